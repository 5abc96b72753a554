//! Executes a download payload for one course.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::api::{CanvasApi, CanvasFile, DiscussionTopic};
use crate::download::state::RunStats;
use crate::download::transfer::{TransferSink, TransferSource};
use crate::error::Result;
use crate::fs::{category_path, course_folder_name, document_path, module_path};
use crate::render::{grade_rows, render, Document};
use crate::selection::{
    module_items, CategoryKind, CategoryRequest, DownloadPayload, FileIndex, Item, ItemMeta,
};

/// Name used in the grades header when the profile cannot be fetched.
const FALLBACK_USER_NAME: &str = "Me";

type TransferOutcome = (PathBuf, Result<()>);

/// Runs one download payload against a transfer sink.
///
/// Categories and the items inside them are fetched one after another.
/// Transfers run in the background and are collected at the end of the run.
pub struct Orchestrator {
    api: CanvasApi,
    sink: Arc<dyn TransferSink>,
    course_id: u64,
    root: String,
    tasks: JoinSet<TransferOutcome>,
    stats: RunStats,
}

impl Orchestrator {
    pub fn new(
        api: CanvasApi,
        sink: Arc<dyn TransferSink>,
        course_id: u64,
        course_code: Option<&str>,
    ) -> Self {
        Self {
            api,
            sink,
            course_id,
            root: course_folder_name(course_code, course_id),
            tasks: JoinSet::new(),
            stats: RunStats::default(),
        }
    }

    /// Course root folder, relative to the sink.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Process every category in the payload.
    ///
    /// Failures are logged and counted. Only an authentication failure stops
    /// the run; transfers issued before it are left running.
    pub async fn run(mut self, payload: &DownloadPayload) -> Result<RunStats> {
        tracing::info!(
            "Starting download of {} categories into {}",
            payload.len(),
            self.root
        );

        for kind in CategoryKind::DOWNLOAD_ORDER {
            let Some(request) = payload.get(kind) else {
                continue;
            };

            tracing::info!("Downloading {}", kind.label());
            let result = self.download_category(kind, request).await;
            if let Err(e) = self.recover(kind.label(), result) {
                self.tasks.detach_all();
                return Err(e);
            }
        }

        self.drain().await;

        tracing::info!(
            "Download finished: {} succeeded, {} failed",
            self.stats.succeeded,
            self.stats.failed
        );
        Ok(self.stats)
    }

    async fn download_category(
        &mut self,
        kind: CategoryKind,
        request: &CategoryRequest,
    ) -> Result<()> {
        match kind {
            CategoryKind::Modules => self.download_modules(request).await,
            CategoryKind::Files => self.download_files(request).await,
            CategoryKind::Assignments => self.download_assignments(request).await,
            CategoryKind::Pages => self.download_pages(request).await,
            CategoryKind::Quizzes => self.download_quizzes(request).await,
            CategoryKind::Discussions | CategoryKind::Announcements => {
                self.download_discussions(kind, request).await
            }
            CategoryKind::Home => self.download_home().await,
            CategoryKind::Syllabus => self.download_syllabus().await,
            CategoryKind::Grades => self.download_grades().await,
        }
    }

    /// Swallow a non-authentication failure after logging it.
    fn recover(&mut self, what: &str, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_authentication() => Err(e),
            Err(e) => {
                tracing::warn!("Failed to download {}: {}", what, e);
                self.stats.record_fetch_failure();
                Ok(())
            }
        }
    }

    fn issue(&mut self, source: TransferSource, dest: PathBuf) {
        tracing::debug!("Queueing transfer to {}", dest.display());
        self.stats.record_issued();

        let sink = Arc::clone(&self.sink);
        self.tasks.spawn(async move {
            let result = sink.transfer(source, &dest).await;
            (dest, result)
        });
    }

    fn issue_document(&mut self, document: &Document<'_>, dest: PathBuf) {
        let source = TransferSource::Inline {
            content: render(document),
            mime: document.mime(),
        };
        self.issue(source, dest);
    }

    fn skip(&mut self, name: &str, reason: &str) {
        tracing::info!("Skipping {}: {}", name, reason);
        self.stats.record_skipped();
    }

    async fn drain(&mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok((dest, Ok(()))) => {
                    tracing::debug!("Saved {}", dest.display());
                    self.stats.record_success();
                }
                Ok((dest, Err(e))) => {
                    tracing::warn!("Download failed for {}: {}", dest.display(), e);
                    self.stats.record_failure();
                }
                Err(e) => {
                    tracing::warn!("Transfer task failed: {}", e);
                    self.stats.record_failure();
                }
            }
        }
    }

    async fn download_modules(&mut self, request: &CategoryRequest) -> Result<()> {
        match request {
            CategoryRequest::All => {
                let modules = self.api.list_modules(self.course_id).await?;
                let files = FileIndex::from_files(self.api.list_files(self.course_id).await?);

                for item in module_items(&modules, &files) {
                    let result = match &item.meta {
                        ItemMeta::ModuleFile { module_name, .. } => {
                            match files.get(&item.id) {
                                Some(CanvasFile {
                                    url: Some(url),
                                    display_name,
                                    ..
                                }) => {
                                    let dest = module_path(&self.root, module_name, display_name);
                                    self.issue(TransferSource::Url(url.clone()), dest);
                                }
                                _ => self.skip(&item.name, "file is not available"),
                            }
                            Ok(())
                        }
                        ItemMeta::ModulePage { .. } => self.download_module_page(&item).await,
                        // Assignments inside modules only download when selected.
                        _ => Ok(()),
                    };
                    self.recover(&item.name, result)?;
                }
            }
            CategoryRequest::Select { items } => {
                for item in items {
                    let result = self.download_module_item(item).await;
                    self.recover(&item.name, result)?;
                }
            }
        }
        Ok(())
    }

    async fn download_module_item(&mut self, item: &Item) -> Result<()> {
        match &item.meta {
            ItemMeta::ModuleFile {
                module_name,
                api_url: Some(api_url),
            } => {
                let file = self.api.resolve_file(api_url).await?;
                match file.url {
                    Some(url) => {
                        let dest = module_path(&self.root, module_name, &item.name);
                        self.issue(TransferSource::Url(url), dest);
                    }
                    None => self.skip(&item.name, "no download URL in file metadata"),
                }
            }
            ItemMeta::ModulePage { .. } => self.download_module_page(item).await?,
            ItemMeta::ModuleAssignment { .. } => {
                self.skip(&item.name, "assignments inside modules are not supported")
            }
            _ => self.skip(&item.name, "nothing to download"),
        }
        Ok(())
    }

    async fn download_module_page(&mut self, item: &Item) -> Result<()> {
        let ItemMeta::ModulePage {
            module_name,
            page_url,
        } = &item.meta
        else {
            return Ok(());
        };

        let slug = page_url.clone().unwrap_or_else(|| item.id.to_string());
        let page = self.api.get_page(self.course_id, &slug).await?;
        let dest = module_path(&self.root, module_name, &format!("{}.html", item.name));
        self.issue_document(
            &Document::Page {
                title: &page.title,
                body: page.body.as_deref(),
            },
            dest,
        );
        Ok(())
    }

    async fn download_files(&mut self, request: &CategoryRequest) -> Result<()> {
        match request {
            CategoryRequest::All => {
                let files = self.api.list_files(self.course_id).await?;
                for file in files {
                    match file.url {
                        Some(url) => {
                            let dest =
                                category_path(&self.root, CategoryKind::Files, &file.display_name);
                            self.issue(TransferSource::Url(url), dest);
                        }
                        None => self.skip(&file.display_name, "file is not available"),
                    }
                }
            }
            CategoryRequest::Select { items } => {
                for item in items {
                    match &item.meta {
                        ItemMeta::File { url: Some(url) } => {
                            let dest = category_path(&self.root, CategoryKind::Files, &item.name);
                            self.issue(TransferSource::Url(url.clone()), dest);
                        }
                        _ => self.skip(&item.name, "file is not available"),
                    }
                }
            }
        }
        Ok(())
    }

    async fn download_assignments(&mut self, request: &CategoryRequest) -> Result<()> {
        match request {
            CategoryRequest::All => {
                let assignments = self.api.list_assignments(self.course_id).await?;
                for assignment in assignments {
                    let dest =
                        document_path(&self.root, CategoryKind::Assignments, &assignment.name);
                    self.issue_document(
                        &Document::Assignment {
                            name: &assignment.name,
                            description: assignment.description.as_deref(),
                        },
                        dest,
                    );
                }
            }
            CategoryRequest::Select { items } => {
                for item in items {
                    let result = self.download_assignment(item).await;
                    self.recover(&item.name, result)?;
                }
            }
        }
        Ok(())
    }

    async fn download_assignment(&mut self, item: &Item) -> Result<()> {
        let assignment = self.api.get_assignment(self.course_id, &item.id).await?;
        let dest = document_path(&self.root, CategoryKind::Assignments, &item.name);
        self.issue_document(
            &Document::Assignment {
                name: &assignment.name,
                description: assignment.description.as_deref(),
            },
            dest,
        );
        Ok(())
    }

    async fn download_pages(&mut self, request: &CategoryRequest) -> Result<()> {
        let pages: Vec<(String, String)> = match request {
            CategoryRequest::All => self
                .api
                .list_pages(self.course_id)
                .await?
                .into_iter()
                .map(|page| (page.url, page.title))
                .collect(),
            CategoryRequest::Select { items } => items
                .iter()
                .map(|item| (item.id.to_string(), item.name.clone()))
                .collect(),
        };

        for (slug, title) in pages {
            let result = self.download_page(&slug, &title).await;
            self.recover(&title, result)?;
        }
        Ok(())
    }

    /// Listings omit page bodies, so every page is fetched on its own.
    async fn download_page(&mut self, slug: &str, title: &str) -> Result<()> {
        let page = self.api.get_page(self.course_id, slug).await?;
        let dest = document_path(&self.root, CategoryKind::Pages, title);
        self.issue_document(
            &Document::Page {
                title,
                body: page.body.as_deref(),
            },
            dest,
        );
        Ok(())
    }

    async fn download_quizzes(&mut self, request: &CategoryRequest) -> Result<()> {
        let quizzes = match request {
            CategoryRequest::All => self.api.list_quizzes(self.course_id).await?,
            CategoryRequest::Select { items } => {
                let mut quizzes = Vec::with_capacity(items.len());
                for item in items {
                    let fetched = self.api.get_quiz(self.course_id, &item.id).await;
                    match fetched {
                        Ok(quiz) => quizzes.push(quiz),
                        Err(e) => self.recover(&item.name, Err(e))?,
                    }
                }
                quizzes
            }
        };

        for quiz in &quizzes {
            let dest = document_path(&self.root, CategoryKind::Quizzes, &quiz.title);
            self.issue_document(
                &Document::Quiz {
                    title: &quiz.title,
                    description: quiz.description.as_deref(),
                    quiz_type: quiz.quiz_type.as_deref(),
                },
                dest,
            );
        }
        Ok(())
    }

    async fn download_discussions(
        &mut self,
        kind: CategoryKind,
        request: &CategoryRequest,
    ) -> Result<()> {
        let topics: Vec<DiscussionTopic> = match request {
            CategoryRequest::All if kind == CategoryKind::Announcements => {
                self.api.list_announcements(self.course_id).await?
            }
            CategoryRequest::All => self.api.list_discussions(self.course_id).await?,
            CategoryRequest::Select { items } => {
                let mut topics = Vec::with_capacity(items.len());
                for item in items {
                    let fetched = self.api.get_discussion(self.course_id, &item.id).await;
                    match fetched {
                        Ok(topic) => topics.push(topic),
                        Err(e) => self.recover(&item.name, Err(e))?,
                    }
                }
                topics
            }
        };

        for topic in &topics {
            let dest = document_path(&self.root, kind, &topic.title);
            self.issue_document(
                &Document::Discussion {
                    title: &topic.title,
                    author: topic.user_name.as_deref(),
                    message: topic.message.as_deref(),
                },
                dest,
            );
        }
        Ok(())
    }

    async fn download_home(&mut self) -> Result<()> {
        let page = self.api.get_front_page(self.course_id).await?;
        let dest = document_path(&self.root, CategoryKind::Home, &page.title);
        self.issue_document(
            &Document::Page {
                title: &page.title,
                body: page.body.as_deref(),
            },
            dest,
        );
        Ok(())
    }

    async fn download_syllabus(&mut self) -> Result<()> {
        let course = self.api.get_syllabus(self.course_id).await?;
        let dest = document_path(&self.root, CategoryKind::Syllabus, "Syllabus");
        self.issue_document(
            &Document::Syllabus {
                body: course.syllabus_body.as_deref(),
            },
            dest,
        );
        Ok(())
    }

    async fn download_grades(&mut self) -> Result<()> {
        let user_name = match self.api.get_profile().await {
            Ok(profile) => profile.name,
            Err(e) if e.is_authentication() => return Err(e),
            Err(e) => {
                tracing::debug!("Profile unavailable, using fallback name: {}", e);
                FALLBACK_USER_NAME.to_string()
            }
        };

        let assignments = self.api.list_assignments(self.course_id).await?;
        let submissions = self.api.list_own_submissions(self.course_id).await?;
        let rows = grade_rows(assignments, &submissions);
        tracing::debug!("Rendering {} grade rows", rows.len());

        let dest = document_path(&self.root, CategoryKind::Grades, "Grades");
        self.issue_document(
            &Document::Grades {
                user_name: &user_name,
                rows: &rows,
            },
            dest,
        );
        Ok(())
    }
}
