use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::api::{CanvasApi, Credentials, ItemId};
use crate::error::{Error, Result};
use crate::selection::{CategoryKind, CategoryRequest, DownloadPayload, Item, ItemKind, ItemMeta};

const COURSE_ID: u64 = 1;

/// Records every transfer and fails those whose destination contains
/// `fail_on`.
#[derive(Default)]
struct RecordingSink {
    transfers: Mutex<Vec<(PathBuf, TransferSource)>>,
    fail_on: Option<&'static str>,
}

impl RecordingSink {
    fn failing_on(fragment: &'static str) -> Self {
        Self {
            fail_on: Some(fragment),
            ..Default::default()
        }
    }

    fn sorted(&self) -> Vec<(PathBuf, TransferSource)> {
        let mut transfers = self.transfers.lock().unwrap().clone();
        transfers.sort_by(|a, b| a.0.cmp(&b.0));
        transfers
    }

    fn html(&self, dest: &str) -> String {
        let transfers = self.transfers.lock().unwrap();
        let (_, source) = transfers
            .iter()
            .find(|(path, _)| path == Path::new(dest))
            .unwrap_or_else(|| panic!("no transfer to {dest}"));
        match source {
            TransferSource::Inline { content, mime } => {
                assert_eq!(*mime, "text/html");
                String::from_utf8(content.clone()).unwrap()
            }
            other => panic!("expected inline content, got {other:?}"),
        }
    }
}

#[async_trait]
impl TransferSink for RecordingSink {
    async fn transfer(&self, source: TransferSource, dest: &Path) -> Result<()> {
        self.transfers
            .lock()
            .unwrap()
            .push((dest.to_path_buf(), source));

        match self.fail_on {
            Some(fragment) if dest.to_string_lossy().contains(fragment) => {
                Err(Error::Transfer("disk full".into()))
            }
            _ => Ok(()),
        }
    }
}

fn api_for(server: &MockServer) -> CanvasApi {
    CanvasApi::new(&server.uri(), Credentials::new("1234~token")).unwrap()
}

async fn run(
    server: &MockServer,
    sink: &Arc<RecordingSink>,
    payload: DownloadPayload,
) -> Result<RunStats> {
    let sink: Arc<dyn TransferSink> = sink.clone();
    Orchestrator::new(api_for(server), sink, COURSE_ID, Some("CS1010"))
        .run(&payload)
        .await
}

fn single(kind: CategoryKind, request: CategoryRequest) -> DownloadPayload {
    let mut payload = DownloadPayload::new();
    payload.insert(kind, request);
    payload
}

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn file_item(id: u64, name: &str) -> Item {
    Item {
        id: ItemId::Numeric(id),
        name: name.to_string(),
        kind: ItemKind::File,
        size: Some(100),
        meta: ItemMeta::File {
            url: Some(format!("https://files.example/{}", id)),
        },
    }
}

#[tokio::test]
async fn test_files_all_transfers_every_file() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/v1/courses/1/files",
        json!([
            {"id": 1, "display_name": "a.pdf", "size": 10, "url": "https://files.example/1"},
            {"id": 2, "display_name": "week 1/notes.pdf", "size": 20, "url": "https://files.example/2"}
        ]),
    )
    .await;

    let sink = Arc::new(RecordingSink::default());
    let stats = run(&server, &sink, single(CategoryKind::Files, CategoryRequest::All))
        .await
        .unwrap();

    assert_eq!(
        sink.sorted(),
        vec![
            (
                PathBuf::from("CS1010/Files/a.pdf"),
                TransferSource::Url("https://files.example/1".into())
            ),
            (
                PathBuf::from("CS1010/Files/week 1_notes.pdf"),
                TransferSource::Url("https://files.example/2".into())
            ),
        ]
    );
    assert_eq!(stats.issued, 2);
    assert_eq!(stats.succeeded, 2);
    assert!(!stats.has_failures());
}

#[tokio::test]
async fn test_one_failed_transfer_does_not_stop_the_batch() {
    let server = MockServer::start().await;
    let items = (1..=5)
        .map(|id| file_item(id, &format!("file{}.pdf", id)))
        .collect();

    let sink = Arc::new(RecordingSink::failing_on("file3"));
    let stats = run(
        &server,
        &sink,
        single(CategoryKind::Files, CategoryRequest::Select { items }),
    )
    .await
    .unwrap();

    assert_eq!(sink.sorted().len(), 5);
    assert_eq!(stats.issued, 5);
    assert_eq!(stats.succeeded, 4);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn test_failed_transfer_in_full_listing_does_not_stop_the_batch() {
    let server = MockServer::start().await;
    let files: Vec<_> = (1..=5)
        .map(|id| {
            json!({
                "id": id,
                "display_name": format!("file{}.pdf", id),
                "size": 10,
                "url": format!("https://files.example/{}", id),
            })
        })
        .collect();
    mount_json(&server, "/api/v1/courses/1/files", json!(files)).await;

    let sink = Arc::new(RecordingSink::failing_on("file3"));
    let stats = run(&server, &sink, single(CategoryKind::Files, CategoryRequest::All))
        .await
        .unwrap();

    let dests: Vec<_> = sink.sorted().into_iter().map(|(dest, _)| dest).collect();
    assert_eq!(
        dests,
        (1..=5)
            .map(|id| PathBuf::from(format!("CS1010/Files/file{}.pdf", id)))
            .collect::<Vec<_>>()
    );
    assert_eq!(stats.issued, 5);
    assert_eq!(stats.succeeded, 4);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.fetch_failures, 0);
}

#[tokio::test]
async fn test_modules_all_joins_file_listing_and_renders_pages() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/v1/courses/1/modules",
        json!([{
            "id": 1,
            "name": "Week 1",
            "items": [
                {"id": 11, "title": "Slides", "type": "File", "content_id": 100},
                {"id": 12, "title": "Reading", "type": "Page", "page_url": "reading"},
                {"id": 13, "title": "Lab 1", "type": "Assignment", "content_id": 300},
                {"id": 14, "title": "Course site", "type": "ExternalUrl"},
                {"id": 15, "title": "Locked", "type": "File", "content_id": 999}
            ]
        }]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 100, "display_name": "slides-v2.pdf", "size": 10, "url": "https://files.example/100"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    mount_json(
        &server,
        "/api/v1/courses/1/pages/reading",
        json!({"url": "reading", "title": "Reading", "body": "<p>Chapter 1</p>"}),
    )
    .await;

    let sink = Arc::new(RecordingSink::default());
    let stats = run(&server, &sink, single(CategoryKind::Modules, CategoryRequest::All))
        .await
        .unwrap();

    let transfers = sink.sorted();
    assert_eq!(transfers.len(), 2);
    assert_eq!(
        transfers[1],
        (
            PathBuf::from("CS1010/Modules/Week 1/slides-v2.pdf"),
            TransferSource::Url("https://files.example/100".into())
        )
    );
    assert_eq!(
        sink.html("CS1010/Modules/Week 1/Reading.html"),
        "<html><head><title>Reading</title></head><body><p>Chapter 1</p></body></html>"
    );
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.succeeded, 2);
}

#[tokio::test]
async fn test_pages_all_refetches_each_page_body() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/v1/courses/1/pages",
        json!([
            {"url": "week-1", "title": "Week 1"},
            {"url": "faq", "title": "FAQ"}
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/pages/week-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"url": "week-1", "title": "Week 1", "body": "<p>Intro</p>"}),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/pages/faq"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"url": "faq", "title": "FAQ", "body": "<p>Ask away</p>"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let stats = run(&server, &sink, single(CategoryKind::Pages, CategoryRequest::All))
        .await
        .unwrap();

    assert_eq!(stats.issued, 2);
    assert_eq!(
        sink.html("CS1010/Pages/Week 1.html"),
        "<html><head><title>Week 1</title></head><body><p>Intro</p></body></html>"
    );
    assert_eq!(
        sink.html("CS1010/Pages/FAQ.html"),
        "<html><head><title>FAQ</title></head><body><p>Ask away</p></body></html>"
    );
}

#[tokio::test]
async fn test_pages_select_fetches_only_selected_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/pages/faq"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"url": "faq", "title": "FAQ (updated)", "body": "<p>Ask away</p>"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let items = vec![Item::record("faq", "FAQ", ItemKind::Page)];
    let sink = Arc::new(RecordingSink::default());
    let stats = run(
        &server,
        &sink,
        single(CategoryKind::Pages, CategoryRequest::Select { items }),
    )
    .await
    .unwrap();

    assert_eq!(stats.issued, 1);
    assert_eq!(
        sink.html("CS1010/Pages/FAQ.html"),
        "<html><head><title>FAQ</title></head><body><p>Ask away</p></body></html>"
    );
}

#[tokio::test]
async fn test_quizzes_select_uses_fetched_titles() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/v1/courses/1/quizzes/5",
        json!({
            "id": 5,
            "title": "Quiz 1",
            "description": "<p>Ten questions</p>",
            "quiz_type": "assignment"
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/quizzes/6"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let items = vec![
        Item::record(5u64, "Quiz 1 (draft)", ItemKind::Quiz),
        Item::record(6u64, "Quiz 2", ItemKind::Quiz),
    ];
    let sink = Arc::new(RecordingSink::default());
    let stats = run(
        &server,
        &sink,
        single(CategoryKind::Quizzes, CategoryRequest::Select { items }),
    )
    .await
    .unwrap();

    assert_eq!(sink.sorted().len(), 1);
    assert_eq!(
        sink.html("CS1010/Quizzes/Quiz 1.html"),
        "<html><head><title>Quiz 1</title></head><body><h1>Quiz 1</h1><p>Ten questions</p><hr><p>Type: assignment</p></body></html>"
    );
    assert_eq!(stats.fetch_failures, 1);
}

#[tokio::test]
async fn test_announcements_all_requests_only_announcements() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/discussion_topics"))
        .and(query_param("only_announcements", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "Exam venue", "message": "<p>MPSH 1</p>", "user_name": "Prof Lee"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/discussion_topics"))
        .and(query_param_is_missing("only_announcements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    run(
        &server,
        &sink,
        single(CategoryKind::Announcements, CategoryRequest::All),
    )
    .await
    .unwrap();

    assert_eq!(sink.sorted().len(), 1);
    assert_eq!(
        sink.html("CS1010/Announcements/Exam venue.html"),
        "<html><head><title>Exam venue</title></head><body><h1>Exam venue</h1><p>Author: Prof Lee</p><hr><p>MPSH 1</p></body></html>"
    );
}

#[tokio::test]
async fn test_home_saves_front_page_under_its_title() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/v1/courses/1/front_page",
        json!({"url": "home", "title": "Welcome", "body": "<p>Hello class</p>"}),
    )
    .await;

    let sink = Arc::new(RecordingSink::default());
    let stats = run(&server, &sink, single(CategoryKind::Home, CategoryRequest::All))
        .await
        .unwrap();

    assert_eq!(stats.succeeded, 1);
    assert_eq!(
        sink.html("CS1010/Home/Welcome.html"),
        "<html><head><title>Welcome</title></head><body><p>Hello class</p></body></html>"
    );
}

#[tokio::test]
async fn test_grades_rows_include_unmatched_submissions() {
    let server = MockServer::start().await;
    mount_json(&server, "/api/v1/users/self/profile", json!({"name": "Alex Tan"})).await;
    mount_json(
        &server,
        "/api/v1/courses/1/assignments",
        json!([
            {"id": 10, "name": "Lab 1", "points_possible": 10.0},
            {"id": 11, "name": "Lab 2", "points_possible": 20.0}
        ]),
    )
    .await;
    mount_json(
        &server,
        "/api/v1/courses/1/students/submissions",
        json!([
            {"assignment_id": 10, "score": 8.0, "grade": "B"},
            {"assignment_id": 999, "score": null, "grade": null},
            {"assignment_id": 11, "score": 20.0, "grade": "A"}
        ]),
    )
    .await;

    let sink = Arc::new(RecordingSink::default());
    run(&server, &sink, single(CategoryKind::Grades, CategoryRequest::All))
        .await
        .unwrap();

    let html = sink.html("CS1010/Grades/Grades.html");
    assert!(html.contains("<h1>Grades: Alex Tan</h1>"));
    assert_eq!(html.matches("<tr><td").count(), 3);
    assert!(html.contains("Assignment 999"));
    assert!(html.contains("<b>8</b>/10"));
    assert!(html.contains("<b>-</b>/-"));
}

#[tokio::test]
async fn test_grades_fall_back_to_default_user_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/self/profile"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_json(&server, "/api/v1/courses/1/assignments", json!([])).await;
    mount_json(&server, "/api/v1/courses/1/students/submissions", json!([])).await;

    let sink = Arc::new(RecordingSink::default());
    run(&server, &sink, single(CategoryKind::Grades, CategoryRequest::All))
        .await
        .unwrap();

    assert!(sink
        .html("CS1010/Grades/Grades.html")
        .contains("<h1>Grades: Me</h1>"));
}

#[tokio::test]
async fn test_module_selection_resolves_files_and_pages() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/v1/courses/1/files/100",
        json!({"id": 100, "display_name": "slides-v2.pdf", "size": 10, "url": "https://files.example/100"}),
    )
    .await;
    mount_json(
        &server,
        "/api/v1/courses/1/pages/reading",
        json!({"url": "reading", "title": "Reading", "body": "<p>Read</p>"}),
    )
    .await;

    let items = vec![
        Item {
            id: ItemId::Numeric(100),
            name: "Slides".into(),
            kind: ItemKind::ModuleFile,
            size: Some(10),
            meta: ItemMeta::ModuleFile {
                module_name: "Week 1".into(),
                api_url: Some(format!("{}/api/v1/courses/1/files/100", server.uri())),
            },
        },
        Item {
            id: ItemId::Numeric(12),
            name: "Reading".into(),
            kind: ItemKind::ModulePage,
            size: None,
            meta: ItemMeta::ModulePage {
                module_name: "Week 1".into(),
                page_url: Some("reading".into()),
            },
        },
        Item {
            id: ItemId::Numeric(300),
            name: "Lab 1".into(),
            kind: ItemKind::ModuleAssignment,
            size: None,
            meta: ItemMeta::ModuleAssignment {
                module_name: "Week 1".into(),
            },
        },
    ];

    let sink = Arc::new(RecordingSink::default());
    let stats = run(
        &server,
        &sink,
        single(CategoryKind::Modules, CategoryRequest::Select { items }),
    )
    .await
    .unwrap();

    let transfers = sink.sorted();
    assert_eq!(transfers.len(), 2);
    assert_eq!(
        transfers[1],
        (
            PathBuf::from("CS1010/Modules/Week 1/Slides"),
            TransferSource::Url("https://files.example/100".into())
        )
    );
    assert_eq!(
        sink.html("CS1010/Modules/Week 1/Reading.html"),
        "<html><head><title>Reading</title></head><body><p>Read</p></body></html>"
    );
    assert_eq!(stats.skipped, 1);
}

#[tokio::test]
async fn test_failed_detail_fetch_is_isolated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/assignments/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_json(
        &server,
        "/api/v1/courses/1/assignments/2",
        json!({"id": 2, "name": "Lab 2", "description": "<p>Build it</p>"}),
    )
    .await;

    let items = vec![
        Item::record(1u64, "Lab 1", ItemKind::Assignment),
        Item::record(2u64, "Lab 2 (renamed)", ItemKind::Assignment),
    ];
    let sink = Arc::new(RecordingSink::default());
    let stats = run(
        &server,
        &sink,
        single(CategoryKind::Assignments, CategoryRequest::Select { items }),
    )
    .await
    .unwrap();

    assert_eq!(stats.fetch_failures, 1);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(
        sink.html("CS1010/Assignments/Lab 2 (renamed).html"),
        "<html><head><title>Lab 2</title></head><body><h1>Lab 2</h1><p>Build it</p></body></html>"
    );
}

#[tokio::test]
async fn test_unauthorized_aborts_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/files"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/self/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Alex"})))
        .expect(0)
        .mount(&server)
        .await;

    let mut payload = single(CategoryKind::Files, CategoryRequest::All);
    payload.insert(CategoryKind::Grades, CategoryRequest::All);

    let sink = Arc::new(RecordingSink::default());
    let result = run(&server, &sink, payload).await;

    assert!(matches!(result, Err(Error::Authentication(_))));
    assert!(sink.sorted().is_empty());
}

#[tokio::test]
async fn test_dispatch_commands() {
    let server = MockServer::start().await;
    let api = api_for(&server);
    let sink: Arc<dyn TransferSink> = Arc::new(RecordingSink::default());

    let legacy = dispatch(Command::StartDownload, &api, sink.clone()).await.unwrap();
    assert!(legacy.is_none());

    let empty = Command::DownloadGranular {
        course_id: COURSE_ID,
        course_code: None,
        payload: DownloadPayload::new(),
    };
    assert!(matches!(
        dispatch(empty, &api, sink).await,
        Err(Error::EmptySelection)
    ));
}

#[tokio::test]
async fn test_root_folder_falls_back_to_course_id() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/v1/courses/1",
        json!({"id": 1, "syllabus_body": "<p>Week 1</p>"}),
    )
    .await;

    let sink = Arc::new(RecordingSink::default());
    let dyn_sink: Arc<dyn TransferSink> = sink.clone();
    Orchestrator::new(api_for(&server), dyn_sink, COURSE_ID, None)
        .run(&single(CategoryKind::Syllabus, CategoryRequest::All))
        .await
        .unwrap();

    assert!(sink
        .html("Canvas_Course_1/Syllabus/Syllabus.html")
        .contains("<h1>Syllabus</h1><p>Week 1</p>"));
}
