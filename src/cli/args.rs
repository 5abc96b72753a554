//! Command-line argument definitions using clap.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::api::ItemId;
use crate::config::Config;
use crate::selection::CategoryKind;

/// Canvas course downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "canvas-downloader",
    version,
    about = "Download Canvas course content into a local folder tree",
    long_about = "A CLI tool to export files, modules, assignments, pages, quizzes, discussions,\n\
                  announcements, the home page, the syllabus and your grades from a Canvas course.\n\n\
                  Categories are downloaded whole unless individual items are selected."
)]
pub struct Args {
    /// Course id or any Canvas URL inside the course.
    #[arg(long, value_name = "ID|URL")]
    pub course: Option<String>,

    /// Canvas access token. Saved to the config file once validated.
    /// Falls back to the CANVAS_TOKEN environment variable, which is never saved.
    #[arg(short, long)]
    pub token: Option<String>,

    /// Root URL of the Canvas instance.
    #[arg(long = "base-url", env = "CANVAS_BASE_URL")]
    pub base_url: Option<String>,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory")]
    pub download_directory: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Select every category.
    #[arg(long)]
    pub all: bool,

    /// Select a whole category. Repeatable; replaces the configured defaults.
    #[arg(long = "category", value_name = "KIND")]
    pub categories: Vec<CategoryKind>,

    /// Select a single item, e.g. `files:123` or `pages:week-1`. Repeatable.
    #[arg(long = "item", value_name = "KIND:ID")]
    pub items: Vec<ItemSelector>,

    /// Print the selection tree instead of downloading.
    #[arg(long)]
    pub list: bool,

    /// Write the download command to a JSON file instead of running it.
    #[arg(long = "save-command", value_name = "FILE")]
    pub save_command: Option<PathBuf>,

    /// Run a previously saved download command.
    #[arg(
        long = "command",
        value_name = "FILE",
        conflicts_with_all = ["course", "all", "categories", "items", "list", "save_command"]
    )]
    pub command: Option<PathBuf>,

    /// Hide download progress information.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// Environment variable consulted when `--token` is absent.
pub const TOKEN_ENV: &str = "CANVAS_TOKEN";

/// Where the token in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Flag,
    Environment,
    ConfigFile,
}

/// The token a run authenticates with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub value: String,
    pub source: TokenSource,
}

impl ResolvedToken {
    /// Only tokens typed on the command line are written to the config file.
    pub fn should_persist(&self, stored: Option<&str>) -> bool {
        self.source == TokenSource::Flag && stored != Some(self.value.as_str())
    }

    /// A rejected token is removed from the config file only if it is the
    /// one stored there.
    pub fn should_clear_on_rejection(&self, stored: Option<&str>) -> bool {
        stored == Some(self.value.as_str())
    }
}

/// A `<category>:<id>` item reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSelector {
    pub kind: CategoryKind,
    pub id: ItemId,
}

impl FromStr for ItemSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| format!("Expected <category>:<id>, got '{}'", s))?;

        let kind: CategoryKind = kind.parse()?;
        let id = id.trim();
        if id.is_empty() {
            return Err(format!("Missing item id in '{}'", s));
        }

        let id = match id.parse::<u64>() {
            Ok(numeric) => ItemId::Numeric(numeric),
            Err(_) => ItemId::Slug(id.to_string()),
        };

        Ok(Self { kind, id })
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    ///
    /// The token is handled by [`Args::resolve_token`].
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.account.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(dir) = &self.download_directory {
            config.options.download_directory = Some(dir.clone());
        }

        if self.quiet {
            config.options.show_downloads = false;
        }
    }

    /// Pick the token: `--token`, then the environment, then the stored one.
    /// Blank values are ignored.
    pub fn resolve_token(
        &self,
        env_token: Option<String>,
        stored: Option<&str>,
    ) -> Option<ResolvedToken> {
        let candidates = [
            (self.token.clone(), TokenSource::Flag),
            (env_token, TokenSource::Environment),
            (stored.map(str::to_string), TokenSource::ConfigFile),
        ];

        candidates.into_iter().find_map(|(value, source)| {
            let value = value?.trim().to_string();
            (!value.is_empty()).then_some(ResolvedToken { value, source })
        })
    }

    /// Whether the command line replaces the configured default categories.
    pub fn has_explicit_selection(&self) -> bool {
        self.all || !self.categories.is_empty() || !self.items.is_empty()
    }
}
