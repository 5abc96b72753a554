//! Canvas Downloader - CLI entry point.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use canvas_downloader::{
    api::{CanvasApi, Credentials},
    cli::{Args, ResolvedToken, TOKEN_ENV},
    config::{
        default_config_path, parse_course_id, parse_default_categories, validate_config,
        validate_token, Config,
    },
    download::{dispatch, Command, FsTransferSink, TransferSink},
    error::{exit_codes, Error, Result},
    output::{
        create_spinner, print_banner, print_course_summary, print_error, print_info,
        print_run_stats, print_selection_stats, print_selection_tree, print_success,
        print_warning,
    },
    selection::{CategoryKind, CourseSession},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::EmptySelection => ExitCode::from(exit_codes::ABORT as u8),
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::UnknownCategory(_)
                | Error::TomlParse(_)
                | Error::UrlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::Authentication(_) => ExitCode::from(exit_codes::AUTH_ERROR as u8),
                Error::Api(_) | Error::UnexpectedStatus { .. } | Error::Http(_) => {
                    ExitCode::from(exit_codes::API_ERROR as u8)
                }
                Error::Transfer(_) => ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    if !args.quiet {
        print_banner();
    }

    // Load configuration
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    if !config_path.exists() {
        print_info(&format!(
            "No configuration at {}, using defaults",
            config_path.display()
        ));
    }
    let mut config = Config::load_or_default(&config_path)?;
    let stored_token = config.account.token.take();

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);
    validate_config(&config)?;

    let token = args
        .resolve_token(std::env::var(TOKEN_ENV).ok(), stored_token.as_deref())
        .ok_or_else(|| {
            Error::MissingConfig(format!("token (pass --token or set {})", TOKEN_ENV))
        })?;
    validate_token(&token.value)?;
    tracing::debug!("Using token from {:?}", token.source);

    let api = CanvasApi::new(&config.account.base_url, Credentials::new(token.value.clone()))?
        .with_page_size(config.options.page_size);

    let result = run_with_api(
        &args,
        &config,
        &api,
        &config_path,
        &token,
        stored_token.as_deref(),
    )
    .await;

    if let Err(Error::Authentication(_)) = &result {
        if token.should_clear_on_rejection(stored_token.as_deref()) {
            Config::load_or_default(&config_path)?.clear_token(&config_path)?;
        }
        print_warning("The Canvas token is invalid or expired. Pass a new one with --token.");
    }

    result
}

async fn run_with_api(
    args: &Args,
    config: &Config,
    api: &CanvasApi,
    config_path: &Path,
    token: &ResolvedToken,
    stored_token: Option<&str>,
) -> Result<()> {
    // Validate token by fetching the current user
    let user = api.validate_token().await?;
    print_info(&format!("Logged in as: {}", user.name));

    if token.should_persist(stored_token) {
        Config::load_or_default(config_path)?.set_token(&token.value, config_path)?;
        tracing::info!("Saved token to {}", config_path.display());
    }

    let download_dir = config.download_directory();
    let sink: Arc<dyn TransferSink> = Arc::new(
        FsTransferSink::new(&download_dir, api.http_client().clone())
            .with_progress(config.options.show_downloads)
            .with_concurrency(config.options.concurrent_transfers),
    );

    // Replay a saved command
    if let Some(path) = &args.command {
        let command = Command::load(path)?;
        print_info(&format!("Running command from {}", path.display()));
        if let Some(stats) = dispatch(command, api, sink).await? {
            print_run_stats(&stats);
        }
        return Ok(());
    }

    let course_input = args
        .course
        .as_deref()
        .ok_or_else(|| Error::MissingConfig("course (pass --course <id|url>)".into()))?;
    let course_id = parse_course_id(course_input)?;
    let defaults = parse_default_categories(&config.options.default_categories)?;

    let spinner = (!args.quiet).then(|| create_spinner("Loading course..."));
    let opened = CourseSession::open(api, course_id, &defaults).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let mut session = opened?;

    print_course_summary(session.course(), &download_dir.display().to_string());

    apply_selection(&mut session, api, args).await?;

    if args.list {
        print_selection_tree(session.tree());
        print_selection_stats(&session.selection_stats());
        return Ok(());
    }

    let payload = session.build_payload()?;
    print_selection_stats(&session.selection_stats());

    let command = Command::DownloadGranular {
        course_id,
        course_code: session.course().code.clone(),
        payload,
    };

    if let Some(path) = &args.save_command {
        command.save(path)?;
        print_success(&format!("Saved download command to {}", path.display()));
        return Ok(());
    }

    let stats = dispatch(command, api, sink).await?;
    if let Some(stats) = stats {
        print_run_stats(&stats);
        if stats.has_failures() {
            print_warning("Some content could not be downloaded, see the log above.");
        } else {
            print_success("Download complete");
        }
    }

    Ok(())
}

/// Apply the command-line selection to the session tree.
///
/// Explicit selections replace the configured default categories.
async fn apply_selection(session: &mut CourseSession, api: &CanvasApi, args: &Args) -> Result<()> {
    if !args.has_explicit_selection() {
        if args.list {
            for kind in CategoryKind::DISPLAY_ORDER {
                session.expand_or_check(api, kind).await?;
            }
        }
        return Ok(());
    }

    if args.all {
        let spinner = (!args.quiet).then(|| create_spinner("Loading all categories..."));
        let result = session.toggle_all(api, true).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        return result;
    }

    for kind in CategoryKind::ALL {
        session.toggle_category(api, kind, false).await?;
    }

    for kind in &args.categories {
        session.toggle_category(api, *kind, true).await?;
    }

    for selector in &args.items {
        session.expand_or_check(api, selector.kind).await?;
        if !session.set_item_checked(selector.kind, &selector.id, true) {
            print_warning(&format!(
                "No {} item with id {}",
                selector.kind, selector.id
            ));
        }
    }

    Ok(())
}
