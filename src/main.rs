//! # NewsAPI Explorer
//!
//! A command-line client for the NewsAPI `everything` search endpoint. The
//! command-line flags form the search form; results are rendered as a
//! numbered list in plain text, Markdown, or JSON.
//!
//! ## Usage
//!
//! ```sh
//! newsapi_explorer --api-key YOUR_KEY search -q apple --sort-by popularity
//! newsapi_explorer sources
//! newsapi_explorer shell --language en
//! ```
//!
//! ## Architecture
//!
//! Each submission follows the same pipeline:
//! 1. **Form**: configured defaults overlaid with command-line flags ([`cli::FormArgs`])
//! 2. **Parameters**: the request is validated and translated to query keys ([`params`])
//! 3. **Fetch**: one GET against the upstream API ([`api`])
//! 4. **Render**: the response is interpreted and formatted ([`render`], [`outputs`])
//!
//! The source catalog ([`sources`]) is fetched lazily and memoized per API key.

use clap::Parser;
use std::error::Error;
use std::io::Write as _;
use std::path::Path;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod params;
mod render;
mod sources;
mod utils;

use api::{HttpGet, NewsApi, ReqwestGet};
use cli::{Cli, Command, FormArgs};
use config::Settings;
use error::NewsResult;
use models::SearchRequest;
use outputs::OutputFormat;
use render::SearchOutcome;
use sources::{SourceCatalogCache, SourceLookupOutcome, unknown_sources};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    let _ = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(command = ?args.command, config = ?args.config, "Parsed CLI arguments");

    let settings = match Settings::load(&args).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to load settings");
            eprintln!("Configuration error: {e}");
            return Ok(ExitCode::from(2));
        }
    };

    let client = ReqwestGet::new(settings.timeout, &settings.user_agent)?;
    let api = NewsApi::new(client, settings.base_url.clone());
    let catalog = SourceCatalogCache::new();

    let code = match &args.command {
        Command::Search {
            form,
            format,
            output,
        } => run_search(&api, &catalog, &settings, form, *format, output.as_deref()).await?,
        Command::Sources => run_sources(&api, &catalog, &settings).await,
        Command::Shell { form, format } => run_shell(&api, &catalog, &settings, form, *format).await?,
    };

    info!("Done");
    Ok(code)
}

/// One-shot search: build the form, submit, print or write the result.
#[instrument(level = "info", skip_all)]
async fn run_search<C: HttpGet>(
    api: &NewsApi<C>,
    catalog: &SourceCatalogCache,
    settings: &Settings,
    form: &FormArgs,
    format: OutputFormat,
    output: Option<&Path>,
) -> NewsResult<ExitCode> {
    let today = utils::today();
    let mut request = settings.request_defaults(today);
    form.apply_to(&mut request);

    let outcome = match submit(api, catalog, settings, &request, today).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_configuration() => {
            warn!(error = %e, "Submission blocked before any request was sent");
            eprintln!("Configuration error: {e}");
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e),
    };

    let rendered = outputs::format_outcome(&outcome, &request, format)?;
    match output {
        Some(path) => {
            outputs::write_output(path, &rendered).await?;
            eprintln!("{} (written to {})", outcome.headline(), path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(if outcome.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Validate requested sources against the catalog, then run the search.
///
/// Unknown source ids only produce a warning; the upstream API has the final say.
async fn submit<C: HttpGet>(
    api: &NewsApi<C>,
    catalog: &SourceCatalogCache,
    settings: &Settings,
    request: &SearchRequest,
    today: chrono::NaiveDate,
) -> NewsResult<SearchOutcome> {
    if let (false, Some(key)) = (request.sources.is_empty(), settings.api_key.as_deref()) {
        let known = catalog.lookup(api, key).await;
        if !known.is_empty() {
            let unknown = unknown_sources(&request.sources, &known);
            if !unknown.is_empty() {
                warn!(?unknown, "Requested sources are not in the source catalog");
                eprintln!("Warning: unknown source ids: {}", unknown.join(", "));
            }
        }
    }
    api.search(request, settings.api_key.as_deref(), today).await
}

/// Print the source catalog, one id per line.
#[instrument(level = "info", skip_all)]
async fn run_sources<C: HttpGet>(
    api: &NewsApi<C>,
    catalog: &SourceCatalogCache,
    settings: &Settings,
) -> ExitCode {
    let Some(key) = settings.api_key.as_deref() else {
        eprintln!("Configuration error: {}", error::NewsError::MissingApiKey);
        return ExitCode::from(2);
    };
    print_sources(catalog.resolve(api, key).await)
}

fn print_sources(outcome: SourceLookupOutcome) -> ExitCode {
    match outcome {
        SourceLookupOutcome::Fetched(ids) if ids.is_empty() => {
            println!("Info: no sources available.");
            ExitCode::SUCCESS
        }
        SourceLookupOutcome::Fetched(ids) => {
            for id in ids {
                println!("{id}");
            }
            ExitCode::SUCCESS
        }
        SourceLookupOutcome::Failed(reason) => {
            warn!(%reason, "Source lookup failed");
            eprintln!("Warning: source lookup failed ({reason}); no sources available.");
            ExitCode::FAILURE
        }
    }
}

const SHELL_HELP: &str = "Type keywords to search. Commands: :sources, :help, :quit";

/// Interactive prompt. Every line is a fresh submission; errors are printed
/// and the prompt keeps going.
#[instrument(level = "info", skip_all)]
async fn run_shell<C: HttpGet>(
    api: &NewsApi<C>,
    catalog: &SourceCatalogCache,
    settings: &Settings,
    form: &FormArgs,
    format: OutputFormat,
) -> NewsResult<ExitCode> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("{SHELL_HELP}");

    loop {
        eprint!("search> ");
        let _ = std::io::stderr().flush();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => continue,
            ":quit" | ":q" | ":exit" => break,
            ":help" => eprintln!("{SHELL_HELP}"),
            ":sources" => match settings.api_key.as_deref() {
                Some(key) => {
                    print_sources(catalog.resolve(api, key).await);
                }
                None => eprintln!("Configuration error: {}", error::NewsError::MissingApiKey),
            },
            query => {
                let today = utils::today();
                let mut request = settings.request_defaults(today);
                form.apply_to(&mut request);
                request.query = query.to_string();

                match submit(api, catalog, settings, &request, today).await {
                    Ok(outcome) => match outputs::format_outcome(&outcome, &request, format) {
                        Ok(rendered) => print!("{rendered}"),
                        Err(e) => error!(error = %e, "Failed to format result"),
                    },
                    Err(e) => eprintln!("Configuration error: {e}"),
                }
            }
        }
    }

    info!(cached_catalogs = catalog.len().await, "Shell closed");
    Ok(ExitCode::SUCCESS)
}
