//! Command-line interface definitions for the NewsAPI explorer.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The search "form" is [`FormArgs`]; it is shared by the one-shot `search`
//! command and the interactive `shell`.

use crate::models::{Language, SearchField, SearchRequest, SortBy};
use crate::outputs::OutputFormat;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the NewsAPI explorer.
///
/// # Examples
///
/// ```sh
/// # Search with the default form values
/// newsapi_explorer --api-key YOUR_KEY search -q apple
///
/// # Italian articles from two domains, newest first, as Markdown
/// newsapi_explorer search -q energia --language it --sort-by publishedAt \
///     --domains ansa.it,repubblica.it --format markdown
///
/// # List valid source identifiers
/// NEWSAPI_API_KEY=YOUR_KEY newsapi_explorer sources
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// NewsAPI API key
    #[arg(long, env = "NEWSAPI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Optional path to a config.yaml file
    #[arg(short, long, env = "NEWSAPI_EXPLORER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Override the upstream base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one search against the everything endpoint
    Search {
        #[command(flatten)]
        form: FormArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the result to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the source identifiers available to this API key
    Sources,
    /// Interactive prompt: each line is a new keyword search
    Shell {
        #[command(flatten)]
        form: FormArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// The search form. Unset flags keep the configured defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct FormArgs {
    /// Keywords or phrases to search for
    #[arg(short, long)]
    pub query: Option<String>,

    /// Restrict the keyword match to these fields
    #[arg(long, value_enum, value_delimiter = ',')]
    pub search_in: Vec<SearchField>,

    /// Comma-separated source identifiers (see the `sources` command)
    #[arg(long, value_delimiter = ',')]
    pub sources: Vec<String>,

    /// Comma-separated domains to restrict the search to
    #[arg(long)]
    pub domains: Option<String>,

    /// Comma-separated domains to remove from the results
    #[arg(long)]
    pub exclude_domains: Option<String>,

    /// Oldest publication date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Newest publication date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Restrict results to one language
    #[arg(long, value_enum, conflicts_with = "all_languages")]
    pub language: Option<Language>,

    /// Search all languages, ignoring any configured default
    #[arg(long)]
    pub all_languages: bool,

    /// Result ordering
    #[arg(long, value_enum)]
    pub sort_by: Option<SortBy>,

    /// Results per page (1-100)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<u32>,
}

impl FormArgs {
    /// Overlay the flags that were given onto `request`.
    pub fn apply_to(&self, request: &mut SearchRequest) {
        if let Some(q) = &self.query {
            request.query = q.clone();
        }
        if !self.search_in.is_empty() {
            request.search_in = self.search_in.clone();
        }
        if !self.sources.is_empty() {
            request.sources = self.sources.clone();
        }
        if self.domains.is_some() {
            request.domains = self.domains.clone();
        }
        if self.exclude_domains.is_some() {
            request.exclude_domains = self.exclude_domains.clone();
        }
        if let Some(from) = self.from {
            request.from_date = from;
        }
        if let Some(to) = self.to {
            request.to_date = to;
        }
        if self.all_languages {
            request.language = None;
        } else if self.language.is_some() {
            request.language = self.language;
        }
        if let Some(sort_by) = self.sort_by {
            request.sort_by = sort_by;
        }
        if let Some(page_size) = self.page_size {
            request.page_size = page_size;
        }
        if let Some(page) = self.page {
            request.page = page;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    #[test]
    fn test_cli_search_parsing() {
        let cli = Cli::parse_from([
            "newsapi_explorer",
            "--api-key",
            "abc123",
            "search",
            "-q",
            "apple",
            "--from",
            "2024-01-01",
            "--to",
            "2024-02-01",
            "--sort-by",
            "popularity",
            "--page-size",
            "20",
            "--page",
            "1",
        ]);
        assert_eq!(cli.api_key.as_deref(), Some("abc123"));

        let Command::Search { form, format, output } = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(format, OutputFormat::Text);
        assert!(output.is_none());

        let mut req = SearchRequest::with_defaults(today());
        form.apply_to(&mut req);
        assert_eq!(req.query, "apple");
        assert_eq!(req.from_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(req.to_date, today());
        assert_eq!(req.sort_by, SortBy::Popularity);
    }

    #[test]
    fn test_cli_list_flags() {
        let cli = Cli::parse_from([
            "newsapi_explorer",
            "search",
            "--search-in",
            "title,description",
            "--sources",
            "bbc-news,the-verge",
            "--language",
            "it",
            "--sort-by",
            "publishedAt",
            "--format",
            "json",
        ]);
        let Command::Search { form, format, .. } = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(format, OutputFormat::Json);
        assert_eq!(form.search_in, vec![SearchField::Title, SearchField::Description]);
        assert_eq!(form.sources, vec!["bbc-news", "the-verge"]);
        assert_eq!(form.language, Some(Language::It));
        assert_eq!(form.sort_by, Some(SortBy::PublishedAt));
    }

    #[test]
    fn test_all_languages_clears_default() {
        let form = FormArgs {
            all_languages: true,
            ..Default::default()
        };
        let mut req = SearchRequest::with_defaults(today());
        req.language = Some(Language::It);
        form.apply_to(&mut req);
        assert!(req.language.is_none());
    }

    #[test]
    fn test_unset_flags_keep_defaults() {
        let mut req = SearchRequest::with_defaults(today());
        let before = req.clone();
        FormArgs::default().apply_to(&mut req);
        assert_eq!(req, before);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["newsapi_explorer", "sources", "--api-key", "k", "-c", "/tmp/c.yaml"]);
        assert!(matches!(cli.command, Command::Sources));
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
    }

    #[test]
    fn test_invalid_date_rejected_by_parser() {
        let result = Cli::try_parse_from(["newsapi_explorer", "search", "--from", "01/02/2024"]);
        assert!(result.is_err());
    }
}
