//! CLI command implementations

use std::io::IsTerminal;

use clap::{Args, Subcommand};
use futures::FutureExt;
use futures::future::{BoxFuture, OptionFuture};
use marquee_core::{MarqueeConfig, MarqueeError, Result};
use marquee_search::{
    PipelineOutcome, PipelineRun, QueryError, RatingTier, RunError, SearchPipeline, SearchQuery,
    SearchSession,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::render::{RenderStyle, render_outcome};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Search movies by title and print result cards
    Search {
        /// Movie title to search for
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
        #[command(flatten)]
        options: SearchOptions,
    },
    /// Read titles from stdin, one search per line; newer lines cancel older searches
    Interactive {
        #[command(flatten)]
        options: SearchOptions,
    },
    /// Show the colour tier for a rating value
    Rating {
        /// Rating as reported upstream, e.g. "8.8" or "N/A"
        value: String,
    },
}

/// Options shared by the searching commands.
#[derive(Args, Debug, Default, Clone)]
pub struct SearchOptions {
    /// OMDb API key (overrides OMDB_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,
    /// Maximum number of result cards to show
    #[arg(long)]
    pub display_budget: Option<usize>,
    /// Cap on concurrent upstream requests per stage
    #[arg(long)]
    pub max_concurrency: Option<usize>,
    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
    /// Disable ANSI colours
    #[arg(long)]
    pub no_color: bool,
}

impl SearchOptions {
    fn render_style(&self) -> RenderStyle {
        RenderStyle {
            color: !self.no_color && std::io::stdout().is_terminal(),
        }
    }
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Search { title, options } => search(title.join(" "), options).await,
        Commands::Interactive { options } => interactive(options).await,
        Commands::Rating { value } => {
            show_rating(&value);
            Ok(())
        }
    }
}

/// Run one search and print its outcome
///
/// # Errors
/// - `MarqueeError::InvalidInput` - Title is blank
/// - `MarqueeError::Configuration` - Missing API key or invalid settings
pub async fn search(title: String, options: SearchOptions) -> Result<()> {
    let query = SearchQuery::parse(&title).map_err(invalid_input)?;
    let config = apply_options(MarqueeConfig::from_env()?, &options)?;
    let pipeline = SearchPipeline::from_config(&config)?;

    let outcome = pipeline.run(&query).await;
    info!(query = %query, outcome = outcome.label(), "Search finished");

    print_outcome(&outcome, &options)
}

/// Read titles from stdin and search each, last search wins
///
/// # Errors
/// - `MarqueeError::Configuration` - Missing API key or invalid settings
/// - `MarqueeError::Io` - Reading stdin failed
pub async fn interactive(options: SearchOptions) -> Result<()> {
    let config = apply_options(MarqueeConfig::from_env()?, &options)?;
    let session = SearchSession::new(SearchPipeline::from_config(&config)?);
    let input = BufReader::new(tokio::io::stdin());

    run_session(&session, input, |event| match event {
        SessionEvent::Prompt => {
            println!("{}", QueryError::Empty);
            Ok(())
        }
        SessionEvent::Finished(outcome) => print_outcome(&outcome, &options),
    })
    .await
}

/// What a line of interactive input led to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The line was blank
    Prompt,
    /// The latest search completed
    Finished(PipelineOutcome),
}

/// Drives `session` from `input`, one search per line.
///
/// A new line supersedes the search still in flight, so only the latest
/// search of a burst reports an outcome. At end of input the last search is
/// awaited before returning.
///
/// # Errors
/// - `MarqueeError::Io` - Reading `input` failed
/// - Any error returned by `emit`
pub async fn run_session<R, F>(session: &SearchSession, input: R, mut emit: F) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(SessionEvent) -> Result<()>,
{
    let mut lines = input.lines();
    let mut pending: Option<BoxFuture<'static, std::result::Result<PipelineRun, RunError>>> =
        None;

    loop {
        tokio::select! {
            biased;
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match session.start(&line) {
                    Ok(run) => pending = Some(run.boxed()),
                    Err(_) => emit(SessionEvent::Prompt)?,
                }
            }
            Some(result) = OptionFuture::from(pending.as_mut()), if pending.is_some() => {
                pending = None;
                report(result, &mut emit)?;
            }
        }
    }

    match pending {
        Some(run) => report(run.await, &mut emit),
        None => Ok(()),
    }
}

fn report<F>(result: std::result::Result<PipelineRun, RunError>, emit: &mut F) -> Result<()>
where
    F: FnMut(SessionEvent) -> Result<()>,
{
    match result {
        Ok(run) => {
            info!(run_id = %run.run_id, outcome = run.outcome.label(), "Search finished");
            emit(SessionEvent::Finished(run.outcome))
        }
        Err(RunError::Cancelled { run_id }) => {
            debug!(%run_id, "Search superseded by newer input");
            Ok(())
        }
        Err(RunError::InvalidQuery(error)) => Err(invalid_input(error)),
    }
}

/// Print the tier and colour for a rating string
pub fn show_rating(value: &str) {
    let tier = RatingTier::classify(value);
    println!("{tier} {}", tier.color_hex());
}

/// Layers command-line overrides on top of environment configuration.
///
/// # Errors
/// - `MarqueeError::Configuration` - The resulting configuration is unusable
pub fn apply_options(mut config: MarqueeConfig, options: &SearchOptions) -> Result<MarqueeConfig> {
    if let Some(api_key) = options.api_key.as_deref().map(str::trim)
        && !api_key.is_empty()
    {
        config.api.api_key = Some(api_key.to_string());
    }
    if let Some(budget) = options.display_budget {
        config.pipeline.display_budget = budget;
    }
    if let Some(limit) = options.max_concurrency {
        config.pipeline.max_concurrent_requests = Some(limit);
    }

    config.validate()?;
    Ok(config)
}

fn print_outcome(outcome: &PipelineOutcome, options: &SearchOptions) -> Result<()> {
    if options.json {
        let json = serde_json::to_string_pretty(outcome).map_err(std::io::Error::from)?;
        println!("{json}");
    } else {
        print!("{}", render_outcome(outcome, options.render_style()));
    }
    Ok(())
}

fn invalid_input(error: QueryError) -> MarqueeError {
    MarqueeError::InvalidInput {
        reason: error.to_string(),
    }
}
