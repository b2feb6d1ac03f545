//! CLI for the PR metadata policy
//!
//! Run `pr-policy --help` for usage information. Inside GitHub Actions every
//! option is picked up from the standard workflow environment.

// CLI binaries legitimately need println! for user output
#![allow(clippy::disallowed_macros)]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pr_policy::config::{DEFAULT_API_URL, DEFAULT_BOT_LOGIN, DEFAULT_SERVER_URL};
use pr_policy::{
    checklist, remediation, ChecklistSync, Config, DryRunStore, GitHubClient, LabelSet, PolicyError,
    PrStore, RemediationPublisher, RepoSlug, SyncOutcome, Trigger, Validator,
};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pr-policy")]
#[command(about = "Keep PR checklist comments and labels in sync and validate PR metadata")]
#[command(version)]
struct Cli {
    /// Repository in owner/repo format
    #[arg(long, env = "GITHUB_REPOSITORY", global = true)]
    repo: Option<String>,

    /// GitHub token used for comment and label writes
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// GitHub web URL, used to recognize pull request links
    #[arg(long, env = "GITHUB_SERVER_URL", default_value = DEFAULT_SERVER_URL, global = true)]
    server_url: String,

    /// Login the automation writes as; its own events are ignored
    #[arg(long, env = "PR_POLICY_BOT_LOGIN", default_value = DEFAULT_BOT_LOGIN, global = true)]
    bot_login: String,

    /// Log writes instead of performing them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Output format: json, text
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Log format: json, text
    #[arg(long, default_value = "text", global = true)]
    log_format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
struct EventArgs {
    /// Name of the triggering event
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    event_name: String,

    /// Path to the event payload JSON
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: PathBuf,

    /// Actor to assume when the payload has no sender
    #[arg(long, env = "GITHUB_ACTOR")]
    actor: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync the checklist comment and the PR labels for the current event
    Sync {
        #[command(flatten)]
        event: EventArgs,
    },

    /// Validate PR labels and description, publishing remediations
    Validate {
        #[command(flatten)]
        event: EventArgs,
    },

    /// Print the checklist comment for a set of labels
    Render {
        /// Label present on the PR (repeatable)
        #[arg(short, long = "label")]
        labels: Vec<String>,
    },

    /// Validate labels and a PR description offline
    CheckBody {
        /// Label present on the PR (repeatable)
        #[arg(short, long = "label")]
        labels: Vec<String>,

        /// File holding the PR description (stdin when omitted)
        #[arg(long)]
        body_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<PolicyError>() {
                Some(cause) if cause.is_precondition() => {
                    error!(%cause, "Cannot evaluate this event: {e:#}");
                }
                _ => error!("{e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });

    match cli.log_format {
        OutputFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init(),
        OutputFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .init(),
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    match &cli.command {
        Commands::Render { labels } => {
            let labels: LabelSet = labels.iter().map(String::as_str).collect();
            println!("{}", checklist::render(&labels));
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckBody { labels, body_file } => {
            run_check_body(&cli, labels, body_file.as_ref())
        }
        Commands::Sync { event } => run_sync(&cli, event).await,
        Commands::Validate { event } => run_validate(&cli, event).await,
    }
}

fn build_config(cli: &Cli) -> Result<Config> {
    let repo = cli
        .repo
        .as_deref()
        .context("repository is required (--repo or GITHUB_REPOSITORY)")?;
    let repository: RepoSlug = repo.parse()?;

    Ok(Config::new(repository)
        .with_api_url(&cli.api_url)
        .with_server_url(&cli.server_url)
        .with_bot_login(&cli.bot_login))
}

fn build_store(cli: &Cli, config: &Config) -> Result<Arc<dyn PrStore>> {
    let token = cli
        .token
        .as_deref()
        .context("GitHub token is required (--token or GITHUB_TOKEN)")?;
    let client = GitHubClient::new(&config.api_url, token)?;

    if cli.dry_run {
        info!("Dry run: writes will be logged, not performed");
        Ok(Arc::new(DryRunStore::new(client)))
    } else {
        Ok(Arc::new(client))
    }
}

fn load_trigger(config: &Config, event: &EventArgs) -> Result<Trigger> {
    Trigger::from_file(
        &event.event_name,
        &config.repository,
        &event.event_path,
        event.actor.as_deref(),
    )
    .context("Failed to load triggering pull request")
}

async fn run_sync(cli: &Cli, event: &EventArgs) -> Result<ExitCode> {
    let config = build_config(cli)?;
    let trigger = load_trigger(&config, event)?;
    let store = build_store(cli, &config)?;

    let outcome = ChecklistSync::new(store, &config).run(&trigger).await?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => match &outcome {
            SyncOutcome::SelfTriggered => println!("Skipped: event caused by {}", config.bot_login),
            SyncOutcome::LabelsUpdated { delta } if delta.is_empty() => {
                println!("Labels already match the checklist on {}", trigger.pr);
            }
            SyncOutcome::LabelsUpdated { delta } => {
                let added: Vec<String> = delta.add.iter().map(ToString::to_string).collect();
                let removed: Vec<String> = delta.remove.iter().map(ToString::to_string).collect();
                println!(
                    "Updated labels on {}: added [{}], removed [{}]",
                    trigger.pr,
                    added.join(", "),
                    removed.join(", ")
                );
            }
            SyncOutcome::CommentCreated => println!("Created checklist on {}", trigger.pr),
            SyncOutcome::CommentUpdated => println!("Updated checklist on {}", trigger.pr),
            SyncOutcome::Unchanged => println!("Checklist already up to date on {}", trigger.pr),
        },
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_validate(cli: &Cli, event: &EventArgs) -> Result<ExitCode> {
    let config = build_config(cli)?;
    let trigger = load_trigger(&config, event)?;
    let store = build_store(cli, &config)?;

    let remediations = Validator::new(&config)?.validate(&trigger.labels, &trigger.body);
    let outcome = RemediationPublisher::new(store, &config)
        .publish(&trigger.pr, &remediations)
        .await?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&remediations)?),
        OutputFormat::Text => {
            if remediations.is_empty() {
                println!("PR metadata for {} satisfies policy", trigger.pr);
            } else {
                println!("{}", remediation::render(&remediations));
            }
        }
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_check_body(cli: &Cli, labels: &[String], body_file: Option<&PathBuf>) -> Result<ExitCode> {
    let config = build_config(cli)?;

    let body = match body_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read PR description from stdin")?;
            body
        }
    };

    let labels: LabelSet = labels.iter().map(String::as_str).collect();
    let remediations = Validator::new(&config)?.validate(&labels, &body);

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&remediations)?),
        OutputFormat::Text => {
            if remediations.is_empty() {
                println!("No remediations needed");
            } else {
                println!("{}", remediation::render(&remediations));
            }
        }
    }

    Ok(if remediations.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
