use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use jobboard::board::{relative_age, Job, JobForm, JobId, JobType, SortOrder, NO_RESULTS};
use jobboard::config::{ClientConfig, WatchConfig};
use jobboard::session::{JobBoard, Saved, Submitted};
use jobboard::shutdown::install_interrupt_handler;
use jobboard::store::HttpJobStore;
use jobboard::BoardError;

#[derive(Parser, Debug)]
#[command(name = "jobboard")]
#[command(version)]
#[command(about = "Browse and manage postings on a job board")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Job management commands
    Job {
        #[command(flatten)]
        client: ClientArgs,

        #[command(subcommand)]
        command: JobCommands,
    },
}

// =============================================================================
// Client Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct ClientArgs {
    /// Job board backend address
    #[arg(
        long,
        short = 'a',
        env = "JOBBOARD_ADDR",
        default_value = "http://127.0.0.1:5000"
    )]
    addr: String,

    /// Request timeout in milliseconds
    #[arg(long, default_value = "10000")]
    timeout_ms: u64,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Search, filter and sort options shared by `list` and `watch`
#[derive(clap::Args, Debug)]
struct ViewArgs {
    /// Case-insensitive match on title or company
    #[arg(long, short = 's', default_value = "")]
    search: String,

    /// Only show jobs of this exact type, e.g. full-time, contract, Hybrid
    #[arg(long = "type", short = 't')]
    job_type: Option<JobType>,

    /// Sort by posting date (newest or oldest)
    #[arg(long, default_value = "newest")]
    sort: SortOrder,
}

// =============================================================================
// Job Commands
// =============================================================================

#[derive(clap::Subcommand, Debug)]
enum JobCommands {
    /// List jobs
    List {
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Post a new job
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        company: String,

        #[arg(long, default_value = "")]
        location: String,

        #[arg(long = "type", short = 't')]
        job_type: Option<JobType>,

        /// Comma-separated tags, e.g. "rust, backend"
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Edit an existing job. Fields not given keep their current value.
    Update {
        /// The job ID
        job_id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long = "type", short = 't')]
        job_type: Option<JobType>,

        /// Comma-separated tags; pass "" to clear
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a job
    Delete {
        /// The job ID
        job_id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Re-fetch and print the job list until interrupted
    Watch {
        #[command(flatten)]
        view: ViewArgs,

        /// Refresh interval in milliseconds
        #[arg(long, default_value = "5000")]
        interval_ms: u64,
    },
}

// =============================================================================
// JSON Output Types
// =============================================================================

#[derive(Serialize)]
struct JobListItem {
    id: String,
    title: String,
    company: String,
    location: String,
    job_type: Option<String>,
    tags: Vec<String>,
    posting_date: String,
    posted: String,
}

#[derive(Serialize)]
struct JobListOutput {
    jobs: Vec<JobListItem>,
    shown_count: usize,
    total_count: usize,
}

#[derive(Serialize)]
struct JobSavedOutput {
    action: &'static str,
    job: JobListItem,
}

#[derive(Serialize)]
struct JobDeletedOutput {
    job_id: String,
    deleted: bool,
}

// =============================================================================
// Helper Functions
// =============================================================================

fn list_item(job: &Job) -> JobListItem {
    JobListItem {
        id: job.id.to_string(),
        title: job.title.clone(),
        company: job.company.clone(),
        location: job.location.clone(),
        job_type: job.job_type.as_ref().map(|t| t.to_string()),
        tags: job.tags.clone(),
        posting_date: job.posting_date.to_rfc3339(),
        posted: relative_age(job.posting_date, Utc::now()),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

async fn apply_view_args(board: &JobBoard, view: &ViewArgs) {
    board.set_search_term(view.search.clone()).await;
    board.set_type_filter(view.job_type.clone()).await;
    board.set_sort_order(view.sort).await;
}

fn print_jobs(
    jobs: &[Job],
    total_count: usize,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match output_format {
        OutputFormat::Json => {
            let output = JobListOutput {
                jobs: jobs.iter().map(list_item).collect(),
                shown_count: jobs.len(),
                total_count,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            if jobs.is_empty() {
                println!("{}", NO_RESULTS);
                return Ok(());
            }

            println!(
                "{:<8} {:<28} {:<20} {:<16} {:<11} {:<12} TAGS",
                "ID", "TITLE", "COMPANY", "LOCATION", "TYPE", "POSTED"
            );
            println!("{}", "-".repeat(104));
            let now = Utc::now();
            for job in jobs {
                let job_type = job
                    .job_type
                    .as_ref()
                    .map(|t| t.to_string())
                    .unwrap_or_default();
                println!(
                    "{:<8} {:<28} {:<20} {:<16} {:<11} {:<12} {}",
                    truncate(job.id.as_str(), 8),
                    truncate(&job.title, 28),
                    truncate(&job.company, 20),
                    truncate(&job.location, 16),
                    job_type,
                    relative_age(job.posting_date, now),
                    job.tags.join(", ")
                );
            }
            println!();
            println!("Showing {} of {} jobs", jobs.len(), total_count);
        }
    }
    Ok(())
}

/// The change itself succeeded; a failed refetch is only worth a note.
fn warn_if_stale<T>(saved: &Saved<T>) {
    if let Some(e) = &saved.refresh_error {
        eprintln!("Warning: change saved, but the job list could not be refreshed: {}", e);
    }
}

fn print_saved(
    saved: &Saved<Submitted>,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    warn_if_stale(saved);
    let submitted = &saved.outcome;
    let action = match submitted {
        Submitted::Created(_) => "created",
        Submitted::Updated(_) => "updated",
    };
    let job = submitted.job();
    match output_format {
        OutputFormat::Json => {
            let output = JobSavedOutput {
                action,
                job: list_item(job),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            println!("Job {} successfully!", action);
            println!("Job ID:   {}", job.id);
            println!("Title:    {}", job.title);
            println!("Company:  {}", job.company);
        }
    }
    Ok(())
}

async fn confirm(prompt: &str) -> Result<bool, Box<dyn std::error::Error>> {
    eprint!("{} [y/N] ", prompt);
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

// =============================================================================
// Job Command Handlers
// =============================================================================

async fn handle_job_list(
    board: &JobBoard,
    view: &ViewArgs,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    apply_view_args(board, view).await;
    board.refresh().await?;

    let jobs = board.visible_jobs().await;
    let total_count = board.read(|v| v.jobs().len()).await;
    print_jobs(&jobs, total_count, output_format)
}

async fn handle_job_create(
    board: &JobBoard,
    form: JobForm,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    board.begin_create().await;
    let saved = board.submit(&form).await?;
    print_saved(&saved, output_format)
}

#[allow(clippy::too_many_arguments)]
async fn handle_job_update(
    board: &JobBoard,
    job_id: JobId,
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    job_type: Option<JobType>,
    tags: Option<String>,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    board.refresh().await?;
    let mut form = board
        .begin_edit(&job_id)
        .await
        .ok_or_else(|| BoardError::NotFound(job_id.clone()))?;

    if let Some(title) = title {
        form.title = title;
    }
    if let Some(company) = company {
        form.company = company;
    }
    if let Some(location) = location {
        form.location = location;
    }
    if job_type.is_some() {
        form.job_type = job_type;
    }
    if let Some(tags) = tags {
        form.tags = tags;
    }

    let saved = board.submit(&form).await?;
    print_saved(&saved, output_format)
}

async fn handle_job_delete(
    board: &JobBoard,
    job_id: JobId,
    yes: bool,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if !yes && !confirm("Are you sure you want to delete this job?").await? {
        println!("Aborted.");
        return Ok(());
    }

    let saved = board.delete(&job_id).await?;
    warn_if_stale(&saved);
    match output_format {
        OutputFormat::Json => {
            let output = JobDeletedOutput {
                job_id: job_id.to_string(),
                deleted: true,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            println!("Job {} deleted.", job_id);
        }
    }
    Ok(())
}

async fn handle_job_watch(
    board: &JobBoard,
    view: &ViewArgs,
    watch: WatchConfig,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    apply_view_args(board, view).await;
    let token = install_interrupt_handler();
    let mut ticker = tokio::time::interval(watch.interval());

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                board.cancel_pending().await;
                break;
            }
            _ = ticker.tick() => {
                let refreshed = tokio::select! {
                    r = board.refresh() => r,
                    _ = token.cancelled() => {
                        board.cancel_pending().await;
                        break;
                    }
                };
                match refreshed {
                    Ok(true) => {
                        let jobs = board.visible_jobs().await;
                        let total_count = board.read(|v| v.jobs().len()).await;
                        if matches!(output_format, OutputFormat::Table) {
                            println!("== {} ==", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
                        }
                        print_jobs(&jobs, total_count, output_format)?;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "Refresh failed, keeping last job list");
                    }
                }
            }
        }
    }
    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Commands::Job { client, command } => {
            let config = ClientConfig::new(client.addr.clone()).with_timeout_ms(client.timeout_ms);
            let store = HttpJobStore::new(config)?;
            let board = JobBoard::new(Arc::new(store));

            match command {
                JobCommands::List { view } => {
                    handle_job_list(&board, &view, &client.output).await?;
                }
                JobCommands::Create {
                    title,
                    company,
                    location,
                    job_type,
                    tags,
                } => {
                    let form = JobForm {
                        title,
                        company,
                        location,
                        job_type,
                        tags,
                    };
                    handle_job_create(&board, form, &client.output).await?;
                }
                JobCommands::Update {
                    job_id,
                    title,
                    company,
                    location,
                    job_type,
                    tags,
                } => {
                    handle_job_update(
                        &board,
                        JobId::from(job_id),
                        title,
                        company,
                        location,
                        job_type,
                        tags,
                        &client.output,
                    )
                    .await?;
                }
                JobCommands::Delete { job_id, yes } => {
                    handle_job_delete(&board, JobId::from(job_id), yes, &client.output).await?;
                }
                JobCommands::Watch { view, interval_ms } => {
                    let watch = WatchConfig { interval_ms };
                    handle_job_watch(&board, &view, watch, &client.output).await?;
                }
            }
        }
    }
    Ok(())
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
