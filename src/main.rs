mod api;
mod bookmarks;
mod config;
mod controller;
mod error;
mod logging;
mod models;
mod scroll;
mod store;
mod tui;
mod view;

use anyhow::{Context, Result};
use api::{HttpJobSource, JobSource};
use clap::{Parser, Subcommand};
use config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jobfeed")]
#[command(about = "Browse job postings from the job feed and bookmark them for later")]
struct Cli {
    /// Job listing endpoint (pages are requested with ?page=N)
    #[arg(long, global = true, env = "JOBFEED_ENDPOINT", default_value = api::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Rows from the bottom of the list at which the next page is fetched
    #[arg(long, global = true, env = "JOBFEED_SCROLL_THRESHOLD", default_value_t = scroll::DEFAULT_THRESHOLD)]
    threshold: u16,

    /// Directory for log files
    #[arg(long, global = true, env = "JOBFEED_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive browser with infinite scroll and bookmarks (default)
    Browse,

    /// Fetch a single page and print it
    Page {
        /// Page number, starting at 1
        #[arg(default_value = "1")]
        page: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::new(&cli.endpoint, cli.threshold, cli.log_dir)?;
    let _log_guard = logging::init(&config.log_dir)?;

    match cli.command.unwrap_or(Commands::Browse) {
        Commands::Browse => tui::run_browse(&config).await?,

        Commands::Page { page } => {
            let source = HttpJobSource::new(config.endpoint.clone());
            let jobs = source
                .fetch_page(page)
                .await
                .with_context(|| format!("Failed to fetch page {}", page))?;

            if jobs.is_empty() {
                println!("No jobs on page {}.", page);
            } else {
                println!(
                    "{:<10} {:<22} {:<18} {:<14} {:<17} {:>5}  {:<20}",
                    "ID", "COMPANY", "ROLE", "LOCATION", "SALARY", "OPEN", "EXPIRES"
                );
                println!("{}", "-".repeat(112));
                for job in jobs {
                    println!(
                        "{:<10} {:<22} {:<18} {:<14} {:<17} {:>5}  {:<20}",
                        job.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
                        truncate(job.company_name.as_deref().unwrap_or(""), 20),
                        truncate(job.job_role.as_deref().unwrap_or(""), 16),
                        truncate(job.location.as_deref().unwrap_or(""), 12),
                        truncate(&job.salary_range(), 17),
                        job.total_vacancy.map(|n| n.to_string()).unwrap_or_default(),
                        job.expires_display(),
                    );
                }
            }
        }
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
