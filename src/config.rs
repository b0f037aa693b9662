use anyhow::{anyhow, Context, Result};
use reqwest::Url;
use std::path::PathBuf;

/// Runtime settings, resolved once from the command line and environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Url,
    /// Rows from the bottom of the list at which the next page is requested.
    pub scroll_threshold: u16,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn new(endpoint: &str, scroll_threshold: u16, log_dir: Option<PathBuf>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid job feed endpoint: {}", endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Job feed endpoint must be http or https, got '{}'",
                endpoint.scheme()
            ));
        }

        let log_dir = match log_dir {
            Some(dir) => dir,
            None => Self::default_log_dir(),
        };

        Ok(Self {
            endpoint,
            scroll_threshold,
            log_dir,
        })
    }

    fn default_log_dir() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobfeed") {
            proj_dirs.data_dir().join("logs")
        } else {
            PathBuf::from("logs")
        }
    }
}
