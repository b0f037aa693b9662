/// Why a page fetch failed. The store treats every variant the same way;
/// the detail only ends up in the log.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("job feed returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("could not decode job feed: {0}")]
    Decode(#[from] serde_json::Error),
}
