//! Fetcher error taxonomy.

/// A single source attempt's failure. `AllSourcesFailed` aggregates the
/// chain's outcome when every source in the market's order has been tried.
#[derive(thiserror::Error, Debug, Clone)]
pub enum FetchError {
    #[error("transport error from {source}: {detail}")]
    Transport { source: &'static str, detail: String },

    #[error("decode error from {source}: {detail}")]
    Decode { source: &'static str, detail: String },

    #[error("{source} returned zero samples")]
    Empty { source: &'static str },

    #[error("{source} responded with status {code}")]
    Upstream { source: &'static str, code: u16 },

    #[error("all sources exhausted, last error: {0}")]
    AllSourcesFailed(Box<FetchError>),
}

impl FetchError {
    #[must_use]
    pub fn source_name(&self) -> &'static str {
        match self {
            Self::Transport { source, .. }
            | Self::Decode { source, .. }
            | Self::Empty { source }
            | Self::Upstream { source, .. } => source,
            Self::AllSourcesFailed(inner) => inner.source_name(),
        }
    }
}
