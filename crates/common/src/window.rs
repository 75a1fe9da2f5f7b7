use serde::{Deserialize, Serialize};

pub const DEFAULT_FROM: u64 = 0;
pub const DEFAULT_LIMIT: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("'from' must be >= 0, got {0}")]
    NegativeFrom(i64),
    #[error("'limit' must be >= 1, got {0}")]
    NonPositiveLimit(i64),
}

/// A validated `[from, from + limit)` window over the virtual
///  concatenation of sources, plus whether remote nodes are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRequest {
    pub from: u64,
    pub limit: u64,
    pub all_nodes: bool,
}

impl Default for WindowRequest {
    fn default() -> Self {
        Self {
            from: DEFAULT_FROM,
            limit: DEFAULT_LIMIT,
            all_nodes: false,
        }
    }
}

impl WindowRequest {
    pub fn new(from: i64, limit: i64, all_nodes: bool) -> Result<Self, WindowError> {
        if from < 0 {
            return Err(WindowError::NegativeFrom(from));
        }
        if limit < 1 {
            return Err(WindowError::NonPositiveLimit(limit));
        }
        Ok(Self {
            from: from as u64,
            limit: limit as u64,
            all_nodes,
        })
    }

    /// Same window restricted to the local source.
    pub fn local_only(self) -> Self {
        Self {
            all_nodes: false,
            ..self
        }
    }

    pub fn end(&self) -> u64 {
        self.from.saturating_add(self.limit)
    }
}
