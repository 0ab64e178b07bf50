use serde::{Deserialize, Serialize};

/// Pagination bounds applied to every listing request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLimits {
    /// Page size used when the request carries no `limit` parameter
    pub default_limit: u64,

    /// Hard cap on the requested page size
    pub max_limit: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: 1000,
        }
    }
}

impl PageLimits {
    /// Create limits from environment variables
    pub fn from_env() -> Self {
        Self {
            default_limit: std::env::var("PAGE_DEFAULT_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            max_limit: std::env::var("PAGE_MAX_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
        }
    }
}
