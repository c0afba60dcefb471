use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bridge::{GridData, GridKey, Level};

/// A precomputed grid as persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredGrid {
    pub key: GridKey,
    pub data: GridData,
    pub created_at: DateTime<Utc>,
}

/// Listing entry without the payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSummary {
    pub name: String,
    pub level: Level,
    /// Number of sampled values in the grid
    pub cells: i64,
    pub created_at: DateTime<Utc>,
}
