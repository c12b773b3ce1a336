//! Admin query parameters and pagination.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{BetStatus, EventStatus};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 200;
const MAX_OFFSET: i64 = 100_000;

/// Plain pagination parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Query parameters for listing events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEventsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub status: Option<EventStatus>,
}

/// Query parameters for listing bets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBetsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub fight_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub status: Option<BetStatus>,
}

pub(crate) fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Clamp limit and offset to safe maximums.
pub fn clamp_pagination(limit: i64, offset: i64) -> (i64, i64) {
    (limit.clamp(1, MAX_LIMIT), offset.clamp(0, MAX_OFFSET))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(clamp_pagination(0, -5), (1, 0));
        assert_eq!(clamp_pagination(10_000, 5), (MAX_LIMIT, 5));
        assert_eq!(clamp_pagination(20, 1_000_000), (20, MAX_OFFSET));
    }

    #[test]
    fn list_bets_query_defaults() {
        let q: ListBetsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.limit, DEFAULT_LIMIT);
        assert_eq!(q.offset, 0);
        assert!(q.fight_id.is_none());
    }
}
