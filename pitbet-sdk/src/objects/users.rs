use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::signature::Signature;

/// Registers a player and opens an empty wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub username: CompactString,
    pub display_name: Option<String>,
}

impl Signature for RegisterUserRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub username: CompactString,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
}
