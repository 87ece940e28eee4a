use serde::{Deserialize, Serialize};

/// Account counts from `GET /admin/stats`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminStats {
    pub total: u64,
    pub admins: u64,
    pub teachers: u64,
    pub students: u64,
    /// Accounts still waiting for approval.
    pub pending: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeleteUserResponse {
    pub message: String,
    pub deleted_user_id: i64,
}
