use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Roles known to the backend. The first account to sign up becomes `Admin`.
///
/// The backend stores whatever role string signup was given, so anything
/// outside the known set is kept verbatim in `Other`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// A user record as returned by `/auth/me` and the admin endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_approved: bool,
    pub is_active: bool,
    /// Naive UTC timestamp, the backend does not attach an offset.
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Partial update for `PUT /admin/users/{id}`. Unset fields are left alone
/// by the server and omitted from the request body.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_approved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.is_approved.is_none() && self.full_name.is_none()
    }
}
