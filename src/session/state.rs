use serde::Serialize;
use tracing::debug;

use crate::models::{TokenClaims, User};

/// The client-side record of who is signed in.
///
/// `token` may be set while `user` is still `None`: that is the state right
/// after restoring a token from storage and before `/auth/me` has answered.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
    pub is_authenticated: bool,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Anonymous,
    TokenOnly,
    Authenticated,
}

impl Session {
    pub fn phase(&self) -> SessionPhase {
        if self.is_authenticated {
            SessionPhase::Authenticated
        } else if self.token.is_some() {
            SessionPhase::TokenOnly
        } else {
            SessionPhase::Anonymous
        }
    }

    /// Unverified claims of the current token, if there is a decodable one.
    pub fn token_claims(&self) -> Option<TokenClaims> {
        let token = self.token.as_deref()?;
        match TokenClaims::decode_unverified(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                debug!("Session token is not a readable JWT: {}", e);
                None
            }
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }
}
