//! Client-side authentication state.
//!
//! [`AuthStore`] is an observable cell holding the current [`Session`]. It is
//! the only writer of the session and of the persisted token; the API client
//! only ever reads the token.

pub mod state;
pub mod store;

pub use state::{Session, SessionPhase};
pub use store::{AuthStore, Subscription};
