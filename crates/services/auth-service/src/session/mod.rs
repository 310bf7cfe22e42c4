//! Persistence of the signed-in user between commands.

mod session_store;

pub use session_store::{FileSessionStore, SessionStore};

#[cfg(any(test, feature = "test-utils"))]
pub use session_store::MockSessionStore;
