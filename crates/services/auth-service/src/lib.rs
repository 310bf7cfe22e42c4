//! Auth Service Library
//!
//! Signs users in against the accounts stored in the records document and
//! keeps the signed-in user in a session file between commands.

pub mod client;
pub mod config;
pub mod service;
pub mod session;

use std::sync::Arc;

use records_service_lib::infra::DocumentStore;

use crate::client::StoreDirectory;
use crate::config::AuthServiceConfig;
use crate::service::Authenticator;
use crate::session::FileSessionStore;

/// Build the authenticator over the shared document store.
pub fn authenticator(store: Arc<DocumentStore>, config: &AuthServiceConfig) -> Authenticator {
    Authenticator::new(
        Arc::new(StoreDirectory::new(store)),
        Arc::new(FileSessionStore::new(config.session_path.clone())),
    )
}
