//! Access to the accounts kept in the records document.

mod user_directory;

pub use user_directory::{StoreDirectory, UserDirectory};

#[cfg(any(test, feature = "test-utils"))]
pub use user_directory::MockUserDirectory;
