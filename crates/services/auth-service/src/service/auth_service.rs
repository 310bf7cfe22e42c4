//! Authentication service - sign in, sign out and the current user.
//!
//! Usernames are compared after stripping everything outside
//! `[A-Za-z0-9]` and ignoring case. Passwords are trimmed and verified
//! against the stored argon2 hash. Several accounts may share a normalized
//! username; the first one whose password matches signs in.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use tracing::{info, warn};

use common::{AppError, AppResult};
use domain::{Password, UserProfile};

use crate::client::UserDirectory;
use crate::session::SessionStore;

/// Verified when no user matches so a miss costs as much as a wrong password.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    Password::new("not-a-real-password")
        .map(Password::into_string)
        .unwrap_or_default()
});

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and start a session.
    async fn login(&self, username: &str, password: &str) -> AppResult<UserProfile>;

    async fn logout(&self) -> AppResult<()>;

    /// The signed-in user with fresh account data.
    async fn current_user(&self) -> AppResult<UserProfile>;
}

/// Reject non-managers.
pub fn require_manager(profile: &UserProfile) -> AppResult<()> {
    if profile.is_manager() {
        Ok(())
    } else {
        Err(AppError::forbidden("this action is reserved to managers"))
    }
}

/// Concrete implementation of AuthService.
pub struct Authenticator {
    users: Arc<dyn UserDirectory>,
    sessions: Arc<dyn SessionStore>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserDirectory>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { users, sessions }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn login(&self, username: &str, password: &str) -> AppResult<UserProfile> {
        let candidates = self.users.find_by_username(username).await?;
        let password = password.trim();

        if candidates.is_empty() {
            let _ = Password::from_hash(DUMMY_HASH.as_str()).verify(password);
        }
        let user = candidates
            .into_iter()
            .find(|user| Password::from_hash(user.password.as_str()).verify(password));

        let Some(user) = user else {
            warn!("Failed login attempt");
            return Err(AppError::InvalidCredentials);
        };

        let profile = UserProfile::from(user);
        self.sessions.save(&profile).await?;
        info!(id = profile.id, username = %profile.username, "Signed in");
        Ok(profile)
    }

    async fn logout(&self) -> AppResult<()> {
        self.sessions.clear().await?;
        info!("Signed out");
        Ok(())
    }

    async fn current_user(&self) -> AppResult<UserProfile> {
        let session = self.sessions.load().await?.ok_or(AppError::Unauthorized)?;

        // The account may have been edited or removed since sign-in
        match self.users.find_by_id(session.id).await? {
            Some(user) => {
                let profile = UserProfile::from(user);
                if profile != session {
                    self.sessions.save(&profile).await?;
                }
                Ok(profile)
            }
            None => {
                self.sessions.clear().await?;
                Err(AppError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockUserDirectory;
    use crate::session::MockSessionStore;
    use domain::{User, UserRole};
    use mockall::predicate::eq;

    fn admin() -> User {
        User {
            id: 1,
            name: "Admin User".to_string(),
            mobile: "01000000000".to_string(),
            username: "Admin".to_string(),
            password: Password::new("Admin").unwrap().into_string(),
            role: UserRole::Manager,
        }
    }

    fn directory_with_admin() -> MockUserDirectory {
        let mut users = MockUserDirectory::new();
        users.expect_find_by_username().returning(|name| {
            let admin = admin();
            Ok(admin.matches_username(name).then_some(admin).into_iter().collect())
        });
        users
    }

    fn named(id: u64, username: &str, password: &str) -> User {
        User {
            id,
            name: username.to_string(),
            username: username.to_string(),
            password: Password::new(password).unwrap().into_string(),
            role: UserRole::User,
            ..admin()
        }
    }

    #[tokio::test]
    async fn login_normalizes_username_and_trims_password() {
        let mut sessions = MockSessionStore::new();
        sessions
            .expect_save()
            .withf(|p| p.username == "Admin")
            .times(1)
            .returning(|_| Ok(()));

        let auth = Authenticator::new(Arc::new(directory_with_admin()), Arc::new(sessions));
        let profile = auth.login(" ad-min ", " Admin ").await.unwrap();
        assert_eq!(profile.id, 1);
        assert!(profile.is_manager());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let mut sessions = MockSessionStore::new();
        sessions.expect_save().never();

        let auth = Authenticator::new(Arc::new(directory_with_admin()), Arc::new(sessions));
        let err = auth.login("admin", "admin").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let mut sessions = MockSessionStore::new();
        sessions.expect_save().never();

        let auth = Authenticator::new(Arc::new(directory_with_admin()), Arc::new(sessions));
        let err = auth.login("nobody", "Admin").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn colliding_usernames_are_told_apart_by_password() {
        let mut sessions = MockSessionStore::new();
        sessions.expect_save().returning(|_| Ok(()));

        // Both names normalize to the empty string
        let mut users = MockUserDirectory::new();
        users.expect_find_by_username().returning(|name| {
            Ok([named(2, "سارة", "s1"), named(3, "محمد", "m1")]
                .into_iter()
                .filter(|u| u.matches_username(name))
                .collect())
        });

        let auth = Authenticator::new(Arc::new(users), Arc::new(sessions));
        assert_eq!(auth.login("سارة", "s1").await.unwrap().id, 2);
        assert_eq!(auth.login("محمد", "m1").await.unwrap().id, 3);
        let err = auth.login("محمد", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn current_user_requires_a_session() {
        let mut sessions = MockSessionStore::new();
        sessions.expect_load().returning(|| Ok(None));

        let auth = Authenticator::new(Arc::new(MockUserDirectory::new()), Arc::new(sessions));
        let err = auth.current_user().await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn deleted_account_ends_the_session() {
        let mut sessions = MockSessionStore::new();
        sessions
            .expect_load()
            .returning(|| Ok(Some(UserProfile::from(admin()))));
        sessions.expect_clear().times(1).returning(|| Ok(()));

        let mut users = MockUserDirectory::new();
        users.expect_find_by_id().with(eq(1)).returning(|_| Ok(None));

        let auth = Authenticator::new(Arc::new(users), Arc::new(sessions));
        let err = auth.current_user().await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn demoted_account_is_refreshed() {
        let mut sessions = MockSessionStore::new();
        sessions
            .expect_load()
            .returning(|| Ok(Some(UserProfile::from(admin()))));
        sessions
            .expect_save()
            .withf(|p| p.role == UserRole::User)
            .times(1)
            .returning(|_| Ok(()));

        let mut users = MockUserDirectory::new();
        users.expect_find_by_id().returning(|_| {
            Ok(Some(User {
                role: UserRole::User,
                ..admin()
            }))
        });

        let auth = Authenticator::new(Arc::new(users), Arc::new(sessions));
        let profile = auth.current_user().await.unwrap();
        assert!(require_manager(&profile).is_err());
    }
}
