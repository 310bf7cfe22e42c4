//! User service - Handles account management.
//!
//! Every operation here is reserved to managers. The bootstrap `Admin`
//! account can be edited but never deleted or demoted.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use common::{AppError, AppResult, OptionExt};
use domain::{
    validate_input, CreateUser, Document, Password, UpdateUser, User, UserProfile, UserRole,
};

use crate::infra::DocumentStore;
use crate::types::{compare_text, matches_search, Paginated, PaginationParams, SortDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSort {
    #[default]
    Name,
    Username,
    Mobile,
    Role,
}

impl FromStr for UserSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "username" => Ok(Self::Username),
            "mobile" => Ok(Self::Mobile),
            "role" => Ok(Self::Role),
            other => Err(format!("unknown user sort key '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    /// Matches name, username or mobile
    pub search: Option<String>,
    pub sort: UserSort,
    pub direction: SortDirection,
    pub pagination: PaginationParams,
}

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn list_users(&self, actor: &UserProfile, query: UserQuery)
        -> AppResult<Paginated<UserProfile>>;

    async fn get_user(&self, actor: &UserProfile, id: u64) -> AppResult<UserProfile>;

    async fn create_user(&self, actor: &UserProfile, input: CreateUser) -> AppResult<UserProfile>;

    /// Update name, mobile and role
    async fn update_user(&self, actor: &UserProfile, id: u64, input: UpdateUser)
        -> AppResult<UserProfile>;

    async fn reset_password(&self, actor: &UserProfile, id: u64, password: &str) -> AppResult<()>;

    async fn delete_user(&self, actor: &UserProfile, id: u64) -> AppResult<()>;

    /// Delete many users, skipping `Admin`. Returns the number removed.
    async fn delete_users(&self, actor: &UserProfile, ids: &[u64]) -> AppResult<usize>;
}

/// Concrete implementation of UserService over the document store.
pub struct UserManager {
    store: Arc<DocumentStore>,
}

impl UserManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

fn require_manager(actor: &UserProfile) -> AppResult<()> {
    if actor.is_manager() {
        Ok(())
    } else {
        Err(AppError::forbidden("user management is reserved to managers"))
    }
}

fn mobile_taken(doc: &Document, mobile: &str, except: Option<u64>) -> bool {
    doc.users
        .iter()
        .any(|u| u.mobile == mobile && Some(u.id) != except)
}

fn hash_password(plain: &str) -> AppResult<String> {
    Ok(Password::new(plain.trim())?.into_string())
}

#[async_trait]
impl UserService for UserManager {
    async fn list_users(
        &self,
        actor: &UserProfile,
        query: UserQuery,
    ) -> AppResult<Paginated<UserProfile>> {
        require_manager(actor)?;

        let doc = self.store.snapshot().await;
        let mut rows: Vec<UserProfile> = doc
            .users
            .iter()
            .filter(|u| {
                matches_search(
                    query.search.as_deref(),
                    &[u.name.as_str(), u.username.as_str(), u.mobile.as_str()],
                )
            })
            .map(UserProfile::from)
            .collect();

        rows.sort_by(|a, b| {
            let ordering = match query.sort {
                UserSort::Name => compare_text(&a.name, &b.name),
                UserSort::Username => compare_text(&a.username, &b.username),
                UserSort::Mobile => a.mobile.cmp(&b.mobile),
                UserSort::Role => a.role.to_string().cmp(&b.role.to_string()),
            };
            query.direction.apply(ordering)
        });

        Ok(Paginated::from_rows(rows, query.pagination))
    }

    async fn get_user(&self, actor: &UserProfile, id: u64) -> AppResult<UserProfile> {
        require_manager(actor)?;
        self.store
            .snapshot()
            .await
            .user(id)
            .map(UserProfile::from)
            .ok_or_not_found(format!("User {}", id))
    }

    async fn create_user(&self, actor: &UserProfile, input: CreateUser) -> AppResult<UserProfile> {
        require_manager(actor)?;

        let input = CreateUser {
            name: input.name.trim().to_string(),
            mobile: input.mobile.trim().to_string(),
            username: input.username.trim().to_string(),
            password: input.password.trim().to_string(),
            role: input.role,
        };
        validate_input(&input)?;
        let password = hash_password(&input.password)?;

        let created = self
            .store
            .apply(move |doc| {
                if mobile_taken(doc, &input.mobile, None) {
                    return Err(AppError::conflict(format!("User with mobile {}", input.mobile)));
                }
                if doc.users.iter().any(|u| u.has_username(&input.username)) {
                    return Err(AppError::conflict(format!("Username {}", input.username)));
                }

                let user = User {
                    id: doc.next_user_id(),
                    name: input.name,
                    mobile: input.mobile,
                    username: input.username,
                    password,
                    role: input.role,
                };
                let profile = UserProfile::from(&user);
                doc.users.push(user);
                Ok(profile)
            })
            .await?;

        info!(id = created.id, username = %created.username, "User created");
        Ok(created)
    }

    async fn update_user(
        &self,
        actor: &UserProfile,
        id: u64,
        input: UpdateUser,
    ) -> AppResult<UserProfile> {
        require_manager(actor)?;

        let input = UpdateUser {
            name: input.name.trim().to_string(),
            mobile: input.mobile.trim().to_string(),
            role: input.role,
        };
        validate_input(&input)?;

        let updated = self
            .store
            .apply(move |doc| {
                if mobile_taken(doc, &input.mobile, Some(id)) {
                    return Err(AppError::conflict(format!("User with mobile {}", input.mobile)));
                }
                let user = doc
                    .users
                    .iter_mut()
                    .find(|u| u.id == id)
                    .ok_or_not_found(format!("User {}", id))?;
                if user.is_bootstrap() && input.role != UserRole::Manager {
                    return Err(AppError::forbidden("the Admin account must stay a manager"));
                }

                user.name = input.name;
                user.mobile = input.mobile;
                user.role = input.role;
                Ok(UserProfile::from(&*user))
            })
            .await?;

        info!(id, "User updated");
        Ok(updated)
    }

    async fn reset_password(&self, actor: &UserProfile, id: u64, password: &str) -> AppResult<()> {
        require_manager(actor)?;
        let hash = hash_password(password)?;

        self.store
            .apply(move |doc| {
                let user = doc
                    .users
                    .iter_mut()
                    .find(|u| u.id == id)
                    .ok_or_not_found(format!("User {}", id))?;
                user.password = hash;
                Ok(())
            })
            .await?;

        info!(id, "Password reset");
        Ok(())
    }

    async fn delete_user(&self, actor: &UserProfile, id: u64) -> AppResult<()> {
        require_manager(actor)?;

        self.store
            .apply(move |doc| {
                let user = doc.user(id).ok_or_not_found(format!("User {}", id))?;
                if user.is_bootstrap() {
                    return Err(AppError::forbidden("the Admin account cannot be deleted"));
                }
                doc.users.retain(|u| u.id != id);
                Ok(())
            })
            .await?;

        info!(id, "User deleted");
        Ok(())
    }

    async fn delete_users(&self, actor: &UserProfile, ids: &[u64]) -> AppResult<usize> {
        require_manager(actor)?;
        let targets: HashSet<u64> = ids.iter().copied().collect();

        let removed = self
            .store
            .apply(move |doc| {
                let deletable: HashSet<u64> = doc
                    .users
                    .iter()
                    .filter(|u| targets.contains(&u.id) && !u.is_bootstrap())
                    .map(|u| u.id)
                    .collect();
                if deletable.is_empty() && !targets.is_empty() {
                    let admin_selected = doc
                        .users
                        .iter()
                        .any(|u| targets.contains(&u.id) && u.is_bootstrap());
                    return Err(if admin_selected {
                        AppError::forbidden("the Admin account cannot be deleted")
                    } else {
                        AppError::not_found("Users")
                    });
                }
                doc.users.retain(|u| !deletable.contains(&u.id));
                Ok(deletable.len())
            })
            .await?;

        info!(removed, "Users deleted");
        Ok(removed)
    }
}
