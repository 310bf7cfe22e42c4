//! User domain entity and related types.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{
    BOOTSTRAP_USERNAME, LEGACY_MANAGER_USERNAMES, LEGACY_ROLE_MANAGER, LEGACY_ROLE_USER,
    ROLE_MANAGER, ROLE_USER,
};
use crate::validation::MOBILE_RE;

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[serde(alias = "مدير")]
    Manager,
    #[serde(alias = "مستخدم")]
    User,
}

impl UserRole {
    /// Check if this role has manager privileges
    pub fn is_manager(&self) -> bool {
        matches!(self, UserRole::Manager)
    }

    /// Parse a stored role, accepting legacy spellings
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            ROLE_MANAGER | LEGACY_ROLE_MANAGER => Some(UserRole::Manager),
            ROLE_USER | LEGACY_ROLE_USER => Some(UserRole::User),
            _ => None,
        }
    }

    /// Role assigned to a legacy record that has none
    pub fn migrate_for(username: &str) -> Self {
        if LEGACY_MANAGER_USERNAMES.contains(&username) {
            UserRole::Manager
        } else {
            UserRole::User
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Manager => write!(f, "{}", ROLE_MANAGER),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::parse(s).ok_or_else(|| format!("unknown role '{}'", s))
    }
}

/// User domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub mobile: String,
    pub username: String,
    /// argon2 PHC string
    pub password: String,
    pub role: UserRole,
}

impl User {
    /// Check if user has manager role
    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    /// The bootstrap account can never be removed or demoted
    pub fn is_bootstrap(&self) -> bool {
        self.username == BOOTSTRAP_USERNAME
    }

    /// Strip everything outside `[A-Za-z0-9]` and lowercase.
    pub fn normalize_username(raw: &str) -> String {
        raw.trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }

    /// Whether a login attempt names this user
    pub fn matches_username(&self, candidate: &str) -> bool {
        Self::normalize_username(&self.username) == Self::normalize_username(candidate)
    }

    /// Account uniqueness: the raw usernames, ignoring case
    pub fn has_username(&self, username: &str) -> bool {
        self.username.trim().to_lowercase() == username.trim().to_lowercase()
    }
}

/// User creation data transfer object
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub name: String,
    #[validate(regex(
        path = *MOBILE_RE,
        message = "Mobile must be 11 digits starting with 010, 011, 012 or 015"
    ))]
    pub mobile: String,
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub role: UserRole,
}

/// User update data transfer object
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub name: String,
    #[validate(regex(
        path = *MOBILE_RE,
        message = "Mobile must be 11 digits starting with 010, 011, 012 or 015"
    ))]
    pub mobile: String,
    pub role: UserRole,
}

/// User profile (safe to store in a session or print)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    pub mobile: String,
    pub username: String,
    pub role: UserRole,
}

impl UserProfile {
    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            mobile: user.mobile.clone(),
            username: user.username.clone(),
            role: user.role,
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            mobile: user.mobile,
            username: user.username,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_role_spellings_parse() {
        assert_eq!(UserRole::parse("مدير"), Some(UserRole::Manager));
        assert_eq!(UserRole::parse("مستخدم"), Some(UserRole::User));
        assert_eq!(UserRole::parse("manager"), Some(UserRole::Manager));
        assert_eq!(UserRole::parse("admin"), None);
    }

    #[test]
    fn legacy_role_deserializes_through_alias() {
        let role: UserRole = serde_json::from_str("\"مدير\"").unwrap();
        assert_eq!(role, UserRole::Manager);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"manager\"");
    }

    #[test]
    fn migration_promotes_legacy_manager_names_only() {
        assert_eq!(UserRole::migrate_for("Admin"), UserRole::Manager);
        assert_eq!(UserRole::migrate_for("Tarek"), UserRole::Manager);
        assert_eq!(UserRole::migrate_for("admin"), UserRole::User);
        assert_eq!(UserRole::migrate_for("sara"), UserRole::User);
    }

    #[test]
    fn username_normalization_ignores_case_and_punctuation() {
        assert_eq!(User::normalize_username(" ad-min "), "admin");
        assert_eq!(User::normalize_username("Admin"), "admin");
        assert_eq!(User::normalize_username("t.a_r-e k"), "tarek");
    }
}
