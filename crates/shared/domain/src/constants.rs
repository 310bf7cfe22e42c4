//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// User Roles
// =============================================================================

/// Role with access to user management and settings
pub const ROLE_MANAGER: &str = "manager";

/// Default role for regular staff
pub const ROLE_USER: &str = "user";

/// Legacy spelling of the manager role found in older documents
pub const LEGACY_ROLE_MANAGER: &str = "مدير";

/// Legacy spelling of the user role found in older documents
pub const LEGACY_ROLE_USER: &str = "مستخدم";

/// All valid role values
pub const VALID_ROLES: &[&str] = &[ROLE_MANAGER, ROLE_USER];

/// Check if a role value is valid
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

/// Username of the bootstrap manager account. It can never be deleted or demoted.
pub const BOOTSTRAP_USERNAME: &str = "Admin";

/// Usernames that migrate to the manager role when a legacy record has no role
pub const LEGACY_MANAGER_USERNAMES: &[&str] = &["Admin", "Tarek"];

// =============================================================================
// Codes
// =============================================================================

/// Prefix of beneficiary codes (`B001`)
pub const BENEFICIARY_CODE_PREFIX: &str = "B";

/// Prefix of operation codes (`OP001`)
pub const OPERATION_CODE_PREFIX: &str = "OP";

/// Minimum number of digits in a generated code
pub const CODE_PAD_WIDTH: usize = 3;

// =============================================================================
// Employees
// =============================================================================

/// Wire value of the volunteer assignment (no responsible employee)
pub const VOLUNTEER_ID: &str = "VOLUNTEER";

/// Display name used when a beneficiary is assigned to the volunteer
pub const VOLUNTEER_DISPLAY_NAME: &str = "متطوع";

/// Display name used when a reference cannot be resolved
pub const UNKNOWN_DISPLAY_NAME: &str = "غير معروف";

// =============================================================================
// Validation
// =============================================================================

/// National id: 14 digits starting with 2 or 3
pub const NATIONAL_ID_PATTERN: &str = r"^(2|3)[0-9]{13}$";

/// Egyptian mobile number: 11 digits starting with 010, 011, 012 or 015
pub const MOBILE_PATTERN: &str = r"^01[0125][0-9]{8}$";

/// Largest record id kept on restore; larger ids are reassigned
pub const MAX_RECORD_ID: u64 = (1 << 53) - 1;

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 1;

/// Minimum number of family members on a beneficiary record
pub const MIN_FAMILY_MEMBERS: u32 = 1;

/// Prefix of an accepted organization logo
pub const LOGO_DATA_URL_PREFIX: &str = "data:image/png;base64,";

// =============================================================================
// Dates
// =============================================================================

/// Calendar date format used by every date field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp format of note lines in spreadsheet backups
pub const NOTE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Listing
// =============================================================================

/// Default number of rows per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Maximum allowed rows per page
pub const MAX_PAGE_SIZE: usize = 500;

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: usize = 1;

// =============================================================================
// Organization
// =============================================================================

/// Organization name used when neither the document nor the seed set one
pub const DEFAULT_ORGANIZATION_NAME: &str = "مؤسسة الجارحي";
