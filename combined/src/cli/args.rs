//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use domain::{DisbursementStatus, MaritalStatus, OperationStatus, ResearchResult, UserRole};
use records_service_lib::service::{
    AssistanceSort, BackupFormat, BeneficiarySort, EmployeeSort, OperationSort, SearchTarget,
    UserSort,
};
use records_service_lib::types::{DateRange, PaginationParams, SortDirection};

/// Charity desk - employees, beneficiaries and aid operations
#[derive(Parser, Debug)]
#[command(name = "charity-desk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the document and the session
    #[arg(long, global = true, env = "CHARITY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory receiving backups and exports
    #[arg(long, global = true, env = "CHARITY_BACKUP_DIR")]
    pub backup_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in
    Login(LoginArgs),
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Record counts and your tasks
    Dashboard,
    /// Manage employees
    Employee(EmployeeArgs),
    /// Manage beneficiaries
    Beneficiary(BeneficiaryArgs),
    /// Manage assistance types
    Assistance(AssistanceArgs),
    /// Manage aid operations
    Operation(OperationArgs),
    /// Manage your tasks
    Task(TaskArgs),
    /// Manage user accounts (managers only)
    User(UserArgs),
    /// Organization settings (managers only)
    Settings(SettingsArgs),
    /// Find beneficiaries directly or through their employee
    Search(SearchArgs),
    /// Incentive report for one employee
    Incentive(IncentiveArgs),
    /// Write a full backup
    Backup(BackupArgs),
    /// Replace all data with a backup file
    Restore(RestoreArgs),
    /// Write export workbooks
    Export(ExportArgs),
    /// Write a backup if the last automatic one is stale
    AutoBackup,
}

impl Commands {
    /// Commands usable without a session
    pub fn is_public(&self) -> bool {
        matches!(self, Commands::Login(_) | Commands::Logout)
    }
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    pub username: String,

    #[arg(short, long, env = "CHARITY_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Search, sort and page flags shared by every list
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    #[arg(long, default_value_t = 1)]
    pub page: usize,

    #[arg(long, default_value_t = domain::DEFAULT_PAGE_SIZE)]
    pub per_page: usize,
}

impl ListArgs {
    pub fn direction(&self) -> SortDirection {
        if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct PeriodArgs {
    /// First day, YYYY-MM-DD
    #[arg(long)]
    pub from: Option<String>,

    /// Last day, YYYY-MM-DD
    #[arg(long)]
    pub to: Option<String>,
}

impl PeriodArgs {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.from.clone(), self.to.clone())
    }
}

// =============================================================================
// Employees
// =============================================================================

#[derive(Args, Debug)]
pub struct EmployeeArgs {
    #[command(subcommand)]
    pub action: EmployeeAction,
}

#[derive(Subcommand, Debug)]
pub enum EmployeeAction {
    Add(EmployeeFields),
    /// Edit an employee; a new national id moves its beneficiaries along
    Edit {
        /// Current national id
        #[arg(value_name = "NATIONAL_ID")]
        target: String,
        #[command(flatten)]
        fields: EmployeeFields,
    },
    /// Freeze and hand the beneficiaries to the volunteer
    Freeze { national_ids: Vec<String> },
    Unfreeze { national_ids: Vec<String> },
    Show { national_id: String },
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long, default_value = "name")]
        sort: EmployeeSort,
    },
}

#[derive(Args, Debug, Default)]
pub struct EmployeeFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub national_id: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub governorate: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub area: Option<String>,
}

// =============================================================================
// Beneficiaries
// =============================================================================

#[derive(Args, Debug)]
pub struct BeneficiaryArgs {
    #[command(subcommand)]
    pub action: BeneficiaryAction,
}

#[derive(Subcommand, Debug)]
pub enum BeneficiaryAction {
    /// Add a beneficiary; without --employee the area's employee is suggested
    Add(BeneficiaryFields),
    /// Edit a beneficiary; an empty value clears an optional field
    Edit {
        #[arg(value_name = "NATIONAL_ID")]
        target: String,
        #[command(flatten)]
        fields: BeneficiaryFields,
    },
    /// Append a follow-up note
    Note { national_id: String, text: String },
    Blacklist { national_ids: Vec<String> },
    Unblacklist { national_ids: Vec<String> },
    /// Employee proposed for an area
    Suggest {
        #[arg(long)]
        governorate: String,
        #[arg(long)]
        city: String,
    },
    Show { national_id: String },
    /// Operations of one beneficiary, newest first
    History { national_id: String },
    List {
        #[command(flatten)]
        filter: BeneficiaryFilter,
    },
}

#[derive(Args, Debug, Default)]
pub struct BeneficiaryFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub national_id: Option<String>,
    #[arg(long)]
    pub join_date: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub alternative_phone: Option<String>,
    #[arg(long)]
    pub governorate: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub area: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub job: Option<String>,
    #[arg(long)]
    pub family_members: Option<u32>,
    #[arg(long)]
    pub marital_status: Option<MaritalStatus>,
    #[arg(long)]
    pub spouse_name: Option<String>,
    /// Employee national id, or `volunteer`
    #[arg(long)]
    pub employee: Option<String>,
    #[arg(long)]
    pub receipt_date: Option<String>,
    #[arg(long)]
    pub submission_date: Option<String>,
    #[arg(long)]
    pub result: Option<ResearchResult>,
}

#[derive(Args, Debug, Clone)]
pub struct BeneficiaryFilter {
    #[command(flatten)]
    pub list: ListArgs,
    #[arg(long)]
    pub governorate: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    // Join date range
    #[command(flatten)]
    pub joined: PeriodArgs,
    #[arg(long, default_value = "name")]
    pub sort: BeneficiarySort,
}

// =============================================================================
// Assistance types
// =============================================================================

#[derive(Args, Debug)]
pub struct AssistanceArgs {
    #[command(subcommand)]
    pub action: AssistanceAction,
}

#[derive(Subcommand, Debug)]
pub enum AssistanceAction {
    Add { name: String },
    Rename { id: u64, name: String },
    Delete {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long, default_value = "name")]
        sort: AssistanceSort,
    },
}

// =============================================================================
// Operations
// =============================================================================

#[derive(Args, Debug)]
pub struct OperationArgs {
    #[command(subcommand)]
    pub action: OperationAction,
}

#[derive(Subcommand, Debug)]
pub enum OperationAction {
    Add(OperationFields),
    Edit {
        id: u64,
        #[command(flatten)]
        fields: OperationFields,
    },
    Delete {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    Show { id: u64 },
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        status: Option<OperationStatus>,
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(long, default_value = "date")]
        sort: OperationSort,
        /// Oldest first (the default is newest first)
        #[arg(long, conflicts_with = "desc")]
        asc: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct OperationFields {
    /// Beneficiary national id
    #[arg(long)]
    pub beneficiary: Option<String>,
    /// Assistance type id
    #[arg(long)]
    pub assistance: Option<u64>,
    #[arg(long)]
    pub amount: Option<f64>,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub committee_number: Option<String>,
    #[arg(long)]
    pub committee_decision: Option<String>,
    #[arg(long)]
    pub spending_entity: Option<String>,
    #[arg(long)]
    pub details: Option<String>,
    #[arg(long)]
    pub status: Option<OperationStatus>,
    #[arg(long)]
    pub acceptance_date: Option<String>,
    #[arg(long)]
    pub pending_date: Option<String>,
    #[arg(long)]
    pub disbursement_status: Option<DisbursementStatus>,
    #[arg(long)]
    pub disbursement_date: Option<String>,
}

// =============================================================================
// Tasks, users and settings
// =============================================================================

#[derive(Args, Debug)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand, Debug)]
pub enum TaskAction {
    List,
    Add { text: String },
    Edit { id: u64, text: String },
    Toggle { id: u64 },
    Delete { id: u64 },
}

#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long, default_value = "name")]
        sort: UserSort,
    },
    Show { id: u64 },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        mobile: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "user")]
        role: UserRole,
    },
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        mobile: Option<String>,
        #[arg(long)]
        role: Option<UserRole>,
    },
    ResetPassword {
        id: u64,
        #[arg(long)]
        password: String,
    },
    Delete {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
}

#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub action: SettingsAction,
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    Show,
    /// Rename the organization
    Name { name: String },
    /// Use a PNG file as the logo
    Logo { path: PathBuf },
    ClearLogo,
}

// =============================================================================
// Reports, backups and exports
// =============================================================================

#[derive(Args, Debug)]
pub struct SearchArgs {
    pub term: String,

    /// `beneficiary` or `employee`
    #[arg(long, default_value = "beneficiary")]
    pub by: SearchTarget,
}

#[derive(Args, Debug)]
pub struct IncentiveArgs {
    /// Employee national id
    #[arg(long)]
    pub employee: String,

    // Research submission date range
    #[command(flatten)]
    pub period: PeriodArgs,

    /// Beneficiaries met inside the office
    #[arg(long, value_delimiter = ',')]
    pub internal: Vec<String>,

    /// Beneficiaries met outside the office
    #[arg(long, value_delimiter = ',')]
    pub external: Vec<String>,
}

#[derive(Args, Debug)]
pub struct BackupArgs {
    /// `json` or `xlsx`
    #[arg(default_value = "json")]
    pub format: BackupFormat,

    /// Target file or directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// A `.json` or `.xlsx` backup
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub action: ExportAction,
}

#[derive(Subcommand, Debug)]
pub enum ExportAction {
    /// Every collection; beneficiaries and operations limited to the period
    Report {
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// The filtered beneficiary list
    Beneficiaries {
        #[command(flatten)]
        filter: BeneficiaryFilter,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
