//! Workbook layout shared by the backup writer and the restore reader.

/// One sheet of the backup workbook.
#[derive(Debug, Clone, Copy)]
pub struct SheetLayout {
    pub name: &'static str,
    /// Names written by older releases
    pub aliases: &'static [&'static str],
    pub columns: &'static [&'static str],
}

impl SheetLayout {
    pub fn matches(&self, sheet_name: &str) -> bool {
        let sheet_name = sheet_name.trim();
        self.name.eq_ignore_ascii_case(sheet_name) || self.aliases.contains(&sheet_name)
    }
}

pub const EMPLOYEES: SheetLayout = SheetLayout {
    name: "Employees",
    aliases: &["الموظفين"],
    columns: &[
        "name",
        "national_id",
        "phone",
        "governorate",
        "city",
        "area",
        "is_frozen",
    ],
};

pub const BENEFICIARIES: SheetLayout = SheetLayout {
    name: "Beneficiaries",
    aliases: &["المستفيدين"],
    columns: &[
        "code",
        "name",
        "national_id",
        "join_date",
        "phone",
        "alternative_phone",
        "governorate",
        "city",
        "area",
        "detailed_address",
        "job",
        "family_members",
        "marital_status",
        "spouse_name",
        "employee_national_id",
        "is_blacklisted",
        "notes",
        "researcher_receipt_date",
        "research_submission_date",
        "research_result",
    ],
};

pub const ASSISTANCE_TYPES: SheetLayout = SheetLayout {
    name: "AssistanceTypes",
    aliases: &["أنواع المساعدات"],
    columns: &["id", "name"],
};

pub const OPERATIONS: SheetLayout = SheetLayout {
    name: "Operations",
    aliases: &["العمليات"],
    columns: &[
        "id",
        "code",
        "beneficiary_national_id",
        "assistance_id",
        "amount",
        "date",
        "committee_number",
        "committee_decision_description",
        "spending_entity",
        "details",
        "status",
        "acceptance_date",
        "pending_date",
        "disbursement_status",
        "disbursement_date",
    ],
};

pub const USERS: SheetLayout = SheetLayout {
    name: "Users",
    aliases: &["المستخدمين"],
    columns: &["id", "name", "mobile", "username", "password", "role"],
};

pub const TASKS: SheetLayout = SheetLayout {
    name: "Tasks",
    aliases: &["المهام"],
    columns: &["id", "userId", "text", "isCompleted", "createdAt", "updatedAt"],
};

/// Organization settings, one row
pub const SETTINGS: SheetLayout = SheetLayout {
    name: "Settings",
    aliases: &["الإعدادات"],
    columns: &["organizationName"],
};

/// Sheets of a full backup, in writing order
pub const BACKUP_SHEETS: [SheetLayout; 7] = [
    EMPLOYEES,
    BENEFICIARIES,
    ASSISTANCE_TYPES,
    OPERATIONS,
    USERS,
    TASKS,
    SETTINGS,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_sheet_names_are_accepted() {
        assert!(EMPLOYEES.matches("الموظفين"));
        assert!(ASSISTANCE_TYPES.matches("أنواع المساعدات"));
        assert!(OPERATIONS.matches("operations"));
        assert!(!OPERATIONS.matches("Users"));
    }
}
