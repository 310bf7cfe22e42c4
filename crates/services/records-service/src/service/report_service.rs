//! Report service - dashboard, search, incentive report and export workbooks.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use common::{AppError, AppResult, OptionExt};
use domain::{Beneficiary, Document, Task};

use crate::infra::DocumentStore;
use crate::spreadsheet::sheets::{ASSISTANCE_TYPES, BENEFICIARIES, EMPLOYEES, OPERATIONS};
use crate::spreadsheet::{Cell, Table};
use crate::types::{compare_text, DateRange};

use super::beneficiary_service::{beneficiary_rows, BeneficiaryQuery, BeneficiaryRow};
use super::task_service::tasks_of;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub employees: usize,
    pub beneficiaries: usize,
    pub operations: usize,
    /// Tasks of the signed-in user
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchTarget {
    #[default]
    Beneficiary,
    Employee,
}

impl FromStr for SearchTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beneficiary" => Ok(Self::Beneficiary),
            "employee" => Ok(Self::Employee),
            other => Err(format!("unknown search target '{}'", other)),
        }
    }
}

/// Where the researcher met the beneficiary, for the incentive summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[serde(alias = "داخلي")]
    Internal,
    #[serde(alias = "خارجي")]
    External,
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "internal" | "داخلي" => Ok(Self::Internal),
            "external" | "خارجي" => Ok(Self::External),
            other => Err(format!("unknown placement '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IncentiveRow {
    pub beneficiary: Beneficiary,
    pub placement: Option<Placement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncentiveSummary {
    pub employee_name: String,
    pub period: String,
    pub internal_count: usize,
    pub external_count: usize,
    /// Every submitted research in the period, classified or not
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct IncentiveReport {
    pub rows: Vec<IncentiveRow>,
    pub summary: IncentiveSummary,
}

#[async_trait]
pub trait ReportService: Send + Sync {
    async fn dashboard(&self, user_id: u64) -> AppResult<DashboardStats>;

    /// Beneficiaries matching the term directly, or through their employee.
    /// A blank term finds nothing.
    async fn search(&self, target: SearchTarget, term: &str) -> AppResult<Vec<BeneficiaryRow>>;

    /// Researches submitted by one employee within `period`.
    async fn incentive(
        &self,
        employee_national_id: &str,
        period: DateRange,
        placements: &HashMap<String, Placement>,
    ) -> AppResult<IncentiveReport>;

    /// Employees, beneficiaries, assistance types and operations; beneficiaries
    /// are filtered by join date and operations by date.
    async fn report_workbook(&self, period: DateRange) -> AppResult<Vec<Table>>;

    /// The filtered beneficiary list as shown on screen.
    async fn beneficiary_workbook(&self, query: &BeneficiaryQuery) -> AppResult<Vec<Table>>;
}

pub struct ReportManager {
    store: Arc<DocumentStore>,
}

impl ReportManager {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

pub fn describe_period(period: &DateRange) -> String {
    match (period.from.as_deref(), period.to.as_deref()) {
        (Some(from), Some(to)) => format!("من {} إلى {}", from, to),
        (Some(from), None) => format!("من تاريخ {}", from),
        (None, Some(to)) => format!("حتى تاريخ {}", to),
        (None, None) => "كل الأوقات".to_string(),
    }
}

fn search_rows(doc: &Document, target: SearchTarget, term: &str) -> Vec<BeneficiaryRow> {
    let term = term.trim();
    if term.is_empty() {
        return Vec::new();
    }

    match target {
        SearchTarget::Beneficiary => {
            let query = BeneficiaryQuery {
                search: Some(term.to_string()),
                ..Default::default()
            };
            beneficiary_rows(doc, &query)
        }
        SearchTarget::Employee => {
            let needle = term.to_lowercase();
            let employees: HashSet<&str> = doc
                .employees
                .iter()
                .filter(|e| e.name.to_lowercase().contains(&needle) || e.phone.contains(term))
                .map(|e| e.national_id.as_str())
                .collect();
            beneficiary_rows(doc, &BeneficiaryQuery::default())
                .into_iter()
                .filter(|row| {
                    row.beneficiary
                        .employee_national_id
                        .as_deref()
                        .is_some_and(|id| employees.contains(id))
                })
                .collect()
        }
    }
}

fn incentive_report(
    doc: &Document,
    employee_national_id: &str,
    period: &DateRange,
    placements: &HashMap<String, Placement>,
) -> AppResult<IncentiveReport> {
    let employee = doc
        .employee(employee_national_id)
        .ok_or_not_found(format!("Employee {}", employee_national_id))?;

    let mut rows: Vec<IncentiveRow> = doc
        .beneficiaries
        .iter()
        .filter(|b| b.is_assigned_to(&employee.national_id))
        .filter(|b| {
            b.research_submission_date
                .as_deref()
                .is_some_and(|date| period.contains(date))
        })
        .map(|b| IncentiveRow {
            placement: placements.get(&b.national_id).copied(),
            beneficiary: b.clone(),
        })
        .collect();
    rows.sort_by(|a, b| compare_text(&a.beneficiary.name, &b.beneficiary.name));

    let count = |p: Placement| rows.iter().filter(|r| r.placement == Some(p)).count();
    let summary = IncentiveSummary {
        employee_name: employee.name.clone(),
        period: describe_period(period),
        internal_count: count(Placement::Internal),
        external_count: count(Placement::External),
        total: rows.len(),
    };
    Ok(IncentiveReport { rows, summary })
}

fn report_tables(doc: &Document, period: &DateRange) -> AppResult<Vec<Table>> {
    let beneficiaries: Vec<&Beneficiary> = doc
        .beneficiaries
        .iter()
        .filter(|b| period.contains(&b.join_date))
        .collect();
    let mut beneficiary_table = Table::from_records(&BENEFICIARIES, &beneficiaries)?;
    beneficiary_table.columns.push("research_status".to_string());
    for (row, b) in beneficiary_table.rows.iter_mut().zip(&beneficiaries) {
        row.push(Cell::from(b.research_status().as_str()));
    }

    let operations: Vec<_> = doc
        .operations
        .iter()
        .filter(|o| period.contains(&o.date))
        .collect();

    Ok(vec![
        Table::from_records(&EMPLOYEES, &doc.employees)?,
        beneficiary_table,
        Table::from_records(&ASSISTANCE_TYPES, &doc.assistance_types)?,
        Table::from_records(&OPERATIONS, &operations)?,
    ])
}

const BENEFICIARY_LIST_COLUMNS: &[&str] = &[
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
    "marital_status",
    "spouse_name",
    "family_members",
    "researcher_receipt_date",
    "research_submission_date",
    "research_status",
    "operations_count",
    "employee_name",
    "notes",
];

fn beneficiary_list_table(rows: &[BeneficiaryRow]) -> Table {
    let mut table = Table::new(BENEFICIARIES.name, BENEFICIARY_LIST_COLUMNS.iter().copied());
    for row in rows {
        let b = &row.beneficiary;
        let notes = b
            .notes_newest_first()
            .iter()
            .map(|n| format!("{}: {}", n.date.format(domain::DATE_FORMAT), n.text))
            .collect::<Vec<_>>()
            .join("\n");
        table.push(vec![
            Cell::from(b.code.as_str()),
            Cell::from(b.name.as_str()),
            Cell::from(b.national_id.as_str()),
            Cell::from(b.join_date.as_str()),
            Cell::from(b.phone.as_str()),
            Cell::from(b.alternative_phone.clone()),
            Cell::from(b.governorate.as_str()),
            Cell::from(b.city.as_str()),
            Cell::from(b.area.as_str()),
            Cell::from(b.detailed_address.as_str()),
            Cell::from(b.job.as_str()),
            Cell::from(b.marital_status.as_str()),
            Cell::from(b.spouse_name.clone()),
            Cell::from(b.family_members),
            Cell::from(b.researcher_receipt_date.clone()),
            Cell::from(b.research_submission_date.clone()),
            Cell::from(row.research_status.as_str()),
            Cell::from(row.operations_count),
            Cell::from(row.employee_name.as_str()),
            Cell::from(notes),
        ]);
    }
    table
}

#[async_trait]
impl ReportService for ReportManager {
    async fn dashboard(&self, user_id: u64) -> AppResult<DashboardStats> {
        let doc = self.store.snapshot().await;
        Ok(DashboardStats {
            employees: doc.employees.len(),
            beneficiaries: doc.beneficiaries.len(),
            operations: doc.operations.len(),
            tasks: tasks_of(&doc, user_id),
        })
    }

    async fn search(&self, target: SearchTarget, term: &str) -> AppResult<Vec<BeneficiaryRow>> {
        let doc = self.store.snapshot().await;
        Ok(search_rows(&doc, target, term))
    }

    async fn incentive(
        &self,
        employee_national_id: &str,
        period: DateRange,
        placements: &HashMap<String, Placement>,
    ) -> AppResult<IncentiveReport> {
        let employee_national_id = employee_national_id.trim();
        if employee_national_id.is_empty() {
            return Err(AppError::validation("employee: An employee must be selected"));
        }
        let doc = self.store.snapshot().await;
        incentive_report(&doc, employee_national_id, &period, placements)
    }

    async fn report_workbook(&self, period: DateRange) -> AppResult<Vec<Table>> {
        let doc = self.store.snapshot().await;
        report_tables(&doc, &period)
    }

    async fn beneficiary_workbook(&self, query: &BeneficiaryQuery) -> AppResult<Vec<Table>> {
        let doc = self.store.snapshot().await;
        Ok(vec![beneficiary_list_table(&beneficiary_rows(&doc, query))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::SeedData;

    fn document() -> Document {
        let mut doc = SeedData::builtin().into_document().unwrap();
        doc.employees = serde_json::from_value(serde_json::json!([
            {"name": "Mona Adel", "national_id": "29001011234567", "phone": "01012345678",
             "governorate": "Cairo", "city": "Nasr City", "area": "7th District"},
            {"name": "Karim Samy", "national_id": "29102021234567", "phone": "01198765432",
             "governorate": "Giza", "city": "Dokki", "area": "Mesaha"}
        ]))
        .unwrap();
        doc.beneficiaries = serde_json::from_value(serde_json::json!([
            {"code": "B001", "name": "Salma", "national_id": "30001011234567", "join_date": "2024-01-10",
             "phone": "01511111111", "governorate": "Cairo", "city": "Nasr City", "area": "a",
             "detailed_address": "x", "job": "none", "family_members": 3,
             "employee_national_id": "29001011234567",
             "researcher_receipt_date": "2024-02-01", "research_submission_date": "2024-02-10",
             "research_result": "accepted"},
            {"code": "B002", "name": "Hoda", "national_id": "30002021234567", "join_date": "2024-03-05",
             "phone": "01522222222", "governorate": "Cairo", "city": "Nasr City", "area": "a",
             "detailed_address": "x", "job": "none", "family_members": 2,
             "employee_national_id": "29001011234567",
             "researcher_receipt_date": "2024-03-06", "research_submission_date": "2024-04-01"},
            {"code": "B003", "name": "Amal", "national_id": "30003031234567", "join_date": "2024-05-01",
             "phone": "01533333333", "governorate": "Giza", "city": "Dokki", "area": "b",
             "detailed_address": "x", "job": "none", "family_members": 1,
             "employee_national_id": "29102021234567"}
        ]))
        .unwrap();
        doc.operations.clear();
        doc
    }

    #[test]
    fn period_descriptions() {
        let both = DateRange::new(Some("2024-01-01".into()), Some("2024-12-31".into()));
        assert_eq!(describe_period(&both), "من 2024-01-01 إلى 2024-12-31");
        assert_eq!(
            describe_period(&DateRange::new(Some("2024-01-01".into()), None)),
            "من تاريخ 2024-01-01"
        );
        assert_eq!(
            describe_period(&DateRange::new(None, Some("2024-12-31".into()))),
            "حتى تاريخ 2024-12-31"
        );
        assert_eq!(describe_period(&DateRange::default()), "كل الأوقات");
    }

    #[test]
    fn employee_search_lists_their_beneficiaries() {
        let doc = document();

        let rows = search_rows(&doc, SearchTarget::Employee, "mona");
        let names: Vec<&str> = rows.iter().map(|r| r.beneficiary.name.as_str()).collect();
        assert_eq!(names, vec!["Hoda", "Salma"]);

        let rows = search_rows(&doc, SearchTarget::Employee, "0119876");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].beneficiary.code, "B003");
    }

    #[test]
    fn blank_search_finds_nothing() {
        let doc = document();
        assert!(search_rows(&doc, SearchTarget::Beneficiary, "   ").is_empty());
        assert_eq!(search_rows(&doc, SearchTarget::Beneficiary, "b002").len(), 1);
    }

    #[test]
    fn incentive_counts_submitted_research_in_period() {
        let doc = document();
        let mut placements = HashMap::new();
        placements.insert("30001011234567".to_string(), Placement::Internal);

        let report =
            incentive_report(&doc, "29001011234567", &DateRange::default(), &placements).unwrap();
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.internal_count, 1);
        assert_eq!(report.summary.external_count, 0);
        assert_eq!(report.summary.employee_name, "Mona Adel");

        let march = DateRange::new(Some("2024-03-01".into()), None);
        let report = incentive_report(&doc, "29001011234567", &march, &placements).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].beneficiary.name, "Hoda");
        assert_eq!(report.summary.internal_count, 0);
    }

    #[test]
    fn incentive_needs_a_known_employee() {
        let doc = document();
        let err = incentive_report(&doc, "29999999999999", &DateRange::default(), &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn report_workbook_filters_by_period() {
        let doc = document();
        let period = DateRange::new(Some("2024-02-01".into()), Some("2024-12-31".into()));
        let tables = report_tables(&doc, &period).unwrap();

        assert_eq!(tables.len(), 4);
        assert_eq!(tables[0].rows.len(), 2);
        let beneficiaries = &tables[1];
        assert_eq!(beneficiaries.rows.len(), 2);
        assert_eq!(beneficiaries.columns.last().unwrap(), "research_status");
        assert_eq!(
            beneficiaries.rows[0].last(),
            Some(&Cell::Text("awaiting-result".to_string()))
        );
    }

    #[test]
    fn placements_parse_both_languages() {
        assert_eq!("internal".parse::<Placement>(), Ok(Placement::Internal));
        assert_eq!("خارجي".parse::<Placement>(), Ok(Placement::External));
        assert!("elsewhere".parse::<Placement>().is_err());
    }
}
