//! Turns a raw document into a valid one, or refuses it.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use common::{AppError, AppResult};
use domain::codes::{is_valid_code, CodeAllocator};
use domain::{
    Document, Password, SeedData, User, BENEFICIARY_CODE_PREFIX, OPERATION_CODE_PREFIX,
    VOLUNTEER_ID,
};

use super::coerce::RawRecord;
use super::raw::RawDocument;
use super::records;

/// Every correction applied while reconciling a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub users_seeded: bool,
    pub roles_migrated: usize,
    pub passwords_rehashed: usize,
    pub tasks_seeded: bool,
    pub assistance_ids_repaired: usize,
    pub operation_ids_repaired: usize,
    pub task_ids_repaired: usize,
    pub user_ids_repaired: usize,
    pub beneficiary_codes_corrected: usize,
    pub operation_codes_corrected: usize,
    pub volunteer_records_dropped: usize,
    pub organization_name_defaulted: bool,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }

    /// User-facing notices, one per kind of correction.
    pub fn notices(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.users_seeded {
            out.push("No users found; the default accounts were restored".to_string());
        }
        let counted = [
            (self.roles_migrated, "user role(s) migrated from an older format"),
            (self.passwords_rehashed, "plaintext password(s) hashed"),
            (self.assistance_ids_repaired, "assistance type id(s) repaired"),
            (self.operation_ids_repaired, "operation id(s) repaired"),
            (self.task_ids_repaired, "task id(s) repaired"),
            (self.user_ids_repaired, "user id(s) repaired"),
            (
                self.beneficiary_codes_corrected,
                "duplicate or invalid beneficiary code(s) corrected",
            ),
            (
                self.operation_codes_corrected,
                "duplicate or invalid operation code(s) corrected",
            ),
            (self.volunteer_records_dropped, "legacy volunteer employee record(s) removed"),
        ];
        out.extend(
            counted
                .iter()
                .filter(|(n, _)| *n > 0)
                .map(|(n, what)| format!("{} {}", n, what)),
        );
        if self.tasks_seeded {
            out.push("No task list found; the initial tasks were restored".to_string());
        }
        if self.organization_name_defaulted {
            out.push("Organization name was missing and has been set to the default".to_string());
        }
        out
    }
}

/// Assign `max + 1` to ids that are missing or already taken, in order.
fn repair_ids<T>(
    items: Vec<(Option<u64>, T)>,
    set_id: impl Fn(&mut T, u64),
) -> AppResult<(Vec<T>, usize)> {
    let mut current = items.iter().filter_map(|(id, _)| *id).max().unwrap_or(0);
    let mut seen = HashSet::new();
    let mut repaired = 0;
    let mut out = Vec::with_capacity(items.len());

    for (id, mut item) in items {
        let id = match id {
            Some(id) if seen.insert(id) => id,
            _ => {
                current = current
                    .checked_add(1)
                    .ok_or_else(|| AppError::corrupt("record ids are out of range"))?;
                seen.insert(current);
                repaired += 1;
                current
            }
        };
        set_id(&mut item, id);
        out.push(item);
    }
    Ok((out, repaired))
}

/// Replace codes that are malformed or already taken.
fn repair_codes<T>(
    items: &mut [T],
    prefix: &'static str,
    code: impl Fn(&mut T) -> &mut String,
) -> usize {
    let existing: Vec<String> = items.iter_mut().map(|i| code(i).clone()).collect();
    let mut alloc = CodeAllocator::new(prefix, existing.iter().map(String::as_str));
    let mut seen: HashSet<String> = HashSet::new();
    let mut corrected = 0;

    for item in items.iter_mut() {
        let slot = code(item);
        if !is_valid_code(prefix, slot.as_str()) || seen.contains(slot.as_str()) {
            *slot = alloc.allocate();
            corrected += 1;
        }
        seen.insert(slot.clone());
    }
    corrected
}

fn reconcile_users(
    raw: Option<Vec<RawRecord>>,
    seed: &SeedData,
    report: &mut RestoreReport,
) -> AppResult<Vec<User>> {
    let raw = match raw {
        Some(list) if !list.is_empty() => list,
        _ => {
            report.users_seeded = true;
            return Ok(seed.users()?);
        }
    };

    let mut parsed = Vec::with_capacity(raw.len());
    for record in &raw {
        let mut entry = records::user(record);
        if !entry.has_role {
            report.roles_migrated += 1;
        }
        let plain = entry.user.password.trim().to_string();
        if !Password::is_hash(&entry.user.password) && !plain.is_empty() {
            entry.user.password = Password::new(&plain)?.into_string();
            report.passwords_rehashed += 1;
        }
        parsed.push((entry.id, entry.user));
    }

    let (users, repaired) = repair_ids(parsed, |u, id| u.id = id)?;
    report.user_ids_repaired = repaired;
    Ok(users)
}

/// Reconcile `raw` against `seed`.
///
/// Nothing is applied on error; the caller keeps its current document.
pub fn reconcile(raw: RawDocument, seed: &SeedData) -> AppResult<(Document, RestoreReport)> {
    let missing = raw.missing_required();
    if !missing.is_empty() {
        return Err(AppError::corrupt(format!(
            "missing required collection(s): {}",
            missing.join(", ")
        )));
    }

    let mut report = RestoreReport::default();
    let RawDocument {
        users: raw_users,
        employees,
        beneficiaries,
        assistance_types,
        operations,
        tasks,
        organization_name,
        organization_logo,
    } = raw;

    let users = reconcile_users(raw_users, seed, &mut report)?;

    let mut employees: Vec<_> = employees
        .unwrap_or_default()
        .iter()
        .map(records::employee)
        .collect();
    let before = employees.len();
    employees.retain(|e| e.national_id != VOLUNTEER_ID);
    report.volunteer_records_dropped = before - employees.len();

    let (assistance_types, repaired) = repair_ids(
        assistance_types
            .unwrap_or_default()
            .iter()
            .map(records::assistance_type)
            .collect(),
        |a, id| a.id = id,
    )?;
    report.assistance_ids_repaired = repaired;

    let (mut operations, repaired) = repair_ids(
        operations
            .unwrap_or_default()
            .iter()
            .map(records::operation)
            .collect(),
        |o, id| o.id = id,
    )?;
    report.operation_ids_repaired = repaired;

    let tasks = match tasks {
        Some(list) => {
            let (tasks, repaired) =
                repair_ids(list.iter().map(records::task).collect(), |t, id| t.id = id)?;
            report.task_ids_repaired = repaired;
            tasks
        }
        None => {
            report.tasks_seeded = true;
            seed.tasks()
        }
    };

    let mut beneficiaries: Vec<_> = beneficiaries
        .unwrap_or_default()
        .iter()
        .map(records::beneficiary)
        .collect();
    report.beneficiary_codes_corrected =
        repair_codes(&mut beneficiaries, BENEFICIARY_CODE_PREFIX, |b| &mut b.code);
    report.operation_codes_corrected =
        repair_codes(&mut operations, OPERATION_CODE_PREFIX, |o| &mut o.code);

    let organization_name = match organization_name.map(|n| n.trim().to_string()) {
        Some(name) if !name.is_empty() => name,
        _ => {
            report.organization_name_defaulted = true;
            seed.organization_name.clone()
        }
    };

    let document = Document {
        users,
        employees,
        beneficiaries,
        assistance_types,
        operations,
        tasks,
        organization_name,
        organization_logo: organization_logo.unwrap_or_default(),
    };

    if report.is_clean() {
        debug!("Document reconciled without corrections");
    } else {
        info!(?report, "Document reconciled with corrections");
    }
    Ok((document, report))
}
