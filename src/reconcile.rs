// src/reconcile.rs

//! Attendance reconciliation.
//!
//! Raw attendance rows arrive in whatever shape the backend produced over
//! its lifetime: employee references by numeric id or by code, duplicate
//! rows for one employee, statuses in mixed casings or missing entirely.
//! Everything is normalized here, once. The rest of the console only sees
//! canonical employee keys and typed statuses.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use tracing::debug;

use crate::hrms_client::{AttendancePayload, AttendanceRecord, Employee, EmployeeRef, RecordId};

/// Effective attendance status. "Not marked" is the third state, modeled as
/// the absence of an entry rather than a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    /// Projects a raw status string. Whitespace-only input has no status at
    /// all; any non-empty value other than a case-insensitive `present`
    /// match counts as absent.
    pub fn from_raw(raw: &str) -> Option<AttendanceStatus> {
        if raw.trim().is_empty() {
            return None;
        }
        if raw.eq_ignore_ascii_case("present") {
            Some(AttendanceStatus::Present)
        } else {
            Some(AttendanceStatus::Absent)
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Present => f.write_str("Present"),
            AttendanceStatus::Absent => f.write_str("Absent"),
        }
    }
}

/// Resolves a raw employee reference against the roster: exact numeric-id
/// match first, then the human-assigned code (mapped back to the owning
/// entry's id so both forms land on one key), else the reference
/// stringified. Stale references therefore still get a stable key, they
/// just never match a roster row.
pub fn canonical_key(roster: &[Employee], reference: Option<&EmployeeRef>) -> String {
    let raw = match reference {
        Some(r) => r.to_string(),
        None => return String::new(),
    };
    for entry in roster {
        if let Some(id) = entry.id {
            if id.to_string() == raw {
                return raw;
            }
        }
    }
    for entry in roster {
        if entry.employee_id.as_deref() == Some(raw.as_str()) {
            if let Some(id) = entry.id {
                return id.to_string();
            }
            // Entry has no numeric id; its code is its key.
            return raw;
        }
    }
    raw
}

/// Canonical key of a roster entry itself: id when present, else code, else
/// its position in the roster.
pub fn roster_key(employee: &Employee, index: usize) -> String {
    if let Some(id) = employee.id {
        return id.to_string();
    }
    if let Some(code) = employee.employee_id.as_deref() {
        if !code.is_empty() {
            return code.to_string();
        }
    }
    index.to_string()
}

fn has_status(record: &AttendanceRecord) -> bool {
    record
        .status
        .as_deref()
        .map_or(false, |s| !s.trim().is_empty())
}

/// Tie-break between two rows that resolved to the same employee: a row
/// with a real status beats one without; otherwise the numerically larger
/// record id wins; otherwise the most-recently-encountered row wins. The
/// last arm is order-dependent by nature, it only fires when the backend
/// hands out rows with no comparable ids and there is nothing better to
/// order by.
fn wins_over(candidate: &AttendanceRecord, existing: &AttendanceRecord) -> bool {
    let candidate_has_status = has_status(candidate);
    if candidate_has_status != has_status(existing) {
        return candidate_has_status;
    }
    let candidate_id = candidate.id.as_ref().and_then(RecordId::as_num);
    let existing_id = existing.id.as_ref().and_then(RecordId::as_num);
    match (candidate_id, existing_id) {
        (Some(new_id), Some(old_id)) => new_id > old_id,
        _ => true,
    }
}

/// One reconciled row: the raw record that survived deduplication plus the
/// canonical employee key it resolved to.
#[derive(Debug, Clone)]
pub struct SurvivingRecord {
    pub key: String,
    pub record: AttendanceRecord,
}

/// Key a record occupies when the surviving set is re-keyed after a save:
/// the server id when known, otherwise a synthetic employee+date key.
/// Numeric ids order first, ascending, which keeps the fold deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum RecordKey {
    Id(i64),
    Raw(String),
}

fn record_storage_key(surviving: &SurvivingRecord) -> RecordKey {
    match &surviving.record.id {
        Some(RecordId::Num(n)) => RecordKey::Id(*n),
        Some(RecordId::Text(s)) if !s.trim().is_empty() => match s.trim().parse() {
            Ok(n) => RecordKey::Id(n),
            Err(_) => RecordKey::Raw(s.clone()),
        },
        _ => RecordKey::Raw(format!(
            "{}-{}",
            surviving.key,
            surviving.record.date.as_deref().unwrap_or_default()
        )),
    }
}

/// What a save must do for one employee key: update the record already on
/// the server or create a fresh one.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveAction {
    Create(AttendancePayload),
    Update { id: RecordId, payload: AttendancePayload },
}

/// Per-date view state for the attendance screens: the roster, the one
/// surviving record per employee, and staged (unsaved) edits. Rebuilt from
/// scratch whenever the selected date changes.
#[derive(Debug)]
pub struct AttendanceSheet {
    date: NaiveDate,
    roster: Vec<Employee>,
    records: Vec<SurvivingRecord>,
    staged: BTreeMap<String, AttendanceStatus>,
}

impl AttendanceSheet {
    /// Reconciles the raw rows for `date`: every row resolves to a canonical
    /// key and duplicates collapse to a single survivor per key.
    pub fn new(date: NaiveDate, roster: Vec<Employee>, raw_rows: Vec<AttendanceRecord>) -> Self {
        let mut records: Vec<SurvivingRecord> = Vec::new();
        for record in raw_rows {
            let key = canonical_key(&roster, record.employee.as_ref());
            match records.iter().position(|s| s.key == key) {
                None => records.push(SurvivingRecord { key, record }),
                Some(index) => {
                    if wins_over(&record, &records[index].record) {
                        debug!("Row for key '{}' superseded by a later duplicate", key);
                        records[index].record = record;
                    }
                }
            }
        }
        Self {
            date,
            roster,
            records,
            staged: BTreeMap::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn roster(&self) -> &[Employee] {
        &self.roster
    }

    pub fn records(&self) -> &[SurvivingRecord] {
        &self.records
    }

    /// Per-employee status projection for the sheet's date. Survivors whose
    /// date differs and survivors with an empty status stay out of the map
    /// entirely; a missing entry is the "not marked" state.
    pub fn statuses(&self) -> BTreeMap<String, AttendanceStatus> {
        let date = self.date.to_string();
        let mut map = BTreeMap::new();
        for surviving in &self.records {
            if surviving.record.date.as_deref() != Some(date.as_str()) {
                continue;
            }
            let Some(raw) = surviving.record.status.as_deref() else {
                continue;
            };
            if let Some(status) = AttendanceStatus::from_raw(raw) {
                map.insert(surviving.key.clone(), status);
            }
        }
        map
    }

    /// Stages an edit for an employee key. Nothing goes over the wire until
    /// the save is planned and executed.
    pub fn stage(&mut self, key: &str, status: AttendanceStatus) {
        self.staged.insert(key.to_string(), status);
    }

    pub fn staged(&self) -> &BTreeMap<String, AttendanceStatus> {
        &self.staged
    }

    pub fn staged_status(&self, key: &str) -> Option<AttendanceStatus> {
        self.staged.get(key).copied()
    }

    /// Decides create-vs-update for a staged key: a surviving record with a
    /// server id gets an update, anything else a create. Returns `None` when
    /// nothing is staged for the key.
    pub fn plan_save(&self, key: &str) -> Option<SaveAction> {
        let status = self.staged.get(key)?;
        let payload = AttendancePayload {
            employee: key.to_string(),
            date: self.date.to_string(),
            status: status.to_string(),
        };
        let existing_id = self
            .records
            .iter()
            .find(|s| s.key == key)
            .and_then(|s| s.record.id.clone());
        Some(match existing_id {
            Some(id) => SaveAction::Update { id, payload },
            None => SaveAction::Create(payload),
        })
    }

    /// Folds the record the backend returned from a save back into the
    /// surviving set without a refetch: records re-key by server id (or a
    /// synthetic employee+date key) and the returned row replaces whatever
    /// it supersedes. The staged edit it answers is cleared.
    pub fn apply_saved(&mut self, returned: AttendanceRecord) {
        let mut by_key: BTreeMap<RecordKey, SurvivingRecord> = BTreeMap::new();
        for surviving in self.records.drain(..) {
            by_key.insert(record_storage_key(&surviving), surviving);
        }
        let key = canonical_key(&self.roster, returned.employee.as_ref());
        self.staged.remove(&key);
        let incoming = SurvivingRecord {
            key,
            record: returned,
        };
        by_key.insert(record_storage_key(&incoming), incoming);
        self.records = by_key.into_values().collect();
    }
}

/// Stat-card numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_employees: usize,
    pub present_today: usize,
    pub absent_today: usize,
}

impl DashboardStats {
    /// Totals derived from the reconciled projection: present counts keys
    /// whose surviving status projects to `Present`; everyone else on the
    /// roster, absent or not marked, counts as absent.
    pub fn from_sheet(sheet: &AttendanceSheet) -> DashboardStats {
        let total_employees = sheet.roster().len();
        let present_today = sheet
            .statuses()
            .values()
            .filter(|status| **status == AttendanceStatus::Present)
            .count();
        DashboardStats {
            total_employees,
            present_today,
            absent_today: total_employees.saturating_sub(present_today),
        }
    }
}
