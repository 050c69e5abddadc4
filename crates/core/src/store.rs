use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::matching::{date_matches, phone_matches, text_matches, time_matches};
use crate::normalize::normalize_date;
use crate::record::{supplied, AppointmentRecord, FieldUpdates, SearchCriteria};
use crate::schema::{self, HeaderMap};
use crate::workbook::{Workbook, Worksheet};

/// Worksheet used when no routing decision applies.
pub const DEFAULT_SHEET: &str = "Appointments";

/// Upper bound on candidates reported back on an ambiguous update.
pub const MAX_REPORTED_MATCHES: usize = 10;

/// Deployment-wide rule selecting the worksheet a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingPolicy {
    /// Every record lands on one fixed worksheet.
    SingleSheet(String),
    /// One worksheet per normalized preferred date, named `YYYY-MM-DD`.
    /// Unresolvable dates fall back to the current date.
    ByDate,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self::SingleSheet(DEFAULT_SHEET.to_string())
    }
}

/// Identifying fields of one candidate row, reported when an update is
/// ambiguous. `row` is the 1-based spreadsheet row number, counting the
/// header as row 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub sheet: String,
    pub row: usize,
    pub name: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub existing_appointment: String,
}

/// Wire result of the booking operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LogOutcome {
    Logged { path: String, sheet: String },
    Error { code: String, message: String },
}

/// Wire result of the update operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    Updated {
        path: String,
        sheet: String,
        moved: bool,
    },
    NotFound,
    MultipleMatches {
        matches: Vec<MatchCandidate>,
    },
    MissingSearch,
    Error {
        code: String,
        message: String,
    },
}

/// Where an append landed.
#[derive(Debug, Clone)]
pub struct AppendReceipt {
    pub path: PathBuf,
    pub sheet: String,
}

/// Owner of the on-disk ledger. Every operation holds the injected
/// exclusive lock across its whole load, mutate, save cycle; clones share
/// the lock, so one store per ledger file serializes all traffic to it.
#[derive(Clone)]
pub struct LedgerStore {
    path: PathBuf,
    routing: RoutingPolicy,
    lock: Arc<Mutex<()>>,
}

impl LedgerStore {
    pub fn new<P: AsRef<Path>>(path: P, routing: RoutingPolicy) -> Self {
        Self::with_lock(path, routing, Arc::new(Mutex::new(())))
    }

    /// Builds a store sharing an existing exclusive section, for callers
    /// that must serialize several stores against each other.
    pub fn with_lock<P: AsRef<Path>>(
        path: P,
        routing: RoutingPolicy,
        lock: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            routing,
            lock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a new appointment row, creating the ledger file and the
    /// routed worksheet on first use.
    pub fn append(&self, record: &AppointmentRecord) -> Result<AppendReceipt> {
        let _guard = self.lock.lock();
        let mut book = Workbook::load(&self.path)?;
        let sheet_name = self.route_sheet(supplied(&record.preferred_date).unwrap_or(""));
        let sheet = book.sheets.entry(sheet_name.clone()).or_default();
        let headers = schema::reconcile_headers(sheet);
        let mut row = vec![String::new(); sheet.rows[0].len()];
        fill(&mut row, &headers, "logged_at", timestamp());
        for (column, value) in record.column_values() {
            fill(&mut row, &headers, column, value);
        }
        sheet.rows.push(row);
        book.save(&self.path)?;
        Ok(AppendReceipt {
            path: self.path.clone(),
            sheet: sheet_name,
        })
    }

    /// Operation boundary for the booking tool: storage failures become a
    /// structured error result instead of propagating.
    pub fn log_appointment(&self, record: &AppointmentRecord) -> LogOutcome {
        match self.append(record) {
            Ok(receipt) => LogOutcome::Logged {
                path: receipt.path.display().to_string(),
                sheet: receipt.sheet,
            },
            Err(err) => LogOutcome::Error {
                code: err.code().to_string(),
                message: err.to_string(),
            },
        }
    }

    /// Locates the row matching `criteria`, merges `updates` into it, and
    /// relocates it to another worksheet when a reschedule changes the date
    /// shard. `Err` is reserved for storage failures; every search verdict
    /// is an [`UpdateOutcome`].
    pub fn find_and_update(
        &self,
        criteria: &SearchCriteria,
        action: &str,
        updates: &FieldUpdates,
    ) -> Result<UpdateOutcome> {
        if criteria.is_empty() {
            return Ok(UpdateOutcome::MissingSearch);
        }
        let _guard = self.lock.lock();
        let mut book = Workbook::load(&self.path)?;
        let candidates = self.scan(&book, criteria);
        if candidates.is_empty() {
            return Ok(UpdateOutcome::NotFound);
        }
        if candidates.len() > 1 && !criteria.has_date_or_time() {
            let matches = candidates
                .iter()
                .take(MAX_REPORTED_MATCHES)
                .map(Candidate::report)
                .collect();
            return Ok(UpdateOutcome::MultipleMatches { matches });
        }
        let target = match candidates.into_iter().next() {
            Some(candidate) => candidate,
            None => return Ok(UpdateOutcome::NotFound),
        };

        let reschedule = is_reschedule(action);
        let mut merged = updates.supplied_values();
        if reschedule
            && supplied(&updates.existing_appointment).is_none()
            && target.existing_appointment.trim().is_empty()
        {
            // keep an audit trail of the slot being moved away from
            let snapshot = format!("{} {}", target.date, target.time)
                .trim()
                .to_string();
            if !snapshot.is_empty() {
                merged.push(("existing_appointment", snapshot));
            }
        }

        let destination = match (&self.routing, reschedule, supplied(&updates.preferred_date)) {
            (RoutingPolicy::ByDate, true, Some(new_date)) => Some(self.route_sheet(new_date)),
            _ => None,
        };

        match destination.filter(|name| *name != target.sheet) {
            Some(dest_name) => {
                relocate_row(&mut book, &target, &dest_name, action, &merged)?;
                book.save(&self.path)?;
                Ok(UpdateOutcome::Updated {
                    path: self.path.display().to_string(),
                    sheet: dest_name,
                    moved: true,
                })
            }
            None => {
                update_in_place(&mut book, &target, action, &merged)?;
                book.save(&self.path)?;
                Ok(UpdateOutcome::Updated {
                    path: self.path.display().to_string(),
                    sheet: target.sheet,
                    moved: false,
                })
            }
        }
    }

    /// Operation boundary for the update tool; mirrors
    /// [`LedgerStore::log_appointment`].
    pub fn update_appointment(
        &self,
        criteria: &SearchCriteria,
        action: &str,
        updates: &FieldUpdates,
    ) -> UpdateOutcome {
        match self.find_and_update(criteria, action, updates) {
            Ok(outcome) => outcome,
            Err(err) => UpdateOutcome::Error {
                code: err.code().to_string(),
                message: err.to_string(),
            },
        }
    }

    /// Read-only view of the ledger, taken under the exclusive section.
    pub fn snapshot(&self) -> Result<Workbook> {
        let _guard = self.lock.lock();
        Workbook::load(&self.path)
    }

    /// Writes one worksheet to `destination` as CSV. Returns the number of
    /// rows written, header included.
    pub fn export_worksheet(&self, sheet: &str, destination: &Path) -> Result<usize> {
        let _guard = self.lock.lock();
        let book = Workbook::load(&self.path)?;
        let worksheet = book
            .sheets
            .get(sheet)
            .ok_or_else(|| LedgerError::UnknownSheet(sheet.to_string()))?;
        let file =
            fs::File::create(destination).map_err(|err| LedgerError::from_io(destination, err))?;
        worksheet.write_csv(file)
    }

    fn route_sheet(&self, date_hint: &str) -> String {
        match &self.routing {
            RoutingPolicy::SingleSheet(name) => name.clone(),
            RoutingPolicy::ByDate => {
                let normalized = normalize_date(date_hint);
                if NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").is_ok() {
                    normalized
                } else {
                    Local::now().format("%Y-%m-%d").to_string()
                }
            }
        }
    }

    /// Every data row of every worksheet, hint shard first, that satisfies
    /// all supplied criteria. Blank rows are skipped.
    fn scan(&self, book: &Workbook, criteria: &SearchCriteria) -> Vec<Candidate> {
        let mut found = Vec::new();
        for sheet_name in self.scan_order(book, criteria) {
            let Some(sheet) = book.sheets.get(&sheet_name) else {
                continue;
            };
            let headers = schema::read_headers(sheet);
            for (index, row) in sheet.rows.iter().enumerate().skip(1) {
                if Worksheet::is_blank_row(row) {
                    continue;
                }
                if row_matches(criteria, row, &headers) {
                    found.push(Candidate::from_row(&sheet_name, index, row, &headers));
                }
            }
        }
        found
    }

    fn scan_order(&self, book: &Workbook, criteria: &SearchCriteria) -> Vec<String> {
        let mut order: Vec<String> = Vec::with_capacity(book.sheets.len());
        if let (RoutingPolicy::ByDate, Some(date)) = (&self.routing, supplied(&criteria.date)) {
            let hint = self.route_sheet(date);
            if book.sheets.contains_key(&hint) {
                order.push(hint);
            }
        }
        for name in book.sheets.keys() {
            if !order.iter().any(|existing| existing == name) {
                order.push(name.clone());
            }
        }
        order
    }
}

/// A matched row and the field snapshot taken at scan time. `row` indexes
/// into the worksheet's `rows`, so data rows start at 1.
struct Candidate {
    sheet: String,
    row: usize,
    name: String,
    phone: String,
    date: String,
    time: String,
    existing_appointment: String,
}

impl Candidate {
    fn from_row(sheet: &str, row_index: usize, row: &[String], headers: &HeaderMap) -> Self {
        Self {
            sheet: sheet.to_string(),
            row: row_index,
            name: cell_value(row, headers, "patient_name").to_string(),
            phone: cell_value(row, headers, "phone").to_string(),
            date: cell_value(row, headers, "preferred_date").to_string(),
            time: cell_value(row, headers, "preferred_time").to_string(),
            existing_appointment: cell_value(row, headers, "existing_appointment").to_string(),
        }
    }

    fn report(&self) -> MatchCandidate {
        MatchCandidate {
            sheet: self.sheet.clone(),
            row: self.row + 1,
            name: self.name.clone(),
            phone: self.phone.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
            existing_appointment: self.existing_appointment.clone(),
        }
    }
}

fn row_matches(criteria: &SearchCriteria, row: &[String], headers: &HeaderMap) -> bool {
    text_matches(
        criteria.name.as_deref().unwrap_or(""),
        cell_value(row, headers, "patient_name"),
    ) && phone_matches(
        criteria.phone.as_deref().unwrap_or(""),
        cell_value(row, headers, "phone"),
    ) && date_matches(
        criteria.date.as_deref().unwrap_or(""),
        cell_value(row, headers, "preferred_date"),
    ) && time_matches(
        criteria.time.as_deref().unwrap_or(""),
        cell_value(row, headers, "preferred_time"),
    )
}

fn update_in_place(
    book: &mut Workbook,
    target: &Candidate,
    action: &str,
    merged: &[(&'static str, String)],
) -> Result<()> {
    let sheet = book
        .sheets
        .get_mut(&target.sheet)
        .ok_or(LedgerError::InvalidState("matched worksheet vanished"))?;
    let headers = schema::reconcile_headers(sheet);
    set_by_column(sheet, target.row, &headers, "action", action.trim().to_string());
    set_by_column(sheet, target.row, &headers, "logged_at", timestamp());
    for (column, value) in merged {
        set_by_column(sheet, target.row, &headers, column, value.clone());
    }
    Ok(())
}

/// Appends the merged row to `destination` and deletes it from the source
/// worksheet. Runs entirely inside the caller's exclusive section, so no
/// other operation can observe the row in both places.
fn relocate_row(
    book: &mut Workbook,
    target: &Candidate,
    destination: &str,
    action: &str,
    merged: &[(&'static str, String)],
) -> Result<()> {
    let mut values: Vec<(String, String)> = {
        let source = book
            .sheets
            .get(&target.sheet)
            .ok_or(LedgerError::InvalidState("matched worksheet vanished"))?;
        let headers = schema::read_headers(source);
        let row = source
            .rows
            .get(target.row)
            .ok_or(LedgerError::InvalidState("matched row vanished"))?;
        headers
            .iter()
            .map(|(column, &position)| {
                (column.clone(), row.get(position).cloned().unwrap_or_default())
            })
            .collect()
    };
    overlay(&mut values, "action", action.trim().to_string());
    overlay(&mut values, "logged_at", timestamp());
    for (column, value) in merged {
        overlay(&mut values, column, value.clone());
    }

    let dest = book.sheets.entry(destination.to_string()).or_default();
    let mut dest_headers = schema::reconcile_headers(dest);
    let mut new_row = vec![String::new(); dest.rows[0].len()];
    for (column, value) in values {
        let position = schema::ensure_column(dest, &mut dest_headers, &column);
        if position >= new_row.len() {
            new_row.resize(position + 1, String::new());
        }
        new_row[position] = value;
    }
    dest.rows.push(new_row);

    if let Some(source) = book.sheets.get_mut(&target.sheet) {
        if target.row < source.rows.len() {
            source.rows.remove(target.row);
        }
    }
    Ok(())
}

fn set_by_column(
    sheet: &mut Worksheet,
    row: usize,
    headers: &HeaderMap,
    column: &str,
    value: String,
) {
    if let Some(&position) = headers.get(column) {
        sheet.set_cell(row, position, value);
    }
}

fn fill(row: &mut [String], headers: &HeaderMap, column: &str, value: String) {
    if let Some(&position) = headers.get(column) {
        if let Some(cell) = row.get_mut(position) {
            *cell = value;
        }
    }
}

fn overlay(values: &mut Vec<(String, String)>, column: &str, value: String) {
    if let Some(entry) = values.iter_mut().find(|(name, _)| name == column) {
        entry.1 = value;
    } else {
        values.push((column.to_string(), value));
    }
}

fn cell_value<'a>(row: &'a [String], headers: &HeaderMap, column: &str) -> &'a str {
    headers
        .get(column)
        .and_then(|&position| row.get(position))
        .map(String::as_str)
        .unwrap_or("")
}

fn is_reschedule(action: &str) -> bool {
    action.to_lowercase().contains("reschedul")
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
