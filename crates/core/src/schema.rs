use indexmap::IndexMap;

use crate::workbook::Worksheet;

/// Fixed ledger schema, in the order a fresh worksheet writes its header
/// row. `logged_at` is assigned by the store; the rest come from the
/// caller.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "logged_at",
    "action",
    "patient_name",
    "patient_age_or_dob",
    "phone",
    "department_or_doctor",
    "reason",
    "preferred_date",
    "preferred_time",
    "visit_type",
    "existing_appointment",
    "notes",
];

/// Column name to position, in header order.
pub type HeaderMap = IndexMap<String, usize>;

/// Header map from the worksheet's first row as it stands. Blank header
/// cells are skipped; duplicate names keep their first position.
pub fn read_headers(sheet: &Worksheet) -> HeaderMap {
    let mut map = HeaderMap::new();
    if let Some(header_row) = sheet.rows.first() {
        for (position, cell) in header_row.iter().enumerate() {
            let name = cell.trim();
            if !name.is_empty() {
                map.entry(name.to_string()).or_insert(position);
            }
        }
    }
    map
}

/// Guarantees the worksheet's header row is a superset of
/// [`REQUIRED_COLUMNS`]. An empty worksheet gets the required list
/// verbatim; otherwise missing columns are appended at the end. Existing
/// column positions are never touched, so ledgers written under an older
/// schema keep working.
pub fn reconcile_headers(sheet: &mut Worksheet) -> HeaderMap {
    if sheet.rows.is_empty() {
        sheet
            .rows
            .push(REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect());
        return read_headers(sheet);
    }
    let mut map = read_headers(sheet);
    for column in REQUIRED_COLUMNS {
        ensure_column(sheet, &mut map, column);
    }
    map
}

/// Position of `column`, appending a new header cell for it when absent.
pub fn ensure_column(sheet: &mut Worksheet, headers: &mut HeaderMap, column: &str) -> usize {
    if let Some(&position) = headers.get(column) {
        return position;
    }
    if sheet.rows.is_empty() {
        sheet.rows.push(Vec::new());
    }
    let position = sheet.rows[0].len();
    sheet.rows[0].push(column.to_string());
    headers.insert(column.to_string(), position);
    position
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_worksheet_gets_required_headers() {
        let mut sheet = Worksheet::default();
        let map = reconcile_headers(&mut sheet);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0], REQUIRED_COLUMNS);
        assert_eq!(map.len(), REQUIRED_COLUMNS.len());
        assert_eq!(map["logged_at"], 0);
        assert_eq!(map["notes"], 11);
    }

    #[test]
    fn missing_columns_are_appended_after_existing_ones() {
        let mut sheet = Worksheet {
            rows: vec![
                vec!["patient_name".to_string(), "phone".to_string()],
                vec!["John Smith".to_string(), "5551234567".to_string()],
            ],
        };
        let map = reconcile_headers(&mut sheet);
        assert_eq!(map["patient_name"], 0);
        assert_eq!(map["phone"], 1);
        assert_eq!(map["logged_at"], 2);
        assert_eq!(sheet.rows[0].len(), REQUIRED_COLUMNS.len());
        // data row untouched
        assert_eq!(sheet.rows[1], vec!["John Smith", "5551234567"]);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut sheet = Worksheet::default();
        reconcile_headers(&mut sheet);
        let before = sheet.rows.clone();
        let map = reconcile_headers(&mut sheet);
        assert_eq!(sheet.rows, before);
        assert_eq!(map.len(), REQUIRED_COLUMNS.len());
    }

    #[test]
    fn extra_columns_survive() {
        let mut sheet = Worksheet {
            rows: vec![REQUIRED_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .chain(["insurance_id".to_string()])
                .collect()],
        };
        let map = reconcile_headers(&mut sheet);
        assert_eq!(map["insurance_id"], 12);
        assert_eq!(sheet.rows[0].len(), 13);
    }
}
