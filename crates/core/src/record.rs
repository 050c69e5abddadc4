use serde::Deserialize;

use crate::normalize::{normalize_date, normalize_phone};

/// One appointment event as supplied by the conversational layer. Every
/// field except `action` is optional; absent fields become empty cells.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentRecord {
    #[serde(default)]
    pub action: String,
    pub patient_name: Option<String>,
    pub patient_age_or_dob: Option<String>,
    pub phone: Option<String>,
    pub department_or_doctor: Option<String>,
    pub reason: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub visit_type: Option<String>,
    pub existing_appointment: Option<String>,
    pub notes: Option<String>,
}

impl AppointmentRecord {
    /// Column name and cell value for every caller field, in schema order.
    /// Phone and preferred date are canonicalized on the way in; the rest
    /// is stored verbatim.
    pub(crate) fn column_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("action", self.action.trim().to_string()),
            ("patient_name", plain(&self.patient_name)),
            ("patient_age_or_dob", plain(&self.patient_age_or_dob)),
            ("phone", normalize_phone(text(&self.phone))),
            ("department_or_doctor", plain(&self.department_or_doctor)),
            ("reason", plain(&self.reason)),
            ("preferred_date", normalize_date(text(&self.preferred_date))),
            ("preferred_time", plain(&self.preferred_time)),
            ("visit_type", plain(&self.visit_type)),
            ("existing_appointment", plain(&self.existing_appointment)),
            ("notes", plain(&self.notes)),
        ]
    }
}

/// Free-text criteria for locating an existing row. A missing or blank
/// value imposes no constraint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchCriteria {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        supplied(&self.name).is_none()
            && supplied(&self.phone).is_none()
            && supplied(&self.date).is_none()
            && supplied(&self.time).is_none()
    }

    pub fn has_date_or_time(&self) -> bool {
        supplied(&self.date).is_some() || supplied(&self.time).is_some()
    }
}

/// Values to merge into a matched row. Only supplied, non-blank values
/// overwrite; everything else stays as stored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldUpdates {
    pub patient_name: Option<String>,
    pub patient_age_or_dob: Option<String>,
    pub phone: Option<String>,
    pub department_or_doctor: Option<String>,
    pub reason: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub visit_type: Option<String>,
    pub existing_appointment: Option<String>,
    pub notes: Option<String>,
}

impl FieldUpdates {
    pub(crate) fn supplied_values(&self) -> Vec<(&'static str, String)> {
        let fields: [(&'static str, &Option<String>); 10] = [
            ("patient_name", &self.patient_name),
            ("patient_age_or_dob", &self.patient_age_or_dob),
            ("phone", &self.phone),
            ("department_or_doctor", &self.department_or_doctor),
            ("reason", &self.reason),
            ("preferred_date", &self.preferred_date),
            ("preferred_time", &self.preferred_time),
            ("visit_type", &self.visit_type),
            ("existing_appointment", &self.existing_appointment),
            ("notes", &self.notes),
        ];
        let mut pairs = Vec::new();
        for (column, value) in fields {
            if let Some(value) = supplied(value) {
                let value = match column {
                    "phone" => normalize_phone(value),
                    "preferred_date" => normalize_date(value),
                    _ => value.to_string(),
                };
                pairs.push((column, value));
            }
        }
        pairs
    }
}

/// Trimmed view of an optional field, `None` when absent or blank.
pub(crate) fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn plain(value: &Option<String>) -> String {
    text(value).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::REQUIRED_COLUMNS;

    #[test]
    fn column_values_cover_the_schema() {
        let record = AppointmentRecord::default();
        let columns: Vec<&str> = record.column_values().iter().map(|(c, _)| *c).collect();
        for column in REQUIRED_COLUMNS.iter().filter(|c| **c != "logged_at") {
            assert!(columns.contains(column), "missing column {column}");
        }
        assert_eq!(columns.len(), REQUIRED_COLUMNS.len() - 1);
    }

    #[test]
    fn record_values_are_canonicalized() {
        let record = AppointmentRecord {
            action: " book ".to_string(),
            phone: Some("(555) 123-4567".to_string()),
            preferred_date: Some("15/03/2026".to_string()),
            notes: Some("  has insurance  ".to_string()),
            ..Default::default()
        };
        let values = record.column_values();
        let get = |column: &str| {
            values
                .iter()
                .find(|(c, _)| *c == column)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(get("action"), "book");
        assert_eq!(get("phone"), "5551234567");
        assert_eq!(get("preferred_date"), "2026-03-15");
        assert_eq!(get("notes"), "has insurance");
        assert_eq!(get("patient_name"), "");
    }

    #[test]
    fn blank_updates_are_not_supplied() {
        let updates = FieldUpdates {
            patient_name: Some("  ".to_string()),
            phone: Some("555-0000".to_string()),
            preferred_date: Some("03/15/2026".to_string()),
            ..Default::default()
        };
        let pairs = updates.supplied_values();
        assert_eq!(
            pairs,
            vec![
                ("phone", "5550000".to_string()),
                ("preferred_date", "2026-03-15".to_string()),
            ]
        );
    }

    #[test]
    fn criteria_presence_checks_ignore_blanks() {
        let empty = SearchCriteria {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(empty.is_empty());
        assert!(!empty.has_date_or_time());
        let dated = SearchCriteria {
            date: Some("2026-03-15".to_string()),
            ..Default::default()
        };
        assert!(!dated.is_empty());
        assert!(dated.has_date_or_time());
    }
}
