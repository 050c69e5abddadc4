mod error;
mod matching;
mod normalize;
mod record;
mod schema;
mod store;
mod workbook;

pub use error::{LedgerError, Result};
pub use matching::{date_matches, phone_matches, text_matches, time_matches};
pub use normalize::{normalize_date, normalize_phone, normalize_time_bucket};
pub use record::{AppointmentRecord, FieldUpdates, SearchCriteria};
pub use schema::{HeaderMap, REQUIRED_COLUMNS};
pub use store::{
    AppendReceipt, LedgerStore, LogOutcome, MatchCandidate, RoutingPolicy, UpdateOutcome,
    DEFAULT_SHEET, MAX_REPORTED_MATCHES,
};
pub use workbook::{Workbook, Worksheet};
