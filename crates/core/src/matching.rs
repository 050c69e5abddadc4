use crate::normalize::{normalize_date, normalize_phone, normalize_time_bucket};

// An empty search token always matches: a criterion the caller did not
// supply imposes no constraint on the row.

/// Digits-only equality, or a suffix relationship of at least seven digits
/// in either direction. Callers often give only the tail of a number.
pub fn phone_matches(search: &str, stored: &str) -> bool {
    let search = normalize_phone(search);
    if search.is_empty() {
        return true;
    }
    let stored = normalize_phone(stored);
    if search == stored {
        return true;
    }
    let shorter = search.len().min(stored.len());
    shorter >= 7 && (search.ends_with(&stored) || stored.ends_with(&search))
}

/// Case-insensitive containment in either direction, so "smith" finds
/// "John Smith" and "John Smith Jr" finds "smith".
pub fn text_matches(search: &str, stored: &str) -> bool {
    let search = search.trim().to_lowercase();
    if search.is_empty() {
        return true;
    }
    let stored = stored.trim().to_lowercase();
    stored.contains(&search) || search.contains(&stored)
}

/// Equality of normalized dates, or containment in either direction to
/// tolerate partial dates like a bare month and day.
pub fn date_matches(search: &str, stored: &str) -> bool {
    if search.trim().is_empty() {
        return true;
    }
    let search = normalize_date(search).to_lowercase();
    let stored = normalize_date(stored).to_lowercase();
    stored.contains(&search) || search.contains(&stored)
}

/// Bucket equality first, raw containment as the fallback for times the
/// bucketizer could not place.
pub fn time_matches(search: &str, stored: &str) -> bool {
    if search.trim().is_empty() {
        return true;
    }
    if normalize_time_bucket(search) == normalize_time_bucket(stored) {
        return true;
    }
    let search = search.trim().to_lowercase();
    let stored = stored.trim().to_lowercase();
    stored.contains(&search) || search.contains(&stored)
}
