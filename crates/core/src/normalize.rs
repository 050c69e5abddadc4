use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Date layouts accepted verbatim, tried in order. Day-first beats
/// month-first for ambiguous slash and dash forms.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%m-%d-%Y"];

/// Keeps only ASCII digits. Empty input stays empty; there is no failure
/// mode.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Canonicalizes a caller-supplied date to `YYYY-MM-DD` when any of the
/// layered parsers succeeds, otherwise returns the trimmed input unchanged.
/// Transcribed speech produces anything from `12/05/2026` to
/// `the 3rd of March`, so each stage is a fallback for the previous one.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if let Some(date) = parse_listed_formats(trimmed) {
        return iso(date);
    }
    if let Some(date) = rescue_embedded_date(trimmed) {
        return iso(date);
    }
    if let Some(date) = parse_spoken_date(trimmed, Local::now().date_naive()) {
        return iso(date);
    }
    trimmed.to_string()
}

/// Collapses a free-text time expression into one of the coarse buckets
/// `morning`, `afternoon`, `evening`. Keyword rules run before numeric
/// extraction; unrecognized input comes back lower-cased for the matcher's
/// substring fallback.
pub fn normalize_time_bucket(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    if lower.contains("morning") || lower.contains("am") {
        return "morning".to_string();
    }
    if lower.contains("afternoon") || lower.contains("noon") || lower.contains("pm") {
        return "afternoon".to_string();
    }
    if lower.contains("evening") || lower.contains("night") {
        return "evening".to_string();
    }
    if let Some(bucket) = bucket_from_clock(&lower) {
        return bucket.to_string();
    }
    lower
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_listed_formats(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Pulls the first date-shaped substring out of surrounding words
/// ("it was 12/05/2026 I think") and retries the format list on it.
fn rescue_embedded_date(text: &str) -> Option<NaiveDate> {
    static DATE_SHAPE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\d{1,4}[/-]\d{1,2}[/-]\d{1,4}").unwrap());
    let found = DATE_SHAPE_RE.find(text)?;
    parse_listed_formats(found.as_str())
}

/// Last-resort parser for spoken dates: month names, ordinal day suffixes,
/// bare month/day number pairs, optional year. Missing components default
/// to `today`. Returns `None` when the text carries neither a month nor a
/// day, or when the combination is not a real date.
fn parse_spoken_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lower = text.to_lowercase();
    let mut month: Option<u32> = None;
    let mut day: Option<u32> = None;
    let mut year: Option<i32> = None;
    // A leading bare number up to 12 is provisionally a month; if no day
    // token ever shows up it was the day all along.
    let mut month_was_bare_number = false;
    for token in lower.split(|c: char| !c.is_ascii_alphanumeric()) {
        if token.is_empty() {
            continue;
        }
        if let Some(found) = month_from_name(token) {
            if month_was_bare_number && day.is_none() {
                day = month.take();
                month_was_bare_number = false;
            }
            month.get_or_insert(found);
            continue;
        }
        let digits = strip_ordinal(token);
        let had_ordinal = digits.len() != token.len();
        let value: u32 = match digits.parse() {
            Ok(value) => value,
            Err(_) => continue,
        };
        if digits.len() >= 4 {
            year.get_or_insert(value as i32);
        } else if had_ordinal {
            if day.is_none() && (1..=31).contains(&value) {
                day = Some(value);
            }
        } else if month.is_none() && day.is_none() && (1..=12).contains(&value) {
            month = Some(value);
            month_was_bare_number = true;
        } else if day.is_none() && (1..=31).contains(&value) {
            day = Some(value);
        } else if month.is_none() && (1..=12).contains(&value) {
            month = Some(value);
        } else if year.is_none() {
            // a trailing small number reads as a short year
            year = Some(2000 + value as i32);
        }
    }
    if month_was_bare_number && day.is_none() && year.is_none() {
        day = month.take();
    }
    if month.is_none() && day.is_none() {
        return None;
    }
    NaiveDate::from_ymd_opt(
        year.unwrap_or_else(|| today.year()),
        month.unwrap_or_else(|| today.month()),
        day.unwrap_or_else(|| today.day()),
    )
}

fn bucket_from_clock(lower: &str) -> Option<&'static str> {
    static CLOCK_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(\d{1,2})(?::\d{2})?\s*(am|pm)?").unwrap());
    let caps = CLOCK_RE.captures(lower)?;
    let mut hour = caps[1].parse::<u32>().ok()?;
    match caps.get(2).map(|m| m.as_str()) {
        Some("pm") if hour < 12 => hour += 12,
        Some("am") if hour == 12 => hour = 0,
        _ => {}
    }
    match hour {
        5..=11 => Some("morning"),
        12..=16 => Some("afternoon"),
        17..=22 => Some("evening"),
        _ => None,
    }
}

fn month_from_name(token: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    if token.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|name| name.starts_with(token))
        .map(|index| index as u32 + 1)
}

fn strip_ordinal(token: &str) -> &str {
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(stripped) = token.strip_suffix(suffix) {
            if !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()) {
                return stripped;
            }
        }
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_phone_punctuation() {
        assert_eq!(normalize_phone("(555) 123-4567"), "5551234567");
        assert_eq!(normalize_phone("+44 20 7946 0958"), "442079460958");
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("ext."), "");
    }

    #[test]
    fn parses_listed_date_formats() {
        assert_eq!(normalize_date("2026-03-15"), "2026-03-15");
        assert_eq!(normalize_date("15/03/2026"), "2026-03-15");
        assert_eq!(normalize_date("03/15/2026"), "2026-03-15");
        assert_eq!(normalize_date("15-03-2026"), "2026-03-15");
        assert_eq!(normalize_date("03-15-2026"), "2026-03-15");
    }

    #[test]
    fn rescues_date_embedded_in_speech() {
        assert_eq!(normalize_date("maybe 15/03/2026 works"), "2026-03-15");
        assert_eq!(normalize_date(" around 2026-03-15. "), "2026-03-15");
    }

    #[test]
    fn spoken_dates_fill_missing_parts_from_today() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 22).unwrap();
        assert_eq!(
            parse_spoken_date("March 3rd", today),
            NaiveDate::from_ymd_opt(2026, 3, 3)
        );
        assert_eq!(
            parse_spoken_date("the 3rd of march 2027", today),
            NaiveDate::from_ymd_opt(2027, 3, 3)
        );
        assert_eq!(
            parse_spoken_date("aug 15", today),
            NaiveDate::from_ymd_opt(2026, 8, 15)
        );
        assert_eq!(
            parse_spoken_date("5 march", today),
            NaiveDate::from_ymd_opt(2026, 3, 5)
        );
        assert_eq!(
            parse_spoken_date("the 15th", today),
            NaiveDate::from_ymd_opt(2026, 8, 15)
        );
        assert_eq!(parse_spoken_date("next week sometime", today), None);
    }

    #[test]
    fn bare_number_pairs_read_month_first() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 22).unwrap();
        assert_eq!(
            parse_spoken_date("03-15", today),
            NaiveDate::from_ymd_opt(2026, 3, 15)
        );
        assert_eq!(
            parse_spoken_date("15-03", today),
            NaiveDate::from_ymd_opt(2026, 3, 15)
        );
        assert_eq!(
            parse_spoken_date("5", today),
            NaiveDate::from_ymd_opt(2026, 8, 5)
        );
    }

    #[test]
    fn unparseable_dates_come_back_trimmed() {
        assert_eq!(normalize_date("  whenever suits  "), "whenever suits");
        assert_eq!(normalize_date(""), "");
    }

    #[test]
    fn keyword_buckets_win_over_digits() {
        assert_eq!(normalize_time_bucket("tomorrow MORNING"), "morning");
        assert_eq!(normalize_time_bucket("8am"), "morning");
        assert_eq!(normalize_time_bucket("around noon"), "afternoon");
        assert_eq!(normalize_time_bucket("8pm"), "afternoon");
        assert_eq!(normalize_time_bucket("late evening"), "evening");
    }

    #[test]
    fn clock_times_bucket_by_hour() {
        assert_eq!(normalize_time_bucket("9:30"), "morning");
        assert_eq!(normalize_time_bucket("14:00"), "afternoon");
        assert_eq!(normalize_time_bucket("18"), "evening");
        assert_eq!(normalize_time_bucket("3:00"), "3:00");
    }

    #[test]
    fn unrecognized_times_come_back_lowercased() {
        assert_eq!(normalize_time_bucket("Whenever"), "whenever");
    }
}
