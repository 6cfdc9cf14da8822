//! Bounded context assembly from fetched records

use crate::config::LimitsConfig;
use crate::constants::TRUNCATION_MARKER;
use crate::mail::EmailRecord;

/// Numbered overview lines for every record. Display only, never prompted.
pub fn summary_lines(records: &[EmailRecord]) -> Vec<String> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| record.summary_line(i + 1))
        .collect()
}

/// Labeled blocks for the first `max_bodies_in_prompt` records, each body cut
/// to `max_body_chars` characters.
pub fn build_context(records: &[EmailRecord], limits: &LimitsConfig) -> String {
    records
        .iter()
        .take(limits.max_bodies_in_prompt)
        .enumerate()
        .map(|(i, record)| {
            format!(
                "--- Email {} ---\nSubject: {}\nFrom: {}\nDate: {}\nBody: {}\n\n",
                i + 1,
                record.subject,
                record.from,
                record.date,
                truncate_body(&record.body, limits.max_body_chars)
            )
        })
        .collect()
}

/// First `max_chars` characters, plus the marker only if anything was cut.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &body[..cut], TRUNCATION_MARKER),
        None => body.to_string(),
    }
}
