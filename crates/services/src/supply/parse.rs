use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

use storage::ItemRecord;
use swipe_core::model::{Item, ItemId};

use super::pipeline::SupplyKind;

const LOGGED_LINE_CHARS: usize = 80;

/// What a block of generated text yielded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Valid, de-duplicated items in the order they appeared.
    pub items: Vec<Item>,
    /// Lines that were not a JSON object at all.
    pub malformed: usize,
    /// Objects with missing fields, out-of-set literals, or the wrong shape.
    pub rejected: usize,
    pub duplicates: usize,
}

/// Parses one JSON object per line, keeping the lines that validate.
///
/// Blank lines and markdown fences are skipped without being counted. Ids are
/// assigned from 1 in acceptance order.
#[must_use]
pub fn parse_lines(text: &str, kind: SupplyKind) -> ParseReport {
    let mut report = ParseReport::default();
    let mut seen = HashSet::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("```") {
            continue;
        }
        let line = line.strip_suffix(',').unwrap_or(line);

        let value = match serde_json::from_str::<Value>(line) {
            Ok(value @ Value::Object(_)) => value,
            _ => {
                warn!(line = %truncate(line), "skipping malformed generated line");
                report.malformed += 1;
                continue;
            }
        };

        let record = match serde_json::from_value::<ItemRecord>(value) {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "rejecting generated record");
                report.rejected += 1;
                continue;
            }
        };
        if record.is_sentence() != matches!(kind, SupplyKind::Sentences) {
            debug!(kind = ?kind, "rejecting generated record of the wrong shape");
            report.rejected += 1;
            continue;
        }

        let next_id = ItemId::new(u64::try_from(report.items.len()).unwrap_or(u64::MAX) + 1);
        let item = match record.into_item(next_id) {
            Ok(item) => item,
            Err(e) => {
                debug!(error = %e, "rejecting generated record");
                report.rejected += 1;
                continue;
            }
        };

        if !seen.insert(item.dedupe_key()) {
            report.duplicates += 1;
            continue;
        }
        report.items.push(item);
    }

    report
}

fn truncate(line: &str) -> String {
    if line.chars().count() <= LOGGED_LINE_CHARS {
        return line.to_string();
    }
    let mut short: String = line.chars().take(LOGGED_LINE_CHARS).collect();
    short.push('…');
    short
}
