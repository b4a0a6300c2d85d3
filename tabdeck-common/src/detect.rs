//! Keyword detector
//!
//! Stateless matching of free text against a small dictionary of UI keywords.
//! Independent of the document store.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Dictionary entries in match priority order
pub const DICTIONARY: &[(&str, &str)] = &[
    ("table", "Here is the table in the preview!"),
    ("text", "Here is the text in the preview!"),
    ("graph", "Here is the graph in the preview!"),
    ("tab", "Here are the tabs in the footer!"),
    ("set", "successfully set!"),
    ("new", "successfully set in a new tab!"),
];

/// Keys whose detection also reports the first number in the text
const COUNTED_KEYS: &[&str] = &["tab", "set"];

/// Result of running the detector over one input
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    /// Matched dictionary key, `null` when nothing matched
    pub key: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<&'static str>,

    pub timestamp: String,

    /// Input with its first line removed
    pub maindata: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_tabs: Option<u64>,
}

/// Run the detector, stamping the result with the current time
pub fn detect(text: &str) -> Detection {
    detect_at(text, Utc::now())
}

/// Run the detector with an explicit timestamp
pub fn detect_at(text: &str, at: DateTime<Utc>) -> Detection {
    let timestamp = at.to_rfc3339_opts(SecondsFormat::Millis, true);
    let maindata = strip_first_line(text);
    let lowered = text.to_lowercase();

    for &(key, value) in DICTIONARY {
        if !lowered.contains(key) {
            continue;
        }

        // Zero is treated as "no number"
        let number_of_tabs = if COUNTED_KEYS.contains(&key) {
            first_number(text).filter(|n| *n != 0)
        } else {
            None
        };

        return Detection {
            key: Some(key),
            value: Some(value),
            timestamp,
            maindata,
            number_of_tabs,
        };
    }

    Detection {
        key: None,
        value: None,
        timestamp,
        maindata,
        number_of_tabs: None,
    }
}

/// Drop the first line (`\n` or `\r\n` separated) and rejoin the rest with `\n`.
///
/// A `\r` with no `\n` after it is content, not a separator.
fn strip_first_line(text: &str) -> String {
    let mut lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    for line in &mut lines[..last] {
        let current: &str = *line;
        *line = current.strip_suffix('\r').unwrap_or(current);
    }
    lines[1..].join("\n")
}

/// First run of ASCII digits, if it fits in a `u64`
fn first_number(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits = &text[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}
