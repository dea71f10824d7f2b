//! Parser for `UnicodeData.txt`.
//!
//! Each row has fifteen `;`-separated fields:
//!
//! ```text
//! 078A;THAANA LETTER FAAFU;Lo;0;AL;;;;;N;;;;;
//! 01E8;LATIN CAPITAL LETTER K WITH CARON;Lu;0;L;004B 030C;;;;N;LATIN CAPITAL LETTER K HACEK;;;01E9;
//! ```
//!
//! Large uniform blocks are not listed codepoint by codepoint. Two bracketing rows stand in
//! for the whole range instead, and every codepoint between them shares the fields of the
//! first row:
//!
//! ```text
//! 4E00;<CJK Ideograph, First>;Lo;0;L;;;;;N;;;;;
//! 9FFF;<CJK Ideograph, Last>;Lo;0;L;;;;;N;;;;;
//! ```
//!
//! Codepoints inside such a range are named after the range label, `<CJK Ideograph>`, in the
//! same style UnicodeData uses for `<control>` characters.

use std::borrow::Cow;

use super::{parse_codepoint, Assignment};
use crate::{Error, Result};

const FIELD_COUNT: usize = 15;

const FIRST_SUFFIX: &str = ", First>";
const LAST_SUFFIX: &str = ", Last>";

/// Field positions within a row.
const NAME: usize = 1;
const GENERAL_CATEGORY: usize = 2;
const COMBINING_CLASS: usize = 3;
const BIDI_CLASS: usize = 4;
const DECOMPOSITION: usize = 5;
const NUMERIC_DECIMAL: usize = 6;
const NUMERIC_DIGIT: usize = 7;
const NUMERIC_VALUE: usize = 8;
const BIDI_MIRRORED: usize = 9;
const UNICODE_1_NAME: usize = 10;
const ISO_COMMENT: usize = 11;
const UPPERCASE: usize = 12;
const LOWERCASE: usize = 13;
const TITLECASE: usize = 14;

/// Optional fields: recorded only when the source field is non-empty.
const OPTIONAL_FIELDS: [(usize, &str); 7] = [
    (DECOMPOSITION, "Decomposition_Mapping"),
    (BIDI_MIRRORED, "Bidi_Mirrored"),
    (UNICODE_1_NAME, "Unicode_1_Name"),
    (ISO_COMMENT, "ISO_Comment"),
    (UPPERCASE, "Simple_Uppercase_Mapping"),
    (LOWERCASE, "Simple_Lowercase_Mapping"),
    (TITLECASE, "Simple_Titlecase_Mapping"),
];

/// A `First>` row waiting for its `Last>` partner.
struct OpenRange<'a> {
    start: u32,
    label: &'a str,
    line: usize,
    fields: Vec<&'a str>,
}

/// Parses `UnicodeData.txt`, reconstructing `First>`/`Last>` ranges.
///
/// # Errors
/// Returns [`Error::Structural`] when a `First>` row is not immediately followed by the
/// matching `Last>` row, when a `Last>` row has no `First>`, or when a range ends before
/// it starts. Any of these means the file was truncated or damaged.
pub(super) fn parse_unicode_data<'a>(file: &str, text: &'a str) -> Result<Vec<Assignment<'a>>> {
    let structural = |line: usize, message: String| Error::Structural {
        file: file.to_string(),
        line,
        message,
    };

    let mut assignments = Vec::new();
    let mut open: Option<OpenRange<'a>> = None;

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let row = line.trim();
        if row.is_empty() || row.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = row.split(';').collect();
        if fields.len() < FIELD_COUNT {
            continue;
        }
        let Some(codepoint) = parse_codepoint(fields[0]) else {
            continue;
        };
        let name = fields[NAME];

        if let Some(range) = open.take() {
            let Some(label) = range_label(name, LAST_SUFFIX) else {
                return Err(structural(
                    range.line,
                    format!(
                        "range <{}, First> at U+{:04X} is not followed by its Last> row",
                        range.label, range.start
                    ),
                ));
            };
            if label != range.label {
                return Err(structural(
                    line_number,
                    format!(
                        "range <{}, First> at U+{:04X} is closed by <{label}, Last>",
                        range.label, range.start
                    ),
                ));
            }
            if codepoint < range.start {
                return Err(structural(
                    line_number,
                    format!(
                        "range <{label}> ends at U+{codepoint:04X}, before its start U+{:04X}",
                        range.start
                    ),
                ));
            }

            let name = Cow::Owned(format!("<{label}>"));
            push_row(&mut assignments, range.start..=codepoint, name, &range.fields);
            continue;
        }

        if let Some(label) = range_label(name, FIRST_SUFFIX) {
            open = Some(OpenRange {
                start: codepoint,
                label,
                line: line_number,
                fields,
            });
            continue;
        }

        if let Some(label) = range_label(name, LAST_SUFFIX) {
            return Err(structural(
                line_number,
                format!("<{label}, Last> at U+{codepoint:04X} has no matching First> row"),
            ));
        }

        push_row(&mut assignments, codepoint..=codepoint, Cow::Borrowed(name), &fields);
    }

    if let Some(range) = open {
        return Err(structural(
            range.line,
            format!(
                "range <{}, First> at U+{:04X} is not closed before end of file",
                range.label, range.start
            ),
        ));
    }

    Ok(assignments)
}

/// Extracts `Label` from `<Label, First>` (or `, Last>`).
fn range_label<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    name.strip_prefix('<')?.strip_suffix(suffix)
}

/// Emits every property of one row (or one reconstructed range).
fn push_row<'a>(
    assignments: &mut Vec<Assignment<'a>>,
    range: std::ops::RangeInclusive<u32>,
    name: Cow<'a, str>,
    fields: &[&'a str],
) {
    assignments.push(Assignment::range(range.clone(), "Name", name));
    assignments.push(Assignment::range(
        range.clone(),
        "General_Category",
        fields[GENERAL_CATEGORY],
    ));
    assignments.push(Assignment::range(
        range.clone(),
        "Canonical_Combining_Class",
        fields[COMBINING_CLASS],
    ));
    assignments.push(Assignment::range(
        range.clone(),
        "Bidi_Class",
        fields[BIDI_CLASS],
    ));

    let numeric_value = fields[NUMERIC_VALUE];
    if !numeric_value.is_empty() {
        let numeric_type = if !fields[NUMERIC_DECIMAL].is_empty() {
            "Decimal"
        } else if !fields[NUMERIC_DIGIT].is_empty() {
            "Digit"
        } else {
            "Numeric"
        };
        assignments.push(Assignment::range(range.clone(), "Numeric_Type", numeric_type));
        assignments.push(Assignment::range(range.clone(), "Numeric_Value", numeric_value));
    }

    for (index, property) in OPTIONAL_FIELDS {
        let value = fields[index].trim();
        if !value.is_empty() {
            assignments.push(Assignment::range(range.clone(), property, value));
        }
    }
}
