//! Parsers for the two casing files, which list several rows per codepoint and therefore
//! have to decide which rows are authoritative.

use super::{data_fields, parse_codepoint, Assignment};

/// Parses `CaseFolding.txt`.
///
/// Rows are `CODE; STATUS; MAPPING;` and a codepoint may appear with several statuses:
///
/// | Status | Recorded as |
/// |--------|-------------|
/// | `C` | `Case_Folding_Status`, `Case_Folding_Mapping`, `Simple_Case_Folding_Mapping` |
/// | `F` | `Case_Folding_Status`, `Case_Folding_Mapping` |
/// | `S` | `Simple_Case_Folding_Mapping` |
/// | `T` | `Turkic_Case_Folding_Mapping` |
///
/// `Case_Folding_*` thus describe the default full folding (C + F), and no two rows of one
/// codepoint ever write the same property.
pub(super) fn parse_case_folding(text: &str) -> Vec<Assignment<'_>> {
    let mut assignments = Vec::new();

    for line in text.lines() {
        let Some(fields) = data_fields(line) else {
            continue;
        };
        let [codepoint, status, mapping, ..] = fields[..] else {
            continue;
        };
        let Some(codepoint) = parse_codepoint(codepoint) else {
            continue;
        };
        if mapping.is_empty() {
            continue;
        }

        match status {
            "C" => {
                assignments.push(Assignment::single(codepoint, "Case_Folding_Status", status));
                assignments.push(Assignment::single(codepoint, "Case_Folding_Mapping", mapping));
                assignments.push(Assignment::single(
                    codepoint,
                    "Simple_Case_Folding_Mapping",
                    mapping,
                ));
            }
            "F" => {
                assignments.push(Assignment::single(codepoint, "Case_Folding_Status", status));
                assignments.push(Assignment::single(codepoint, "Case_Folding_Mapping", mapping));
            }
            "S" => {
                assignments.push(Assignment::single(
                    codepoint,
                    "Simple_Case_Folding_Mapping",
                    mapping,
                ));
            }
            "T" => {
                assignments.push(Assignment::single(
                    codepoint,
                    "Turkic_Case_Folding_Mapping",
                    mapping,
                ));
            }
            _ => {}
        }
    }

    assignments
}

/// Parses `SpecialCasing.txt`.
///
/// Rows are `CODE; LOWER; TITLE; UPPER; [CONDITIONS;]`. Rows with a condition list
/// (`Final_Sigma`, `tr After_I`, ...) only apply in context and are skipped, so the recorded
/// `Lowercase_Mapping`, `Titlecase_Mapping` and `Uppercase_Mapping` are the unconditional
/// full mappings.
pub(super) fn parse_special_casing(text: &str) -> Vec<Assignment<'_>> {
    let mut assignments = Vec::new();

    for line in text.lines() {
        let Some(fields) = data_fields(line) else {
            continue;
        };
        let [codepoint, lower, title, upper, ref rest @ ..] = fields[..] else {
            continue;
        };
        if rest.first().is_some_and(|conditions| !conditions.is_empty()) {
            continue;
        }
        let Some(codepoint) = parse_codepoint(codepoint) else {
            continue;
        };

        assignments.push(Assignment::single(codepoint, "Lowercase_Mapping", lower));
        assignments.push(Assignment::single(codepoint, "Titlecase_Mapping", title));
        assignments.push(Assignment::single(codepoint, "Uppercase_Mapping", upper));
    }

    assignments
}
