//! Parsers for range-keyed files.
//!
//! Most UCD property files share one line grammar:
//!
//! ```text
//! 0780..07A5    ; Thaana # Lo  [38] THAANA LETTER HAA..THAANA LETTER WAAVU
//! 07B1          ; Thaana # Lo       THAANA LETTER NAA
//! ```
//!
//! Single-property files (`Scripts.txt`, `Blocks.txt`, `LineBreak.txt`, ...) carry the value
//! in the second field. Composite files (`PropList.txt`, `DerivedCoreProperties.txt`,
//! `emoji-data.txt`) carry a property *name* there instead, optionally followed by a value.

use super::{data_fields, parse_range, Assignment};

/// Parses a file of `RANGE ; VALUE` lines, all defining `property`.
///
/// A line must consist of exactly two non-empty fields; anything else is skipped. Upstream
/// files occasionally contain prose that survives comment stripping, and `@missing` defaults
/// live inside comments, so neither reaches this point.
pub(super) fn parse_ranges<'a>(text: &'a str, property: &'a str) -> Vec<Assignment<'a>> {
    let mut assignments = Vec::new();

    for line in text.lines() {
        let Some(fields) = data_fields(line) else {
            continue;
        };
        let [range, value] = fields[..] else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let Some(range) = parse_range(range) else {
            continue;
        };

        assignments.push(Assignment::range(range, property, value));
    }

    assignments
}

/// Parses a composite file of `RANGE ; Property_Name [; VALUE]` lines.
///
/// Binary properties have no value field and are recorded as `Y`.
pub(super) fn parse_flags(text: &str) -> Vec<Assignment<'_>> {
    let mut assignments = Vec::new();

    for line in text.lines() {
        let Some(fields) = data_fields(line) else {
            continue;
        };
        let (range, property, value) = match fields[..] {
            [range, property] => (range, property, "Y"),
            [range, property, value] => (range, property, value),
            _ => continue,
        };
        if property.is_empty() || value.is_empty() {
            continue;
        }
        let Some(range) = parse_range(range) else {
            continue;
        };

        assignments.push(Assignment::range(range, property, value));
    }

    assignments
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPTS: &str = "\
# Scripts-16.0.0.txt
# Date: 2024-04-30, 21:48:40 GMT

# ================================================

0780..07A5    ; Thaana # Lo  [38] THAANA LETTER HAA..THAANA LETTER WAAVU
07A6..07B0    ; Thaana # Mn  [11] THAANA ABAFILI..THAANA SUKUN
07b1          ; Thaana # Lo       THAANA LETTER NAA

# Total code points: 50
";

    #[test]
    fn test_parse_ranges() {
        let assignments = parse_ranges(SCRIPTS, "Script");
        assert_eq!(assignments.len(), 3);
        assert_eq!(assignments[0].range, 0x0780..=0x07A5);
        assert_eq!(assignments[1].range, 0x07A6..=0x07B0);
        assert_eq!(assignments[2].range, 0x07B1..=0x07B1);
        assert!(assignments
            .iter()
            .all(|a| a.property == "Script" && a.value == "Thaana"));
    }

    #[test]
    fn test_parse_ranges_skips_noise() {
        let text = "\
0041..005A
0041..005A ; Latin ; Extra
ZZZZ ; Latin
005A..0041 ; Latin
0041 ;
Some prose; that looks like data
0061..007A ; Latin
";
        let assignments = parse_ranges(text, "Script");
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].range, 0x0061..=0x007A);
    }

    #[test]
    fn test_parse_ranges_multi_word_values() {
        let assignments = parse_ranges("0100..017F; Latin Extended-A\n", "Block");
        assert_eq!(assignments[0].value, "Latin Extended-A");

        let assignments = parse_ranges("0951 ; Beng Deva Gran # Mn\n", "Script_Extensions");
        assert_eq!(assignments[0].value, "Beng Deva Gran");
    }

    #[test]
    fn test_parse_flags() {
        let text = "\
0009..000D    ; White_Space # Cc   [5] <control-0009>..<control-000D>
0020          ; White_Space # Zs       SPACE
0300..034E    ; InCB; Extend # Mn  [79] COMBINING GRAVE ACCENT..COMBINING UPWARDS ARROW BELOW
1F600         ; Emoji_Presentation # E1.0 [1] (😀) grinning face
";
        let assignments = parse_flags(text);
        assert_eq!(assignments.len(), 4);
        assert_eq!(assignments[0].property, "White_Space");
        assert_eq!(assignments[0].value, "Y");
        assert_eq!(assignments[2].property, "InCB");
        assert_eq!(assignments[2].value, "Extend");
        assert_eq!(assignments[3].range, 0x1F600..=0x1F600);
    }
}
