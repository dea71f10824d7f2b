//! Parsers for codepoint-keyed files with positional fields.

use std::{borrow::Cow, collections::BTreeMap};

use super::{data_fields, parse_codepoint, parse_range, Assignment};

/// Parses `CODEPOINT ; FIELD ; FIELD ...` lines.
///
/// Field `i` (after the codepoint) is recorded under `properties[i]`; `None` entries and
/// fields beyond the end of `properties` are ignored. Values are kept verbatim, including
/// empty ones: `Jamo.txt` legitimately gives U+110B an empty short name.
pub(super) fn parse_fields<'a>(
    text: &'a str,
    properties: &'static [Option<&'static str>],
) -> Vec<Assignment<'a>> {
    let mut assignments = Vec::new();

    for line in text.lines() {
        let Some(fields) = data_fields(line) else {
            continue;
        };
        if fields.len() < 2 {
            continue;
        }
        let Some(range) = parse_range(fields[0]) else {
            continue;
        };

        for (property, value) in properties.iter().zip(&fields[1..]) {
            if let Some(property) = property {
                assignments.push(Assignment::range(range.clone(), property, *value));
            }
        }
    }

    assignments
}

/// Parses `NameAliases.txt`.
///
/// A codepoint can have several aliases (a correction and an abbreviation, say), each on its
/// own row. All of them are kept, joined with `", "` in file order, as `Name_Alias`.
pub(super) fn parse_name_aliases(text: &str) -> Vec<Assignment<'_>> {
    let mut aliases: BTreeMap<u32, Vec<&str>> = BTreeMap::new();

    for line in text.lines() {
        let Some(fields) = data_fields(line) else {
            continue;
        };
        let [codepoint, alias, ..] = fields[..] else {
            continue;
        };
        let Some(codepoint) = parse_codepoint(codepoint) else {
            continue;
        };
        if alias.is_empty() {
            continue;
        }

        aliases.entry(codepoint).or_default().push(alias);
    }

    aliases
        .into_iter()
        .map(|(codepoint, names)| {
            let value = match names.as_slice() {
                [single] => Cow::Borrowed(*single),
                _ => Cow::Owned(names.join(", ")),
            };
            Assignment::single(codepoint, "Name_Alias", value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields_positional() {
        let text = "\
# ArabicShaping-16.0.0.txt
0600; ARABIC NUMBER SIGN; U; No_Joining_Group
0620; YEH WITH RING; D; YEH
0640; TATWEEL; C; No_Joining_Group
";
        let properties: &'static [Option<&'static str>] =
            &[None, Some("Joining_Type"), Some("Joining_Group")];
        let assignments = parse_fields(text, properties);

        assert_eq!(assignments.len(), 6);
        assert_eq!(assignments[2].range, 0x0620..=0x0620);
        assert_eq!(assignments[2].property, "Joining_Type");
        assert_eq!(assignments[2].value, "D");
        assert_eq!(assignments[3].property, "Joining_Group");
        assert_eq!(assignments[3].value, "YEH");
        assert!(assignments.iter().all(|a| a.value != "TATWEEL"));
    }

    #[test]
    fn test_parse_fields_keeps_empty_values() {
        let text = "\
1100; G     # HANGUL CHOSEONG KIYEOK
110B;       # HANGUL CHOSEONG IEUNG
";
        let assignments = parse_fields(text, &[Some("Jamo_Short_Name")]);
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].value, "G");
        assert_eq!(assignments[1].range, 0x110B..=0x110B);
        assert_eq!(assignments[1].value, "");
    }

    #[test]
    fn test_parse_fields_short_rows() {
        let text = "0028; 0029; o # LEFT PARENTHESIS\n0029\nXYZW; 0028; c\n";
        let assignments = parse_fields(
            text,
            &[Some("Bidi_Paired_Bracket"), Some("Bidi_Paired_Bracket_Type")],
        );
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[1].value, "o");
    }

    #[test]
    fn test_parse_name_aliases() {
        let text = "\
# NameAliases-16.0.0.txt
0000;NULL;control
0000;NUL;abbreviation
01A2;LATIN CAPITAL LETTER GHA;correction
";
        let assignments = parse_name_aliases(text);
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].range, 0..=0);
        assert_eq!(assignments[0].property, "Name_Alias");
        assert_eq!(assignments[0].value, "NULL, NUL");
        assert_eq!(assignments[1].value, "LATIN CAPITAL LETTER GHA");
        assert!(matches!(assignments[1].value, Cow::Borrowed(_)));
    }
}
