//! UCD source files and the strategies that parse them.
//!
//! The Unicode Character Database is a collection of text files that all look alike at a
//! glance (semicolon separated fields, `#` comments) but differ in what the fields mean. This
//! module names every file the crate consumes ([`UcdFile`]), assigns each one a parsing
//! strategy ([`Format`]) through a static table, and exposes a single entry point,
//! [`parse`], which turns raw text into a flat list of [`Assignment`]s.
//!
//! # Strategies
//!
//! - [`Format::Ranges`] - `RANGE ; VALUE` files defining one property (`Scripts.txt`, ...)
//! - [`Format::Flags`] - `RANGE ; Property [; VALUE]` composite files (`PropList.txt`, ...)
//! - [`Format::Fields`] - codepoint keyed files with positional fields (`Jamo.txt`, ...)
//! - [`Format::CaseFolding`] - `CaseFolding.txt`, rows selected by status
//! - [`Format::SpecialCasing`] - `SpecialCasing.txt`, unconditional rows only
//! - [`Format::NameAliases`] - `NameAliases.txt`, several rows per codepoint
//! - [`Format::UnicodeData`] - `UnicodeData.txt` with its `First>`/`Last>` range pairs
//!
//! Parsing never touches the property index. Folding assignments into the index, and
//! enforcing which file owns which property name, is the job of [`crate::loader`].
//!
//! # Examples
//!
//! ```rust
//! use ucdprops::ucd::{parse, UcdFile};
//!
//! let assignments = parse(UcdFile::Blocks, "0780..07BF; Thaana\n")?;
//! assert_eq!(assignments.len(), 1);
//! assert_eq!(assignments[0].range, 0x0780..=0x07BF);
//! assert_eq!(assignments[0].property, "Block");
//! assert_eq!(assignments[0].value, "Thaana");
//! # Ok::<(), ucdprops::Error>(())
//! ```
mod casing;
mod fields;
mod ranges;
mod unicodedata;

use std::{borrow::Cow, ops::RangeInclusive};

use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Highest valid Unicode codepoint.
pub const MAX_CODEPOINT: u32 = 0x10FFFF;

/// A property value asserted over an inclusive range of codepoints.
///
/// Single codepoints are ranges of length one. `property` and `value` usually borrow from the
/// source text; values that have to be synthesized (joined aliases, range labels) are owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<'a> {
    /// Codepoints the value applies to, inclusive on both ends
    pub range: RangeInclusive<u32>,
    /// UCD property name, e.g. `Script`
    pub property: &'a str,
    /// Property value, e.g. `Thaana`
    pub value: Cow<'a, str>,
}

impl<'a> Assignment<'a> {
    /// Creates an assignment for a single codepoint.
    pub fn single(codepoint: u32, property: &'a str, value: impl Into<Cow<'a, str>>) -> Self {
        Assignment {
            range: codepoint..=codepoint,
            property,
            value: value.into(),
        }
    }

    /// Creates an assignment for an inclusive range.
    pub fn range(
        range: RangeInclusive<u32>,
        property: &'a str,
        value: impl Into<Cow<'a, str>>,
    ) -> Self {
        Assignment {
            range,
            property,
            value: value.into(),
        }
    }
}

/// Every UCD file this crate knows how to consume.
///
/// The display form is the file name as it appears in the UCD distribution (and in the local
/// cache directory), so `UcdFile::from_str("Scripts.txt")` resolves a name back to the file.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    EnumCount,
    IntoStaticStr,
)]
pub enum UcdFile {
    /// Joining type and group for Arabic-style scripts
    #[strum(to_string = "ArabicShaping.txt")]
    ArabicShaping,
    /// Paired bracket mappings
    #[strum(to_string = "BidiBrackets.txt")]
    BidiBrackets,
    /// Mirrored glyph mappings
    #[strum(to_string = "BidiMirroring.txt")]
    BidiMirroring,
    /// Block names
    #[strum(to_string = "Blocks.txt")]
    Blocks,
    /// Case folding mappings
    #[strum(to_string = "CaseFolding.txt")]
    CaseFolding,
    /// Version of first assignment
    #[strum(to_string = "DerivedAge.txt")]
    DerivedAge,
    /// Derived binary properties (`Alphabetic`, `Math`, ...) and `InCB`
    #[strum(to_string = "DerivedCoreProperties.txt")]
    DerivedCoreProperties,
    /// East Asian width
    #[strum(to_string = "EastAsianWidth.txt")]
    EastAsianWidth,
    /// Emoji binary properties
    #[strum(to_string = "emoji-data.txt")]
    EmojiData,
    /// Grapheme cluster break classes
    #[strum(to_string = "GraphemeBreakProperty.txt")]
    GraphemeBreakProperty,
    /// Hangul syllable types
    #[strum(to_string = "HangulSyllableType.txt")]
    HangulSyllableType,
    /// Indic positional categories
    #[strum(to_string = "IndicPositionalCategory.txt")]
    IndicPositionalCategory,
    /// Indic syllabic categories
    #[strum(to_string = "IndicSyllabicCategory.txt")]
    IndicSyllabicCategory,
    /// Jamo short names
    #[strum(to_string = "Jamo.txt")]
    Jamo,
    /// Line break classes
    #[strum(to_string = "LineBreak.txt")]
    LineBreak,
    /// Formal name aliases
    #[strum(to_string = "NameAliases.txt")]
    NameAliases,
    /// Contributory binary properties (`White_Space`, `Dash`, ...)
    #[strum(to_string = "PropList.txt")]
    PropList,
    /// Script extensions
    #[strum(to_string = "ScriptExtensions.txt")]
    ScriptExtensions,
    /// Scripts
    #[strum(to_string = "Scripts.txt")]
    Scripts,
    /// Sentence break classes
    #[strum(to_string = "SentenceBreakProperty.txt")]
    SentenceBreakProperty,
    /// Full (unconditional) case mappings
    #[strum(to_string = "SpecialCasing.txt")]
    SpecialCasing,
    /// The main character table
    #[strum(to_string = "UnicodeData.txt")]
    UnicodeData,
    /// Word break classes
    #[strum(to_string = "WordBreakProperty.txt")]
    WordBreakProperty,
}

impl UcdFile {
    /// The file name, e.g. `Scripts.txt`.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Path of the file relative to the root of the UCD distribution.
    #[must_use]
    pub fn remote_path(self) -> String {
        match self {
            UcdFile::GraphemeBreakProperty
            | UcdFile::SentenceBreakProperty
            | UcdFile::WordBreakProperty => format!("auxiliary/{}", self.name()),
            UcdFile::EmojiData => format!("emoji/{}", self.name()),
            _ => self.name().to_string(),
        }
    }

    /// The parsing strategy for this file.
    #[must_use]
    pub fn format(self) -> Format {
        match self {
            UcdFile::ArabicShaping => {
                Format::Fields(&[None, Some("Joining_Type"), Some("Joining_Group")])
            }
            UcdFile::BidiBrackets => Format::Fields(&[
                Some("Bidi_Paired_Bracket"),
                Some("Bidi_Paired_Bracket_Type"),
            ]),
            UcdFile::BidiMirroring => Format::Fields(&[Some("Bidi_Mirroring_Glyph")]),
            UcdFile::Blocks => Format::Ranges("Block"),
            UcdFile::CaseFolding => Format::CaseFolding,
            UcdFile::DerivedAge => Format::Ranges("Age"),
            UcdFile::DerivedCoreProperties | UcdFile::EmojiData | UcdFile::PropList => {
                Format::Flags
            }
            UcdFile::EastAsianWidth => Format::Ranges("East_Asian_Width"),
            UcdFile::GraphemeBreakProperty => Format::Ranges("Grapheme_Cluster_Break"),
            UcdFile::HangulSyllableType => Format::Ranges("Hangul_Syllable_Type"),
            UcdFile::IndicPositionalCategory => Format::Ranges("Indic_Positional_Category"),
            UcdFile::IndicSyllabicCategory => Format::Ranges("Indic_Syllabic_Category"),
            UcdFile::Jamo => Format::Fields(&[Some("Jamo_Short_Name")]),
            UcdFile::LineBreak => Format::Ranges("Line_Break"),
            UcdFile::NameAliases => Format::NameAliases,
            UcdFile::ScriptExtensions => Format::Ranges("Script_Extensions"),
            UcdFile::Scripts => Format::Ranges("Script"),
            UcdFile::SentenceBreakProperty => Format::Ranges("Sentence_Break"),
            UcdFile::SpecialCasing => Format::SpecialCasing,
            UcdFile::UnicodeData => Format::UnicodeData,
            UcdFile::WordBreakProperty => Format::Ranges("Word_Break"),
        }
    }

    /// Resolves a file name to a [`UcdFile`].
    ///
    /// # Errors
    /// Returns [`Error::UnrecognizedFormat`] if no parsing strategy handles `name`.
    pub fn from_name(name: &str) -> Result<UcdFile> {
        name.parse()
            .map_err(|_| Error::UnrecognizedFormat(name.to_string()))
    }
}

/// The structural family of a UCD file, which decides how it is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `RANGE ; VALUE` lines defining the single named property.
    Ranges(&'static str),
    /// `RANGE ; Property_Name [; VALUE]` lines; binary properties get the value `Y`.
    Flags,
    /// `CODEPOINT ; FIELD ; FIELD ...` lines; fields map positionally onto the names, `None`
    /// skips a field.
    Fields(&'static [Option<&'static str>]),
    /// `CaseFolding.txt`, rows selected by their status flag.
    CaseFolding,
    /// `SpecialCasing.txt`, conditional rows ignored.
    SpecialCasing,
    /// `NameAliases.txt`, all aliases of a codepoint joined.
    NameAliases,
    /// `UnicodeData.txt`, with `First>`/`Last>` range reconstruction.
    UnicodeData,
}

/// Parses the text of one UCD file into property assignments.
///
/// Lines that do not look like data (headers, prose, damaged rows) are skipped. Only
/// violations of a file's structural contract are errors.
///
/// # Errors
/// Returns [`Error::Structural`] if `UnicodeData.txt` contains an unmatched `First>` or
/// `Last>` row.
pub fn parse(file: UcdFile, text: &str) -> Result<Vec<Assignment<'_>>> {
    let assignments = match file.format() {
        Format::Ranges(property) => ranges::parse_ranges(text, property),
        Format::Flags => ranges::parse_flags(text),
        Format::Fields(properties) => fields::parse_fields(text, properties),
        Format::CaseFolding => casing::parse_case_folding(text),
        Format::SpecialCasing => casing::parse_special_casing(text),
        Format::NameAliases => fields::parse_name_aliases(text),
        Format::UnicodeData => unicodedata::parse_unicode_data(file.name(), text)?,
    };

    Ok(assignments)
}

/// Reads the Unicode version from the header line UCD files start with.
///
/// ```rust
/// use ucdprops::ucd::unicode_version;
///
/// assert_eq!(unicode_version("# DerivedAge-16.0.0.txt\n# Date: ..."), Some("16.0.0".to_string()));
/// assert_eq!(unicode_version("0041;LATIN CAPITAL LETTER A;Lu;0;L;;;;;N;;;;0061;"), None);
/// ```
#[must_use]
pub fn unicode_version(text: &str) -> Option<String> {
    let header = text.lines().next()?.trim().strip_prefix('#')?.trim();
    let (_, version) = header.strip_suffix(".txt")?.rsplit_once('-')?;

    let valid = !version.is_empty()
        && version.split('.').all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
    valid.then(|| version.to_string())
}

/// Strips a trailing `# comment` from a line.
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    }
}

/// Splits a data line into trimmed `;`-separated fields.
///
/// Returns `None` for blank and comment-only lines.
fn data_fields(line: &str) -> Option<Vec<&str>> {
    let data = strip_comment(line).trim();
    if data.is_empty() {
        return None;
    }

    Some(data.split(';').map(str::trim).collect())
}

/// Parses a 4 to 6 digit hexadecimal codepoint.
pub(crate) fn parse_codepoint(text: &str) -> Option<u32> {
    if !(4..=6).contains(&text.len()) || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    u32::from_str_radix(text, 16)
        .ok()
        .filter(|codepoint| *codepoint <= MAX_CODEPOINT)
}

/// Parses `XXXX` or `XXXX..YYYY` into an inclusive range.
pub(crate) fn parse_range(text: &str) -> Option<RangeInclusive<u32>> {
    let text = text.trim();
    let (start, end) = match text.split_once("..") {
        Some((start, end)) => (parse_codepoint(start)?, parse_codepoint(end)?),
        None => {
            let codepoint = parse_codepoint(text)?;
            (codepoint, codepoint)
        }
    };

    if start > end {
        return None;
    }

    Some(start..=end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_parse_codepoint() {
        assert_eq!(parse_codepoint("0041"), Some(0x41));
        assert_eq!(parse_codepoint("1f600"), Some(0x1F600));
        assert_eq!(parse_codepoint("10FFFF"), Some(0x10FFFF));
        assert_eq!(parse_codepoint("110000"), None);
        assert_eq!(parse_codepoint("041"), None);
        assert_eq!(parse_codepoint("0041G"), None);
        assert_eq!(parse_codepoint("+041"), None);
        assert_eq!(parse_codepoint("Code"), None);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("0780..07BF"), Some(0x0780..=0x07BF));
        assert_eq!(parse_range(" 078A "), Some(0x078A..=0x078A));
        assert_eq!(parse_range("07BF..0780"), None);
        assert_eq!(parse_range("0780.."), None);
    }

    #[test]
    fn test_file_names_round_trip() {
        for file in UcdFile::iter() {
            assert_eq!(UcdFile::from_str(file.name()).unwrap(), file);
            assert_eq!(file.to_string(), file.name());
            assert!(file.remote_path().ends_with(file.name()));
        }
        assert_eq!(
            UcdFile::EmojiData.remote_path(),
            "emoji/emoji-data.txt".to_string()
        );
    }

    #[test]
    fn test_unrecognized_file() {
        match UcdFile::from_name("Unihan_Readings.txt") {
            Err(Error::UnrecognizedFormat(name)) => assert_eq!(name, "Unihan_Readings.txt"),
            other => panic!("expected UnrecognizedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_unicode_version() {
        assert_eq!(
            unicode_version("# Scripts-15.1.0.txt\n"),
            Some("15.1.0".to_string())
        );
        assert_eq!(unicode_version("# emoji-data.txt\n"), None);
        assert_eq!(unicode_version("# DerivedAge-.txt\n"), None);
        assert_eq!(unicode_version(""), None);
    }

    #[test]
    fn test_dispatch() {
        let assignments = parse(UcdFile::Scripts, "0780..07A5    ; Thaana # Lo\n").unwrap();
        assert_eq!(assignments[0].property, "Script");

        let assignments = parse(UcdFile::BidiMirroring, "0028; 0029 # LEFT PARENTHESIS\n").unwrap();
        assert_eq!(assignments[0].property, "Bidi_Mirroring_Glyph");
        assert_eq!(assignments[0].value, "0029");
    }
}
