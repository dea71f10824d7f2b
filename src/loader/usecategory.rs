//! Derived `USE_Category` property.
//!
//! The Universal Shaping Engine classifies the characters of complex scripts into categories
//! such as `B` (base), `H` (halant) or `VPre` (pre-base vowel sign). The category is not part of
//! the UCD; it is computed from five UCD properties:
//!
//! | Input | Source | Default |
//! |---|---|---|
//! | `Indic_Syllabic_Category` | `IndicSyllabicCategory.txt` | `Other` |
//! | `Indic_Positional_Category` | `IndicPositionalCategory.txt` | `Not_Applicable` |
//! | `General_Category` | `UnicodeData.txt` | `Cn` |
//! | `Joining_Type` | `ArabicShaping.txt` | `X` |
//! | `Block` | `Blocks.txt` | `No_Block` |
//!
//! A fixed set of corrections is applied on top of the UCD data before classification, for
//! characters whose UCD properties do not match what shaping engines actually need.
//!
//! Only the UCD files above are read. The `IndicSyllabicCategory-Additional.txt` and
//! `IndicPositionalCategory-Additional.txt` override tables maintained alongside USE are not
//! applied, so for the codepoints they touch the category here can differ from the tables
//! shipped with shaping engines.

use std::{borrow::Cow, collections::BTreeSet};

use log::debug;

use crate::{
    loader::{Accumulator, PropertyLoader, SourceSet},
    ucd::{Assignment, UcdFile},
    Result,
};

const PROPERTY: &str = "USE_Category";

const DEPENDENCIES: &[UcdFile] = &[
    UcdFile::ArabicShaping,
    UcdFile::Blocks,
    UcdFile::IndicPositionalCategory,
    UcdFile::IndicSyllabicCategory,
    UcdFile::UnicodeData,
];

/// Blocks USE does not handle at all.
const EXCLUDED_BLOCKS: [&str; 3] = ["Samaritan", "Thai", "Lao"];

/// Characters USE classifies although the Indic data files leave them out.
const EXTRA_OTHER: &[(u32, u32)] = &[
    (0x0640, 0x0640),
    (0x07CA, 0x07EA),
    (0x07FA, 0x07FA),
    (0x0840, 0x0858),
    (0x1887, 0x18A8),
    (0x18AA, 0x18AA),
    (0x1B61, 0x1B61),
    (0x1B63, 0x1B67),
    (0x1B69, 0x1B6A),
    (0x2060, 0x2060),
    (0xA840, 0xA872),
    (0x10B80, 0x10B91),
    (0x10BA9, 0x10BAE),
    (0x10FB0, 0x10FB0),
    (0x10FB2, 0x10FB6),
    (0x10FB8, 0x10FBF),
    (0x10FC1, 0x10FC4),
    (0x10FC9, 0x10FCB),
];

const EXTRA_PLACEHOLDERS: &[u32] = &[
    0x1B5B, 0x1B5C, 0x1B5F, 0x1B62, 0x1B68, 0x111C8, 0x11C44, 0x11C45,
];

/// Classification inputs of one codepoint, after corrections.
#[derive(Debug, Clone, Copy)]
struct Inputs<'a> {
    codepoint: u32,
    syllabic: &'a str,
    positional: &'a str,
    general: &'a str,
    joining: &'a str,
}

type Predicate = fn(&Inputs<'_>) -> bool;

/// Categories in the order USE defines them. Exactly one predicate has to match.
const CATEGORIES: [(&str, Predicate); 24] = [
    ("B", is_base),
    ("IND", is_base_ind),
    ("N", |i: &Inputs<'_>| i.syllabic == "Brahmi_Joining_Number"),
    ("GB", is_base_other),
    ("F", is_cons_final),
    ("FM", |i: &Inputs<'_>| i.syllabic == "Syllable_Modifier"),
    ("M", is_cons_med),
    ("CM", is_cons_mod),
    ("SUB", |i: &Inputs<'_>| i.syllabic == "Consonant_Subjoined" && i.general != "Lo"),
    ("CS", |i: &Inputs<'_>| i.syllabic == "Consonant_With_Stacker"),
    ("H", is_halant),
    ("HVM", is_halant_or_vowel_modifier),
    ("HN", |i: &Inputs<'_>| i.syllabic == "Number_Joiner"),
    ("ZWNJ", |i: &Inputs<'_>| i.syllabic == "Non_Joiner"),
    ("ZWJ", is_zwj),
    ("WJ", is_word_joiner),
    ("O", is_other),
    ("Rsv", |i: &Inputs<'_>| i.general == "Cn"),
    ("R", |i: &Inputs<'_>| {
        matches!(i.syllabic, "Consonant_Preceding_Repha" | "Consonant_Prefixed")
    }),
    ("S", is_sym),
    ("Sk", is_sakot),
    ("SM", is_sym_mod),
    ("V", is_vowel),
    ("VM", is_vowel_mod),
];

fn is_base(i: &Inputs<'_>) -> bool {
    matches!(
        i.syllabic,
        "Number" | "Consonant" | "Consonant_Head_Letter" | "Tone_Letter" | "Vowel_Independent"
    ) || (matches!(i.joining, "C" | "D" | "L" | "R") && !is_zwj(i))
        || (i.general == "Lo"
            && matches!(
                i.syllabic,
                "Avagraha"
                    | "Bindu"
                    | "Consonant_Final"
                    | "Consonant_Medial"
                    | "Consonant_Subjoined"
                    | "Vowel"
                    | "Vowel_Dependent"
            ))
}

fn is_base_ind(i: &Inputs<'_>) -> bool {
    const NOT_IND: [u32; 17] = [
        0x0F04, 0x0F05, 0x0F06, 0x104B, 0x104E, 0x1800, 0x1807, 0x180A, 0x1B5B, 0x1B5C, 0x1B5F,
        0x2022, 0x111C8, 0x11A3F, 0x11A45, 0x11C44, 0x11C45,
    ];

    matches!(i.syllabic, "Consonant_Dead" | "Modifying_Letter")
        || (i.general == "Po" && !NOT_IND.contains(&i.codepoint))
}

fn is_base_other(i: &Inputs<'_>) -> bool {
    i.syllabic == "Consonant_Placeholder"
        || matches!(i.codepoint, 0x2015 | 0x2022 | 0x25FB..=0x25FE)
}

fn is_cons_final(i: &Inputs<'_>) -> bool {
    (i.syllabic == "Consonant_Final" && i.general != "Lo")
        || i.syllabic == "Consonant_Succeeding_Repha"
}

fn is_cons_med(i: &Inputs<'_>) -> bool {
    (i.syllabic == "Consonant_Medial" && i.general != "Lo")
        || i.syllabic == "Consonant_Initial_Postfixed"
}

fn is_cons_mod(i: &Inputs<'_>) -> bool {
    matches!(i.syllabic, "Nukta" | "Gemination_Mark" | "Consonant_Killer") && !is_sym_mod(i)
}

fn is_halant(i: &Inputs<'_>) -> bool {
    matches!(i.syllabic, "Virama" | "Invisible_Stacker")
        && !is_halant_or_vowel_modifier(i)
        && !is_sakot(i)
}

fn is_halant_or_vowel_modifier(i: &Inputs<'_>) -> bool {
    matches!(i.codepoint, 0x11046 | 0x1134D)
}

fn is_zwj(i: &Inputs<'_>) -> bool {
    i.syllabic == "Joiner"
}

fn is_word_joiner(i: &Inputs<'_>) -> bool {
    i.codepoint == 0x2060
}

fn is_other(i: &Inputs<'_>) -> bool {
    i.syllabic == "Other" && !is_base(i) && !is_sym(i) && !is_sym_mod(i) && !is_word_joiner(i)
}

fn is_sakot(i: &Inputs<'_>) -> bool {
    i.codepoint == 0x1A60
}

fn is_sym(i: &Inputs<'_>) -> bool {
    if matches!(i.codepoint, 0x25CC | 0x1E14F) {
        return false;
    }
    matches!(i.general, "So" | "Sc") && !matches!(i.codepoint, 0x0F01 | 0x1B62 | 0x1B68)
}

fn is_sym_mod(i: &Inputs<'_>) -> bool {
    matches!(i.codepoint, 0x1B6B..=0x1B73)
}

fn is_vowel(i: &Inputs<'_>) -> bool {
    i.syllabic == "Pure_Killer"
        || (i.general != "Lo"
            && matches!(i.syllabic, "Vowel" | "Vowel_Dependent")
            && i.codepoint != 0xAA29)
}

fn is_vowel_mod(i: &Inputs<'_>) -> bool {
    matches!(
        i.syllabic,
        "Tone_Mark" | "Cantillation_Mark" | "Register_Shifter" | "Visarga"
    ) || (i.general != "Lo" && (i.syllabic == "Bindu" || i.codepoint == 0xAA29))
}

type Positions = &'static [(&'static str, &'static [&'static str])];

/// Position suffixes for the categories that take one, keyed by positional category.
fn positions(category: &str) -> Option<Positions> {
    let positions: Positions = match category {
        "F" => &[("Abv", &["Top"]), ("Blw", &["Bottom"]), ("Pst", &["Right"])],
        "M" => &[
            ("Abv", &["Top"]),
            ("Blw", &["Bottom", "Bottom_And_Left", "Bottom_And_Right"]),
            ("Pst", &["Right"]),
            ("Pre", &["Left", "Top_And_Bottom_And_Left"]),
        ],
        "CM" => &[("Abv", &["Top"]), ("Blw", &["Bottom", "Overstruck"])],
        "V" => &[
            (
                "Abv",
                &["Top", "Top_And_Bottom", "Top_And_Bottom_And_Right", "Top_And_Right"],
            ),
            ("Blw", &["Bottom", "Overstruck", "Bottom_And_Right"]),
            ("Pst", &["Right"]),
            (
                "Pre",
                &["Left", "Top_And_Left", "Top_And_Left_And_Right", "Left_And_Right"],
            ),
        ],
        "VM" => &[
            ("Abv", &["Top"]),
            ("Blw", &["Bottom", "Overstruck"]),
            ("Pst", &["Right"]),
            ("Pre", &["Left"]),
        ],
        "SM" => &[("Abv", &["Top"]), ("Blw", &["Bottom"])],
        "FM" => &[
            ("Abv", &["Top"]),
            ("Blw", &["Bottom"]),
            ("Pst", &["Not_Applicable"]),
        ],
        _ => return None,
    };
    Some(positions)
}

/// Corrections to the syllabic category, and in one case the positional category.
fn correct_syllabic<'a>(codepoint: u32, syllabic: &'a str, positional: &'a str) -> (&'a str, &'a str) {
    match codepoint {
        0x1CE2..=0x1CE8 => ("Cantillation_Mark", positional),
        0x0F18..=0x0F19 | 0x0F3E..=0x0F3F => ("Vowel_Dependent", positional),
        0x1BF2..=0x1BF3 => ("Nukta", "Bottom"),
        0x1CED => ("Tone_Mark", positional),
        0xA982 => ("Consonant_Succeeding_Repha", positional),
        _ => (syllabic, positional),
    }
}

/// Corrections to the positional category, applied after classification.
fn correct_positional(codepoint: u32, positional: &str) -> &str {
    match codepoint {
        0x0953..=0x0954 => "Not_Applicable",
        0xA926..=0xA92A
        | 0x11302
        | 0x11303
        | 0x114C1
        | 0x1CF8..=0x1CF9
        | 0x1112A..=0x1112B
        | 0x11131..=0x11132 => "Top",
        _ => positional,
    }
}

/// Computes the USE category of one codepoint, `None` if the classification is ambiguous.
fn classify(inputs: &Inputs<'_>) -> Option<Cow<'static, str>> {
    let matched: Vec<&'static str> = CATEGORIES
        .iter()
        .filter(|(_, predicate)| predicate(inputs))
        .map(|(category, _)| *category)
        .collect();

    let [category] = matched[..] else {
        debug!(
            "No unique USE category for U+{:04X} ({inputs:?}), candidates {matched:?}",
            inputs.codepoint
        );
        return None;
    };

    let positional = correct_positional(inputs.codepoint, inputs.positional);
    let suffix = positions(category).and_then(|positions| {
        positions
            .iter()
            .find(|(_, categories)| categories.contains(&positional))
            .map(|(suffix, _)| *suffix)
    });

    Some(match suffix {
        Some(suffix) => Cow::Owned(format!("{category}{suffix}")),
        None => Cow::Borrowed(category),
    })
}

/// Derives `USE_Category` from the Indic, general, joining and block properties.
pub(crate) struct UseCategoryLoader;

impl UseCategoryLoader {
    fn syllabic_override(codepoint: u32) -> Option<&'static str> {
        if EXTRA_PLACEHOLDERS.contains(&codepoint) {
            return Some("Consonant_Placeholder");
        }
        EXTRA_OTHER
            .iter()
            .any(|(start, end)| (*start..=*end).contains(&codepoint))
            .then_some("Other")
    }
}

impl PropertyLoader for UseCategoryLoader {
    fn load<'a>(
        &self,
        _sources: &SourceSet<'a>,
        accumulator: &Accumulator,
    ) -> Result<Vec<Assignment<'a>>> {
        let mut candidates: BTreeSet<u32> = BTreeSet::new();
        candidates.extend(accumulator.codepoints_with("Indic_Syllabic_Category"));
        candidates.extend(accumulator.codepoints_with("Indic_Positional_Category"));
        candidates.extend(EXTRA_PLACEHOLDERS);
        for (start, end) in EXTRA_OTHER {
            candidates.extend(*start..=*end);
        }

        let mut assignments = Vec::new();
        for codepoint in candidates {
            let block = accumulator.value(codepoint, "Block").unwrap_or("No_Block");
            if EXCLUDED_BLOCKS.contains(&block) {
                continue;
            }
            let general = accumulator
                .value(codepoint, "General_Category")
                .unwrap_or("Cn");
            if general == "Cn" || (0xFE00..=0xFE0F).contains(&codepoint) {
                continue;
            }

            let syllabic = Self::syllabic_override(codepoint)
                .or_else(|| accumulator.value(codepoint, "Indic_Syllabic_Category"))
                .unwrap_or("Other");
            let positional = accumulator
                .value(codepoint, "Indic_Positional_Category")
                .unwrap_or("Not_Applicable");
            let (syllabic, positional) = correct_syllabic(codepoint, syllabic, positional);

            let inputs = Inputs {
                codepoint,
                syllabic,
                positional,
                general,
                joining: accumulator.value(codepoint, "Joining_Type").unwrap_or("X"),
            };

            if let Some(category) = classify(&inputs) {
                assignments.push(Assignment::single(codepoint, PROPERTY, category));
            }
        }

        debug!("Derived {PROPERTY} for {} codepoints", assignments.len());
        Ok(assignments)
    }

    fn source(&self) -> Option<UcdFile> {
        None
    }

    fn dependencies(&self) -> &'static [UcdFile] {
        DEPENDENCIES
    }

    fn name(&self) -> &'static str {
        PROPERTY
    }
}
