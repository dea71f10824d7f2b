use std::path::PathBuf;

use clap::Parser;

/// ucdprops - look up Unicode Character Database properties of a character
#[derive(Debug, Parser)]
#[command(name = "ucdprops", version, about, long_about = None)]
pub struct Cli {
    /// The character to look up: the character itself, or its codepoint in hex
    /// (`U+078A`, `0x78a`, `78A`).
    #[arg(value_name = "CHAR", value_parser = parse_codepoint)]
    pub codepoint: u32,

    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(flatten)]
    pub cache: CacheOptions,
}

/// Options controlling the output.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Options controlling the UCD cache.
#[derive(Debug, Parser)]
pub struct CacheOptions {
    /// Download the UCD files again even if the cache is current.
    #[arg(long)]
    pub force_download: bool,

    /// Only use files already in the cache; never touch the network.
    #[arg(long, conflicts_with = "force_download")]
    pub offline: bool,

    /// Cache directory (default: the per-user cache directory).
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Parse a command line character argument into a codepoint.
///
/// A single character stands for itself. Anything longer is a hexadecimal codepoint, with an
/// optional `U+` or `0x` prefix.
pub fn parse_codepoint(input: &str) -> Result<u32, String> {
    let mut chars = input.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(u32::from(c));
    }

    let digits = ["U+", "u+", "0x", "0X"]
        .iter()
        .find_map(|prefix| input.strip_prefix(prefix))
        .unwrap_or(input);

    if digits.is_empty() {
        return Err(format!("'{input}' is not a character or a hex codepoint"));
    }

    let codepoint = u32::from_str_radix(digits, 16)
        .map_err(|_| format!("'{input}' is not a character or a hex codepoint"))?;

    if codepoint > 0x10_FFFF {
        return Err(format!(
            "U+{codepoint:04X} is outside the Unicode codespace (max U+10FFFF)"
        ));
    }

    Ok(codepoint)
}
