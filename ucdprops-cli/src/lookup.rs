use anyhow::Context;
use serde::Serialize;
use ucdprops::{
    cache::{Cache, Config},
    PropertyRecord,
};

use crate::{
    app::{CacheOptions, GlobalOptions},
    output::{print_output, TabWriter},
};

#[derive(Debug, Serialize)]
pub struct CharacterData {
    pub character: String,
    pub codepoint: String,
    pub decimal: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unicode_version: Option<String>,
    pub properties: PropertyRecord,
}

/// Build the cache configuration from the command line flags.
pub fn cache_config(opts: &CacheOptions) -> Config {
    let config = match &opts.cache_dir {
        Some(dir) => Config::with_cache_dir(dir),
        None => Config::default(),
    };

    config
        .with_offline(opts.offline)
        .with_force_refresh(opts.force_download)
}

/// Surrogates and other non-scalar values are shown as the replacement character.
fn display_char(codepoint: u32) -> char {
    char::from_u32(codepoint).unwrap_or(char::REPLACEMENT_CHARACTER)
}

pub fn run(codepoint: u32, cache: &CacheOptions, opts: &GlobalOptions) -> anyhow::Result<()> {
    let config = cache_config(cache);
    let cache_dir = config.cache_dir.clone();
    let index = Cache::new(config)
        .load()
        .with_context(|| format!("failed to load UCD cache at {}", cache_dir.display()))?;

    let data = CharacterData {
        character: display_char(codepoint).to_string(),
        codepoint: format!("U+{codepoint:04X}"),
        decimal: codepoint,
        unicode_version: index.unicode_version().map(str::to_string),
        properties: index.lookup(codepoint),
    };

    print_output(&data, opts, |data| {
        println!(
            "Character data for '{}' ({}, {})",
            data.character, data.codepoint, data.decimal
        );

        let mut table = TabWriter::new(2);
        for (property, value) in &data.properties {
            let label = property.replace('_', " ");
            table.row(vec![format!("{label:40}"), value.clone()]);
        }
        table.print();
    })
}
