//! The mutable per-codepoint table loaders fold into.
//!
//! Property names and values are interned into string tables as they arrive; each codepoint
//! holds a short list of `(name id, value id)` pairs. Ownership of property names is tracked
//! here as well: the first loader to write a name owns it, any other loader writing it later
//! is a configuration error.

use std::collections::HashMap;

use crate::{
    index::{PropertyIndex, Run},
    ucd::{Assignment, MAX_CODEPOINT},
    Error, Result,
};

/// Interned `(property, value)` pairs of one codepoint.
type Entries = Vec<(u16, u32)>;

/// Accumulates assignments from all loaders until it is finalized into a [`PropertyIndex`].
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    names: Vec<String>,
    name_ids: HashMap<String, u16>,
    /// Owning loader, indexed by name id
    owners: Vec<&'static str>,
    values: Vec<String>,
    value_ids: HashMap<String, u32>,
    /// Indexed by codepoint, grown on demand
    records: Vec<Entries>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds the output of the loader `owner` into the table.
    ///
    /// Within one loader a later assignment replaces an earlier one for the same codepoint
    /// and property.
    ///
    /// # Errors
    /// Returns [`Error::PropertyCollision`] if a property name is already owned by a different
    /// loader, and [`Error::Malformed`] if the intern tables overflow.
    pub fn fold(&mut self, owner: &'static str, assignments: Vec<Assignment<'_>>) -> Result<()> {
        for assignment in assignments {
            if *assignment.range.end() > MAX_CODEPOINT {
                continue;
            }

            let name = self.claim(assignment.property, owner)?;
            let value = self.intern_value(&assignment.value)?;
            self.assign(assignment.range, name, value);
        }

        Ok(())
    }

    fn claim(&mut self, property: &str, owner: &'static str) -> Result<u16> {
        if let Some(&id) = self.name_ids.get(property) {
            let current = self.owners[usize::from(id)];
            if current != owner {
                return Err(Error::PropertyCollision {
                    property: property.to_string(),
                    owner: current,
                    intruder: owner,
                });
            }
            return Ok(id);
        }

        let id = u16::try_from(self.names.len())
            .map_err(|_| malformed_error!("More than {} property names", u16::MAX))?;
        self.names.push(property.to_string());
        self.name_ids.insert(property.to_string(), id);
        self.owners.push(owner);
        Ok(id)
    }

    fn intern_value(&mut self, value: &str) -> Result<u32> {
        if let Some(&id) = self.value_ids.get(value) {
            return Ok(id);
        }

        let id = u32::try_from(self.values.len())
            .map_err(|_| malformed_error!("More than {} property values", u32::MAX))?;
        self.values.push(value.to_string());
        self.value_ids.insert(value.to_string(), id);
        Ok(id)
    }

    fn assign(&mut self, range: std::ops::RangeInclusive<u32>, name: u16, value: u32) {
        let (start, end) = (*range.start() as usize, *range.end() as usize);
        if self.records.len() <= end {
            self.records.resize_with(end + 1, Vec::new);
        }

        for entries in &mut self.records[start..=end] {
            match entries.iter_mut().find(|(id, _)| *id == name) {
                Some(entry) => entry.1 = value,
                None => entries.push((name, value)),
            }
        }
    }

    /// The value of `property` at `codepoint`, if any loader set it.
    pub fn value(&self, codepoint: u32, property: &str) -> Option<&str> {
        let name = *self.name_ids.get(property)?;
        self.records
            .get(codepoint as usize)?
            .iter()
            .find(|(id, _)| *id == name)
            .map(|(_, value)| self.values[*value as usize].as_str())
    }

    /// Every codepoint that has a value for `property`, ascending.
    pub fn codepoints_with(&self, property: &str) -> Vec<u32> {
        let Some(&name) = self.name_ids.get(property) else {
            return Vec::new();
        };

        (0u32..)
            .zip(&self.records)
            .filter(|(_, entries)| entries.iter().any(|(id, _)| *id == name))
            .map(|(codepoint, _)| codepoint)
            .collect()
    }

    /// Finalizes the table into an immutable index.
    ///
    /// Identical records are stored once, and consecutive codepoints sharing a record collapse
    /// into a single run.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the number of distinct records overflows.
    pub fn finish(self, version: Option<String>) -> Result<PropertyIndex> {
        let mut records: Vec<Entries> = Vec::new();
        let mut record_ids: HashMap<Entries, u32> = HashMap::new();
        let mut runs: Vec<Run> = Vec::new();

        for (codepoint, mut entries) in (0u32..).zip(self.records) {
            if entries.is_empty() {
                continue;
            }
            entries.sort_unstable();

            let record = match record_ids.get(&entries) {
                Some(&id) => id,
                None => {
                    let id = u32::try_from(records.len())
                        .map_err(|_| malformed_error!("More than {} distinct records", u32::MAX))?;
                    record_ids.insert(entries.clone(), id);
                    records.push(entries);
                    id
                }
            };

            match runs.last_mut() {
                Some(run) if run.record == record && run.end + 1 == codepoint => run.end = codepoint,
                _ => runs.push(Run {
                    start: codepoint,
                    end: codepoint,
                    record,
                }),
            }
        }

        Ok(PropertyIndex::from_parts(
            version,
            self.names,
            self.values,
            records,
            runs,
        ))
    }
}
