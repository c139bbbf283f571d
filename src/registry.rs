//! Logical program names mapped to platform executables.

use std::collections::BTreeMap;

/// Read-only view of `program_mapping`.
///
/// Lookups are exact: no case folding, trimming, or fuzzy matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramRegistry {
    programs: BTreeMap<String, String>,
}

impl ProgramRegistry {
    pub fn new(programs: BTreeMap<String, String>) -> Self {
        Self { programs }
    }

    /// The executable registered under exactly `name`.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.programs.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Registered entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.programs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for ProgramRegistry {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
