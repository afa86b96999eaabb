use std::collections::BTreeMap;

use robic_core::{ContextId, VariableSource, WorldVersion};

/// In-memory counter/string tables.
///
/// Names are case-insensitive. A name is a string variable when it begins
/// with `$` and its base (the part before any `#` or `+`) contains no `.` —
/// that keeps composites like `$name.length` on the counter path. Missing
/// counters read 0 and missing strings read empty, so scripts can probe
/// freely.
#[derive(Debug, Clone, Default)]
pub struct World {
    counters: BTreeMap<Vec<u8>, i32>,
    strings: BTreeMap<Vec<u8>, Vec<u8>>,
    input_line: Vec<u8>,
    version: WorldVersion,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(version: WorldVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    pub fn version(&self) -> WorldVersion {
        self.version
    }

    pub fn set_version(&mut self, version: WorldVersion) {
        self.version = version;
    }

    pub fn set_counter(&mut self, name: &str, value: i32) {
        self.counters.insert(key(name.as_bytes()), value);
    }

    pub fn counter(&self, name: &str) -> i32 {
        self.counters
            .get(&key(name.as_bytes()))
            .copied()
            .unwrap_or(0)
    }

    pub fn set_string(&mut self, name: &str, value: impl Into<Vec<u8>>) {
        self.strings.insert(key(name.as_bytes()), value.into());
    }

    pub fn string(&self, name: &str) -> &[u8] {
        self.strings
            .get(&key(name.as_bytes()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn set_input_line(&mut self, line: impl Into<Vec<u8>>) {
        self.input_line = line.into();
    }
}

fn key(name: &[u8]) -> Vec<u8> {
    name.to_ascii_lowercase()
}

/// `$name.length` composite: the string whose length is being asked for.
fn length_target(name: &[u8]) -> Option<&[u8]> {
    if !name.starts_with(b"$") {
        return None;
    }
    let suffix_at = name.len().checked_sub(b".length".len())?;
    if name[suffix_at..].eq_ignore_ascii_case(b".length") {
        Some(&name[..suffix_at])
    } else {
        None
    }
}

impl VariableSource for World {
    fn read_counter(&mut self, name: &[u8], _context: ContextId) -> i32 {
        if let Some(target) = length_target(name) {
            let target = key(target);
            return self
                .strings
                .get(&target)
                .map(|value| value.len() as i32)
                .unwrap_or(0);
        }
        self.counters.get(&key(name)).copied().unwrap_or(0)
    }

    fn is_string(&self, name: &[u8]) -> bool {
        if !name.starts_with(b"$") {
            return false;
        }
        let base_len = name
            .iter()
            .position(|&b| b == b'#' || b == b'+')
            .unwrap_or(name.len());
        !name[..base_len].contains(&b'.')
    }

    fn read_string(&mut self, name: &[u8], _context: ContextId) -> Vec<u8> {
        self.strings.get(&key(name)).cloned().unwrap_or_default()
    }

    fn input_line(&mut self, _context: ContextId) -> Vec<u8> {
        self.input_line.clone()
    }

    fn format_version(&self, _context: ContextId) -> WorldVersion {
        self.version
    }
}

#[cfg(test)]
mod world_tests {
    use super::*;

    fn context() -> ContextId {
        ContextId::default()
    }

    #[test]
    fn counters_are_case_insensitive_and_default_to_zero() {
        let mut world = World::new();
        world.set_counter("Score", 42);
        assert_eq!(world.read_counter(b"score", context()), 42);
        assert_eq!(world.read_counter(b"SCORE", context()), 42);
        assert_eq!(world.read_counter(b"missing", context()), 0);
    }

    #[test]
    fn string_classification_follows_the_dollar_and_dot_rules() {
        let world = World::new();
        assert!(world.is_string(b"$name"));
        assert!(!world.is_string(b"name"));
        assert!(!world.is_string(b"$name.length"));
        // A dot after a splice marker does not disqualify the base name.
        assert!(world.is_string(b"$name+2.0"));
    }

    #[test]
    fn string_length_reads_through_the_counter_path() {
        let mut world = World::new();
        world.set_string("$name", "ada");
        assert_eq!(world.read_counter(b"$name.length", context()), 3);
        assert_eq!(world.read_counter(b"$NAME.LENGTH", context()), 3);
        assert_eq!(world.read_counter(b"$other.length", context()), 0);
    }

    #[test]
    fn strings_default_to_empty() {
        let mut world = World::new();
        world.set_string("$greet", "hi");
        assert_eq!(world.read_string(b"$GREET", context()), b"hi");
        assert!(world.read_string(b"$missing", context()).is_empty());
        assert_eq!(world.string("$greet"), b"hi");
    }

    #[test]
    fn version_and_input_line_are_held_per_world() {
        let mut world = World::with_version(WorldVersion::new(2, 51));
        assert_eq!(world.format_version(context()), WorldVersion::new(2, 51));
        world.set_version(WorldVersion::CURRENT);
        assert_eq!(world.version(), WorldVersion::CURRENT);

        world.set_input_line("north");
        assert_eq!(world.input_line(context()), b"north");
    }
}
