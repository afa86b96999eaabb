use std::collections::BTreeMap;
use std::fs;

use serde::Deserialize;
use thiserror::Error;

use robic_core::WorldVersion;
use robic_runtime::World;

use crate::cli_args::WorldArgs;

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("cannot read vars file \"{path}\": {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot parse vars file \"{path}\": {source}")]
    ParseFile {
        path: String,
        source: serde_json::Error,
    },
    #[error("binding \"{0}\" is not name=value")]
    MalformedBinding(String),
    #[error("counter \"{name}\" has non-integer value \"{value}\"")]
    NonIntegerCounter { name: String, value: String },
    #[error("format version \"{0}\" is not major.minor")]
    MalformedVersion(String),
}

/// JSON shape of a vars file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VarsFile {
    #[serde(default)]
    pub counters: BTreeMap<String, i32>,
    #[serde(default)]
    pub strings: BTreeMap<String, String>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Build a [`World`] from a vars file and flag bindings; flags win.
pub fn build_world(args: &WorldArgs) -> Result<World, BindingError> {
    let mut world = World::new();

    if let Some(path) = &args.vars {
        let text = fs::read_to_string(path).map_err(|source| BindingError::ReadFile {
            path: path.clone(),
            source,
        })?;
        let file: VarsFile =
            serde_json::from_str(&text).map_err(|source| BindingError::ParseFile {
                path: path.clone(),
                source,
            })?;
        for (name, value) in &file.counters {
            world.set_counter(name, *value);
        }
        for (name, value) in &file.strings {
            world.set_string(name, value.as_str());
        }
        if let Some(input) = &file.input {
            world.set_input_line(input.as_str());
        }
        if let Some(version) = &file.version {
            world.set_version(parse_version(version)?);
        }
    }

    for binding in &args.counters {
        let (name, value) = split_binding(binding)?;
        let value = value
            .parse::<i32>()
            .map_err(|_| BindingError::NonIntegerCounter {
                name: name.to_string(),
                value: value.to_string(),
            })?;
        world.set_counter(name, value);
    }
    for binding in &args.strings {
        let (name, value) = split_binding(binding)?;
        world.set_string(name, value);
    }
    if let Some(input) = &args.input {
        world.set_input_line(input.as_str());
    }
    if let Some(version) = &args.format_version {
        world.set_version(parse_version(version)?);
    }

    Ok(world)
}

fn split_binding(binding: &str) -> Result<(&str, &str), BindingError> {
    binding
        .split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| BindingError::MalformedBinding(binding.to_string()))
}

fn parse_version(text: &str) -> Result<WorldVersion, BindingError> {
    let malformed = || BindingError::MalformedVersion(text.to_string());
    let (major, minor) = text.split_once('.').ok_or_else(malformed)?;
    let major = major.parse::<u8>().map_err(|_| malformed())?;
    let minor = minor.parse::<u8>().map_err(|_| malformed())?;
    Ok(WorldVersion::new(major, minor))
}

#[cfg(test)]
mod bindings_tests {
    use super::*;

    #[test]
    fn flag_bindings_build_a_world() {
        let args = WorldArgs {
            counters: vec!["score=42".to_string(), "lives=-1".to_string()],
            strings: vec!["$name=ada".to_string()],
            input: Some("north".to_string()),
            format_version: Some("2.90".to_string()),
            ..WorldArgs::default()
        };
        let world = build_world(&args).expect("world should build");
        assert_eq!(world.counter("score"), 42);
        assert_eq!(world.counter("lives"), -1);
        assert_eq!(world.string("$name"), b"ada");
        assert_eq!(world.version(), WorldVersion::TERNARY);
    }

    #[test]
    fn malformed_bindings_are_rejected() {
        let args = WorldArgs {
            counters: vec!["scoreless".to_string()],
            ..WorldArgs::default()
        };
        assert!(matches!(
            build_world(&args),
            Err(BindingError::MalformedBinding(_))
        ));

        let args = WorldArgs {
            counters: vec!["score=ten".to_string()],
            ..WorldArgs::default()
        };
        assert!(matches!(
            build_world(&args),
            Err(BindingError::NonIntegerCounter { .. })
        ));

        let args = WorldArgs {
            format_version: Some("2".to_string()),
            ..WorldArgs::default()
        };
        assert!(matches!(
            build_world(&args),
            Err(BindingError::MalformedVersion(_))
        ));
    }

    #[test]
    fn string_values_may_contain_equals_signs() {
        let args = WorldArgs {
            strings: vec!["$eq=a=b".to_string()],
            ..WorldArgs::default()
        };
        let world = build_world(&args).expect("world should build");
        assert_eq!(world.string("$eq"), b"a=b");
    }

    #[test]
    fn vars_file_parses_all_sections() {
        let file: VarsFile = serde_json::from_str(
            r#"{
                "counters": {"gems": 7},
                "strings": {"$name": "ada"},
                "input": "east",
                "version": "2.68"
            }"#,
        )
        .expect("file should parse");
        assert_eq!(file.counters["gems"], 7);
        assert_eq!(file.strings["$name"], "ada");
        assert_eq!(file.input.as_deref(), Some("east"));
        assert_eq!(file.version.as_deref(), Some("2.68"));
    }
}
