use crate::error::Error;
use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Conventional secondary search location. Always present after validation,
/// whether or not the user listed it.
pub const CONVENTIONAL_SUBMODULE: &str = "commands";

/// Keywords that cannot be used as command or alias names, since they could
/// never name a module segment in the host language.
const RESERVED: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while",
];

/// The four user-facing settings, as read from a TOML file.
///
/// All fields default to empty, so an absent file is equivalent to an empty
/// one. A `Settings` value is only usable after [`validate`](Settings::validate)
/// has normalized it; the dispatcher treats it as immutable from then on.
///
/// ```toml
/// modules = ["ops.tasks"]
/// submodules = ["admin_commands"]
///
/// [paths]
/// publish = "blog.commands.publish.Command"
///
/// [aliases]
/// release = ["publish --all", "notify ops"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Override map: command name to the exact implementation path to run.
    pub paths: BTreeMap<String, String>,
    /// Primary search locations: dotted module paths probed for a submodule
    /// named after the requested command.
    pub modules: Vec<String>,
    /// Secondary search locations: suffixes appended to each component's
    /// namespace. [`CONVENTIONAL_SUBMODULE`] is prepended when missing.
    pub submodules: Vec<String>,
    /// Alias map: name to the list of command invocations it expands to.
    ///
    /// Direct self-reference is rejected at validation; indirect cycles are
    /// not detected and will recurse until the process dies.
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl Settings {
    /// Read settings from a TOML file and validate them.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: Settings = toml::from_str(&raw)
            .with_context(|| format!("parsing settings from {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings.validate()?)
    }

    /// Check every setting against its well-formedness rules and return the
    /// normalized value.
    ///
    /// Fails with [`Error::Config`] carrying one of the codes `paths.key`,
    /// `paths.value`, `modules.item`, `submodules.item`, `aliases.key`,
    /// `aliases.empty` or `aliases.self_reference`. Normalization is
    /// idempotent: validating an already-validated value is a no-op.
    pub fn validate(mut self) -> Result<Self, Error> {
        for (key, value) in &self.paths {
            if !is_identifier(key) {
                return Err(config_error(
                    format!("invalid key {key:?} in paths; keys must be valid identifiers (with hyphens allowed)"),
                    "paths.key",
                ));
            }
            if !is_dotted_path(value, 2) {
                return Err(config_error(
                    format!("invalid value for paths[{key:?}]; values must be dotted paths with at least 2 segments"),
                    "paths.value",
                ));
            }
        }

        validate_path_list(&self.modules, "modules", "modules.item")?;
        validate_path_list(&self.submodules, "submodules", "submodules.item")?;
        if !self.submodules.iter().any(|s| s == CONVENTIONAL_SUBMODULE) {
            self.submodules.insert(0, CONVENTIONAL_SUBMODULE.to_owned());
        }

        for (key, expansions) in &self.aliases {
            if !is_identifier(key) {
                return Err(config_error(
                    format!("invalid key {key:?} in aliases; keys must be valid identifiers (with hyphens allowed)"),
                    "aliases.key",
                ));
            }
            for (index, expansion) in expansions.iter().enumerate() {
                match expansion.split_whitespace().next() {
                    None => {
                        return Err(config_error(
                            format!("empty item found in aliases[{key:?}][{index}]; items must not be empty"),
                            "aliases.empty",
                        ));
                    }
                    Some(command) if command == key => {
                        return Err(config_error(
                            format!("invalid value for aliases[{key:?}][{index}]; items must not refer to the alias they are defined by"),
                            "aliases.self_reference",
                        ));
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(self)
    }
}

fn config_error(message: String, code: &'static str) -> Error {
    Error::Config { message, code }
}

fn validate_path_list(items: &[String], name: &str, code: &'static str) -> Result<(), Error> {
    for (index, item) in items.iter().enumerate() {
        if !is_dotted_path(item, 1) {
            return Err(config_error(
                format!("invalid value for {name}[{index}]; items must be dotted paths"),
                code,
            ));
        }
    }
    Ok(())
}

/// An identifier with hyphens tolerated: normalization to underscores applies
/// to the check only, lookups use the key as typed.
fn is_identifier(s: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[^\d\W]\w*$").expect("identifier pattern"));
    let normalized = s.replace('-', "_");
    re.is_match(&normalized) && !RESERVED.contains(&normalized.as_str())
}

fn is_dotted_path(s: &str, min_parts: usize) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE
        .get_or_init(|| Regex::new(r"^[^\d\W]\w*(\.[^\d\W]\w*)*$").expect("dotted path pattern"));
    if !re.is_match(s) {
        return false;
    }
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() >= min_parts && parts.iter().all(|part| is_identifier(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn test_validate_rejects_invalid_path_key() {
        let mut s = settings();
        s.paths.insert("*publish".to_owned(), "blog.Command".to_owned());

        let err = s.validate().unwrap_err();
        assert_eq!(err.code(), Some("paths.key"));
        assert!(err.to_string().contains("*publish"));
    }

    #[test]
    fn test_validate_accepts_hyphenated_path_key() {
        let mut s = settings();
        s.paths
            .insert("publish-all".to_owned(), "blog.Command".to_owned());

        let validated = s.validate().unwrap();
        // The key is kept as typed; only the validity check normalizes hyphens.
        assert!(validated.paths.contains_key("publish-all"));
    }

    #[test]
    fn test_validate_rejects_reserved_keyword_as_path_key() {
        let mut s = settings();
        s.paths.insert("loop".to_owned(), "blog.Command".to_owned());

        assert_eq!(s.validate().unwrap_err().code(), Some("paths.key"));
    }

    #[test]
    fn test_validate_rejects_single_segment_path_value() {
        let mut s = settings();
        s.paths.insert("publish".to_owned(), "Command".to_owned());

        let err = s.validate().unwrap_err();
        assert_eq!(err.code(), Some("paths.value"));
        assert!(err.to_string().contains("publish"));
    }

    #[test]
    fn test_validate_rejects_malformed_path_value() {
        let mut s = settings();
        s.paths
            .insert("publish".to_owned(), "*blog.Command".to_owned());

        assert_eq!(s.validate().unwrap_err().code(), Some("paths.value"));
    }

    #[test]
    fn test_validate_rejects_invalid_module_item() {
        let mut s = settings();
        s.modules = vec!["ops.tasks".to_owned(), "1bad".to_owned()];

        let err = s.validate().unwrap_err();
        assert_eq!(err.code(), Some("modules.item"));
        assert!(err.to_string().contains("modules[1]"));
    }

    #[test]
    fn test_validate_rejects_invalid_submodule_item() {
        let mut s = settings();
        s.submodules = vec!["*bad".to_owned()];

        assert_eq!(s.validate().unwrap_err().code(), Some("submodules.item"));
    }

    #[test]
    fn test_validate_prepends_conventional_submodule_when_missing() {
        let mut s = settings();
        s.submodules = vec!["admin_commands".to_owned()];

        let validated = s.validate().unwrap();
        assert_eq!(
            validated.submodules,
            vec!["commands".to_owned(), "admin_commands".to_owned()],
        );
    }

    #[test]
    fn test_validate_keeps_conventional_submodule_position_when_present() {
        let mut s = settings();
        s.submodules = vec!["admin_commands".to_owned(), "commands".to_owned()];

        let validated = s.validate().unwrap();
        assert_eq!(
            validated.submodules,
            vec!["admin_commands".to_owned(), "commands".to_owned()],
        );
    }

    #[test]
    fn test_validate_is_idempotent() {
        let mut s = settings();
        s.submodules = vec!["admin_commands".to_owned()];

        let once = s.validate().unwrap();
        let twice = once.clone().validate().unwrap();
        assert_eq!(once.submodules, twice.submodules);
    }

    #[test]
    fn test_validate_rejects_invalid_alias_key() {
        let mut s = settings();
        s.aliases
            .insert("*release".to_owned(), vec!["publish".to_owned()]);

        assert_eq!(s.validate().unwrap_err().code(), Some("aliases.key"));
    }

    #[test]
    fn test_validate_rejects_empty_alias_expansion() {
        let mut s = settings();
        s.aliases
            .insert("release".to_owned(), vec!["   ".to_owned()]);

        let err = s.validate().unwrap_err();
        assert_eq!(err.code(), Some("aliases.empty"));
        assert!(err.to_string().contains("release"));
    }

    #[test]
    fn test_validate_rejects_self_referencing_alias() {
        let mut s = settings();
        s.aliases
            .insert("release".to_owned(), vec!["release --all".to_owned()]);

        assert_eq!(
            s.validate().unwrap_err().code(),
            Some("aliases.self_reference"),
        );
    }

    #[test]
    fn test_validate_allows_alias_referencing_other_alias() {
        let mut s = settings();
        s.aliases
            .insert("release".to_owned(), vec!["publish".to_owned()]);
        s.aliases
            .insert("ship".to_owned(), vec!["release".to_owned()]);

        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_load_reads_and_validates_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("command_router.toml");
        std::fs::write(
            &path,
            r#"
modules = ["ops.tasks"]
submodules = ["admin_commands"]

[paths]
publish = "blog.commands.publish.Command"

[aliases]
release = ["publish --all"]
"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.modules, vec!["ops.tasks".to_owned()]);
        assert_eq!(settings.submodules[0], "commands");
        assert_eq!(
            settings.paths.get("publish").map(String::as_str),
            Some("blog.commands.publish.Command"),
        );
        assert_eq!(
            settings.aliases.get("release"),
            Some(&vec!["publish --all".to_owned()]),
        );
    }

    #[test]
    fn test_load_propagates_validation_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("command_router.toml");
        std::fs::write(&path, "[paths]\n\"*bad\" = \"blog.Command\"\n").unwrap();

        let err = Settings::load(&path).unwrap_err();
        let config = err.downcast_ref::<Error>().unwrap();
        assert_eq!(config.code(), Some("paths.key"));
    }
}
