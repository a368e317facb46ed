use thiserror::Error;

/// Errors produced while validating configuration and while resolving or
/// dispatching commands.
///
/// Configuration problems are detected eagerly when settings are validated and
/// carry a machine-readable [`code`](Error::code). Resolution problems fall
/// into the remaining variants; note that during candidate iteration a failed
/// probe is *not* an error (see [`LoadOutcome`](crate::registry::LoadOutcome));
/// only an exhausted search or a direct import on behalf of an override
/// surfaces one of these.
#[derive(Debug, Error)]
pub enum Error {
    /// A setting failed validation. The message names the offending key or
    /// value; `code` identifies the rule that rejected it (e.g. `paths.key`).
    #[error("{message}")]
    Config {
        message: String,
        code: &'static str,
    },

    /// A component label that no installed component matches.
    #[error("component {0:?} is not installed")]
    UnknownComponent(String),

    /// A dotted path with no symbol registered at it.
    #[error("symbol {symbol:?} could not be imported from the {module:?} module")]
    Import { module: String, symbol: String },

    /// A dotted path whose symbol exists but is not a command implementation.
    #[error("symbol at {0:?} is not a command implementation")]
    NotACommand(String),

    /// Every candidate location was probed and none produced a command.
    #[error("command {:?} is not registered in {}", .name, searched_scope(.label))]
    UnknownCommand {
        name: String,
        label: Option<String>,
    },

    /// Aliases expand to whole argument vectors and cannot be invoked through
    /// the single-command programmatic entry point.
    #[error("alias {0:?} cannot be called as a single command")]
    AliasInvocation(String),
}

impl Error {
    /// Split `path` on its last separator and build an [`Error::Import`].
    ///
    /// Paths are validated to hold at least two segments before they reach the
    /// loader, so a missing separator only happens for hand-built paths; the
    /// whole path is then reported as the symbol.
    pub(crate) fn import(path: &str) -> Self {
        match path.rsplit_once('.') {
            Some((module, symbol)) => Self::Import {
                module: module.to_owned(),
                symbol: symbol.to_owned(),
            },
            None => Self::Import {
                module: String::new(),
                symbol: path.to_owned(),
            },
        }
    }

    /// Machine-readable code carried by configuration errors, `None` for every
    /// other variant.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Config { code, .. } => Some(code),
            _ => None,
        }
    }
}

fn searched_scope(label: &Option<String>) -> String {
    match label {
        Some(label) => format!("the {label:?} component"),
        None => "any of the installed components".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_unknown_command_message_names_component_scope() {
        let err = Error::UnknownCommand {
            name: "migrate".to_owned(),
            label: Some("blog".to_owned()),
        };
        assert_eq!(
            err.to_string(),
            "command \"migrate\" is not registered in the \"blog\" component",
        );
    }

    #[test]
    fn test_unknown_command_message_without_component_scope() {
        let err = Error::UnknownCommand {
            name: "migrate".to_owned(),
            label: None,
        };
        assert_eq!(
            err.to_string(),
            "command \"migrate\" is not registered in any of the installed components",
        );
    }

    #[test]
    fn test_import_error_splits_module_and_symbol() {
        let err = Error::import("blog.commands.publish.Command");
        assert_eq!(
            err.to_string(),
            "symbol \"Command\" could not be imported from the \"blog.commands.publish\" module",
        );
    }

    #[test]
    fn test_code_is_only_present_on_config_errors() {
        let config = Error::Config {
            message: "bad".to_owned(),
            code: "paths.key",
        };
        assert_eq!(config.code(), Some("paths.key"));
        assert_eq!(Error::UnknownComponent("blog".to_owned()).code(), None);
    }
}
