//! Candidate enumeration and command resolution.
//!
//! Resolution is a pure function of the request, the injected component set,
//! the configuration snapshot and the loader: [`candidate_paths`] lists every
//! fully-qualified location that could hold the requested command, in priority
//! order, and [`resolve`] probes them until the first one loads as a command.
//! Nothing is cached between calls.

use crate::command::Command;
use crate::error::Error;
use crate::registry::{CommandLoader, ComponentSet, LoadOutcome};
use crate::settings::{CONVENTIONAL_SUBMODULE, Settings};

/// Namespace of the framework's own built-in commands. It behaves like a
/// component that is always installed last and only ever uses the conventional
/// secondary location.
pub const CORE_NAMESPACE: &str = "core";

/// Conventional leaf symbol a command module exports.
pub const COMMAND_SYMBOL: &str = "Command";

/// Enumerate every candidate path for `name`, most specific first.
///
/// Unqualified lookups probe the primary locations in declared order, then
/// each installed component in *reverse* registration order (so the last
/// component registered can shadow same-named commands of earlier ones), each
/// with every secondary location, and finally the [`CORE_NAMESPACE`]
/// built-ins. Qualified lookups probe only the named component's secondary
/// locations; an unknown label is an error.
pub fn candidate_paths(
    name: &str,
    label: Option<&str>,
    components: &ComponentSet,
    settings: &Settings,
) -> Result<Vec<String>, Error> {
    let mut candidates = Vec::new();

    match label {
        None => {
            for module in &settings.modules {
                candidates.push(format!("{module}.{name}.{COMMAND_SYMBOL}"));
            }

            let namespaces = components
                .iter()
                .rev()
                .map(|component| component.namespace.as_str())
                .chain(std::iter::once(CORE_NAMESPACE));
            for namespace in namespaces {
                for submodule in &settings.submodules {
                    // Built-ins never pick up user-declared secondary locations.
                    if namespace == CORE_NAMESPACE && submodule.as_str() != CONVENTIONAL_SUBMODULE
                    {
                        continue;
                    }
                    candidates.push(format!("{namespace}.{submodule}.{name}.{COMMAND_SYMBOL}"));
                }
            }
        }
        Some(label) => {
            let component = components
                .get(label)
                .ok_or_else(|| Error::UnknownComponent(label.to_owned()))?;
            for submodule in &settings.submodules {
                candidates.push(format!(
                    "{}.{submodule}.{name}.{COMMAND_SYMBOL}",
                    component.namespace,
                ));
            }
        }
    }

    Ok(candidates)
}

/// Resolve `name` to a command instance.
///
/// Candidates are probed in order; the first [`LoadOutcome::Loaded`] wins and
/// later candidates are never evaluated. A probe that misses or hits a
/// non-command symbol means "try the next one"; neither surfaces as an error.
/// Exhausting the list fails with [`Error::UnknownCommand`].
pub fn resolve(
    name: &str,
    label: Option<&str>,
    loader: &dyn CommandLoader,
    components: &ComponentSet,
    settings: &Settings,
) -> Result<Box<dyn Command>, Error> {
    for path in candidate_paths(name, label, components, settings)? {
        match loader.load(&path) {
            LoadOutcome::Loaded(command) => {
                tracing::debug!(name, path = %path, "resolved command");
                return Ok(command);
            }
            LoadOutcome::NotFound | LoadOutcome::NotACommand => {}
        }
    }

    Err(Error::UnknownCommand {
        name: name.to_owned(),
        label: label.map(str::to_string),
    })
}

/// Load the command at one exact path, on behalf of an override.
///
/// Unlike candidate iteration, failures here surface to the caller: a missing
/// symbol is [`Error::Import`], a non-command symbol is [`Error::NotACommand`].
pub fn import_command(loader: &dyn CommandLoader, path: &str) -> Result<Box<dyn Command>, Error> {
    match loader.load(path) {
        LoadOutcome::Loaded(command) => Ok(command),
        LoadOutcome::NotFound => Err(Error::import(path)),
        LoadOutcome::NotACommand => Err(Error::NotACommand(path.to_owned())),
    }
}

/// List, per search location, every command name that would resolve there.
///
/// This is the display-side counterpart of [`resolve`]: primary locations come
/// first in declared order, then one entry per component (keyed by namespace)
/// in registration order. Only importable, non-private submodules that pass
/// the command type check are reported; locations with nothing to report are
/// omitted. The conventional location and the built-ins are excluded; the
/// native usage text already lists those.
pub fn discover(
    loader: &dyn CommandLoader,
    components: &ComponentSet,
    settings: &Settings,
) -> Vec<(String, Vec<String>)> {
    let mut listings = Vec::new();

    for module in &settings.modules {
        let names = discoverable_names(loader, module);
        if !names.is_empty() {
            listings.push((module.clone(), names));
        }
    }

    for component in components.iter() {
        let mut names = Vec::new();
        for submodule in &settings.submodules {
            if submodule.as_str() == CONVENTIONAL_SUBMODULE {
                continue;
            }
            let location = format!("{}.{submodule}", component.namespace);
            names.extend(discoverable_names(loader, &location));
        }
        if !names.is_empty() {
            listings.push((component.namespace.clone(), names));
        }
    }

    listings
}

fn discoverable_names(loader: &dyn CommandLoader, location: &str) -> Vec<String> {
    loader
        .submodules(location)
        .into_iter()
        .filter(|name| !name.starts_with('_'))
        .filter(|name| {
            let path = format!("{location}.{name}.{COMMAND_SYMBOL}");
            matches!(loader.load(&path), LoadOutcome::Loaded(_))
        })
        .collect()
}
