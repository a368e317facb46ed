use crate::command::{Command, ExitCode};
use crate::error::Error;
use crate::registry::{CommandLoader, ComponentSet};
use crate::resolver;
use crate::settings::{CONVENTIONAL_SUBMODULE, Settings};
use anyhow::Result;
use std::io::Write;

/// The entry point of the command subsystem.
///
/// A `Dispatcher` owns an immutable configuration snapshot, the injected
/// component set and a [`CommandLoader`], and decides for every incoming
/// argument vector whether it names an override, an alias, the help screen or
/// a command to resolve. Nothing is cached between dispatches: every call
/// re-reads the configuration and re-resolves from scratch.
///
/// Example
/// ```
/// use command_router::{Dispatcher, ComponentSet, ModuleRegistry, Settings};
/// let dispatcher = Dispatcher::new(
///     Settings::default().validate().unwrap(),
///     ComponentSet::new(),
///     Box::new(ModuleRegistry::with_builtins()),
/// );
/// let mut out = Vec::new();
/// let argv = vec!["prog".to_string(), "version".to_string()];
/// assert_eq!(dispatcher.execute(&argv, &mut out).unwrap(), 0);
/// ```
pub struct Dispatcher {
    settings: Settings,
    components: ComponentSet,
    loader: Box<dyn CommandLoader>,
}

impl Dispatcher {
    /// Create a dispatcher over a validated configuration snapshot.
    pub fn new(
        settings: Settings,
        components: ComponentSet,
        loader: Box<dyn CommandLoader>,
    ) -> Self {
        Self {
            settings,
            components,
            loader,
        }
    }

    /// Dispatch a full argument vector: `argv[0]` is the program name,
    /// `argv[1]` the command (or alias, or override, or `label.name`), the
    /// rest the command's own arguments.
    ///
    /// Precedence, highest first: override map, alias map, help, resolution,
    /// native unknown-command fallback. Returns the command's exit code;
    /// unknown component labels and broken override paths are errors.
    pub fn execute(&self, argv: &[String], stdout: &mut dyn Write) -> Result<ExitCode> {
        let prog = argv.first().map_or("command_router", String::as_str);
        let Some(name) = argv.get(1) else {
            write!(stdout, "{}", self.main_help_text(prog))?;
            return Ok(0);
        };

        if let Some(path) = self.settings.paths.get(name) {
            tracing::debug!(name = %name, path = %path, "dispatching override");
            let command = resolver::import_command(self.loader.as_ref(), path)?;
            return command.run_from_argv(argv, stdout);
        }

        if let Some(expansions) = self.settings.aliases.get(name) {
            return self.execute_alias(prog, name, expansions, stdout);
        }

        if matches!(name.as_str(), "help" | "--help" | "-h") {
            write!(stdout, "{}", self.main_help_text(prog))?;
            return Ok(0);
        }

        match self.fetch_command(name)? {
            Some(command) => command.run_from_argv(argv, stdout),
            None => {
                writeln!(stdout, "Unknown command: {name:?}")?;
                writeln!(stdout, "Type '{prog} help' for usage.")?;
                Ok(1)
            }
        }
    }

    /// Run every expansion of an alias as its own dispatch cycle.
    ///
    /// Expansions may themselves name aliases or overrides; there is no cycle
    /// detection, so a pair of aliases referring to each other recurses until
    /// the stack runs out. A failing step ends the sequence: the first
    /// non-zero exit code is returned and later expansions do not run.
    fn execute_alias(
        &self,
        prog: &str,
        name: &str,
        expansions: &[String],
        stdout: &mut dyn Write,
    ) -> Result<ExitCode> {
        tracing::debug!(alias = %name, steps = expansions.len(), "expanding alias");
        for expansion in expansions {
            let mut argv = vec![prog.to_owned()];
            argv.extend(expansion.split_whitespace().map(str::to_owned));
            let code = self.execute(&argv, stdout)?;
            if code != 0 {
                return Ok(code);
            }
        }
        Ok(0)
    }

    /// Resolve `name` the way the framework would: split a `label.name`
    /// qualification on the last separator, else resolve unqualified.
    ///
    /// `Ok(None)` means "nothing found anywhere" and sends the caller to the
    /// native fallback. A qualified miss under an installed label retries the
    /// bare name unqualified; an unknown label propagates immediately.
    fn fetch_command(&self, name: &str) -> Result<Option<Box<dyn Command>>, Error> {
        let (label, bare) = match name.rsplit_once('.') {
            Some((label, bare)) => (Some(label), bare),
            None => (None, name),
        };

        if label.is_some() {
            match self.resolve(bare, label) {
                Ok(command) => return Ok(Some(command)),
                Err(Error::UnknownCommand { .. }) => {}
                Err(err) => return Err(err),
            }
        }

        match self.resolve(bare, None) {
            Ok(command) => Ok(Some(command)),
            Err(Error::UnknownCommand { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn resolve(&self, name: &str, label: Option<&str>) -> Result<Box<dyn Command>, Error> {
        resolver::resolve(
            name,
            label,
            self.loader.as_ref(),
            &self.components,
            &self.settings,
        )
    }

    /// Execute a single command by name, programmatically.
    ///
    /// Accepts override names and anything the resolver can find (including
    /// `label.name` qualification). Alias names are rejected: expanding a
    /// multi-step alias is only supported through [`execute`](Self::execute).
    pub fn call_command(
        &self,
        name: &str,
        args: &[&str],
        stdout: &mut dyn Write,
    ) -> Result<ExitCode> {
        if self.settings.aliases.contains_key(name) {
            return Err(Error::AliasInvocation(name.to_owned()).into());
        }

        let command = match self.settings.paths.get(name) {
            Some(path) => resolver::import_command(self.loader.as_ref(), path)?,
            None => self.fetch_command(name)?.ok_or_else(|| Error::UnknownCommand {
                name: name.to_owned(),
                label: None,
            })?,
        };

        let mut argv = vec!["call_command".to_owned(), name.to_owned()];
        argv.extend(args.iter().map(|arg| (*arg).to_owned()));
        command.run_from_argv(&argv, stdout)
    }

    /// The native usage text, augmented with the configured overrides, the
    /// aliases and every discoverable search location, each under its own
    /// heading, in that order. Empty sections are omitted.
    fn main_help_text(&self, prog: &str) -> String {
        let mut lines = vec![
            format!("Usage: {prog} <command> [arguments]"),
            String::new(),
            "Available commands:".to_owned(),
        ];

        let core_location = format!("{}.{CONVENTIONAL_SUBMODULE}", resolver::CORE_NAMESPACE);
        let mut builtins = self.loader.submodules(&core_location);
        builtins.push("help".to_owned());
        builtins.sort();
        for name in builtins {
            lines.push(format!("    {name}"));
        }
        lines.push(String::new());

        if !self.settings.paths.is_empty() {
            lines.push("[command_router: paths]".to_owned());
            for name in self.settings.paths.keys() {
                lines.push(format!("    {name}"));
            }
            lines.push(String::new());
        }

        if !self.settings.aliases.is_empty() {
            lines.push("[command_router: aliases]".to_owned());
            for name in self.settings.aliases.keys() {
                lines.push(format!("    {name}"));
            }
            lines.push(String::new());
        }

        for (location, names) in
            resolver::discover(self.loader.as_ref(), &self.components, &self.settings)
        {
            lines.push(format!("[command_router: {location}]"));
            for name in names {
                lines.push(format!("    {name}"));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }
}
