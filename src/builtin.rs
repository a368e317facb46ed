use crate::command::{Command, ExitCode};
use crate::registry::ModuleRegistry;
use crate::resolver::{COMMAND_SYMBOL, CORE_NAMESPACE};
use crate::settings::CONVENTIONAL_SUBMODULE;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use std::io::Write;
use std::marker::PhantomData;

/// Built-in commands the framework ships under the `core` namespace.
///
/// Builtins declare their arguments with the [`argh`] crate (`FromArgs`) and
/// execute directly in-process. Parsing happens at invocation time, so a parse
/// failure (or `--help`) renders to the command's output stream instead of
/// aborting dispatch.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "version".
    fn name() -> &'static str;

    /// Executes the command.
    ///
    /// Return value follows shell conventions: 0 for success, non-zero for
    /// error.
    fn execute(self, stdout: &mut dyn Write) -> Result<ExitCode>;
}

/// Adapter registered in the symbol table; parses `argv` into `T` when run.
struct Builtin<T> {
    _phantom: PhantomData<T>,
}

impl<T> Default for Builtin<T> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T: BuiltinCommand> Command for Builtin<T> {
    fn run_from_argv(
        self: Box<Self>,
        argv: &[String],
        stdout: &mut dyn Write,
    ) -> Result<ExitCode> {
        let invoked_as = argv.get(1).map(String::as_str).unwrap_or_else(|| T::name());
        let args: Vec<&str> = argv.iter().skip(2).map(String::as_str).collect();
        match T::from_args(&[invoked_as], &args) {
            Ok(command) => command.execute(stdout),
            Err(EarlyExit { output, status }) => {
                writeln!(stdout, "{output}")?;
                Ok(if status.is_err() { 1 } else { 0 })
            }
        }
    }
}

/// Register every built-in under `core.commands.<name>.Command`.
pub(crate) fn register_builtins(registry: &mut ModuleRegistry) {
    register::<Version>(registry);
}

fn register<T: BuiltinCommand + 'static>(registry: &mut ModuleRegistry) {
    let path = format!(
        "{CORE_NAMESPACE}.{CONVENTIONAL_SUBMODULE}.{}.{COMMAND_SYMBOL}",
        T::name(),
    );
    registry.register_command(path, || Box::new(Builtin::<T>::default()));
}

#[derive(FromArgs)]
/// Print the framework name and version.
pub struct Version {}

impl BuiltinCommand for Version {
    fn name() -> &'static str {
        "version"
    }

    fn execute(self, stdout: &mut dyn Write) -> Result<ExitCode> {
        writeln!(
            stdout,
            "{} {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
        )?;
        Ok(0)
    }
}
