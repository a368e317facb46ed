use anyhow::Result;
use std::fmt;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Object-safe trait every runnable command implements.
///
/// This is the crate's equivalent of the host framework's base command type:
/// the resolver only ever hands out implementations of this trait, and the
/// dispatcher knows nothing about a command beyond it.
///
/// `argv` is the full argument vector of the invocation: `argv[0]` is the
/// program name, `argv[1]` the command name it was invoked as, and the rest are
/// the command's own arguments. Output goes to the injected `stdout` stream so
/// callers (and tests) can capture it.
pub trait Command {
    /// Executes the command with the given argument vector.
    fn run_from_argv(
        self: Box<Self>,
        argv: &[String],
        stdout: &mut dyn Write,
    ) -> Result<ExitCode>;
}

impl fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Command")
    }
}
