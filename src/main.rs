use anyhow::Result;
use command_router::{ComponentSet, Dispatcher, ExitCode, ModuleRegistry, Settings};
use std::io::Write;
use std::path::Path;
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = std::env::args().collect();
    match run(&argv) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}

fn run(argv: &[String]) -> Result<ExitCode> {
    let settings = load_settings()?;
    let dispatcher = Dispatcher::new(
        settings,
        ComponentSet::new(),
        Box::new(ModuleRegistry::with_builtins()),
    );

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    let code = dispatcher.execute(argv, &mut stdout)?;
    stdout.flush()?;
    Ok(code)
}

/// Settings come from the file named by `COMMAND_ROUTER_CONFIG`, defaulting to
/// `command_router.toml` in the working directory. An absent file means empty
/// settings; an invalid one aborts startup.
fn load_settings() -> Result<Settings> {
    let path =
        std::env::var("COMMAND_ROUTER_CONFIG").unwrap_or_else(|_| "command_router.toml".to_owned());
    let path = Path::new(&path);
    if path.exists() {
        Settings::load(path)
    } else {
        Ok(Settings::default().validate()?)
    }
}
