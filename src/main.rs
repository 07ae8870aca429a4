use anyhow::{Result, anyhow};
use initsh::interpreter::BANNER;
use initsh::io_adapters::{BufReadSource, EditorSource, LineSource};
use initsh::{Config, Interpreter, bootstrap};
use std::io::{self, IsTerminal};
use tracing::{debug, info};

fn main() -> Result<()> {
    let config: Config = argh::from_env();

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("cannot initialise logging: {e}"))?;

    let env = config.environment();
    info!(
        mount = %env.mount.display(),
        search = %env.search_path,
        plain = config.plain,
        "starting shell"
    );

    if !config.no_bootstrap {
        if let Err(e) = bootstrap::ensure_layout(&env) {
            debug!("{e:#}");
            eprintln!("{e:#}");
        }
    }

    if !config.quiet {
        println!("{BANNER}");
    }

    let input: Box<dyn LineSource> = if config.plain || !io::stdin().is_terminal() {
        Box::new(BufReadSource::new(io::stdin().lock()))
    } else {
        Box::new(EditorSource::new().map_err(|e| anyhow!("cannot start line editor: {e}"))?)
    };

    Interpreter::new(env, input, Box::new(io::stdout())).repl()
}
