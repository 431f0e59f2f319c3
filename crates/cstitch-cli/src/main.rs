//! cstitch entrypoint: wires logging and config discovery, then drives the
//! paint engine from a line-oriented script of commands.

mod script;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "cstitch", version, about = "Corner-stitched tile-plane paint engine driver")]
struct Args {
    /// Script file to run. Reads from stdin when omitted.
    pub script: Option<PathBuf>,
    /// Optional configuration file path (overrides discovery of `cstitch.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

/// `trace_merges` additionally enables `core_paint`'s merge-pass tracing
/// (spec's `debug.trace_merges` knob) by adding a target-scoped directive on
/// top of whatever `RUST_LOG` already asks for.
fn configure_logging(trace_merges: bool) -> Result<Option<WorkerGuard>> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("cstitch.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "cstitch.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if trace_merges {
        filter = filter.add_directive("core_paint=trace".parse().expect("static directive parses"));
    }
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Ok(Some(guard)),
        Err(_err) => Ok(None),
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = core_config::load_from(args.config.clone())?;

    let _log_guard = configure_logging(config.file.debug.trace_merges)?;
    install_panic_hook();

    info!(
        target: "runtime",
        default_capacity = config.effective_default_capacity(),
        max_heap_pops = config.effective_max_heap_pops(),
        phase_b_margin = config.effective_phase_b_margin(),
        "startup"
    );

    let stdout = io::stdout();
    match &args.script {
        Some(path) => {
            let file = File::open(path)?;
            script::run(BufReader::new(file), stdout.lock())?;
        }
        None => {
            script::run(io::stdin().lock(), stdout.lock())?;
        }
    }

    Ok(())
}
