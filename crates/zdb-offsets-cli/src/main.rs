use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use tracing::error;
use tracing_subscriber::EnvFilter;
use zdb_offsets::{DumpOptions, SystemRunner, builtin_targets, dump_offsets};

/// Dump LLDB internal symbol offsets for the zdb plugin.
///
/// Example: dump-offsets /opt/llvm/lib/liblldb.dylib > lldb-21.1.7.json
#[derive(Parser)]
#[command(name = "dump-offsets")]
struct Args {
    /// Path to liblldb (.dylib or .so)
    library: PathBuf,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(&args) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> Result<()> {
    // stdout carries the report, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("zdb_offsets=info".parse()?)
                .add_directive("dump_offsets=info".parse()?),
        )
        .init();
    Ok(())
}

fn run(args: &Args) -> Result<String> {
    let targets = builtin_targets();
    let report = dump_offsets(&SystemRunner, &args.library, &targets, &DumpOptions::default())?;
    Ok(report.to_json_pretty()?)
}
