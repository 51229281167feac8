//! `whence`: show where downloaded files came from.

mod logging;
mod output;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::debug;
use whence_core::{
    Dispatcher, ErrorCode, Platform, ProvenanceCache, WhenceConfig, sqlite_version,
};
use whence_sys::HostAttributes;

use crate::output::{HumanPrinter, JsonReport, color_enabled, format_human_date};

/// Show the provenance recorded on downloaded files
#[derive(Parser, Debug)]
#[command(name = "whence", disable_version_flag = true)]
struct Cli {
    /// Print results in JSON format
    #[arg(short, long)]
    json: bool,

    /// Print the version number and exit
    #[arg(short = 'V', long, short_alias = 'v')]
    version: bool,

    /// Files to inspect
    #[arg(value_name = "FILE", required_unless_present = "version")]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ErrorCode::Ok,
                _ => ErrorCode::BadInvocation,
            };
            // Nothing useful to do if the terminal is gone.
            let _ = err.print();
            return exit_code(code);
        }
    };

    logging::init_logging();

    if cli.version {
        return exit_code(print_version());
    }

    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("whence: {err}");
            ErrorCode::Other
        }
    };
    exit_code(code)
}

fn exit_code(code: ErrorCode) -> ExitCode {
    ExitCode::from(code.exit_code() as u8)
}

fn print_version() -> ErrorCode {
    let mut out = io::stdout().lock();
    let mut line = format!("whence {}", env!("CARGO_PKG_VERSION"));
    if Platform::current() == Platform::MacOs {
        line.push_str(&format!("\nSQLite version {}", sqlite_version()));
    }
    match writeln!(out, "{line}") {
        Ok(()) => ErrorCode::Ok,
        Err(_) => ErrorCode::Other,
    }
}

/// Inspect every file, print the results and fold their outcomes.
fn run(cli: &Cli) -> io::Result<ErrorCode> {
    let platform = Platform::current();
    let config = WhenceConfig::from_env();
    let mut cache = ProvenanceCache::for_platform(platform, &config);
    debug!(platform = %platform, cache = cache.kind(), "starting");

    let source = HostAttributes::new();
    let mut dispatcher = Dispatcher::new(platform, &source, &mut cache);

    let stdout = io::stdout();
    let stderr = io::stderr();
    let no_color = std::env::var_os("NO_COLOR");
    let printer = HumanPrinter {
        color: color_enabled(stdout.is_terminal(), no_color.as_deref()),
        error_color: color_enabled(stderr.is_terminal(), no_color.as_deref()),
    };
    let mut out = stdout.lock();
    let mut err = stderr.lock();
    let mut report = cli.json.then(JsonReport::new);

    let mut outcome: Option<ErrorCode> = None;
    for path in &cli.files {
        let found = dispatcher.collect(path);
        let name = path.display().to_string();

        match report.as_mut() {
            Some(report) => report.add(name, &found.record)?,
            None => printer.print(&mut out, &mut err, &name, &found.record, format_human_date)?,
        }

        outcome = Some(outcome.map_or(found.code, |prev| prev.combine(found.code)));
    }

    if let Some(report) = report {
        report.write(&mut out)?;
    }
    out.flush()?;

    cache.close();
    Ok(outcome.unwrap_or(ErrorCode::Ok))
}
