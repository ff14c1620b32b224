//! reload-shuffle
//!
//! Headless driver for a coreshuffle session. Reads one command per line from a
//! script (or stdin), prints each result, and writes the move list whenever a
//! cycle is committed or exported.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use coreshuffle::{Command, CommandResponse, Endpoint, Session, SessionConfig, ShuffleError};
use tracing_subscriber::EnvFilter;

/// Command-line options.
#[derive(Default)]
struct Options {
    /// TOML session configuration
    config: Option<PathBuf>,
    /// Script to run instead of stdin
    script: Option<PathBuf>,
    /// Move-list destination, overriding the configuration
    export: Option<PathBuf>,
}

fn print_help() {
    println!("reload-shuffle - plan a core reload from a command script");
    println!();
    println!("USAGE:");
    println!("    reload-shuffle [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE>       Session configuration (TOML)");
    println!("    -s, --script <FILE>       Command script [default: stdin]");
    println!("    -o, --export <FILE>       Move-list file [default: fuel_move_list.txt]");
    println!("    -h, --help                Print help information");
    println!();
    println!("COMMANDS:");
    println!("    swap H8 G9                Exchange two assemblies");
    println!("    rotate L1 cw|ccw          Rotate an orbit a quarter turn");
    println!("    load H8 <row>             Load from an inventory row (see show)");
    println!("    remove H8 [description]   Retire an assembly to inventory");
    println!("    undo | redo               Undo the whole cycle, or redo it");
    println!("    commit                    Deplete and start the next cycle");
    println!("    export | show             Print the move list, or the core");
    println!("    shape <name>              Start over on another core shape");
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--config" | "-c" | "--script" | "-s" | "--export" | "-o" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("error: {flag} requires a value");
                    std::process::exit(1);
                };
                let value = Some(PathBuf::from(value));
                match flag {
                    "--config" | "-c" => options.config = value,
                    "--script" | "-s" => options.script = value,
                    _ => options.export = value,
                }
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg => {
                eprintln!("error: unknown argument: {arg}");
                std::process::exit(1);
            }
        }
    }

    options
}

fn endpoint(session: &Session, endpoint: &Endpoint) -> String {
    match endpoint {
        Endpoint::Core(pos) => session.grid().coordinate(*pos),
        Endpoint::Inventory(slot) => match session.inventory().position_of(*slot) {
            Some(row) => format!("inventory row {}", row + 1),
            None => format!("inventory slot {slot}"),
        },
    }
}

fn write_move_list(path: &Path, text: &str) -> Result<(), ShuffleError> {
    fs::write(path, text).map_err(|e| {
        ShuffleError::internal(format!("cannot write {}: {e}", path.display()))
    })
}

fn report(
    session: &Session,
    response: &CommandResponse,
    export_path: &Path,
) -> Result<(), ShuffleError> {
    match response {
        CommandResponse::Moved(outcome) => {
            for t in &outcome.transitions {
                println!(
                    "  {} : {} -> {}",
                    t.label,
                    endpoint(session, &t.from),
                    endpoint(session, &t.to)
                );
            }
        }
        CommandResponse::Undone { moves } => println!("  undid {moves} move(s)"),
        CommandResponse::Redone { moves } => println!("  redid {moves} move(s)"),
        CommandResponse::Committed(cycle) => {
            write_move_list(export_path, &cycle.report)?;
            println!(
                "  cycle {} committed ({} move(s), {}), move list written to {}",
                cycle.cycle,
                cycle.moves.len(),
                cycle.depletion,
                export_path.display()
            );
        }
        CommandResponse::Exported { text } => {
            write_move_list(export_path, text)?;
            print!("{text}");
        }
        CommandResponse::Reshaped { shape } => println!("  now editing {shape}"),
        CommandResponse::Shown { text } => print!("{text}"),
    }
    Ok(())
}

fn run(options: &Options) -> Result<(), ShuffleError> {
    let config = match &options.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    let export_path = options
        .export
        .clone()
        .unwrap_or_else(|| config.export_path());
    let mut session = Session::from_config(&config)?;

    let input: Box<dyn BufRead> = match &options.script {
        Some(path) => Box::new(BufReader::new(fs::File::open(path).map_err(|e| {
            ShuffleError::internal(format!("cannot open {}: {e}", path.display()))
        })?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    for (number, line) in input.lines().enumerate() {
        let line = line.map_err(|e| ShuffleError::internal(format!("cannot read script: {e}")))?;
        let command = match Command::parse_line(&line, session.shape()) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("line {}: {e}", number + 1);
                continue;
            }
        };
        println!("> {}", line.trim());
        match session.execute(command) {
            Ok(response) => report(&session, &response, &export_path)?,
            Err(e) if e.is_recoverable() => eprintln!("line {}: {e}", number + 1),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let options = parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}
