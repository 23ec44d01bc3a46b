use std::fmt;
use std::process;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use slog::{info, o, Discard, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

use synacor::{
    error::ParseError,
    parsing::parse_u16,
    tools::{
        teleporter::{find_key_with_logger, SEEDS},
        vault::{find_path_with_logger, vault_goal, vault_start, VAULT},
    },
};

enum Error {
    Parse(ParseError),
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Error {
        Error::Parse(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("synsolve")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Mitja Karhusaari <mitja@karhusaari.me>")
        .about("Offline solvers for the puzzles of the Synacor challenge")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(Arg::with_name("verbose")
             .help("Enables verbose logging")
             .long("verbose")
             .short("v")
             .global(true))
        .subcommand(SubCommand::with_name("teleporter")
             .about("Searches for the register 7 value accepted by the teleporter")
             .arg(Arg::with_name("row")
                  .help("First argument of the confirmation function")
                  .long("row")
                  .value_name("N")
                  .default_value("4"))
             .arg(Arg::with_name("column")
                  .help("Second argument of the confirmation function")
                  .long("column")
                  .value_name("M")
                  .default_value("1"))
             .arg(Arg::with_name("result")
                  .help("Value the function has to return")
                  .long("result")
                  .value_name("R")
                  .default_value("6")))
        .subcommand(SubCommand::with_name("vault")
             .about("Finds the shortest route carrying the orb to the vault door"))
        .get_matches()
}

fn build_logger(verbose: bool) -> Logger {
    if !verbose {
        return Logger::root(Discard, o!());
    }

    let decorator = TermDecorator::new().stderr().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, o!())
}

fn main() {
    let args = parse_arguments();
    let logger = build_logger(args.is_present("verbose"));

    let result = match args.subcommand() {
        ("teleporter", Some(sub)) => teleporter(sub, logger),
        ("vault", Some(_)) => vault(logger),
        _ => Ok(()),
    };

    if let Err(err) = result {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn teleporter(args: &ArgMatches, logger: Logger) -> Result<(), Error> {
    let number = |name: &str| -> Result<u16, ParseError> {
        parse_u16(args.value_of(name).unwrap_or_default())
    };

    let n = number("row")? as usize;
    let m = number("column")? as usize;
    let result = number("result")?;

    info!(logger, "searching"; "n" => n, "m" => m, "result" => result);

    match find_key_with_logger(SEEDS, n, m, result, logger) {
        Some(key) => println!("r7 = {}", key),
        None => println!("No solution"),
    }

    Ok(())
}

fn vault(logger: Logger) -> Result<(), Error> {
    match find_path_with_logger(&VAULT, &vault_start(), &vault_goal(), logger) {
        Some(path) => {
            println!("Success!");
            println!("{}", path);
        }
        None => println!("No solution"),
    }

    Ok(())
}
