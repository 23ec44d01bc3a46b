use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;

use clap::{App, Arg, ArgMatches};
use slog::{o, Discard, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

use synacor::{
    disassembler::write_listing,
    emulator::{Config, Emulator, ReturnPolicy, StdIo},
    error::{Fault, LoadError, ParseError},
    image::Image,
    memory::{Memory, Patch},
    parsing::parse_u16,
    tools::teleporter::teleporter_patches,
};

enum Error {
    Parse(ParseError),
    Load(LoadError),
    Execution(Fault),
    IO(io::Error),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::IO(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Error {
        Error::Parse(e)
    }
}

impl From<LoadError> for Error {
    fn from(e: LoadError) -> Error {
        Error::Load(e)
    }
}

impl From<Fault> for Error {
    fn from(e: Fault) -> Error {
        Error::Execution(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "Parse error: {}", e),
            Error::Load(e) => write!(f, "Load error: {}", e),
            Error::Execution(e) => write!(f, "Execution error: {}", e),
            Error::IO(e) => write!(f, "IO error: {}", e),
        }
    }
}

fn parse_arguments() -> ArgMatches<'static> {
    App::new("synrun")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Mitja Karhusaari <mitja@karhusaari.me>")
        .about("Utility for executing and disassembling Synacor challenge images")
        .arg(Arg::with_name("image")
             .help("File containing the binary image")
             .value_name("IMAGE")
             .required(true)
             .index(1))
        .arg(Arg::with_name("base")
             .help("Address at which the image is loaded")
             .long("base")
             .value_name("ADDRESS")
             .takes_value(true))
        .arg(Arg::with_name("patch")
             .help("Writes VALUE into a memory cell or register before the run")
             .long("patch")
             .short("p")
             .value_name("ADDRESS=VALUE")
             .takes_value(true)
             .multiple(true)
             .number_of_values(1))
        .arg(Arg::with_name("teleporter")
             .help("Starts with register 7 set to R7 and its validation disabled")
             .long("teleporter")
             .value_name("R7")
             .takes_value(true))
        .arg(Arg::with_name("halt-on-empty-ret")
             .help("Halts instead of faulting when ret finds an empty stack")
             .long("halt-on-empty-ret"))
        .arg(Arg::with_name("disassemble")
             .help("Writes a disassembly listing instead of running the image")
             .long("disassemble")
             .short("d"))
        .arg(Arg::with_name("from")
             .help("First address to disassemble")
             .long("from")
             .value_name("ADDRESS")
             .takes_value(true)
             .requires("disassemble"))
        .arg(Arg::with_name("to")
             .help("Address at which disassembly stops")
             .long("to")
             .value_name("ADDRESS")
             .takes_value(true)
             .requires("disassemble"))
        .arg(Arg::with_name("output")
             .help("File to write the listing to")
             .long("output")
             .short("o")
             .value_name("FILE")
             .takes_value(true)
             .requires("disassemble"))
        .arg(Arg::with_name("verbose")
             .help("Enables verbose logging")
             .long("verbose")
             .short("v"))
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

fn number_of(args: &ArgMatches, name: &str) -> Result<Option<u16>, ParseError> {
    args.value_of(name).map(parse_u16).transpose()
}

fn main() {
    let args = parse_arguments();

    if let Err(err) = run(&args) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn run(args: &ArgMatches) -> Result<(), Error> {
    let logger = build_logger(args.is_present("verbose"));

    let file_path = args.value_of("image").unwrap_or_default();
    let image = Image::parse(&std::fs::read(file_path)?);

    let base = number_of(args, "base")?.unwrap_or(0) as usize;
    let mut memory = Memory::new();
    memory.load(base, &image)?;

    if args.is_present("disassemble") {
        let from = number_of(args, "from")?.map(usize::from).unwrap_or(base);
        let to = number_of(args, "to")?
            .map(usize::from)
            .unwrap_or(base + image.len());

        match args.value_of("output") {
            Some(path) => {
                write_listing(memory.words(), from..to, BufWriter::new(File::create(path)?))?;
            }
            None => {
                let stdout = io::stdout();
                write_listing(memory.words(), from..to, stdout.lock())?;
            }
        }

        return Ok(());
    }

    let mut patches = Vec::new();

    if let Some(r7) = number_of(args, "teleporter")? {
        patches.extend(teleporter_patches(r7));
    }

    if let Some(values) = args.values_of("patch") {
        for value in values {
            patches.push(value.parse::<Patch>()?);
        }
    }

    let empty_return = if args.is_present("halt-on-empty-ret") {
        ReturnPolicy::Halt
    } else {
        ReturnPolicy::Fault
    };

    let mut emulator = Emulator::with_logger(memory, StdIo::new(), logger)
        .with_config(Config { empty_return });

    emulator.patch(&patches)?;

    let result = emulator.run();
    io::stdout().flush()?;
    result?;

    Ok(())
}
