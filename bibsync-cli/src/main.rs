#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]

use std::{error, path::PathBuf, process};

mod config;

use clap::Parser;
use log::trace;

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err}");
        process::exit(2);
    }
}

fn try_main() -> Result<(), Box<dyn error::Error>> {
    let Cli {
        dois,
        config,
        verbosity,
        quiet,
    } = Cli::parse();

    setup_errlog(usize::from(verbosity), quiet)?;

    trace!("Loading configuration from '{}'", config.display());
    let config = config::Config::load(&config)?;

    let summary = bibsync::sync(&config.notion_token, &config.database_id, &dois);
    println!("{summary}");
    Ok(())
}

fn setup_errlog(verbosity: usize, quiet: bool) -> Result<(), Box<dyn error::Error>> {
    // if quiet then ignore verbosity but still show errors
    let verbosity = if quiet { 1 } else { verbosity + 2 };

    stderrlog::new().verbosity(verbosity).init()?;
    Ok(())
}

#[derive(Parser)]
#[clap(name = "bibsync")]
#[clap(about = "Synchronize a Notion reference database with metadata resolved from DOIs")]
#[clap(version, author)]
struct Cli {
    /// DOIs, or DOI URLs, of references to add to the database
    dois: Vec<String>,

    /// The name of the YAML configuration file
    #[clap(short, long, parse(from_os_str), default_value = "config.yml")]
    config: PathBuf,

    /// How chatty the program is when performing commands
    ///
    /// The number of times this flag is used will increase how chatty
    /// the program is.
    #[clap(short, long, parse(from_occurrences))]
    verbosity: u8,

    /// Prevents the program from writing to stdout, errors will still be printed to stderr.
    #[clap(short, long)]
    quiet: bool,
}
