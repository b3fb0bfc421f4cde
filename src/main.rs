//! ACH Engine CLI
//!
//! # Usage
//!
//! ```bash
//! ach-engine validate payroll.ach
//! ach-engine entries payroll.ach > entries.csv
//! ach-engine flatten payroll.ach -o flat.ach
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use ach_engine::report::write_entries;
use ach_engine::{EntryIterator, FlattenStrategy, Reader, Result, ValidateOpts, Writer};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "ach-engine", version, about = "Validate, list and flatten NACHA ACH files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse and validate a file, failing on the first error
    Validate {
        file: PathBuf,

        #[command(flatten)]
        relax: Relax,
    },

    /// Write every entry as CSV to stdout
    Entries { file: PathBuf },

    /// Merge compatible batches and write the result
    Flatten {
        file: PathBuf,

        /// Output path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Start a new batch on a trace number collision instead of renumbering
        #[arg(long)]
        split_on_collision: bool,

        #[command(flatten)]
        relax: Relax,
    },
}

/// Checks that may be switched off.
#[derive(Args)]
struct Relax {
    /// Skip service class code agreement between header and control
    #[arg(long)]
    skip_service_class_check: bool,

    /// Allow trace numbers out of ascending order
    #[arg(long)]
    skip_ascending_trace_check: bool,

    /// Allow trace numbers without the ODFI prefix
    #[arg(long)]
    skip_odfi_trace_check: bool,

    /// Skip the entry/addenda count check
    #[arg(long)]
    skip_entry_count_check: bool,
}

impl From<&Relax> for ValidateOpts {
    fn from(relax: &Relax) -> Self {
        ValidateOpts {
            skip_service_class_check: relax.skip_service_class_check,
            skip_ascending_trace_check: relax.skip_ascending_trace_check,
            skip_odfi_trace_check: relax.skip_odfi_trace_check,
            skip_entry_count_check: relax.skip_entry_count_check,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Validate { file, relax } => {
            let ach = Reader::new(open(&file)?).read()?;
            ach.validate_with(ValidateOpts::from(&relax))?;
            println!(
                "{}: ok ({} batches, {} records)",
                file.display(),
                ach.batches().len() + ach.iat_batches().len(),
                ach.record_count()
            );
        }
        Command::Entries { file } => {
            let stdout = io::stdout();
            let totals = write_entries(EntryIterator::new(open(&file)?), stdout.lock())?;
            info!(
                "{} entries, debits {}, credits {}",
                totals.entries, totals.debit, totals.credit
            );
        }
        Command::Flatten {
            file,
            output,
            split_on_collision,
            relax,
        } => {
            let ach = Reader::new(open(&file)?).read()?;
            ach.validate_with(ValidateOpts::from(&relax))?;
            let strategy = if split_on_collision {
                FlattenStrategy::SplitOnCollision
            } else {
                FlattenStrategy::Renumber
            };
            let flat = ach.flatten_with(strategy)?;
            info!(
                "flattened {} batches into {}",
                ach.batches().len() + ach.iat_batches().len(),
                flat.batches().len() + flat.iat_batches().len()
            );
            match output {
                Some(path) => Writer::new(BufWriter::new(File::create(path)?)).write(&flat)?,
                None => Writer::new(io::stdout().lock()).write(&flat)?,
            }
        }
    }
    Ok(())
}
