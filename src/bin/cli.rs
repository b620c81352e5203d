//! cfkv CLI
//!
//! Command-line interface for inspecting and editing a cfkv store directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cfkv::{Config, Modification, Storage};
use tracing_subscriber::{fmt, EnvFilter};

/// cfkv CLI
#[derive(Parser, Debug)]
#[command(name = "cfkv")]
#[command(about = "Column-family key-value store tool")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./cfkv_data")]
    data_dir: PathBuf,

    /// Do not fsync on commit
    #[arg(long)]
    no_sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// Column family
        cf: String,

        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// Column family
        cf: String,

        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Delete {
        /// Column family
        cf: String,

        /// The key to delete
        key: String,
    },

    /// List the pairs of a column family in key order
    Scan {
        /// Column family
        cf: String,

        /// Start at this key (inclusive)
        #[arg(long)]
        from: Option<String>,

        /// Stop after this many pairs
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Dump a column family to a batch file
    Export {
        /// Column family
        cf: String,

        /// Output file
        file: PathBuf,
    },

    /// Apply a batch file atomically
    Import {
        /// Input file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    // Logs go to stderr so command output stays clean on stdout
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> cfkv::Result<()> {
    tracing::debug!("cfkv v{}", cfkv::VERSION);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .sync_on_commit(!args.no_sync)
        .build();

    let storage = Storage::open(config)?;
    storage.start()?;

    let result = execute(&storage, args.command);
    storage.stop()?;
    result
}

fn execute(storage: &Storage, command: Commands) -> cfkv::Result<()> {
    match command {
        Commands::Get { cf, key } => {
            let mut reader = storage.new_reader()?;
            match reader.get(&cf, key.as_bytes())? {
                Some(value) => println!("{}", String::from_utf8_lossy(&value)),
                None => println!("(not found)"),
            }
            reader.close();
        }
        Commands::Put { cf, key, value } => {
            storage.write_batch([Modification::put(cf, key, value)])?;
            println!("OK");
        }
        Commands::Delete { cf, key } => {
            storage.write_batch([Modification::delete(cf, key)])?;
            println!("OK");
        }
        Commands::Scan { cf, from, limit } => {
            let mut reader = storage.new_reader()?;
            let start = from.unwrap_or_default();
            for pair in reader.iter_from(&cf, start.as_bytes())?.take(limit.unwrap_or(usize::MAX)) {
                let (key, value) = pair?;
                println!(
                    "{}\t{}",
                    String::from_utf8_lossy(&key),
                    String::from_utf8_lossy(&value)
                );
            }
            reader.close();
        }
        Commands::Export { cf, file } => {
            let count = storage.export_cf(&cf, &file)?;
            println!("exported {} pairs to {}", count, file.display());
        }
        Commands::Import { file } => {
            let count = storage.apply_batch_file(&file)?;
            println!("applied {} modifications", count);
        }
    }
    Ok(())
}
