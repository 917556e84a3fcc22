//! minirel - interactive SQL shell over the heap storage engine.

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use minirel::catalog::Catalog;
use minirel::executor::SqlExec;
use minirel::sql;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// A miniature relational database engine
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Data directory
    #[arg(short = 'D', long, default_value = "./minirel_data")]
    data_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    std::fs::create_dir_all(&args.data_dir).context("failed to create data directory")?;

    let catalog = Catalog::new(&args.data_dir);
    let mut exec = SqlExec::new(catalog);

    println!("minirel shell, data directory {}", args.data_dir.display());
    println!("quit to end");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("SQL> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query == "quit" {
            break;
        }
        // Report the error and keep accepting statements.
        match sql::parse(query).and_then(|statement| exec.execute(&statement)) {
            Ok(result) => println!("{result}"),
            Err(e) => println!("error: {e:#}"),
        }
    }
    Ok(())
}
