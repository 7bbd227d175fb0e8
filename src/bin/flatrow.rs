//! Interactive shell for a flatrow database directory.
//!
//! ```bash
//! flatrow --data-dir ./db
//! flatrow --config flatrow.toml --strict-int-nulls -v
//! ```

use std::{
    io::{BufRead, Write, stdin, stdout},
    path::PathBuf,
};

use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use tracing_subscriber::EnvFilter;

use flatrow_db::{Database, DatabaseConfig, QueryResponse};

#[derive(Parser, Debug)]
#[command(name = "flatrow", version, about = "Shell for a flatrow database")]
struct Args {
    /// Directory holding the table files
    #[arg(short = 'd', long, value_name = "DIR", env = "FLATROW_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not write or reload index files
    #[arg(long)]
    no_persist_indexes: bool,

    /// Reject inserting 0 into INT columns
    #[arg(long)]
    strict_int_nulls: bool,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", env = "FLATROW_LOG_LEVEL")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(false)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();

    init_logging(&args);

    let config = load_config(&args)?;
    let mut db = Database::open(config)?;

    let mut buf = String::new();

    let mut stdin = stdin().lock();
    let mut stdout = stdout().lock();

    loop {
        stdout.write_all(b"flatrow> ").into_diagnostic()?;
        stdout.flush().into_diagnostic()?;

        buf.clear();
        let Ok(read) = stdin.read_line(&mut buf) else {
            return Err(miette!("Input reading failed"));
        };
        if read == 0 {
            break;
        }

        let input = buf.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") {
            break;
        }

        match db.execute_query(input) {
            Ok(response) => print_response(&mut stdout, &response)?,
            Err(err) => {
                let report = miette::Report::new(err).with_source_code(input.to_string());
                println!("{report:?}");
            }
        }
    }

    db.flush()?;
    println!("Exiting flatrow");

    Ok(())
}

fn init_logging(args: &Args) {
    let level = if args.verbose {
        "debug"
    } else {
        &args.log_level
    };

    let filter = EnvFilter::try_new(format!("flatrow_db={level},flatrow={level}"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<DatabaseConfig> {
    let mut config = match &args.config {
        Some(path) => DatabaseConfig::from_file(path)?,
        None => DatabaseConfig::default(),
    };

    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if args.no_persist_indexes {
        config.persist_indexes = false;
    }
    if args.strict_int_nulls {
        config.strict_int_nulls = true;
    }

    Ok(config)
}

fn print_response(out: &mut impl Write, response: &QueryResponse) -> Result<()> {
    match response {
        QueryResponse::Message(message) => {
            writeln!(out, "{message}").into_diagnostic()?;
        }
        QueryResponse::Rows { columns, rows } => {
            write!(out, "{: <8}", "Results").into_diagnostic()?;
            for name in columns {
                write!(out, " | {name: <8}").into_diagnostic()?;
            }
            writeln!(out).into_diagnostic()?;

            for (idx, row) in rows.iter().enumerate() {
                write!(out, "{idx: <8}").into_diagnostic()?;
                for value in &row.values {
                    write!(out, " | {: <8}", value.to_string()).into_diagnostic()?;
                }
                writeln!(out).into_diagnostic()?;
            }

            writeln!(out, "({} row(s))", rows.len()).into_diagnostic()?;
        }
    }

    out.flush().into_diagnostic()
}
