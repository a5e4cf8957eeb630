//! respmachine CLI
//!
//! Decode RESP requests from a file or stdin, and encode requests or replies.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use respmachine::protocol::{encode_command, parse_strict_integer};
use respmachine::{Config, Connection, Reply, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// respmachine CLI
#[derive(Parser, Debug)]
#[command(name = "resp-cli")]
#[command(about = "Decode and encode RESP requests and replies")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode pipelined requests and print one line per command
    Decode {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,

        /// Bytes fed to the decoder per read
        #[arg(short, long, default_value = "16384")]
        chunk_size: usize,
    },

    /// Write the multi-bulk encoding of ARGS to stdout
    Encode {
        /// Command arguments
        #[arg(required = true)]
        args: Vec<String>,
    },

    /// Write one encoded reply to stdout
    Reply {
        #[command(subcommand)]
        kind: ReplyKind,
    },
}

#[derive(Subcommand, Debug)]
enum ReplyKind {
    /// +<text>
    Simple { text: String },

    /// -<text>
    Error { text: String },

    /// :<integer>
    Int {
        #[arg(allow_hyphen_values = true, value_parser = parse_int)]
        value: i64,
    },

    /// $<len> <payload>
    Bulk { payload: String },

    /// $-1
    NullBulk,

    /// *<count> followed by bulk strings
    Array { items: Vec<String> },

    /// *-1
    NullArray,
}

fn parse_int(s: &str) -> Result<i64> {
    Ok(parse_strict_integer(s.as_bytes())?)
}

fn main() -> ExitCode {
    // Logs go to stderr, stdout carries protocol bytes
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,respmachine=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Decode { file, chunk_size } => decode(file, chunk_size),
        Commands::Encode { args } => write_stdout(&encode_command(&args)),
        Commands::Reply { kind } => write_stdout(&build_reply(kind).to_bytes()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn decode(file: Option<PathBuf>, chunk_size: usize) -> Result<()> {
    let input: Box<dyn Read> = match file {
        Some(path) => {
            tracing::info!("Decoding {}", path.display());
            Box::new(File::open(path)?)
        }
        None => Box::new(io::stdin().lock()),
    };

    let config = Config::builder().read_buffer_size(chunk_size).build();
    let mut connection = Connection::new(input, &config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut count = 0usize;

    while let Some(args) = connection.read_request()? {
        count += 1;
        write!(out, "{})", count)?;
        for arg in &args {
            write!(out, " \"{}\"", arg.escape_ascii())?;
        }
        writeln!(out)?;
    }

    tracing::info!("Decoded {} commands", count);
    Ok(())
}

fn build_reply(kind: ReplyKind) -> Reply {
    match kind {
        ReplyKind::Simple { text } => Reply::SimpleString(text.into()),
        ReplyKind::Error { text } => Reply::Error(text.into()),
        ReplyKind::Int { value } => Reply::Integer(value),
        ReplyKind::Bulk { payload } => Reply::bulk(payload),
        ReplyKind::NullBulk => Reply::NullBulk,
        ReplyKind::Array { items } => {
            Reply::Array(items.into_iter().map(Reply::bulk).collect())
        }
        ReplyKind::NullArray => Reply::NullArray,
    }
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(bytes)?;
    out.flush()?;
    Ok(())
}
