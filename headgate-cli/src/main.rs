use clap::Parser;
use std::cell::RefCell;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use headgate_net::{
    NotifyingParser, ParseError, ParserConfig, RequestDescriptor, RequestHeaderParser,
};
use tracing_subscriber::EnvFilter;

/// Feeds a captured request through the header parser and prints the result.
#[derive(Debug, Parser)]
#[command(name = "headgate")]
struct Cli {
    /// Raw request bytes; read from stdin when omitted.
    input: Option<PathBuf>,
    /// Bytes handed to the parser per feed call.
    #[arg(long = "chunk-size", default_value_t = 512)]
    chunk_size: usize,
    /// TOML parser configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides `max_header_bytes` from the configuration.
    #[arg(long = "max-header-bytes")]
    max_header_bytes: Option<usize>,
}

enum Outcome {
    Headers(RequestDescriptor, Vec<u8>),
    Error(ParseError),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("headgate: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, String> {
    let mut config = match &cli.config {
        Some(path) => ParserConfig::load(path).map_err(|err| err.to_string())?,
        None => ParserConfig::default(),
    };
    if let Some(max_header_bytes) = cli.max_header_bytes {
        config.max_header_bytes = max_header_bytes;
    }
    if cli.chunk_size == 0 {
        return Err("--chunk-size must be greater than zero".to_string());
    }
    let session = RequestHeaderParser::with_config(config).map_err(|err| err.to_string())?;

    let input = read_input(cli.input.as_deref())?;
    let outcome = RefCell::new(None);

    let mut parser = NotifyingParser::new(session);
    parser.on_headers(|request, leftover| {
        *outcome.borrow_mut() = Some(Outcome::Headers(request, leftover));
    });
    parser.on_error(|error| *outcome.borrow_mut() = Some(Outcome::Error(error)));

    for chunk in input.chunks(cli.chunk_size) {
        parser.feed(chunk);
        if parser.is_finished() {
            break;
        }
    }
    drop(parser);

    match outcome.into_inner() {
        Some(Outcome::Headers(request, leftover)) => {
            print_request(&request, &leftover);
            Ok(ExitCode::SUCCESS)
        }
        Some(Outcome::Error(error)) => {
            println!("error: {} (status {})", error, error.status());
            println!("session: {}", error.session);
            Ok(ExitCode::from(1))
        }
        None => {
            println!("incomplete: no end of header block in {} bytes", input.len());
            Ok(ExitCode::from(2))
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>, String> {
    match path {
        Some(path) => std::fs::read(path).map_err(|err| format!("{}: {err}", path.display())),
        None => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|err| err.to_string())?;
            Ok(buffer)
        }
    }
}

fn print_request(request: &RequestDescriptor, leftover: &[u8]) {
    println!("method: {}", request.method);
    println!("uri: {}", request.uri);
    println!("version: {}", request.version);
    for (name, values) in request.headers.iter() {
        for value in values {
            println!("header: {name}: {value}");
        }
    }
    println!("leftover: {} bytes", leftover.len());
}
