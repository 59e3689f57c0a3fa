//! CLI support: parses a query and a JSON document from the flags `main.rs` collects, runs it,
//! and writes the rendered result.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use crate::error::QueryError;
use crate::gardenwall::{from_json, to_json};
use crate::instance::Instance;

#[derive(Debug)]
pub enum CliError {
    Query(QueryError),
    Json(serde_json::Error),
    Io(io::Error),
    ConflictingDataSource,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Query(e) => write!(f, "{e}"),
            CliError::Json(e) => write!(f, "invalid JSON: {e}"),
            CliError::Io(e) => write!(f, "IO error: {e}"),
            CliError::ConflictingDataSource => {
                write!(f, "--data and --file cannot both be given — pick one, or pipe JSON on stdin")
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Query(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::ConflictingDataSource => None,
        }
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        CliError::Query(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

pub struct Options {
    pub query: String,
    pub data: Option<String>,
    pub file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub pretty: bool,
}

/// Run one query against the JSON document named by `options`, writing the rendered result to
/// `options.output` (or stdout) and returning the same text to the caller.
pub fn execute(options: Options) -> Result<String, CliError> {
    if options.data.is_some() && options.file.is_some() {
        return Err(CliError::ConflictingDataSource);
    }

    let raw = read_input(&options)?;
    let json: serde_json::Value = serde_json::from_slice(&raw)?;
    let input = from_json(&json);

    let instance = Instance::new();
    let result = instance.query(&options.query, input)?;
    let result_json = to_json(&result).map_err(QueryError::from)?;

    let rendered = if options.pretty {
        serde_json::to_string_pretty(&result_json)?
    } else {
        serde_json::to_string(&result_json)?
    };

    match &options.output {
        Some(path) => fs::write(path, &rendered)?,
        None => writeln!(io::stdout(), "{rendered}")?,
    }

    Ok(rendered)
}

/// All input paths read raw bytes, not text: the document may be binary-adjacent JSON (e.g.
/// UTF-8 with a BOM) and `serde_json` is the one that decides whether it's well-formed.
fn read_input(options: &Options) -> Result<Vec<u8>, CliError> {
    if let Some(data) = &options.data {
        return Ok(data.clone().into_bytes());
    }
    if let Some(path) = &options.file {
        return Ok(fs::read(path)?);
    }
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer)?;
    Ok(buffer)
}
