//! Command-line argument parsing.

use anyhow::{anyhow, bail, Context, Result};
use harvest_core::{BrowserEngineKind, RunRequest};
use std::io::Read;
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: harvest [OPTIONS] [REQUEST]

REQUEST is a JSON object such as
  {\"query\": \"acme corp; widgets inc\", \"limit\": 10, \"minDelay\": 2, \"maxDelay\": 5,
   \"timeout\": 30000, \"retries\": 3}
or a bare query string. Reads stdin when REQUEST is '-' or missing.

Progress is written to stdout as server-sent-event frames.

Options:
  --results <PATH>    Write the final results snapshot as JSON
  --config <PATH>     Load configuration from PATH instead of the default location
  --engine <ENGINE>   Browser engine: chromium or http
  -h, --help          Show this help
  -V, --version       Show the version
";

/// Where the request body comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSource {
    Stdin,
    Inline(String),
}

/// Options for one scrape invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub request: RequestSource,
    pub results_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub engine: Option<BrowserEngineKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Run(CliArgs),
    Help,
    Version,
}

/// Parse arguments, excluding the program name.
pub fn parse_args<I>(args: I) -> Result<CliCommand>
where
    I: IntoIterator<Item = String>,
{
    let mut request = None;
    let mut results_path = None;
    let mut config_path = None;
    let mut engine = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "-V" | "--version" => return Ok(CliCommand::Version),
            "--results" => {
                let path = args.next().ok_or_else(|| anyhow!("--results needs a path"))?;
                results_path = Some(PathBuf::from(path));
            }
            "--config" => {
                let path = args.next().ok_or_else(|| anyhow!("--config needs a path"))?;
                config_path = Some(PathBuf::from(path));
            }
            "--engine" => {
                let value = args.next().ok_or_else(|| anyhow!("--engine needs a value"))?;
                let kind = value
                    .parse::<BrowserEngineKind>()
                    .map_err(|e| anyhow!("invalid --engine value: {e}"))?;
                engine = Some(kind);
            }
            flag if flag.starts_with("--") => bail!("unknown option: {flag}"),
            _ if request.is_some() => bail!("unexpected argument: {arg}"),
            "-" => request = Some(RequestSource::Stdin),
            _ => request = Some(RequestSource::Inline(arg)),
        }
    }

    Ok(CliCommand::Run(CliArgs {
        request: request.unwrap_or(RequestSource::Stdin),
        results_path,
        config_path,
        engine,
    }))
}

impl RequestSource {
    /// Read the raw request text.
    pub fn read(&self) -> Result<String> {
        match self {
            Self::Inline(text) => Ok(text.clone()),
            Self::Stdin => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("failed to read request from stdin")?;
                Ok(text)
            }
        }
    }
}

/// Parse request text: a JSON object, or a bare query string.
pub fn parse_request(text: &str) -> Result<RunRequest> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        serde_json::from_str(trimmed).context("request is not valid JSON")
    } else {
        Ok(RunRequest::new(trimmed))
    }
}
