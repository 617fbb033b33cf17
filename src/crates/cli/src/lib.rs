pub mod cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Decodes a payload the way a handler would see it and prints it re-encoded.
#[derive(Debug, Parser)]
pub struct CmdDecode {
    #[arg(long, short)]
    config: Vec<String>,
    #[arg(long, short, default_value = "POST")]
    method: String,
    #[arg(long, default_value = "/")]
    path: String,
    #[arg(long = "content-type", short = 't')]
    content_type: Option<String>,
    /// Path parameter as `key=value`; repeatable.
    #[arg(long = "param", short = 'p', value_parser = parse_param)]
    params: Vec<(String, String)>,
    /// Codec for the output. Defaults to the path's extension, then JSON.
    #[arg(long = "output-type", short = 'o')]
    output_type: Option<String>,
    /// Body source; stdin when omitted.
    file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Decode(CmdDecode),
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}
