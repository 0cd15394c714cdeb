use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use strand_sdk::Uuid;

#[derive(Parser)]
#[command(name = "strand", about = "Strand - content chains behind registry handles", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to ./strand.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register a handle for the configured identity
    Register(RegisterArgs),
    /// Append an entry to a handle's chain
    Push(PushArgs),
    /// Replace an existing entry's content and metadata
    Replace(ReplaceArgs),
    /// Remove an entry from a handle's chain
    Remove(RemoveArgs),
    /// Show a handle's chain, newest first
    Load(LoadArgs),
    /// Print the object stored at an address
    Cat(CatArgs),
    /// Read or write a handle's profile
    Profile(ProfileArgs),
    /// Read or transfer a handle's ownership
    Owner(OwnerArgs),
}

#[derive(Args)]
pub struct RegisterArgs {
    pub handle: String,
    /// Print the cost without executing
    #[arg(long)]
    pub estimate: bool,
}

/// Entry content, inline or from a file.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct ContentArgs {
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct PushArgs {
    pub handle: String,
    #[command(flatten)]
    pub content: ContentArgs,
    /// Metadata as key=value; values that parse as JSON are kept as JSON
    #[arg(long = "meta", value_parser = parse_meta_pair)]
    pub meta: Vec<(String, Value)>,
    #[arg(long)]
    pub estimate: bool,
}

#[derive(Args)]
pub struct ReplaceArgs {
    pub handle: String,
    pub uuid: Uuid,
    #[command(flatten)]
    pub content: ContentArgs,
    #[arg(long = "meta", value_parser = parse_meta_pair)]
    pub meta: Vec<(String, Value)>,
    #[arg(long)]
    pub estimate: bool,
}

#[derive(Args)]
pub struct RemoveArgs {
    pub handle: String,
    pub uuid: Uuid,
    #[arg(long)]
    pub estimate: bool,
}

#[derive(Args)]
pub struct LoadArgs {
    pub handle: String,
}

#[derive(Args)]
pub struct CatArgs {
    /// Address in scheme://payload form
    pub address: String,
}

#[derive(Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

#[derive(Subcommand)]
pub enum ProfileAction {
    Get {
        handle: String,
    },
    Set {
        handle: String,
        /// Profile document as JSON
        #[arg(value_parser = parse_json)]
        profile: Value,
        #[arg(long)]
        estimate: bool,
    },
}

#[derive(Args)]
pub struct OwnerArgs {
    #[command(subcommand)]
    pub action: OwnerAction,
}

#[derive(Subcommand)]
pub enum OwnerAction {
    Get {
        handle: String,
    },
    Set {
        handle: String,
        owner: String,
        #[arg(long)]
        estimate: bool,
    },
}

fn parse_meta_pair(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, found {s:?}"))?;
    if key.is_empty() {
        return Err(format!("empty metadata key in {s:?}"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn parse_json(s: &str) -> Result<Value, String> {
    serde_json::from_str(s).map_err(|e| e.to_string())
}
