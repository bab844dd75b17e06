//! luaconf-events - inspect how a Lua configuration is seen by deserializers

use clap::{Parser, Subcommand};
use luaconf::{Document, LuaConf, Options, VariantSet};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// luaconf-events - Lua configuration inspection tool
#[derive(Parser)]
#[command(name = "luaconf-events")]
#[command(about = "Print the event stream or JSON form of a Lua configuration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one line per event with its location
    Events {
        /// Lua configuration file
        file: PathBuf,

        /// Install a tag constructor with this name (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Print the configuration as pretty JSON
    Json {
        /// Lua configuration file
        file: PathBuf,

        /// Install a tag constructor with this name (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Events { file, tags } => events_command(&file, tags)?,
        Commands::Json { file, tags } => json_command(&file, tags)?,
    }

    Ok(())
}

fn load(file: &Path, tags: Vec<String>) -> anyhow::Result<Document> {
    let mut conf = LuaConf::new().with_options(Options::from_env());
    if !tags.is_empty() {
        conf = conf.register(VariantSet::new("cli", tags))?;
    }
    Ok(conf.load_file(file)?)
}

fn events_command(file: &Path, tags: Vec<String>) -> anyhow::Result<()> {
    let document = load(file, tags)?;
    for item in document.events() {
        let (event, path) = item?;
        println!("{:<24} {}", path.location(), event);
    }
    Ok(())
}

fn json_command(file: &Path, tags: Vec<String>) -> anyhow::Result<()> {
    let document = load(file, tags)?;
    let value: serde_json::Value = document.deserialize()?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
