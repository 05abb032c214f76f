// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

mod render;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use scale_registry::{LoaderOptions, Registry};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "scale-inspect")]
#[command(author = "naskel.com")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect lookup tables and encode/decode SCALE bytes against them")]
struct Cli {
    /// Loader options (YAML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not pre-register the well-known runtime types
    #[arg(long, global = true)]
    no_builtins: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a lookup table and check every reference resolves
    Validate {
        /// Lookup table (JSON or YAML)
        #[arg(value_name = "TABLE")]
        table: PathBuf,
    },

    /// List registered types
    List {
        #[arg(value_name = "TABLE")]
        table: PathBuf,

        /// Only names containing this text
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show a type's descriptor
    Show {
        #[arg(value_name = "TABLE")]
        table: PathBuf,

        /// Type name or inline type spec
        #[arg(value_name = "TYPE")]
        type_name: String,
    },

    /// Decode hex bytes and print the value as JSON
    Decode {
        #[arg(value_name = "TABLE")]
        table: PathBuf,

        #[arg(value_name = "TYPE")]
        type_name: String,

        /// Input bytes, with or without 0x
        #[arg(value_name = "HEX")]
        hex: String,

        /// Allow trailing bytes and report how many were consumed
        #[arg(long)]
        prefix: bool,
    },

    /// Encode a JSON value and print the bytes as hex
    Encode {
        #[arg(value_name = "TABLE")]
        table: PathBuf,

        #[arg(value_name = "TYPE")]
        type_name: String,

        /// Value as JSON text
        #[arg(value_name = "JSON")]
        json: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("scale_inspect=info,scale_registry=warn"),
        1 => EnvFilter::new("scale_inspect=debug,scale_registry=debug"),
        _ => EnvFilter::new("scale_inspect=trace,scale_registry=trace"),
    };
    fmt().with_env_filter(filter).with_target(false).init();

    let options = loader_options(cli.config.as_deref(), cli.no_builtins)?;

    match cli.command {
        Commands::Validate { table } => cmd_validate(&table, &options),
        Commands::List { table, filter } => cmd_list(&table, &options, filter.as_deref()),
        Commands::Show { table, type_name } => cmd_show(&table, &options, &type_name),
        Commands::Decode {
            table,
            type_name,
            hex,
            prefix,
        } => cmd_decode(&table, &options, &type_name, &hex, prefix),
        Commands::Encode {
            table,
            type_name,
            json,
        } => cmd_encode(&table, &options, &type_name, &json),
    }
}

fn loader_options(config: Option<&Path>, no_builtins: bool) -> anyhow::Result<LoaderOptions> {
    let mut options = match config {
        Some(path) => LoaderOptions::from_yaml_file(path)
            .with_context(|| format!("Failed to read loader options {}", path.display()))?,
        None => LoaderOptions::default(),
    };
    if no_builtins {
        options.builtins = false;
    }
    Ok(options)
}

fn load(table: &Path, options: &LoaderOptions) -> anyhow::Result<Registry> {
    let registry = Registry::from_path_with(table, options)
        .with_context(|| format!("Failed to load lookup table {}", table.display()))?;
    tracing::debug!(types = registry.len(), path = %table.display(), "Loaded lookup table");
    Ok(registry)
}

fn cmd_validate(table: &Path, options: &LoaderOptions) -> anyhow::Result<()> {
    let registry = load(table, options)?;
    registry.validate()?;
    println!(
        "[OK] Lookup table valid: {} ({} types)",
        table.display(),
        registry.len()
    );
    Ok(())
}

fn cmd_list(table: &Path, options: &LoaderOptions, filter: Option<&str>) -> anyhow::Result<()> {
    let registry = load(table, options)?;
    let mut shown = 0;
    for (name, desc) in registry.iter() {
        if !render::name_matches(name, filter) {
            continue;
        }
        println!("{:<40} {}", name, render::summary(desc));
        shown += 1;
    }
    tracing::debug!(shown, total = registry.len(), "Listed types");
    Ok(())
}

fn cmd_show(table: &Path, options: &LoaderOptions, type_name: &str) -> anyhow::Result<()> {
    let registry = load(table, options)?;
    let type_ref = registry.type_ref(type_name)?;
    let desc = registry.resolve(&type_ref)?;
    print!("{}", render::describe(type_name, desc));
    let target = registry.unalias(&type_ref)?;
    if !std::ptr::eq(target, desc) {
        println!("  = {}", target);
    }
    Ok(())
}

fn cmd_decode(
    table: &Path,
    options: &LoaderOptions,
    type_name: &str,
    input: &str,
    prefix: bool,
) -> anyhow::Result<()> {
    let registry = load(table, options)?;
    let bytes = parse_hex(input)?;

    let value = if prefix {
        let (value, used) = registry.decode_prefix(type_name, &bytes)?;
        tracing::info!(consumed = used, remaining = bytes.len() - used, "Decoded prefix");
        value
    } else {
        registry.decode(type_name, &bytes)?
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn cmd_encode(
    table: &Path,
    options: &LoaderOptions,
    type_name: &str,
    json: &str,
) -> anyhow::Result<()> {
    let registry = load(table, options)?;
    let input: serde_json::Value = serde_json::from_str(json).context("Invalid JSON value")?;
    let value = registry.value_from_json(type_name, &input)?;
    let bytes = registry.encode(type_name, &value)?;
    println!("0x{}", hex::encode(bytes));
    Ok(())
}

fn parse_hex(input: &str) -> anyhow::Result<Vec<u8>> {
    let digits = input.trim();
    let digits = digits.strip_prefix("0x").unwrap_or(digits);
    if digits.len() % 2 != 0 {
        bail!("Hex input has an odd number of digits");
    }
    hex::decode(digits).context("Invalid hex input")
}
