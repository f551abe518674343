// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use ncf::{
    config::NcfConfig,
    generate::generate_technique_content,
    hook::{get_hooks, Hooks, Phase},
    metadata::{parse_technique_metadata, MetadataRecord},
    method_call::parse_technique_methods_str,
    path::default_config_path,
    scan::Scanner,
    store::TechniqueStore,
    validate::add_default_values_technique_metadata,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
    process::exit,
};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "ncf [options] <ncf-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        match self.command {
            Command::GenericMethods(opts) => run_generic_methods(config, opts),
            Command::Techniques(opts) => run_techniques(config, opts),
            Command::Generate(opts) => run_generate(opts),
            Command::Write(opts) => run_write(config, opts),
            Command::Delete(opts) => run_delete(config, opts),
            Command::Hooks(opts) => run_hooks(config, opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List metadata of every generic method.
    #[command(override_usage = "ncf generic-methods [options]")]
    GenericMethods(ListOptions),

    /// List metadata of every technique.
    #[command(override_usage = "ncf techniques [options]")]
    Techniques(ListOptions),

    /// Print canonical policy text of technique file.
    #[command(override_usage = "ncf generate [options] <file>")]
    Generate(GenerateOptions),

    /// Write technique file into tree.
    #[command(override_usage = "ncf write [options] <file>")]
    Write(WriteOptions),

    /// Delete technique from tree.
    #[command(override_usage = "ncf delete [options] <bundle_name>")]
    Delete(DeleteOptions),

    /// List hooks matching phase and action pattern.
    #[command(override_usage = "ncf hooks [options] <phase> <action_pattern>")]
    Hooks(HooksOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ListOptions {
    /// Second root to scan besides the tree.
    #[arg(short, long, value_name = "dir")]
    pub alt_path: Option<PathBuf>,

    /// Only list file paths.
    #[arg(short, long)]
    pub files: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct GenerateOptions {
    /// Technique file to read.
    #[arg(required = true, value_name = "file")]
    pub file: PathBuf,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct WriteOptions {
    /// Technique file to import.
    #[arg(required = true, value_name = "file")]
    pub file: PathBuf,

    /// Tree root to write into instead of the configured tree.
    #[arg(short, long, value_name = "root")]
    pub path: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct DeleteOptions {
    /// Bundle name of technique to delete.
    #[arg(required = true, value_name = "bundle_name")]
    pub bundle_name: String,

    /// Tree root to delete from instead of the configured tree.
    #[arg(short, long, value_name = "root")]
    pub path: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct HooksOptions {
    /// Phase of hooks, either "pre" or "post".
    #[arg(required = true, value_name = "phase")]
    pub phase: Phase,

    /// Regular expression matching hook actions.
    #[arg(required = true, value_name = "action_pattern")]
    pub action_pattern: String,
}

#[derive(Debug, Serialize)]
struct GenericMethodListing {
    generic_method: Vec<MetadataRecord>,
}

#[derive(Debug, Serialize)]
struct TechniqueListing {
    technique: Vec<MetadataRecord>,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn load_config(path: Option<&Path>) -> Result<NcfConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        debug!("no configuration at {:?}, use defaults", path.display());
        return Ok(NcfConfig::try_default()?);
    }

    let data = read_to_string(&path)
        .with_context(|| format!("failed to read configuration at {:?}", path.display()))?;
    let config = data
        .parse::<NcfConfig>()
        .with_context(|| format!("failed to parse configuration at {:?}", path.display()))?;

    Ok(config)
}

fn run_generic_methods(config: NcfConfig, opts: ListOptions) -> Result<()> {
    let scanner = Scanner::new(config.settings.tree_dir());
    let alt_path = opts.alt_path.or(config.settings.alt_path);

    if opts.files {
        for path in scanner.get_all_generic_methods_filenames(alt_path.as_deref())? {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let listing = GenericMethodListing {
        generic_method: scanner.get_all_generic_methods_metadata(alt_path.as_deref())?,
    };
    print!("{}", toml::ser::to_string_pretty(&listing)?);

    Ok(())
}

fn run_techniques(config: NcfConfig, opts: ListOptions) -> Result<()> {
    let scanner = Scanner::new(config.settings.tree_dir());
    let alt_path = opts.alt_path.or(config.settings.alt_path);

    if opts.files {
        for path in scanner.get_all_techniques_filenames(alt_path.as_deref())? {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let listing = TechniqueListing {
        technique: scanner.get_all_techniques_metadata(alt_path.as_deref())?,
    };
    print!("{}", toml::ser::to_string_pretty(&listing)?);

    Ok(())
}

fn run_generate(opts: GenerateOptions) -> Result<()> {
    let record = read_technique(&opts.file)?;
    let record = add_default_values_technique_metadata(record);
    print!("{}", generate_technique_content(&record)?);

    Ok(())
}

fn run_write(config: NcfConfig, opts: WriteOptions) -> Result<()> {
    let record = read_technique(&opts.file)?;
    let root = opts.path.unwrap_or_else(|| config.settings.tree_dir());
    let store = TechniqueStore::new(root, Hooks::new(config.settings.hooks_dir()));
    let path = store.write_technique(&record)?;
    println!("{}", path.display());

    Ok(())
}

fn run_delete(config: NcfConfig, opts: DeleteOptions) -> Result<()> {
    let root = opts.path.unwrap_or_else(|| config.settings.tree_dir());
    let store = TechniqueStore::new(root, Hooks::new(config.settings.hooks_dir()));
    store.delete_technique(&opts.bundle_name)?;

    Ok(())
}

fn run_hooks(config: NcfConfig, opts: HooksOptions) -> Result<()> {
    for hook in get_hooks(opts.phase, &opts.action_pattern, config.settings.hooks_dir())? {
        println!("{hook}");
    }

    Ok(())
}

fn read_technique(path: &Path) -> Result<MetadataRecord> {
    let content = read_to_string(path)
        .with_context(|| format!("failed to read technique at {:?}", path.display()))?;
    let calls = parse_technique_methods_str(&content)
        .with_context(|| format!("failed to parse method calls of {:?}", path.display()))?;
    let record = parse_technique_metadata(&content)
        .with_context(|| format!("failed to parse metadata of {:?}", path.display()))?;

    Ok(record.with("method_calls", calls))
}
