use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tracing_subscriber::EnvFilter;

use srcpatch::stream::{
    OpenFlags, OpenMode, ResourceType, StreamBroker, StreamContext, StreamOption,
};
use srcpatch::transform::{Substitution, SubstitutionTransformer, TransformerRegistry};
use srcpatch::LoadInterceptor;

#[derive(Parser, Debug)]
#[command(author, version, about, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a resource as code, with the registered transformers applied
    Load {
        /// Path (or scheme://path) of the resource to load
        path: String,
        /// Inline substitution rule such as s/old/new/g, repeatable
        #[arg(short, long = "rule")]
        rules: Vec<String>,
        /// JSON file of named transformer definitions
        #[arg(long = "rules")]
        rules_file: Option<PathBuf>,
        /// Capacity of the raw read buffer, in bytes
        #[arg(long)]
        buffer: Option<usize>,
    },
    /// Read a resource as plain data; transformers never apply
    Cat {
        /// Path (or scheme://path) of the resource
        path: String,
    },
    /// Query metadata for a path through the governing handler
    Stat {
        /// Path (or scheme://path) of the resource
        path: String,
        /// Report a failed query as "no metadata" instead of erroring
        #[arg(short, long)]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Load {
            path,
            rules,
            rules_file,
            buffer,
        } => load(&path, &rules, rules_file.as_deref(), buffer),
        Command::Cat { path } => cat(&path),
        Command::Stat { path, quiet } => stat(&path, quiet),
    }
}

fn load(
    path: &str,
    rules: &[String],
    rules_file: Option<&Path>,
    buffer: Option<usize>,
) -> Result<()> {
    let registry = Arc::new(TransformerRegistry::new());
    if let Some(rules_file) = rules_file {
        for transformer in read_rules(rules_file)? {
            registry.register(Arc::new(transformer));
        }
    }
    for (i, rule) in rules.iter().enumerate() {
        let transformer = SubstitutionTransformer::single(format!("rule-{i}"), rule)?;
        registry.register(Arc::new(transformer));
    }

    let streams = StreamBroker::new();
    let interceptor = LoadInterceptor::new(registry);
    interceptor.intercept(&streams)?;

    let ctx = buffer
        .map(|capacity| StreamContext::new().with_option(StreamOption::ReadBuffer(capacity)));
    let mut handle = streams.open(
        path,
        OpenMode::read_only(),
        OpenFlags::CODE_LOAD,
        ctx.as_ref(),
    )?;
    io::copy(&mut handle, &mut io::stdout().lock())
        .with_context(|| format!("failed reading {path}"))?;
    Ok(())
}

fn cat(path: &str) -> Result<()> {
    let streams = StreamBroker::new();
    let interceptor = LoadInterceptor::new(Arc::new(TransformerRegistry::new()));
    interceptor.intercept(&streams)?;

    let mut handle = streams.open(path, OpenMode::read_only(), OpenFlags::empty(), None)?;
    io::copy(&mut handle, &mut io::stdout().lock())
        .with_context(|| format!("failed reading {path}"))?;
    Ok(())
}

fn stat(path: &str, quiet: bool) -> Result<()> {
    let streams = StreamBroker::new();
    let interceptor = LoadInterceptor::new(Arc::new(TransformerRegistry::new()));
    interceptor.intercept(&streams)?;

    match streams.url_stat(path, quiet)? {
        Some(stat) => {
            let kind = match stat.resource_type {
                ResourceType::File => "file",
                ResourceType::Directory => "directory",
                ResourceType::Symlink => "symlink",
            };
            println!("path: {path}");
            println!("type: {kind}");
            println!("size: {}", stat.len);
            println!("readonly: {}", stat.readonly);
            if let Some(modified) = stat
                .modified
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            {
                println!("modified: {}", modified.as_secs());
            }
        }
        None => println!("no metadata"),
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Debug)]
struct RulesFile {
    rules: Vec<RuleEntry>,
}

#[derive(Serialize, Deserialize, Debug)]
struct RuleEntry {
    name: String,
    subst: Vec<String>,
}

fn read_rules(path: &Path) -> Result<Vec<SubstitutionTransformer>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open rules file at {}", path.display()))?;
    let RulesFile { rules } = serde_json::from_reader(file)
        .with_context(|| format!("failed to parse rules file at {}", path.display()))?;

    let mut transformers = Vec::with_capacity(rules.len());
    for entry in rules {
        let mut parsed = Vec::with_capacity(entry.subst.len());
        for rule in &entry.subst {
            parsed.push(Substitution::parse(rule).with_context(|| {
                format!("bad rule {rule:?} in transformer {:?}", entry.name)
            })?);
        }
        transformers.push(SubstitutionTransformer::new(entry.name, parsed));
    }
    Ok(transformers)
}
