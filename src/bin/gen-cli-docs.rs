use clap::{Parser, Subcommand};
use clap_markdown::help_markdown;
use std::path::PathBuf;

/// Load-time source rewriting behind a stream protocol
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

fn main() {
    // Print header
    println!("# srcpatch CLI Reference");
    println!();
    println!("This page contains the auto-generated reference documentation for the `srcpatch` command-line interface.");
    println!();

    // Generate and print the markdown using the type parameter
    println!("{}", help_markdown::<Cli>());
}
