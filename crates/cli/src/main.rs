//! apidocs-gen CLI
//!
//! Command-line interface for generating API reference documentation from
//! Kubernetes-style OpenAPI v2 specifications.

use anyhow::{bail, Context, Result};
use apidocs_gen_common::{Backend, DocsError, RunOptions};
use apidocs_gen_generator::generate_docs;
use apidocs_gen_parser::ApiReference;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "apidocs-gen")]
#[command(version, about = "Generate API reference docs from OpenAPI v2 specs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the reference documentation
    #[command(after_help = "EXAMPLES:\n  \
        # Single-page HTML from an explicit config.yaml\n  \
        apidocs-gen generate --config-dir ./docs\n\n  \
        # Markdown fragments, ToC generated from extension tags\n  \
        apidocs-gen generate --config-dir ./docs --backend markdown --use-tags\n\n  \
        # Resource-only docs, failing on any spec/config mismatch\n  \
        apidocs-gen generate --config-dir ./docs --build-operations false --allow-errors false")]
    Generate {
        #[command(flatten)]
        run: RunArgs,

        /// Output backend
        #[arg(short, long, value_enum, default_value_t = BackendArg::Html)]
        backend: BackendArg,

        /// Document title (defaults by whether operations are documented)
        #[arg(long)]
        title: Option<String>,

        /// Copyright footer, raw HTML
        #[arg(long)]
        copyright: Option<String>,
    },

    /// Load and index the specs without rendering, then print a summary
    Inspect {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Remove generated output from a config directory
    Clean {
        /// Directory holding config.yaml and the generated output
        #[arg(short, long, default_value = ".")]
        config_dir: PathBuf,
    },
}

/// Options shared by every command that loads the specs
#[derive(Args)]
struct RunArgs {
    /// Directory holding config.yaml, openapi-spec/ and static_includes/
    #[arg(short, long, default_value = ".")]
    config_dir: PathBuf,

    /// Generate the ToC from x-kubernetes extension tags instead of config.yaml
    #[arg(long)]
    use_tags: bool,

    /// Document operations, not just resources
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    build_operations: bool,

    /// Report spec/config mismatches without failing the run
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    allow_errors: bool,

    /// Map short group names onto the names used in operation IDs
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    munge_groups: bool,
}

impl RunArgs {
    fn options(&self) -> RunOptions {
        let mut options = RunOptions::new(&self.config_dir)
            .with_tags(self.use_tags)
            .with_operations(self.build_operations)
            .with_allow_errors(self.allow_errors);
        options.munge_groups = self.munge_groups;
        options
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Html,
    Markdown,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Html => Backend::Html,
            BackendArg::Markdown => Backend::Markdown,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            run,
            backend,
            title,
            copyright,
        } => {
            let mut options = run.options().with_backend(backend.into());
            options.title = title;
            if let Some(copyright) = copyright {
                options.copyright = copyright;
            }
            generate_command(&options)?;
        }
        Commands::Inspect { run } => {
            inspect_command(&run.options(), cli.verbose)?;
        }
        Commands::Clean { config_dir } => {
            clean_command(config_dir)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    // Prefix match: also covers the apidocs_gen_* library crates
    let default = if verbose {
        "apidocs_gen=debug,warn"
    } else {
        "apidocs_gen=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_reference(options: &RunOptions) -> Result<ApiReference> {
    if !options.config_dir.is_dir() {
        bail!(
            "Config directory does not exist: {}",
            options.config_dir.display()
        );
    }
    debug!(
        config_dir = %options.config_dir.display(),
        backend = ?options.backend,
        use_tags = options.use_tags,
        build_operations = options.build_operations,
        "run options"
    );
    println!(
        "{} Loading specs from: {}",
        "→".cyan(),
        options.spec_dir().display()
    );
    ApiReference::load(options).context("Failed to load API reference")
}

fn generate_command(options: &RunOptions) -> Result<()> {
    let reference = load_reference(options)?;
    println!(
        "{} Indexed {} definitions and {} operations",
        "→".cyan(),
        reference.definitions.len(),
        reference.operations.len()
    );

    let backend = match options.backend {
        Backend::Html => "html",
        Backend::Markdown => "markdown",
    };
    println!("{} Writing {} documents", "→".cyan(), backend.yellow());

    let result = generate_docs(&reference, options);
    print_diagnostics(&reference);
    match result {
        Err(DocsError::Diagnostics(count)) => {
            bail!("{} diagnostics reported and --allow-errors is false", count)
        }
        other => other.context("Failed to generate documents")?,
    }

    println!("\n{}", "✓ Generation complete!".green().bold());
    match options.backend {
        Backend::Html => println!(
            "  Output: {}",
            options.build_dir().join("index.html").display()
        ),
        Backend::Markdown => {
            println!("  Fragments: {}", options.includes_dir().display());
            println!("  Manifest: {}", options.manifest_path().display());
        }
    }
    Ok(())
}

fn inspect_command(options: &RunOptions, verbose: bool) -> Result<()> {
    let reference = load_reference(options)?;
    let definitions = &reference.definitions;

    let old = definitions.iter().filter(|(_, d)| d.is_old_version).count();
    let inlined = definitions.iter().filter(|(_, d)| d.is_inlined).count();
    let in_toc = definitions.iter().filter(|(_, d)| d.in_toc).count();
    let unmatched = reference.operations.unmatched().count();

    println!("\n{}", "✓ Load successful!".green().bold());
    println!("\n{}", "API Reference:".bold());
    println!("  Definitions: {}", definitions.len());
    println!("    In ToC: {}", in_toc);
    println!("    Old versions: {}", old);
    println!("    Inlined: {}", inlined);
    println!(
        "  Operations: {} matched, {} unmatched",
        reference.operations.len() - unmatched,
        unmatched
    );

    if verbose {
        println!("\n{}", "Table of Contents:".bold());
        for category in &reference.config.resource_categories {
            println!("  {}", category.name.cyan());
            for resource in &category.resources {
                let status = if resource.definition.is_some() {
                    "✓".green()
                } else {
                    "✗".red()
                };
                println!(
                    "    {} {} {} {}",
                    status, resource.name, resource.version, resource.group
                );
            }
        }
    }

    print_diagnostics(&reference);
    Ok(())
}

fn clean_command(config_dir: PathBuf) -> Result<()> {
    let options = RunOptions::new(config_dir);
    println!(
        "{} Cleaning generated output in: {}",
        "→".cyan(),
        options.config_dir.display()
    );

    for dir in [options.build_dir(), options.includes_dir()] {
        if dir.is_dir() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to remove {}", dir.display()))?;
            println!("  Removed {}", dir.display());
        }
    }
    let manifest = options.manifest_path();
    if manifest.is_file() {
        fs::remove_file(&manifest)
            .with_context(|| format!("Failed to remove {}", manifest.display()))?;
        println!("  Removed {}", manifest.display());
    }

    println!("{}", "✓ Clean complete".green());
    Ok(())
}

fn print_diagnostics(reference: &ApiReference) {
    if reference.diagnostics.is_empty() {
        return;
    }
    println!(
        "\n{} {} diagnostics:",
        "⚠".yellow(),
        reference.diagnostics.len()
    );
    for diagnostic in reference.diagnostics.iter() {
        println!("  {} {}", "•".yellow(), diagnostic);
    }
}
