use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fern_core::config::{SiteConfig, load_site_config};
use fern_core::model::{DiagnosticLevel, OUTPUT_EXT};
use fern_core::site::build_site;

use fern_cli::serve;

#[derive(Debug, Parser)]
#[command(name = "fern_cli")]
struct Cli {
    #[arg(long = "source-dir", short = 's', global = true)]
    source_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Build the site from fern.yaml.")]
    Build {
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
        #[arg(long)]
        preview: bool,
        #[arg(long, default_value = "127.0.0.1", requires = "preview")]
        preview_host: String,
        #[arg(long, default_value_t = 8080, requires = "preview")]
        preview_port: u16,
        #[arg(long, requires = "preview")]
        preview_no_open: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Command::Build {
            out,
            preview,
            preview_host,
            preview_port,
            preview_no_open,
        } => run_build(
            &cli,
            out.as_ref(),
            *preview,
            preview_host,
            *preview_port,
            *preview_no_open,
        ),
    }
}

fn run_build(
    cli: &Cli,
    out: Option<&PathBuf>,
    preview: bool,
    preview_host: &str,
    preview_port: u16,
    preview_no_open: bool,
) -> Result<()> {
    let root = root_dir(cli)?;
    let config_path = root.join("fern.yaml");
    let mut config = load_site_config(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    if let Some(out) = out {
        config.out_dir = out.to_string_lossy().into_owned();
    }

    let report = match build_site(&root, &config) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(err.exit_code());
        }
    };

    for diag in &report.diagnostics {
        let label = match diag.level {
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Error => "error",
        };
        match &diag.source_path {
            Some(path) => eprintln!("{label}: {path}: {}", diag.message),
            None => eprintln!("{label}: {}", diag.message),
        }
    }
    println!("pages: {}", report.pages);
    println!("generated: {}", report.generated);
    println!("out: {}", report.out_dir.display());

    if preview {
        serve::run_serve(serve::ServeOpts {
            out_dir: report.out_dir,
            host: preview_host.to_string(),
            port: preview_port,
            no_open: preview_no_open,
            index: home_out_name(&config),
        })?;
    }
    Ok(())
}

fn home_out_name(config: &SiteConfig) -> String {
    format!("{}.{OUTPUT_EXT}", config.home)
}

fn root_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.source_dir {
        Some(path) => {
            if path.is_absolute() {
                Ok(path.clone())
            } else {
                let cwd = std::env::current_dir().context("failed to read current directory")?;
                Ok(cwd.join(path))
            }
        }
        None => std::env::current_dir().context("failed to read current directory"),
    }
}
