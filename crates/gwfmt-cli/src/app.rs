//! CLI application logic

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use gwfmt_engine::{format_batch, Formatter, StyleConfig};

#[derive(Parser)]
#[command(name = "gwfmt")]
#[command(author, version, about = "House-style formatter for official documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format one or more documents (.docx or .txt)
    Format {
        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Style configuration file (JSON); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Inspect or create style configurations
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration to a file
    Init {
        /// Destination path
        #[arg(default_value = "gwfmt.json")]
        path: PathBuf,
    },
    /// Print the effective configuration
    Show {
        /// Configuration file to load; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Parse arguments and run the selected command
pub fn run_cli() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Format {
            inputs,
            output,
            config,
        } => format_command(&inputs, &output, config.as_deref()),
        Commands::Config { action } => match action {
            ConfigAction::Init { path } => config_init_command(&path),
            ConfigAction::Show { config } => config_show_command(config.as_deref()),
        },
    }
}

/// Format every input into the output directory; one failure does not
/// stop the rest
pub fn format_command(inputs: &[PathBuf], output_dir: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let formatter = Formatter::new(&config);
    let summary = format_batch(&formatter, inputs, output_dir);

    println!(
        "Done: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    );
    for (path, err) in &summary.failures {
        println!("  failed: {} ({err})", path.display());
    }
    if summary.failed > 0 {
        bail!("{} file(s) failed to format", summary.failed);
    }
    Ok(())
}

pub fn config_init_command(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("Refusing to overwrite existing file: {}", path.display());
    }
    StyleConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write configuration: {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

pub fn config_show_command(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    println!("{}", config.to_json_pretty()?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<StyleConfig> {
    match path {
        Some(path) => StyleConfig::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display())),
        None => Ok(StyleConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_init_then_show_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.json");
        config_init_command(&path).unwrap();
        assert!(path.exists());
        // Second init must not clobber
        assert!(config_init_command(&path).is_err());
        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded, StyleConfig::default());
    }

    #[test]
    fn format_command_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.txt");
        fs::write(&good, "标题\n正文。\n").unwrap();
        let bad = dir.path().join("b.pdf");
        fs::write(&bad, "x").unwrap();

        let out = dir.path().join("out");
        let result = format_command(&[good, bad], &out, None);
        assert!(result.is_err());
        assert!(out.join("a_formatted.docx").exists());
    }
}
