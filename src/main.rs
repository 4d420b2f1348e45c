use std::path::PathBuf;

use anyhow::{Context, Result, bail, ensure};
use clap::Parser;
use unwoff::{BatchOptions, ConvertOptions, convert_dir, convert_file, default_target};

/// Convert WOFF fonts back into OpenType/TrueType files.
#[derive(Parser)]
#[command(name = "unwoff", version)]
struct Cli {
    /// A .woff file, or a directory searched recursively for .woff files
    source: PathBuf,
    /// Output file or directory. Defaults to the source with a .otf extension,
    /// or to the source directory itself
    target: Option<PathBuf>,
    /// Number of files converted in parallel in directory mode
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Accept files whose signature is not `wOFF`
    #[arg(long)]
    lenient: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let convert = if cli.lenient {
        ConvertOptions::lenient()
    } else {
        ConvertOptions::default()
    };

    if cli.source.is_dir() {
        let target = cli.target.unwrap_or_else(|| cli.source.clone());
        ensure!(
            !target.exists() || target.is_dir(),
            "{} is not a directory",
            target.display()
        );

        let options = BatchOptions {
            convert,
            jobs: cli.jobs,
        };
        let report = convert_dir(&cli.source, &target, &options)
            .with_context(|| format!("Failed to scan {}", cli.source.display()))?;
        for (path, err) in &report.failed {
            eprintln!("{}: {err}", path.display());
        }
        println!(
            "{} succeeded, {} failed",
            report.converted.len(),
            report.failed.len()
        );
        if !report.all_succeeded() {
            bail!("{} of {} files failed", report.failed.len(), report.total());
        }
    } else {
        let target = cli.target.unwrap_or_else(|| default_target(&cli.source));
        convert_file(&cli.source, &target, &convert)
            .with_context(|| format!("Failed to convert {}", cli.source.display()))?;
    }
    Ok(())
}
