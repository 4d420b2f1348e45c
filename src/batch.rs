//! File and directory conversion

use std::{
    fs,
    io::{self, Cursor},
    path::{Path, PathBuf},
};

use glob::{Pattern, glob};
use log::{info, warn};
use rayon::prelude::*;

use crate::{
    Error, Result,
    decompress_woff1::convert_with_options,
    options::{BatchOptions, ConvertOptions},
};

const WOFF_EXTENSION: &str = "woff";
const SFNT_EXTENSION: &str = "otf";

/// Outcome of converting a directory tree.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output paths that were written
    pub converted: Vec<PathBuf>,
    /// Input paths that could not be converted
    pub failed: Vec<(PathBuf, Error)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The output path used when none is given: `font.woff` becomes `font.otf` next to it.
pub fn default_target(source: &Path) -> PathBuf {
    match source.extension() {
        Some(ext) if ext == WOFF_EXTENSION => source.with_extension(SFNT_EXTENSION),
        _ => {
            let mut name = source.as_os_str().to_owned();
            name.push(".");
            name.push(SFNT_EXTENSION);
            PathBuf::from(name)
        }
    }
}

/// Convert a single WOFF file.
///
/// The font is converted in memory and `target` is only written once the conversion succeeded,
/// so a failed conversion never leaves a partial file behind.
pub fn convert_file(source: &Path, target: &Path, options: &ConvertOptions) -> Result<()> {
    let woff = fs::read(source).map_err(|err| Error::file(source, err))?;

    let mut sfnt = Cursor::new(Vec::with_capacity(woff.len() * 2));
    convert_with_options(&mut Cursor::new(&woff[..]), &mut sfnt, options)?;

    ensure_parent_dir(target)?;
    fs::write(target, sfnt.get_ref()).map_err(|err| Error::file(target, err))?;
    info!(
        "{} -> {} ({} bytes)",
        source.display(),
        target.display(),
        sfnt.get_ref().len()
    );
    Ok(())
}

/// Convert every `.woff` file below `source_dir`, mirroring the tree into `target_dir`.
///
/// Each `a/b/font.woff` becomes `<target_dir>/a/b/font.otf`. Files are converted in parallel, at most
/// `options.jobs` at a time. A failing file does not stop the others; it is recorded in the report.
pub fn convert_dir(
    source_dir: &Path,
    target_dir: &Path,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let sources = find_woff_files(source_dir)?;
    info!(
        "Found {} WOFF files in {}",
        sources.len(),
        source_dir.display()
    );

    let convert_one = |source: PathBuf| {
        let relative = source.strip_prefix(source_dir).unwrap_or(&source);
        let target = target_dir.join(relative).with_extension(SFNT_EXTENSION);
        match convert_file(&source, &target, &options.convert) {
            Ok(()) => Ok(target),
            Err(err) => {
                warn!("{}: {err}", source.display());
                Err((source, err))
            }
        }
    };

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = options.jobs {
        pool = pool.num_threads(jobs);
    }
    let pool = pool
        .build()
        .map_err(|err| Error::Io(io::Error::other(err)))?;
    let results: Vec<_> = pool.install(|| sources.into_par_iter().map(convert_one).collect());

    let mut report = BatchReport::default();
    for result in results {
        match result {
            Ok(target) => report.converted.push(target),
            Err(failure) => report.failed.push(failure),
        }
    }
    Ok(report)
}

fn find_woff_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let dir_str = dir.to_str().ok_or_else(|| {
        Error::file(
            dir,
            io::Error::new(io::ErrorKind::InvalidInput, "path is not valid UTF-8"),
        )
    })?;
    let pattern = format!("{}/**/*.{WOFF_EXTENSION}", Pattern::escape(dir_str));

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| Error::file(parent, err))?;
        }
    }
    Ok(())
}
