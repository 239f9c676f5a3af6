//! Writers for a cleaned comment table: one CSV, and optionally one text file per body.

use crate::clean::CleanTable;
use crate::error::{HarvestError, Result};
use crate::models::CommentTable;
use crate::progress::ProgressScope;
use crate::util::elapsed_secs;
use regex::Regex;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;

/// Create `dir` (and parents). An existing directory is fine.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        tracing::info!("Folder already exists: {}", dir.display());
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| HarvestError::fs(dir, e))?;
    tracing::info!("Folder: {}", dir.display());
    Ok(())
}

/// Write `clean` as CSV with a header row, columns in table order.
/// The file is written next to its destination and renamed into place once complete;
/// on any failure the partial file is removed.
pub fn save_csv(clean: &CleanTable, dir: &Path, file_name: &str) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(file_name);
    let tmp = dir.join(format!(".{file_name}.part"));

    let written = write_csv(clean.table(), &tmp)
        .and_then(|()| fs::rename(&tmp, &path).map_err(|e| HarvestError::fs(&path, e)));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    tracing::info!("All comments saved in {}", path.display());
    Ok(path)
}

fn write_csv(table: &CommentTable, path: &Path) -> Result<()> {
    let f = File::create(path).map_err(|e| HarvestError::fs(path, e))?;
    let mut w = csv::Writer::from_writer(f);
    let cols = table.columns();
    w.write_record(cols.iter().map(|c| c.name())).map_err(|e| csv_error(path, e))?;
    for row in table.rows() {
        w.write_record(cols.iter().map(|c| c.value(row))).map_err(|e| csv_error(path, e))?;
    }
    w.flush().map_err(|e| HarvestError::fs(path, e))
}

/// Every csv failure while writing is a failure of the file underneath.
fn csv_error(path: &Path, e: csv::Error) -> HarvestError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => HarvestError::fs(path, io),
        other => HarvestError::fs(path, io::Error::new(io::ErrorKind::Other, format!("{other:?}"))),
    }
}

fn is_corpus_file(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.txt$").expect("static regex")).is_match(name)
}

/// Remove `<n>.txt` files left by an earlier run so the corpus matches the CSV.
fn clear_corpus(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir).map_err(|e| HarvestError::fs(dir, e))? {
        let entry = entry.map_err(|e| HarvestError::fs(dir, e))?;
        let path = entry.path();
        if path.is_file() && is_corpus_file(&entry.file_name().to_string_lossy()) {
            fs::remove_file(&path).map_err(|e| HarvestError::fs(&path, e))?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Write each body to `<index>.txt` in `dir`, numbered from 0. Returns the file count.
/// Numbered files already in `dir` are replaced.
pub fn save_corpus(clean: &CleanTable, dir: &Path, progress: bool) -> Result<usize> {
    let t = Instant::now();
    ensure_dir(dir)?;
    let stale = clear_corpus(dir)?;
    if stale > 0 {
        tracing::info!("Removed {stale} corpus file(s) from a previous run");
    }

    let rows = clean.table().rows();
    tracing::info!("Saving {} comments as corpus...", rows.len());

    let pb = ProgressScope::count("Writing corpus", rows.len() as u64, progress);
    for (i, c) in rows.iter().enumerate() {
        let path = dir.join(format!("{i}.txt"));
        fs::write(&path, c.body.as_bytes()).map_err(|e| HarvestError::fs(&path, e))?;
        pb.inc_items(1);
    }
    pb.finish(format!("{} file(s)", rows.len()));

    tracing::info!("Corpus saved as {} txt files; time taken: {} second(s)", rows.len(), elapsed_secs(t));
    Ok(rows.len())
}
