//! Input Collection
//!
//! Lists raw exports in the input folder and decompresses gzip archives
//! into the scratch folder.

use crate::InterfaceError;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const GZIP_SUFFIX: &str = ".csv.gz";
const CSV_SUFFIX: &str = ".csv";

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Sorted `*.csv.gz` and `*.csv` files directly inside `folder`
pub fn list_input_files(folder: &Path) -> Result<Vec<PathBuf>, InterfaceError> {
    if !folder.is_dir() {
        return Err(InterfaceError::InputFolderMissing(folder.to_path_buf()));
    }
    let entries = fs::read_dir(folder).map_err(|e| InterfaceError::io(folder, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| InterfaceError::io(folder, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if is_gzip(&path) || has_suffix(&path, CSV_SUFFIX) {
            files.push(path);
        }
    }
    files.sort();
    info!("Found {} input files in {}", files.len(), folder.display());
    Ok(files)
}

/// Decompress every `.csv.gz` into `scratch`; plain CSV files pass through
///
/// Returns the readable CSV paths in input order.
pub fn extract_archives(files: &[PathBuf], scratch: &Path) -> Result<Vec<PathBuf>, InterfaceError> {
    let mut extracted = Vec::with_capacity(files.len());
    for file in files {
        if !is_gzip(file) {
            extracted.push(file.clone());
            continue;
        }
        let target = scratch.join(stem_name(file));
        decompress(file, &target)?;
        debug!("Extracted {} -> {}", file.display(), target.display());
        extracted.push(target);
    }
    info!("Prepared {} CSV files", extracted.len());
    Ok(extracted)
}

/// Read errors name the archive, write and flush errors name the target
fn decompress(source: &Path, target: &Path) -> Result<(), InterfaceError> {
    let input = File::open(source).map_err(|e| InterfaceError::io(source, e))?;
    let mut decoder = GzDecoder::new(BufReader::new(input));
    let output = File::create(target).map_err(|e| InterfaceError::io(target, e))?;
    let mut writer = BufWriter::new(output);

    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let n = match decoder.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(InterfaceError::io(source, e)),
        };
        writer
            .write_all(&buf[..n])
            .map_err(|e| InterfaceError::io(target, e))?;
    }
    writer.flush().map_err(|e| InterfaceError::io(target, e))?;
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    file_name(path).to_ascii_lowercase().ends_with(suffix)
}

fn is_gzip(path: &Path) -> bool {
    has_suffix(path, GZIP_SUFFIX)
}

/// `name.csv.gz` -> `name.csv`
fn stem_name(path: &Path) -> String {
    let name = file_name(path);
    name[..name.len() - ".gz".len()].to_string()
}
