//! Low-level JSON read/write primitives shared by ingestion and export
//! (spec §4.3 JSON Walker, §8 "byte-identical output under deterministic
//! key ordering").

use crate::bag::Bag;
use crate::error::{CombinerError, Result};
use std::path::Path;

/// Read and parse a JSON file into a [`Bag`].
///
/// Per spec §4.3, non-UTF-8 input yields [`CombinerError::MalformedEncoding`]
/// and invalid JSON yields [`CombinerError::ParseError`] — both locally
/// recoverable; callers skip the file and move on.
pub fn read_json(path: &Path) -> Result<Bag> {
    let bytes = std::fs::read(path).map_err(|source| CombinerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| CombinerError::MalformedEncoding {
        path: path.to_path_buf(),
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|err| CombinerError::ParseError {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
    Ok(Bag(value))
}

/// Serialize a [`Bag`] with stable, sorted object keys and write it to
/// `path`, creating parent directories as needed. `serde_json::Map` is
/// backed by a `BTreeMap` in this workspace (the `preserve_order` feature
/// is not enabled), so iteration — and therefore serialization — order is
/// already key-sorted and deterministic across runs.
pub fn write_json_pretty(path: &Path, bag: &Bag) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| CombinerError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = serde_json::to_string_pretty(bag.as_value()).map_err(|err| CombinerError::ParseError {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    std::fs::write(path, text).map_err(|source| CombinerError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Visit every file under `root` matching `glob` (relative to `root`),
/// attempting [`read_json`] on each and invoking `handler(path, bag)`.
/// Parse/encoding failures are swallowed here per the "single skip-on-parse-
/// failure policy" design note; the caller only sees files that parsed.
pub fn for_each_json(
    root: &Path,
    extension: &str,
    mut handler: impl FnMut(&Path, Bag) -> Result<()>,
) -> Result<Vec<(std::path::PathBuf, CombinerError)>> {
    let mut skipped = Vec::new();
    if !root.exists() {
        return Ok(skipped);
    }
    for entry in walkdir::WalkDir::new(root).into_iter().filter_map(std::result::Result::ok) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(std::ffi::OsStr::to_str) != Some(extension) {
            continue;
        }
        match read_json(path) {
            Ok(bag) => handler(path, bag)?,
            Err(err) if err.is_recoverable() => skipped.push((path.to_path_buf(), err)),
            Err(err) => return Err(err),
        }
    }
    Ok(skipped)
}
