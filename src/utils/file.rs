use std::fs;
use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::config::defs::{PipelineError, URL_REGEX};


/// Lexically normalizes a path against `cwd`: relative paths are joined to it,
/// `.` is dropped and `..` pops a component. Symlinks are not resolved.
///
/// # Arguments
///
/// * `path` - Path as given on the command line.
/// * `cwd` - Directory relative paths are resolved against.
///
/// # Returns
/// Absolute path without `.`/`..` components or a trailing separator.
pub fn absolute_path(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}


/// Splits an output directory into the name of its last component and the
/// absolute prefix leading up to it, e.g. `/a/b/c` -> (`c`, `/a/b/`).
///
/// # Arguments
///
/// * `output_dir` - Output directory, absolute or relative to `cwd`.
/// * `cwd` - Current working directory.
///
/// # Returns
/// (output_dir name, output_prefix)
pub fn split_output_dir(output_dir: &str, cwd: &Path) -> (String, String) {
    let abs = absolute_path(Path::new(output_dir), cwd);
    let abs_str = abs.to_string_lossy().into_owned();

    let name = abs
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = abs_str
        .strip_suffix(name.as_str())
        .unwrap_or(&abs_str)
        .to_string();

    (name, prefix)
}


/// Resolves a reference archive argument. Existing local files win and are
/// returned as absolute paths; otherwise the value must be an HTTP(S) URL.
///
/// # Arguments
///
/// * `name` - Flag name, used in the error message.
/// * `value` - Value given on the command line.
/// * `cwd` - Current working directory.
///
/// # Returns
/// Location to write into the workflow ini.
pub fn resolve_archive_location(name: &'static str, value: &str, cwd: &Path) -> Result<String, PipelineError> {
    let local = absolute_path(Path::new(value), cwd);
    if !value.is_empty() && local.is_file() {
        debug!("{} resolved to local archive {}", name, local.display());
        return Ok(local.to_string_lossy().into_owned());
    }
    if URL_REGEX.is_match(value) {
        debug!("{} resolved to URL {}", name, value);
        return Ok(value.to_string());
    }
    Err(PipelineError::InvalidArchiveLocation {
        name,
        value: value.to_string(),
    })
}


/// Finds the SeqWare run-info directory: first directory matching `pattern` in
/// sorted order. Plain files matching the pattern are passed over.
pub fn find_run_info_dir(pattern: &str) -> Result<PathBuf, PipelineError> {
    let paths = glob::glob(pattern).map_err(|e| PipelineError::InvalidGlob {
        pattern: pattern.to_string(),
        error: e.to_string(),
    })?;

    // unreadable entries are skipped
    paths
        .filter_map(Result::ok)
        .find(|p| p.is_dir())
        .ok_or_else(|| PipelineError::RunInfoNotFound(pattern.to_string()))
}


/// Lists the entries of a directory, sorted by path.
pub fn dir_entries(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    Ok(entries)
}
