// src/utils/ini.rs: SeqWare workflow ini generation

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::cli::Arguments;
use crate::config::defs::{PipelineError, FIXED_INI_PARAMS, TUMOR_BAM_SEPARATOR, WORKFLOW_INI};
use crate::utils::file::{resolve_archive_location, split_output_dir};


/// Flat `key=value` configuration read by `seqware bundle launch --ini`.
/// Keys keep insertion order and may appear only once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowIni {
    entries: Vec<(String, String)>,
}

impl WorkflowIni {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) -> Result<(), PipelineError> {
        if self.get(key).is_some() {
            return Err(PipelineError::DuplicateIniKey(key.to_string()));
        }
        self.entries.push((key.to_string(), value.into()));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Newline-joined lines, no trailing newline.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WorkflowIni {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}


/// Builds the CgpSomaticCore ini from the command line. Archive locations are
/// validated here, so an invalid `--refFrom`/`--bbFrom` aborts before anything
/// touches the disk.
///
/// # Arguments
///
/// * `args` - Parsed command-line arguments.
/// * `cwd` - Directory relative paths are resolved against.
///
/// # Returns
/// WorkflowIni with user keys first, then FIXED_INI_PARAMS.
pub fn build_workflow_ini(args: &Arguments, cwd: &Path) -> Result<WorkflowIni, PipelineError> {
    let (output_dir, output_prefix) = split_output_dir(&args.output_dir, cwd);
    let ref_from = resolve_archive_location("refFrom", &args.ref_from, cwd)?;
    let bb_from = resolve_archive_location("bbFrom", &args.bb_from, cwd)?;

    let mut ini = WorkflowIni::new();
    ini.insert("refFrom", ref_from)?;
    ini.insert("bbFrom", bb_from)?;
    // input files
    ini.insert("tumourAliquotIds", "")?;
    ini.insert("tumourAnalysisIds", "")?;
    ini.insert("tumourBams", args.tumor.join(TUMOR_BAM_SEPARATOR))?;
    ini.insert("controlAnalysisId", "")?;
    ini.insert("controlBam", args.normal.as_str())?;
    // output dir setup
    ini.insert("output_dir", output_dir)?;
    ini.insert("output_prefix", output_prefix)?;

    for (key, value) in FIXED_INI_PARAMS {
        ini.insert(key, *value)?;
    }

    debug!("Workflow ini has {} keys", ini.len());
    Ok(ini)
}


/// Writes `workflow.ini` into `basedir`. An existing file is truncated and
/// rewritten in place, so its mode and owner stay as they were.
///
/// # Arguments
///
/// * `ini` - Rendered configuration.
/// * `basedir` - SeqWare base directory.
///
/// # Returns
/// Path of the written ini.
pub fn write_workflow_ini(ini: &WorkflowIni, basedir: &Path) -> Result<PathBuf, PipelineError> {
    let ini_path = basedir.join(WORKFLOW_INI);

    fs::write(&ini_path, ini.render())?;

    info!("Wrote workflow ini to {}", ini_path.display());
    Ok(ini_path)
}
