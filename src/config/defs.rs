use std::path::PathBuf;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use crate::cli::Arguments;

// External software
pub const SEQWARE_TAG: &str = "seqware";
pub const MKDIR_TAG: &str = "mkdir";
pub const CHOWN_TAG: &str = "chown";
pub const MV_TAG: &str = "mv";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeqwareSubcommand {
    BundleLaunch,
}

// Static Filenames
pub const WORKFLOW_INI: &str = "workflow.ini";
pub const WORKFLOW_NAME: &str = "CgpSomaticCore";
pub const SEQWARE_ENGINE: &str = "whitestar-parallel";

// Defaults for the injectable environment
pub const DEFAULT_OUTPUT_DIR: &str = "/output/";
pub const DEFAULT_SEQWARE_BASEDIR: &str = "/home/seqware/CGP-Somatic-Docker";
pub const DEFAULT_WORKFLOW_VERSION: &str = "0.0.0";
pub const DEFAULT_SEQWARE_VERSION: &str = "1.1.1";
pub const DEFAULT_ESCALATE_BIN: &str = "sudo";
pub const DEFAULT_SEQWARE_USER: &str = "seqware";
pub const DEFAULT_RUN_INFO_GLOB: &str = "/datastore/oozie-*";

pub const TUMOR_BAM_SEPARATOR: &str = ":";


// Static Parameters
// Resource sizing for workflow/config/CgpSomaticCore.ini; never varies by input.
pub const FIXED_INI_PARAMS: &[(&str, &str)] = &[
    // clean up
    ("cleanup", "false"),
    ("cleanupBams", "false"),
    // basic setup
    ("coresAddressable", "24"),
    ("memHostMbAvailable", "108000"),
    ("study-refname-override", ""),
    ("analysis-center-override", ""),
    ("assembly", "GRCh37"),
    ("species", "human"),
    ("seqType", "WGS"),
    ("gender", "L"),
    ("refExclude", "MT,GL%,hs37d5,NC_007605"),
    // generic
    ("memWorkflowOverhead", "3000"),
    ("memMarkTime", "4000"),
    ("memGenotype", "4000"),
    ("memContam", "4000"),
    ("memQcMetrics", "4000"),
    ("memGetTbi", "4000"),
    ("memGenerateBasFile", "4000"),
    ("memPackageResults", "4000"),
    // qc
    ("contamDownSampOneIn", "25"),
    // battenberg
    ("memUnpack", "4000"),
    ("memBbMerge", "4000"),
    // ascat
    ("memAlleleCount", "4000"),
    ("memAscat", "8000"),
    ("memAscatFinalise", "4000"),
    // pindel
    ("memPindelInput", "7000"),
    ("memPindelPerThread", "8000"),
    ("memPindelVcf", "8000"),
    ("memPindelMerge", "6000"),
    ("memPindelFlag", "8000"),
    // brass
    ("memBrassInput", "6000"),
    ("memBrassCoverPerThread", "2000"),
    ("memBrassCoverMerge", "500"),
    ("memBrassGroup", "4500"),
    // group, isize and normcn can run in parallel
    ("memBrassIsize", "2000"),
    ("memBrassNormCn", "4000"),
    ("memBrassFilter", "4500"),
    ("memBrassSplit", "4000"),
    ("memBrassAssemblePerThread", "4000"),
    ("memBrassGrass", "4000"),
    ("memBrassTabix", "4000"),
    // caveman
    ("memCaveCnPrep", "4000"),
    ("memCavemanSetup", "4000"),
    ("memCavemanSplit", "4000"),
    ("memCavemanSplitConcat", "4000"),
    ("memCavemanMstepPerThread", "3000"),
    ("memCavemanMerge", "4000"),
    ("memCavemanEstepPerThread", "3000"),
    ("memCavemanMergeResults", "4000"),
    ("memCavemanAddIds", "4000"),
    ("memCavemanFlag", "5000"),
    ("memCavemanTbiClean", "4000"),
];


lazy_static! {
    pub static ref URL_REGEX: Regex = Regex::new(r"^https?").expect("static URL regex");
}


#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{name} must be a local file or a valid URL (got '{value}')")]
    InvalidArchiveLocation { name: &'static str, value: String },

    #[error("Duplicate key in workflow ini: {0}")]
    DuplicateIniKey(String),

    #[error("No SeqWare run-info directory matches {0}")]
    RunInfoNotFound(String),

    #[error("Invalid glob pattern {pattern}: {error}")]
    InvalidGlob { pattern: String, error: String },

    #[error("{tool} failed: {error}")]
    ToolExecution { tool: String, error: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}


/// Filesystem locations and programs the launcher depends on; all overridable from the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub seqware_basedir: PathBuf,
    pub workflow_version: String,
    pub seqware_version: String,
    pub seqware_bin: String,
    pub escalate_bin: String,
    pub seqware_user: String,
    pub run_info_glob: String,
}

impl EngineSettings {
    pub fn from_args(args: &Arguments) -> Self {
        EngineSettings {
            seqware_basedir: PathBuf::from(&args.seqware_basedir),
            workflow_version: args.workflow_version.clone(),
            seqware_version: args.seqware_version.clone(),
            seqware_bin: args.seqware_bin.clone(),
            escalate_bin: args.escalate_bin.clone(),
            seqware_user: args.seqware_user.clone(),
            run_info_glob: args.run_info_glob.clone(),
        }
    }

    pub fn ini_path(&self) -> PathBuf {
        self.seqware_basedir.join(WORKFLOW_INI)
    }

    pub fn bundle_dir(&self) -> PathBuf {
        self.seqware_basedir.join("target").join(format!(
            "Workflow_Bundle_{}_{}_SeqWare_{}",
            WORKFLOW_NAME, self.workflow_version, self.seqware_version
        ))
    }
}


pub struct RunConfig  {
    pub cwd: PathBuf,
    pub args: Arguments,
    pub engine: EngineSettings,
}

impl RunConfig {
    pub fn new(args: Arguments, cwd: PathBuf) -> Self {
        let engine = EngineSettings::from_args(&args);
        RunConfig { cwd, args, engine }
    }
}
