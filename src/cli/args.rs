use clap::Parser;

use crate::config::defs::{
    DEFAULT_ESCALATE_BIN, DEFAULT_OUTPUT_DIR, DEFAULT_RUN_INFO_GLOB, DEFAULT_SEQWARE_BASEDIR,
    DEFAULT_SEQWARE_USER, DEFAULT_SEQWARE_VERSION, DEFAULT_WORKFLOW_VERSION, SEQWARE_TAG,
};

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "cgp-somatic-launcher",
    version,
    about = "SeqWare-based Variant Calling Workflow from Sanger"
)]
pub struct Arguments {

    #[arg(long = "tumor", required = true, num_args = 1.., help = "tumor BAM input")]
    pub tumor: Vec<String>,

    #[arg(long = "normal", help = "matched normal BAM input")]
    pub normal: String,

    #[arg(long = "output-dir", default_value = DEFAULT_OUTPUT_DIR, help = "directory in which to store the outputs of the workflow.")]
    pub output_dir: String,

    #[arg(long = "refFrom", help = "reference file archive for CGP-Somatic-Core workflow. Available to download from: https://s3-eu-west-1.amazonaws.com/wtsi-pancancer/reference/GRCh37d5_CGP_refBundle.tar.gz")]
    pub ref_from: String,

    #[arg(long = "bbFrom", help = "battenberg reference file archive for CGP-Somatic-Core workflow. Available to download from: https://s3-eu-west-1.amazonaws.com/wtsi-pancancer/reference/GRCh37d5_battenberg.tar.gz")]
    pub bb_from: String,

    #[arg(long = "keep-all-seqware-output-files", hide = true, action)]
    pub keep_all_seqware_output_files: bool,

    #[arg(short = 'v', long = "verbose", action)]
    pub verbose: bool,

    #[arg(long, default_value = DEFAULT_SEQWARE_BASEDIR, help = "Directory holding workflow.ini and the target/ bundle directory")]
    pub seqware_basedir: String,

    #[arg(long, default_value = DEFAULT_WORKFLOW_VERSION)]
    pub workflow_version: String,

    #[arg(long, default_value = DEFAULT_SEQWARE_VERSION)]
    pub seqware_version: String,

    #[arg(long, default_value = SEQWARE_TAG, help = "SeqWare executable used to launch the bundle")]
    pub seqware_bin: String,

    #[arg(long, default_value = DEFAULT_ESCALATE_BIN, help = "Program prefixed to mkdir/chown when the output directory must be created")]
    pub escalate_bin: String,

    #[arg(long, default_value = DEFAULT_SEQWARE_USER)]
    pub seqware_user: String,

    #[arg(long, default_value = DEFAULT_RUN_INFO_GLOB, help = "Glob locating the SeqWare run-info directory (first match is used)")]
    pub run_info_glob: String,
}
