use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};

use crate::config::defs::{PipelineError, RunConfig};
use crate::utils::command::{escalated_chown, escalated_mkdir, move_into, seqware_launch, CommandLine};
use crate::utils::file::{absolute_path, dir_entries, find_run_info_dir};
use crate::utils::ini::{build_workflow_ini, write_workflow_ini};
use crate::utils::streams::execute;


#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Exit code of `seqware bundle launch`.
    pub exit_code: i32,
    pub ini_path: PathBuf,
    /// Every command issued, in order.
    pub commands: Vec<CommandLine>,
}


async fn execute_logged(cmd: CommandLine, issued: &mut Vec<CommandLine>) -> Result<i32, PipelineError> {
    let code = execute(&cmd, &mut tokio::io::stdout()).await?;
    issued.push(cmd);
    Ok(code)
}


/// Moves everything SeqWare left in its run-info directory (generated scripts
/// with stdout/stderr for each step) into the output directory, creating the
/// latter with escalated privileges if needed.
///
/// # Arguments
///
/// * `config` - RunConfig struct from main.
/// * `issued` - Commands issued so far; extended in place.
async fn relocate_run_info(config: &RunConfig, issued: &mut Vec<CommandLine>) -> Result<(), PipelineError> {
    let engine = &config.engine;
    let run_info_dir = find_run_info_dir(&engine.run_info_glob)?;
    info!("SeqWare run-info directory: {}", run_info_dir.display());

    let output_dir = absolute_path(&PathBuf::from(&config.args.output_dir), &config.cwd);

    if !output_dir.is_dir() {
        // launcher runs as the seqware user, which cannot create the output mount itself
        for cmd in [escalated_mkdir(engine, &output_dir), escalated_chown(engine, &output_dir)] {
            let program = cmd.to_string();
            let code = execute_logged(cmd, issued).await?;
            if code != 0 {
                warn!("'{}' exited with code {}", program, code);
            }
        }
    }

    let entries = dir_entries(&run_info_dir)?;
    match move_into(&entries, &output_dir) {
        Some(cmd) => {
            let code = execute_logged(cmd, issued).await?;
            if code != 0 {
                warn!("Moving run-info files exited with code {}", code);
            } else {
                info!("Moved {} entries into {}", entries.len(), output_dir.display());
            }
        }
        None => info!("{} is empty; nothing to move", run_info_dir.display()),
    }
    Ok(())
}


/// Run function for the CgpSomaticCore workflow
///
/// # Arguments
///
/// * `config` - RunConfig struct from main.
///
/// # Returns
/// RunReport; a failed workflow is reported through `exit_code`, not as an error.
pub async fn run(config: Arc<RunConfig>) -> Result<RunReport, PipelineError> {
    let mut issued: Vec<CommandLine> = Vec::new();

    // WRITE WORKFLOW INI
    let ini = build_workflow_ini(&config.args, &config.cwd)?;
    let ini_path = write_workflow_ini(&ini, &config.engine.seqware_basedir)?;

    // RUN WORKFLOW
    let launch = seqware_launch(&config.engine, &ini_path);
    let exit_code = execute_logged(launch, &mut issued).await?;
    if exit_code == 0 {
        info!("Workflow finished");
    } else {
        info!("Workflow exited with code {}", exit_code);
    }

    if config.args.keep_all_seqware_output_files {
        relocate_run_info(&config, &mut issued).await?;
    }

    Ok(RunReport {
        exit_code,
        ini_path,
        commands: issued,
    })
}

