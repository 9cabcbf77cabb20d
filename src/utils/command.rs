//! Functions and structs for working with creating command-line arguments

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;

use crate::config::defs::{EngineSettings, SeqwareSubcommand, CHOWN_TAG, MKDIR_TAG, MV_TAG};


/// A program plus its arguments, spawned without a shell. Arguments stay
/// `OsString` so paths reach the child byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<OsString>,
}

impl CommandLine {
    pub fn new(program: &str, args: Vec<OsString>) -> Self {
        CommandLine {
            program: program.to_string(),
            args,
        }
    }

    /// Runs `inner` through a privilege-escalation program such as sudo.
    pub fn escalated(escalate_bin: &str, inner: CommandLine) -> Self {
        let mut args = Vec::with_capacity(inner.args.len() + 1);
        args.push(OsString::from(inner.program));
        args.extend(inner.args);
        CommandLine::new(escalate_bin, args)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}


pub mod seqware {
    use std::ffi::OsString;
    use std::path::Path;
    use crate::config::defs::{EngineSettings, SeqwareSubcommand, SEQWARE_ENGINE};

    pub fn arg_generator(engine: &EngineSettings, subcommand: SeqwareSubcommand, ini_path: &Path) -> Vec<OsString> {
        let mut args_vec: Vec<OsString> = Vec::new();
        match subcommand {
            SeqwareSubcommand::BundleLaunch => {
                args_vec.push("bundle".into());
                args_vec.push("launch".into());
                args_vec.push("--dir".into());
                args_vec.push(engine.bundle_dir().into_os_string());
                args_vec.push("--engine".into());
                args_vec.push(SEQWARE_ENGINE.into());
                args_vec.push("--ini".into());
                args_vec.push(ini_path.as_os_str().to_os_string());
                args_vec.push("--no-metadata".into());
            }
        }
        args_vec
    }
}


pub fn seqware_launch(engine: &EngineSettings, ini_path: &Path) -> CommandLine {
    CommandLine::new(
        &engine.seqware_bin,
        seqware::arg_generator(engine, SeqwareSubcommand::BundleLaunch, ini_path),
    )
}

pub fn escalated_mkdir(engine: &EngineSettings, dir: &Path) -> CommandLine {
    CommandLine::escalated(
        &engine.escalate_bin,
        CommandLine::new(MKDIR_TAG, vec!["-p".into(), dir.as_os_str().to_os_string()]),
    )
}

pub fn escalated_chown(engine: &EngineSettings, dir: &Path) -> CommandLine {
    CommandLine::escalated(
        &engine.escalate_bin,
        CommandLine::new(
            CHOWN_TAG,
            vec![
                "-R".into(),
                OsStr::new(&engine.seqware_user).to_os_string(),
                dir.as_os_str().to_os_string(),
            ],
        ),
    )
}

/// `mv <sources...> <target>`; None when there is nothing to move.
pub fn move_into(sources: &[impl AsRef<Path>], target: &Path) -> Option<CommandLine> {
    if sources.is_empty() {
        return None;
    }
    let mut args: Vec<OsString> = sources
        .iter()
        .map(|s| s.as_ref().as_os_str().to_os_string())
        .collect();
    args.push(target.as_os_str().to_os_string());
    Some(CommandLine::new(MV_TAG, args))
}
