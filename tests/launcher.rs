use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tempfile::{tempdir, TempDir};

use cgp_somatic_launcher::cli::Arguments;
use cgp_somatic_launcher::config::defs::{PipelineError, RunConfig};
use cgp_somatic_launcher::pipelines::cgp_somatic::run;

// Tests write executables and then spawn them; running them one at a time keeps
// a concurrent fork from holding a write handle open (ETXTBSY).
static SERIAL: Mutex<()> = Mutex::new(());

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new(engine_exit: i32) -> Result<Self> {
        let dir = tempdir()?;
        let root = dir.path();
        fs::create_dir_all(root.join("basedir"))?;
        fs::create_dir_all(root.join("datastore/oozie-0001/generated-scripts"))?;
        fs::write(root.join("datastore/oozie-0001/step1.stdout"), "ok\n")?;
        fs::write(root.join("datastore/oozie-0001/step1.stderr"), "")?;
        fs::write(root.join("ref.tar.gz"), "")?;

        write_script(
            &root.join("fake-seqware"),
            &format!(
                "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\necho 'seqware line 1'\necho 'seqware line 2'\necho 'seqware complaint' >&2\nexit {}\n",
                root.join("seqware.args").display(),
                engine_exit
            ),
        )?;
        write_script(
            &root.join("fake-sudo"),
            &format!(
                "#!/bin/sh\necho \"$*\" >> '{}'\nif [ \"$1\" = mkdir ]; then exec \"$@\"; fi\nexit 0\n",
                root.join("sudo.log").display()
            ),
        )?;
        Ok(Sandbox { dir })
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn args(&self, output_dir: &Path, keep: bool) -> Arguments {
        Arguments {
            tumor: vec!["/data/tumor_a.bam".to_string(), "/data/tumor_b.bam".to_string()],
            normal: "/data/normal.bam".to_string(),
            output_dir: output_dir.to_string_lossy().into_owned(),
            ref_from: self.path("ref.tar.gz").to_string_lossy().into_owned(),
            bb_from: "https://s3-eu-west-1.amazonaws.com/wtsi-pancancer/reference/GRCh37d5_battenberg.tar.gz".to_string(),
            keep_all_seqware_output_files: keep,
            verbose: false,
            seqware_basedir: self.path("basedir").to_string_lossy().into_owned(),
            workflow_version: "1.0.8".to_string(),
            seqware_version: "1.1.1".to_string(),
            seqware_bin: self.path("fake-seqware").to_string_lossy().into_owned(),
            escalate_bin: self.path("fake-sudo").to_string_lossy().into_owned(),
            seqware_user: "seqware".to_string(),
            run_info_glob: format!("{}/oozie-*", self.path("datastore").display()),
        }
    }

    fn config(&self, args: Arguments) -> Arc<RunConfig> {
        Arc::new(RunConfig::new(args, self.dir.path().to_path_buf()))
    }
}

fn write_script(path: &Path, body: &str) -> Result<()> {
    fs::write(path, body)?;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}


#[tokio::test]
async fn test_launch_without_relocation() -> Result<()> {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let sandbox = Sandbox::new(0)?;
    let output_dir = sandbox.path("results/run1");

    let report = run(sandbox.config(sandbox.args(&output_dir, false))).await?;

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.ini_path, sandbox.path("basedir/workflow.ini"));
    assert_eq!(report.commands.len(), 1, "only the engine is launched");
    assert!(!sandbox.path("sudo.log").exists(), "no privilege escalation without the keep flag");
    assert!(!output_dir.exists());
    assert!(sandbox.path("datastore/oozie-0001/step1.stdout").exists());

    let ini = fs::read_to_string(&report.ini_path)?;
    let lines: Vec<&str> = ini.lines().collect();
    assert_eq!(lines[0], format!("refFrom={}", sandbox.path("ref.tar.gz").display()));
    assert!(lines.contains(&"tumourBams=/data/tumor_a.bam:/data/tumor_b.bam"));
    assert!(lines.contains(&"controlBam=/data/normal.bam"));
    assert!(lines.contains(&"output_dir=run1"));
    assert!(lines.contains(&format!("output_prefix={}/", sandbox.path("results").display()).as_str()));
    assert!(lines.contains(&"memHostMbAvailable=108000"));

    let engine_args = fs::read_to_string(sandbox.path("seqware.args"))?;
    let engine_args: Vec<&str> = engine_args.lines().collect();
    let bundle = sandbox.path("basedir/target/Workflow_Bundle_CgpSomaticCore_1.0.8_SeqWare_1.1.1");
    let ini_path = report.ini_path.to_string_lossy().into_owned();
    assert_eq!(engine_args, vec![
        "bundle", "launch",
        "--dir", bundle.to_str().unwrap(),
        "--engine", "whitestar-parallel",
        "--ini", ini_path.as_str(),
        "--no-metadata",
    ]);
    Ok(())
}

#[tokio::test]
async fn test_engine_failure_exit_code_is_returned() -> Result<()> {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let sandbox = Sandbox::new(42)?;

    let report = run(sandbox.config(sandbox.args(&sandbox.path("out"), false))).await?;
    assert_eq!(report.exit_code, 42);
    assert_eq!(report.commands.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_relocation_creates_output_dir() -> Result<()> {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let sandbox = Sandbox::new(0)?;
    let output_dir = sandbox.path("output");

    let report = run(sandbox.config(sandbox.args(&output_dir, true))).await?;

    let programs: Vec<String> = report.commands.iter().map(|c| c.to_string()).collect();
    assert_eq!(programs.len(), 4, "launch, mkdir, chown, mv: {:?}", programs);
    assert!(programs[1].ends_with(&format!("mkdir -p {}", output_dir.display())));
    assert!(programs[2].ends_with(&format!("chown -R seqware {}", output_dir.display())));
    assert!(programs[3].starts_with("mv "));

    let sudo_log = fs::read_to_string(sandbox.path("sudo.log"))?;
    assert_eq!(sudo_log.lines().count(), 2);

    assert!(output_dir.join("step1.stdout").is_file());
    assert!(output_dir.join("step1.stderr").is_file());
    assert!(output_dir.join("generated-scripts").is_dir());
    assert!(fs::read_dir(sandbox.path("datastore/oozie-0001"))?.next().is_none());
    Ok(())
}

#[tokio::test]
async fn test_relocation_into_existing_dir_skips_escalation() -> Result<()> {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let sandbox = Sandbox::new(0)?;
    let output_dir = sandbox.path("existing");
    fs::create_dir(&output_dir)?;

    let report = run(sandbox.config(sandbox.args(&output_dir, true))).await?;

    assert_eq!(report.commands.len(), 2, "launch and mv");
    assert!(!sandbox.path("sudo.log").exists());
    assert!(output_dir.join("step1.stdout").is_file());
    Ok(())
}

#[tokio::test]
async fn test_relocation_runs_after_engine_failure() -> Result<()> {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let sandbox = Sandbox::new(3)?;
    let output_dir = sandbox.path("existing");
    fs::create_dir(&output_dir)?;

    let report = run(sandbox.config(sandbox.args(&output_dir, true))).await?;

    assert_eq!(report.exit_code, 3);
    assert!(output_dir.join("step1.stdout").is_file());
    Ok(())
}

#[tokio::test]
async fn test_missing_run_info_dir() -> Result<()> {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let sandbox = Sandbox::new(0)?;
    let mut args = sandbox.args(&sandbox.path("out"), true);
    args.run_info_glob = format!("{}/nothing-*", sandbox.path("datastore").display());

    match run(sandbox.config(args)).await {
        Err(PipelineError::RunInfoNotFound(pattern)) => assert!(pattern.ends_with("nothing-*")),
        other => panic!("expected RunInfoNotFound, got {:?}", other),
    }
    // the engine still ran before relocation was attempted
    assert!(sandbox.path("seqware.args").exists());
    Ok(())
}

#[tokio::test]
async fn test_invalid_ref_from_aborts_before_launch() -> Result<()> {
    let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let sandbox = Sandbox::new(0)?;
    let mut args = sandbox.args(&sandbox.path("out"), true);
    args.ref_from = sandbox.path("no-such-ref.tar.gz").to_string_lossy().into_owned();

    match run(sandbox.config(args)).await {
        Err(PipelineError::InvalidArchiveLocation { name, .. }) => assert_eq!(name, "refFrom"),
        other => panic!("expected InvalidArchiveLocation, got {:?}", other),
    }
    assert!(!sandbox.path("basedir/workflow.ini").exists());
    assert!(!sandbox.path("seqware.args").exists());
    Ok(())
}
