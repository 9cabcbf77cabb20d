use std::env;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use env_logger::Builder;
use log::{LevelFilter, debug, error, info};

use cgp_somatic_launcher::cli::parse;
use cgp_somatic_launcher::config::defs::RunConfig;
use cgp_somatic_launcher::pipelines::cgp_somatic;


#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let run_start = Instant::now();

    let args = parse();

    let log_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let dir = env::current_dir()?;
    debug!("The current directory is {:?}", dir);

    let run_config = Arc::new(RunConfig::new(args, dir));
    info!("SeqWare base directory is {}", run_config.engine.seqware_basedir.display());

    let report = match cgp_somatic::run(run_config).await {
        Ok(report) => report,
        Err(e) => {
            error!("Launcher failed: {} at {} milliseconds.", e, run_start.elapsed().as_millis());
            std::process::exit(1);
        }
    };

    debug!("Issued {} commands in {} milliseconds", report.commands.len(), run_start.elapsed().as_millis());
    std::process::exit(report.exit_code);
}
