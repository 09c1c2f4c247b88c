//! `manifest` command: write project manifests without touching a registry.

use std::path::PathBuf;

use dxigv::registry::export_manifest;

use super::common::resolve_duration;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the manifest command.
pub struct ManifestArgs {
    pub projects: Vec<String>,
    pub output: Option<PathBuf>,
    pub duration: Option<u64>,
}

/// Write one manifest per project into the output folder.
pub fn run(args: ManifestArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("manifest");
    let duration = resolve_duration(args.duration, runner.config())?;
    let output = args.output.unwrap_or_else(|| PathBuf::from("."));
    if !output.is_dir() {
        return Err(CliError::Config(format!(
            "Output folder {} does not exist",
            output.display()
        )));
    }

    let store = runner.store()?;
    for project in &args.projects {
        let report = export_manifest(&store, project, &output, duration)?;
        println!(
            "{} ({}): {} resources -> {}",
            report.project.name,
            report.project.id,
            report.resources,
            report.manifest_path.display()
        );
    }
    Ok(())
}
