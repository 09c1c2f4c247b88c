//! Registry commands: `add`, `new`, `rebuild` and `list`.

use dxigv::config::ConfigFile;
use dxigv::registry::{read_registry, ProjectReport, Registry, RegistryCache};
use tracing::info;

use super::common::{describe, resolve_registry_config, RegistryArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

fn print_report(report: &ProjectReport) {
    println!(
        "{} ({}): {} resources{}",
        report.project.name,
        report.project.id,
        report.resources,
        if report.skipped > 0 {
            format!(", {} skipped without index", report.skipped)
        } else {
            String::new()
        }
    );
    match &report.url {
        Some(url) => println!("  {}", url),
        None => println!("  {}", report.manifest_path.display()),
    }
}

fn print_reports(reports: &[ProjectReport]) {
    for report in reports {
        print_report(report);
    }
    println!();
    println!("{} project(s) published", reports.len());
}

/// Add the given projects to the registry.
pub fn run_add(projects: &[String], args: &RegistryArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("add");
    let config = resolve_registry_config(args, runner.config())?;
    let store = runner.store()?;

    let mut registry = Registry::open(config, &store)?;
    info!("Publishing to {}", describe(registry.config()));
    let reports = registry.add_projects(projects)?;
    print_reports(&reports);
    Ok(())
}

/// Add every remote project that is not yet registered.
pub fn run_new(args: &RegistryArgs, dry_run: bool, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("new");
    let config = resolve_registry_config(args, runner.config())?;
    let store = runner.store()?;

    let mut registry = Registry::open(config, &store)?;
    if dry_run {
        let projects = registry.find_new_projects()?;
        if projects.is_empty() {
            println!("No new projects.");
        }
        for project in &projects {
            println!("{}\t{}", project.id, project.name);
        }
        return Ok(());
    }

    let reports = registry.add_new_projects()?;
    print_reports(&reports);
    Ok(())
}

/// Delete all manifests and the registry file, then regenerate.
pub fn run_rebuild(
    args: &RegistryArgs,
    existing_only: bool,
    verbose: bool,
) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("rebuild");
    let config = resolve_registry_config(args, runner.config())?;
    let store = runner.store()?;

    let mut registry = Registry::open(config, &store)?;
    info!("Rebuilding {}", describe(registry.config()));
    let reports = registry.force_update(existing_only)?;
    print_reports(&reports);
    Ok(())
}

/// List registered projects without contacting DNAnexus.
pub fn run_list(args: &RegistryArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let registry = resolve_registry_config(args, &config)?;
    let folder = registry.folder();

    println!("{}", describe(&registry));
    if !folder.is_dir() {
        println!("(not initialised)");
        return Ok(());
    }

    let cache = RegistryCache::scan(&folder)?;
    let urls = read_registry(&registry.registry_path())?;
    println!();
    for name in cache.names() {
        println!("  {}", name);
    }
    println!();
    println!("{} project(s), {} registry URL(s)", cache.len(), urls.len());
    Ok(())
}
