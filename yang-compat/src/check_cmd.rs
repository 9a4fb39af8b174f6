use std::env;

use anyhow::{bail, Context, Result};
use tracing::info;
use yang_compat::config::discover_config;
use yang_compat::report::{render, ReportFormat};
use yang_compat_core::{validate, ModuleLoader, RfcVersion};

use crate::cli::CheckArgs;

pub fn run_check(args: CheckArgs) -> Result<()> {
    if args.new.len() != 1 {
        bail!(
            "expected exactly one new module file, got {}",
            args.new.len()
        );
    }
    let new_file = &args.new[0];

    let cwd = env::current_dir().context("failed to determine working directory")?;
    let config = discover_config(args.config.as_deref(), &cwd)?.unwrap_or_default();

    let rfc = args
        .rfc_version
        .or(config.rfc_version)
        .unwrap_or(RfcVersion::Rfc6020);
    let format = args.format.or(config.format).unwrap_or(ReportFormat::Text);
    let strict = args.strict || config.strict.unwrap_or(false);
    let from_path = if args.from_path.is_empty() {
        config.from_path
    } else {
        args.from_path
    };
    let path = if args.path.is_empty() {
        config.path
    } else {
        args.path
    };

    let old = ModuleLoader::new(from_path)
        .load_file(&args.from)
        .with_context(|| format!("failed to load old module {}", args.from.display()))?;
    let new = ModuleLoader::new(path)
        .load_file(new_file)
        .with_context(|| format!("failed to load new module {}", new_file.display()))?;
    info!(old = %old.name, new = %new.name, %rfc, "modules loaded");

    let catalog = validate(&old, &new, rfc);
    info!(
        findings = catalog.len(),
        errors = catalog.error_count(),
        warnings = catalog.warning_count(),
        "check complete"
    );
    println!("{}", render(&catalog, format));

    if strict && catalog.error_count() > 0 {
        bail!(
            "compatibility check failed: {} errors",
            catalog.error_count()
        );
    }
    Ok(())
}
