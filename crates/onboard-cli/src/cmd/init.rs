use anyhow::Context;
use onboard_core::{catalog::standard_spec, config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path, with_catalog: bool, json: bool) -> anyhow::Result<()> {
    let dirs = [paths::onboard_dir(root), root.join(paths::SESSIONS_DIR)];
    for p in dirs {
        std::fs::create_dir_all(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_path = paths::config_path(root);
    let config_created = if config_path.exists() {
        false
    } else {
        Config::default()
            .save(root)
            .context("failed to write config.yaml")?;
        true
    };

    let catalog_created = if with_catalog {
        let data = serde_yaml::to_string(&standard_spec()).context("failed to render catalog")?;
        io::write_if_missing(&paths::catalog_path(root), data.as_bytes())
            .context("failed to write catalog.yaml")?
    } else {
        false
    };

    if json {
        crate::output::print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "config_created": config_created,
            "catalog_created": catalog_created,
        }))?;
        return Ok(());
    }

    println!("Initializing onboarding in: {}", root.display());
    println!(
        "  {} {}",
        if config_created { "created:" } else { "exists: " },
        paths::CONFIG_FILE
    );
    if with_catalog {
        println!(
            "  {} {}",
            if catalog_created { "created:" } else { "exists: " },
            paths::CATALOG_FILE
        );
    }
    Ok(())
}
