use anyhow::Context;
use hodge_core::{adapter::LocalPmAdapter, config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing hodge in: {}", root.display());

    let hodge_dir = root.join(paths::HODGE_DIR);
    io::ensure_dir(&hodge_dir)
        .with_context(|| format!("failed to create {}", hodge_dir.display()))?;

    // Write config.yaml if missing
    let config_path = paths::config_path(root);
    if !config_path.exists() {
        Config::default()
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    // Seed the local PM mirror if missing
    let mirror_path = paths::pm_mirror_path(root);
    let existed = mirror_path.exists();
    let local = LocalPmAdapter::new(root).context("failed to open local PM mirror")?;
    local.init().context("failed to seed local PM mirror")?;
    if existed {
        println!("  exists:  {}", paths::PM_MIRROR_FILE);
    } else {
        println!("  created: {}", paths::PM_MIRROR_FILE);
    }

    println!("Next: hodge explore <feature-name>");
    Ok(())
}
