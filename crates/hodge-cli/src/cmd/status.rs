use crate::output::{print_columns, print_json};
use anyhow::Context;
use hodge_core::{config::Config, hooks::PmHooks};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let hooks = PmHooks::new(root, config).context("failed to open PM hooks")?;
    let statuses = hooks
        .local()
        .feature_statuses()
        .context("failed to read local PM mirror")?;
    let progress = hooks.phase_progress().context("failed to compute progress")?;

    if json {
        let features: Vec<_> = statuses
            .iter()
            .map(|(id, status)| serde_json::json!({ "id": id, "status": status }))
            .collect();
        print_json(&serde_json::json!({
            "features": features,
            "progress": progress,
        }))?;
        return Ok(());
    }

    if statuses.is_empty() {
        println!("No features yet.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = statuses
        .iter()
        .map(|(id, status)| vec![id.clone(), status.clone()])
        .collect();
    print_columns(&["FEATURE", "STATUS"], &rows);
    println!(
        "\n{}/{} shipped ({}%)",
        progress.shipped,
        progress.total,
        progress.percent()
    );
    Ok(())
}
