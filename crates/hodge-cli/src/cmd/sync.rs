use crate::output::print_json;
use anyhow::Context;
use hodge_core::{config::Config, hooks::PmHooks};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let hooks = PmHooks::new(root, config).context("failed to open PM hooks")?;
    let outcome = hooks.process_queue().context("failed to process PM queue")?;

    if json {
        print_json(&outcome)?;
    } else if outcome.attempted == 0 {
        println!("Queue empty, nothing to sync.");
    } else {
        println!(
            "Synced {}/{} queued operations.",
            outcome.succeeded, outcome.attempted
        );
        let remaining = outcome.attempted - outcome.succeeded;
        if remaining > 0 {
            println!("{remaining} still queued; run again later.");
        }
    }
    Ok(())
}
