use crate::output::print_json;
use anyhow::Context;
use hodge_core::{
    config::Config,
    hooks::{PmHooks, ShipContext},
    id::IdManager,
};
use std::path::Path;
use std::time::Duration;

/// How long to best-effort-await detached external syncs before the process
/// exits. Syncs still in flight afterwards are lost (accepted limitation).
const DRAIN_GRACE: Duration = Duration::from_millis(1500);

pub fn explore(root: &Path, feature: &str, json: bool) -> anyhow::Result<()> {
    let ids = IdManager::new(root).context("failed to open ID manager")?;
    let resolved = ids
        .resolve_id(feature)
        .with_context(|| format!("failed to resolve '{feature}'"))?;

    // Explore accepts a bare name and allocates an ID for it on first use.
    let feature_id = match resolved {
        Some(f) => f,
        None => ids
            .create_feature(feature, None)
            .with_context(|| format!("failed to create feature '{feature}'"))?,
    };

    let hooks = open_hooks(root)?;
    hooks
        .on_explore(&feature_id.local_id)
        .context("explore hook failed")?;
    hooks.drain(DRAIN_GRACE);

    if json {
        print_json(&feature_id)?;
    } else {
        println!("Exploring {}: {}", feature_id.local_id, feature_id.name);
        println!("Next: hodge build {}", feature_id.local_id);
    }
    Ok(())
}

pub fn build(root: &Path, feature: &str, json: bool) -> anyhow::Result<()> {
    transition(root, feature, json, "building", "harden", |hooks, id| {
        hooks.on_build(id)
    })
}

pub fn harden(root: &Path, feature: &str, json: bool) -> anyhow::Result<()> {
    transition(root, feature, json, "hardening", "ship", |hooks, id| {
        hooks.on_harden(id)
    })
}

#[allow(clippy::too_many_arguments)]
pub fn ship(
    root: &Path,
    feature: &str,
    decisions: Vec<String>,
    patterns: Vec<String>,
    tests_passed: Option<u32>,
    coverage: Option<u8>,
    commit: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let feature_id = require_feature(root, feature)?;
    let ctx = ShipContext {
        decisions,
        patterns,
        tests_passed,
        coverage,
        commit,
    };

    let hooks = open_hooks(root)?;
    let comment = hooks
        .on_ship(&feature_id.local_id, Some(&ctx))
        .context("ship hook failed")?;
    hooks.drain(DRAIN_GRACE);

    if json {
        print_json(&serde_json::json!({
            "localId": feature_id.local_id,
            "name": feature_id.name,
            "status": "shipped",
            "comment": comment,
        }))?;
    } else {
        println!("Shipped {}: {}", feature_id.local_id, feature_id.name);
        if let Some(comment) = comment {
            println!("\n{comment}");
        }
    }
    Ok(())
}

fn transition(
    root: &Path,
    feature: &str,
    json: bool,
    status: &str,
    next: &str,
    hook: impl Fn(&PmHooks, &str) -> hodge_core::Result<()>,
) -> anyhow::Result<()> {
    let feature_id = require_feature(root, feature)?;
    let hooks = open_hooks(root)?;
    hook(&hooks, &feature_id.local_id).with_context(|| format!("{status} hook failed"))?;
    hooks.drain(DRAIN_GRACE);

    if json {
        print_json(&serde_json::json!({
            "localId": feature_id.local_id,
            "name": feature_id.name,
            "status": status,
        }))?;
    } else {
        println!(
            "{}{} {}: {}",
            status[..1].to_uppercase(),
            &status[1..],
            feature_id.local_id,
            feature_id.name
        );
        println!("Next: hodge {next} {}", feature_id.local_id);
    }
    Ok(())
}

fn open_hooks(root: &Path) -> anyhow::Result<PmHooks> {
    let config = Config::load(root).context("failed to load config")?;
    PmHooks::new(root, config).context("failed to open PM hooks")
}

fn require_feature(root: &Path, feature: &str) -> anyhow::Result<hodge_core::id::FeatureId> {
    let ids = IdManager::new(root).context("failed to open ID manager")?;
    ids.resolve_id(feature)
        .with_context(|| format!("failed to resolve '{feature}'"))?
        .ok_or_else(|| anyhow::anyhow!("unknown feature '{feature}' (run: hodge explore {feature})"))
}
