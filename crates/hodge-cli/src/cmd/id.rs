use crate::output::{print_columns, print_json};
use anyhow::Context;
use clap::Subcommand;
use hodge_core::id::IdManager;
use std::path::Path;

#[derive(Subcommand)]
pub enum IdSubcommand {
    /// Allocate the next local feature ID
    Create {
        name: String,
        /// External PM issue ID to link immediately (tool inferred from shape)
        #[arg(long)]
        external: Option<String>,
    },
    /// Link an external PM issue ID to an existing feature
    Link { local: String, external: String },
    /// Resolve a local or external ID to its mapping
    Resolve { id: String },
    /// Allocate a sub-issue ID under an epic
    Sub { parent: String },
    /// List all known feature IDs
    List,
}

pub fn run(root: &Path, subcmd: IdSubcommand, json: bool) -> anyhow::Result<()> {
    let ids = IdManager::new(root).context("failed to open ID manager")?;
    match subcmd {
        IdSubcommand::Create { name, external } => {
            let feature = ids
                .create_feature(&name, external.as_deref())
                .with_context(|| format!("failed to create feature '{name}'"))?;
            if json {
                print_json(&feature)?;
            } else {
                println!("Created {}: {}", feature.local_id, feature.name);
                if let Some(ext) = &feature.external_id {
                    println!("  linked: {ext}");
                }
            }
            Ok(())
        }
        IdSubcommand::Link { local, external } => {
            let feature = ids
                .link_external_id(&local, &external)
                .with_context(|| format!("failed to link '{local}' to '{external}'"))?;
            if json {
                print_json(&feature)?;
            } else {
                let tool = feature
                    .pm_tool
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                println!("Linked {} -> {external} ({tool})", feature.local_id);
            }
            Ok(())
        }
        IdSubcommand::Resolve { id } => {
            let resolved = ids
                .resolve_id(&id)
                .with_context(|| format!("failed to resolve '{id}'"))?;
            match resolved {
                Some(feature) => {
                    if json {
                        print_json(&feature)?;
                    } else {
                        println!("{}: {}", feature.local_id, feature.name);
                        if let Some(ext) = &feature.external_id {
                            println!("  external: {ext}");
                        }
                        if let Some(parent) = &feature.parent_id {
                            println!("  parent:   {parent}");
                        }
                    }
                    Ok(())
                }
                None => anyhow::bail!("no mapping for '{id}'"),
            }
        }
        IdSubcommand::Sub { parent } => {
            let sub = ids
                .create_sub_issue_id(&parent)
                .with_context(|| format!("failed to create sub-issue under '{parent}'"))?;
            if json {
                print_json(&sub)?;
            } else {
                println!("Created {}: {}", sub.local_id, sub.name);
            }
            Ok(())
        }
        IdSubcommand::List => {
            let features = ids.list_features().context("failed to list features")?;
            if json {
                print_json(&features)?;
                return Ok(());
            }
            if features.is_empty() {
                println!("No features yet.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = features
                .iter()
                .map(|f| {
                    vec![
                        f.local_id.clone(),
                        f.external_id.clone().unwrap_or_default(),
                        f.pm_tool.map(|t| t.to_string()).unwrap_or_default(),
                        if f.is_epic { "epic".to_string() } else { String::new() },
                        f.name.clone(),
                    ]
                })
                .collect();
            print_columns(&["LOCAL", "EXTERNAL", "TOOL", "KIND", "NAME"], &rows);
            Ok(())
        }
    }
}
