//! Navigation collaborator
//!
//! The core only yields a target id; this module decides where that id
//! leads and what happens when there is no target at all.

use revguess_common::{SelectionMode, SelectionPolicy};
use tracing::info;

/// Placeholder substituted with the target id in URL templates
pub const ID_PLACEHOLDER: &str = "{id}";

/// Store page URL for `id`
///
/// A template without `{id}` gets the id appended.
pub fn store_url(template: &str, id: u64) -> String {
    if template.contains(ID_PLACEHOLDER) {
        template.replace(ID_PLACEHOLDER, &id.to_string())
    } else {
        format!("{}{}", template, id)
    }
}

/// Id of the next game to visit, `default_id` when nothing can be picked
pub async fn next_target(policy: &SelectionPolicy, mode: SelectionMode, default_id: u64) -> u64 {
    match policy.pick_target(mode).await {
        Some(record) => {
            info!(
                appid = record.id,
                year = ?record.year,
                tags = ?record.tags,
                "Navigating to next game ({} mode)",
                mode
            );
            record.id
        }
        None => {
            info!("No target available ({} mode), using default {}", mode, default_id);
            default_id
        }
    }
}
