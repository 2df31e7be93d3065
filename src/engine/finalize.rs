//! Root finalization: tree-level metadata and the `"roots"` index.

use crate::error::{Operation, PersistError, StoreError};
use crate::model::PhyloTree;
use crate::store::{GraphStore, GraphVertex, INDEX_ROOTS, KEY_NAME, KEY_NEWICK, KEY_TIMESTAMP};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Attaches `source_text` and a creation timestamp to the persisted `root`,
/// saves it and lists it in the `"roots"` index under `tree_id`.
///
/// Must only be called once [persist_tree](super::persist_tree) resolved.
/// The three steps run strictly in sequence; the first failure is returned.
pub async fn finalize_root<S>(
    store: &S,
    tree: &PhyloTree,
    mut root: GraphVertex,
    tree_id: &str,
    source_text: &str,
) -> Result<GraphVertex, PersistError>
where
    S: GraphStore + ?Sized,
{
    let fail = |operation: Operation, source: StoreError| PersistError {
        operation,
        vertex: tree.root_index(),
        name: Some(tree_id.to_string()),
        source,
    };

    root.set_property(KEY_NEWICK, source_text);
    root.set_property(KEY_TIMESTAMP, now_ms());

    store
        .save_vertex(&root)
        .await
        .map_err(|e| fail(Operation::SaveVertex, e))?;
    debug!(id = %root.id, "root saved");

    store
        .insert_index_entry(INDEX_ROOTS, KEY_NAME, &Value::from(tree_id), &root)
        .await
        .map_err(|e| {
            fail(
                Operation::InsertIndex {
                    family: INDEX_ROOTS,
                    key: KEY_NAME,
                },
                e,
            )
        })?;

    info!(id = %root.id, tree_id, "root finalized");
    Ok(root)
}

/// Current time as unix epoch milliseconds.
fn now_ms() -> i64 {
    let ms = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    ms.clamp(0, i64::MAX as i128) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_is_recent() {
        // 2020-09-13T12:26:40Z
        assert!(now_ms() > 1_600_000_000_000);
    }
}
