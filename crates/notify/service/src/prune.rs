//! Invalid-token pruning.

use std::collections::BTreeSet;

use color_eyre::eyre::WrapErr as _;
use notify_storage::DeviceRegistry;

/// Removes permanently invalid tokens from the device registry.
#[derive(Debug, Clone)]
pub struct Pruner<R> {
    registry: R,
}

impl<R: DeviceRegistry> Pruner<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Delete `tokens` with a single bulk write. Idempotent.
    pub fn prune(&self, tokens: &BTreeSet<String>) -> color_eyre::eyre::Result<usize> {
        if tokens.is_empty() {
            return Ok(0);
        }

        let refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
        let deleted = self
            .registry
            .delete_tokens(&refs)
            .wrap_err("failed to prune invalid tokens")?;

        tracing::info!(requested = tokens.len(), deleted, "pruned invalid device tokens");

        Ok(deleted)
    }
}
