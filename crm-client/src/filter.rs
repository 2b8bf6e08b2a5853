//! Client-side owner filtering over the cached collection.
//!
//! Pure derived state: nothing here touches the network.

use crm_core::Instance;
use std::collections::BTreeSet;

/// The active owner selection. Empty means match-all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerFilter {
    selected: BTreeSet<String>,
}

impl OwnerFilter {
    /// Replace the active selection wholesale.
    pub fn set_selected(&mut self, owners: impl IntoIterator<Item = String>) {
        self.selected = owners.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn matches(&self, instance: &Instance) -> bool {
        self.selected.is_empty() || self.selected.contains(&instance.owned_by)
    }

    /// The matching rows in their original fetch order.
    pub fn filtered(&self, rows: &[Instance]) -> Vec<Instance> {
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}

/// De-duplicated `owned_by` values, sorted ascending for deterministic
/// rendering.
pub fn unique_owners(rows: &[Instance]) -> Vec<String> {
    let owners: BTreeSet<&str> = rows.iter().map(|row| row.owned_by.as_str()).collect();
    owners.into_iter().map(str::to_string).collect()
}
