//! Permission catalog and category grouping.
//!
//! The catalog is the flat, ordered permission list fetched from the backend.
//! Grouping is derived and recomputed from it; it never feeds back into the
//! catalog. Normalization here is also the single compatibility shim for
//! legacy name-keyed selection members.

use std::collections::HashMap;

use crate::models::{Permission, PermissionCategory, PermissionRef};
use crate::selection::SelectionSet;

/// Group label for permissions the backend left uncategorized.
pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    permissions: Vec<Permission>,
    /// name -> id translation for legacy selection members.
    id_by_name: HashMap<String, String>,
}

impl PermissionCatalog {
    pub fn new(permissions: Vec<Permission>) -> Self {
        let id_by_name = permissions
            .iter()
            .map(|permission| (permission.name.clone(), permission.id.clone()))
            .collect();

        Self {
            permissions,
            id_by_name,
        }
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    pub fn contains_id(&self, permission_id: &str) -> bool {
        self.permissions
            .iter()
            .any(|permission| permission.id == permission_id)
    }

    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.id_by_name.get(name).map(String::as_str)
    }

    /// Partition the catalog into named groups.
    ///
    /// Groups appear in order of first appearance in the catalog and keep
    /// catalog order internally, so the same catalog always yields the same
    /// grouping. Uncategorized permissions land under [`DEFAULT_CATEGORY`].
    pub fn categories(&self) -> Vec<PermissionCategory> {
        let mut groups: Vec<PermissionCategory> = Vec::new();
        let mut index_by_label: HashMap<String, usize> = HashMap::new();

        for permission in &self.permissions {
            let label = permission.category_key().unwrap_or(DEFAULT_CATEGORY);

            let group_index = match index_by_label.get(label) {
                Some(index) => *index,
                None => {
                    index_by_label.insert(label.to_string(), groups.len());
                    groups.push(PermissionCategory {
                        id: category_id_for(label),
                        category: label.to_string(),
                        permissions: Vec::new(),
                    });
                    groups.len() - 1
                }
            };

            groups[group_index].permissions.push(permission.clone());
        }

        groups
    }

    /// Translate a raw selection into canonical id-keyed form.
    ///
    /// Legacy members keyed by permission name become ids; members matching
    /// nothing in the catalog are dropped, so a permission deleted from the
    /// catalog cannot ride along silently on the next save.
    pub fn normalize_selection<I, S>(&self, raw: I) -> SelectionSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = SelectionSet::new();

        for key in raw {
            let key = key.as_ref();
            if self.contains_id(key) {
                selection.insert(key.to_string());
            } else if let Some(id) = self.id_for_name(key) {
                selection.insert(id.to_string());
            } else {
                tracing::debug!(key = %key, "dropping selection member not in catalog");
            }
        }

        selection
    }

    /// Seed a selection from a role's `permissions` field (`id ?? name` per
    /// entry, then normalization).
    pub fn seed_selection(&self, refs: &[PermissionRef]) -> SelectionSet {
        self.normalize_selection(refs.iter().filter_map(PermissionRef::key))
    }
}

/// Stable id for a locally derived category group.
fn category_id_for(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' => c,
            'A'..='Z' => c.to_ascii_lowercase(),
            _ => '_',
        })
        .collect()
}
