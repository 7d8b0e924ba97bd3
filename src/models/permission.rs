use serde::{Deserialize, Serialize};

// =============================================================================
// PERMISSION
// =============================================================================

/// A single grantable permission from the backend catalog.
///
/// Immutable once loaded; the catalog owns these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Some catalog payloads tag permissions with a category id instead of a
    /// label; the grouper falls back to this when `category` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl Permission {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: None,
            description: None,
            category: None,
            category_id: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Label shown to operators; falls back to the machine name.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Category key used for grouping: `category`, falling back to `categoryId`.
    pub fn category_key(&self) -> Option<&str> {
        self.category.as_deref().or(self.category_id.as_deref())
    }
}

// =============================================================================
// PERMISSION CATEGORY
// =============================================================================

/// A named group of permissions, either fetched from the backend or derived
/// locally from the flat catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCategory {
    pub id: String,
    pub category: String,
    pub permissions: Vec<Permission>,
}

// =============================================================================
// LEGACY PERMISSION REFERENCE
// =============================================================================

/// The shape older role payloads use for their `permissions` field: either a
/// bare permission id, or an embedded permission object keyed by `id` with a
/// `name` fallback. This is the only place the legacy shape is accepted;
/// everything downstream works on id-keyed selection sets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PermissionRef {
    Id(String),
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl PermissionRef {
    /// Selection key for this entry: `id ?? name`. `None` for an object
    /// carrying neither, which seeding skips.
    pub fn key(&self) -> Option<&str> {
        match self {
            PermissionRef::Id(id) => Some(id),
            PermissionRef::Object { id, name } => id.as_deref().or(name.as_deref()),
        }
    }
}

impl From<&Permission> for PermissionRef {
    fn from(permission: &Permission) -> Self {
        PermissionRef::Object {
            id: Some(permission.id.clone()),
            name: Some(permission.name.clone()),
        }
    }
}
