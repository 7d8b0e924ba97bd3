//! Role draft lifecycle.
//!
//! A draft is the in-progress `{name, description, selection}` behind the
//! create-role and edit-role dialogs. It moves `Editing -> Saving -> Saved`
//! on a successful submit, falls back to `Editing` on a failed one (keeping
//! every field for retry), and reaches `Closed` on cancel. System roles can
//! be opened for viewing but every mutation is refused.

use crate::authz::{capabilities, Capabilities};
use crate::catalog::PermissionCatalog;
use crate::errors::{ConsoleError, ConsoleResult};
use crate::models::{Permission, Role};
use crate::selection::{self, SelectionSet};

pub const MIN_ROLE_NAME_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    Editing,
    Saving,
    Saved,
    Closed,
}

/// Validated draft contents packaged for the role service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftPayload {
    pub name: String,
    pub description: Option<String>,
    /// Sorted so identical drafts always produce identical wire payloads.
    pub permission_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RoleDraft {
    role_id: Option<String>,
    name: String,
    description: String,
    selection: SelectionSet,
    is_system: bool,
    state: DraftState,
}

impl RoleDraft {
    /// Open the create dialog: empty fields, empty selection.
    pub fn create() -> Self {
        Self {
            role_id: None,
            name: String::new(),
            description: String::new(),
            selection: SelectionSet::new(),
            is_system: false,
            state: DraftState::Editing,
        }
    }

    /// Open the edit dialog for an existing role, seeding the selection from
    /// its `permissions` field (`id ?? name` per entry, normalized against
    /// the catalog so legacy name keys become ids and stale ids are pruned).
    pub fn edit(role: &Role, catalog: &PermissionCatalog) -> Self {
        Self {
            role_id: Some(role.id.clone()),
            name: role.name.clone(),
            description: role.description.clone().unwrap_or_default(),
            selection: catalog.seed_selection(&role.permissions),
            is_system: role.is_system,
            state: DraftState::Editing,
        }
    }

    pub fn state(&self) -> DraftState {
        self.state
    }

    pub fn role_id(&self) -> Option<&str> {
        self.role_id.as_deref()
    }

    /// True when saving would create a new role rather than update one.
    pub fn is_new(&self) -> bool {
        self.role_id.is_none()
    }

    pub fn is_system(&self) -> bool {
        self.is_system
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> ConsoleResult<()> {
        self.ensure_mutable()?;
        self.name = name.into();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> ConsoleResult<()> {
        self.ensure_mutable()?;
        self.description = description.into();
        Ok(())
    }

    /// Toggle a single permission; the selection is replaced wholesale.
    pub fn toggle_permission(&mut self, permission_id: &str, checked: bool) -> ConsoleResult<()> {
        self.ensure_mutable()?;
        self.selection = selection::toggle_permission(&self.selection, permission_id, checked);
        Ok(())
    }

    /// Toggle an entire category's permissions at once.
    pub fn toggle_category(&mut self, permissions: &[Permission], checked: bool) -> ConsoleResult<()> {
        self.ensure_mutable()?;
        self.selection = selection::toggle_category(&self.selection, permissions, checked);
        Ok(())
    }

    /// Local-only validation; failures are surfaced inline and never reach
    /// the network layer.
    pub fn validate(&self) -> ConsoleResult<()> {
        let name = self.name.trim();

        if name.is_empty() {
            return Err(ConsoleError::validation("name", "role name is required"));
        }
        if name.len() < MIN_ROLE_NAME_LEN {
            return Err(ConsoleError::validation(
                "name",
                format!("role name must be at least {MIN_ROLE_NAME_LEN} characters"),
            ));
        }

        Ok(())
    }

    /// Transition `Editing -> Saving` and package the draft for submission.
    ///
    /// Rejects duplicate submits, system roles, missing capabilities, and
    /// validation failures, in that order, all before any network call.
    pub fn begin_save(&mut self, caps: &Capabilities) -> ConsoleResult<DraftPayload> {
        match self.state {
            DraftState::Editing => {}
            DraftState::Saving => {
                return Err(ConsoleError::conflict("save already in progress"));
            }
            DraftState::Saved | DraftState::Closed => {
                return Err(ConsoleError::conflict("draft is no longer editable"));
            }
        }

        if self.is_system {
            return Err(ConsoleError::permission_denied(
                "system roles cannot be modified",
            ));
        }

        let required = if self.is_new() {
            capabilities::ROLE_CREATE
        } else {
            capabilities::ROLE_UPDATE
        };
        if !caps.allows(required) {
            return Err(ConsoleError::permission_denied(
                "you don't have permission to perform this action",
            ));
        }

        self.validate()?;

        let mut permission_ids: Vec<String> = self.selection.iter().cloned().collect();
        permission_ids.sort();

        let description = self.description.trim();

        self.state = DraftState::Saving;
        tracing::debug!(role_id = ?self.role_id, "role draft submitted");

        Ok(DraftPayload {
            name: self.name.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            permission_ids,
        })
    }

    /// The external save succeeded; the dialog closes and the caller
    /// refreshes the role list from the server.
    pub fn complete_save(&mut self) {
        self.state = DraftState::Saved;
    }

    /// The external save failed; back to `Editing` with name, description and
    /// selection untouched so the operator can retry without re-entering data.
    pub fn fail_save(&mut self) {
        tracing::debug!(role_id = ?self.role_id, "role draft save failed, retained for retry");
        self.state = DraftState::Editing;
    }

    /// Discard the draft without persisting. Idempotent once closed;
    /// rejected while a save is in flight.
    pub fn cancel(&mut self) -> ConsoleResult<()> {
        match self.state {
            DraftState::Saving => Err(ConsoleError::conflict("save in progress")),
            _ => {
                self.state = DraftState::Closed;
                Ok(())
            }
        }
    }

    /// Edits are allowed while `Editing` and while a save is in flight (only
    /// the state at submit time was sent), but never on system roles and
    /// never after the draft completed or closed.
    fn ensure_mutable(&self) -> ConsoleResult<()> {
        if self.is_system {
            return Err(ConsoleError::permission_denied(
                "system roles cannot be modified",
            ));
        }

        match self.state {
            DraftState::Editing | DraftState::Saving => Ok(()),
            DraftState::Saved | DraftState::Closed => {
                Err(ConsoleError::conflict("draft is no longer editable"))
            }
        }
    }
}
