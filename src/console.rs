//! Console facade: wires the collaborator services, the injected capability
//! set, and the notification sink into the role-management flows.

use std::sync::Arc;

use crate::authz::{capabilities, Capabilities};
use crate::catalog::PermissionCatalog;
use crate::draft::RoleDraft;
use crate::errors::{ConsoleError, ConsoleResult};
use crate::models::{PermissionCategory, Role, RoleCreateRequest, RoleUpdateRequest};
use crate::notify::{Notification, Notifier};
use crate::services::{PermissionCatalogService, RoleService};

pub struct AdminConsole {
    catalog_service: Arc<dyn PermissionCatalogService>,
    role_service: Arc<dyn RoleService>,
    capabilities: Capabilities,
    notifier: Arc<dyn Notifier>,
}

impl AdminConsole {
    pub fn new(
        catalog_service: Arc<dyn PermissionCatalogService>,
        role_service: Arc<dyn RoleService>,
        capabilities: Capabilities,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            catalog_service,
            role_service,
            capabilities,
            notifier,
        }
    }

    // Affordance checks for the presentation layer: an action whose
    // capability is missing is not offered at all.

    pub fn can_view_roles(&self) -> bool {
        self.capabilities.allows(capabilities::ROLE_VIEW)
    }

    pub fn can_create_roles(&self) -> bool {
        self.capabilities.allows(capabilities::ROLE_CREATE)
    }

    pub fn can_edit_roles(&self) -> bool {
        self.capabilities.allows(capabilities::ROLE_UPDATE)
    }

    pub fn can_delete_roles(&self) -> bool {
        self.capabilities.allows(capabilities::ROLE_DELETE)
    }

    /// Fetch the full permission catalog.
    pub async fn load_catalog(&self) -> ConsoleResult<PermissionCatalog> {
        self.require(capabilities::PERMISSION_VIEW)?;
        let permissions = self.catalog_service.list_permissions().await?;
        Ok(PermissionCatalog::new(permissions))
    }

    /// Grouped permission browser. Prefers the backend's own category
    /// listing; backends without one get the locally derived grouping.
    pub async fn permission_categories(&self) -> ConsoleResult<Vec<PermissionCategory>> {
        self.require(capabilities::PERMISSION_VIEW)?;

        match self.catalog_service.list_permission_categories().await {
            Ok(categories) => Ok(categories),
            Err(ConsoleError::NotFound(_)) => {
                let catalog = self.load_catalog().await?;
                Ok(catalog.categories())
            }
            Err(error) => Err(error),
        }
    }

    pub async fn list_roles(&self) -> ConsoleResult<Vec<Role>> {
        self.require(capabilities::ROLE_VIEW)?;
        self.role_service.list_roles().await
    }

    /// Look a role up by id, falling back to its name.
    pub async fn find_role(&self, key: &str) -> ConsoleResult<Role> {
        let roles = self.list_roles().await?;
        roles
            .into_iter()
            .find(|role| role.id == key || role.name == key)
            .ok_or_else(|| ConsoleError::not_found(format!("no role matching '{key}'")))
    }

    /// Submit a draft to the role service and drive its state transitions.
    ///
    /// Local failures (validation, capability, system-role lock, duplicate
    /// submit) propagate without a notification: they are surfaced inline by
    /// the dialog. Remote failures return the draft to `Editing` untouched
    /// and emit an error notification carrying the backend's message.
    ///
    /// Server state is not trusted after a write: on success the caller
    /// discards the draft and re-fetches [`list_roles`](Self::list_roles).
    pub async fn save_draft(&self, draft: &mut RoleDraft) -> ConsoleResult<Role> {
        let payload = draft.begin_save(&self.capabilities)?;

        let result = match draft.role_id() {
            None => {
                let request = RoleCreateRequest {
                    name: payload.name.clone(),
                    description: payload.description.clone(),
                    permission_ids: payload.permission_ids.clone(),
                };
                self.role_service.create_role(&request).await
            }
            Some(role_id) => {
                let request = RoleUpdateRequest {
                    name: payload.name.clone(),
                    description: payload.description.clone(),
                    permission_ids: payload.permission_ids.clone(),
                };
                self.role_service.update_role(role_id, &request).await
            }
        };

        match result {
            Ok(role) => {
                draft.complete_save();
                let title = if draft.is_new() { "Role created" } else { "Role updated" };
                self.notifier
                    .notify(Notification::success(title, format!("'{}' was saved", role.name)));
                Ok(role)
            }
            Err(error) => {
                draft.fail_save();
                self.notifier
                    .notify(Notification::error("Role not saved", error.to_string()));
                Err(error)
            }
        }
    }

    pub async fn delete_role(&self, role: &Role) -> ConsoleResult<()> {
        self.require(capabilities::ROLE_DELETE)?;

        if role.is_system {
            return Err(ConsoleError::permission_denied(
                "system roles cannot be deleted",
            ));
        }

        match self.role_service.delete_role(&role.id).await {
            Ok(()) => {
                self.notifier.notify(Notification::success(
                    "Role deleted",
                    format!("'{}' was deleted", role.name),
                ));
                Ok(())
            }
            Err(error) => {
                self.notifier
                    .notify(Notification::error("Role not deleted", error.to_string()));
                Err(error)
            }
        }
    }

    fn require(&self, capability: &str) -> ConsoleResult<()> {
        if self.capabilities.allows(capability) {
            Ok(())
        } else {
            Err(ConsoleError::permission_denied(
                "you don't have permission to perform this action",
            ))
        }
    }
}
