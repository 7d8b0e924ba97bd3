//! Collaborator service contracts.
//!
//! The console consumes these; full implementations live behind the traits.
//! `HttpAdminGateway` is the production implementation speaking to the admin
//! backend; tests substitute in-memory fakes.

mod http;

pub use http::HttpAdminGateway;

use async_trait::async_trait;

use crate::errors::ConsoleResult;
use crate::models::{Permission, PermissionCategory, Role, RoleCreateRequest, RoleUpdateRequest};

/// Read side of the permission catalog. Each call returns a stable, complete
/// catalog; there is no pagination contract.
#[async_trait]
pub trait PermissionCatalogService: Send + Sync {
    async fn list_permissions(&self) -> ConsoleResult<Vec<Permission>>;

    async fn list_permission_categories(&self) -> ConsoleResult<Vec<PermissionCategory>>;
}

/// Role persistence. Failures carry a human-readable message; the console
/// converts them into notifications at the save boundary.
#[async_trait]
pub trait RoleService: Send + Sync {
    async fn list_roles(&self) -> ConsoleResult<Vec<Role>>;

    async fn create_role(&self, request: &RoleCreateRequest) -> ConsoleResult<Role>;

    async fn update_role(&self, role_id: &str, request: &RoleUpdateRequest) -> ConsoleResult<Role>;

    async fn delete_role(&self, role_id: &str) -> ConsoleResult<()>;
}
