use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use widget_console::authz::{capabilities, Capabilities};
use widget_console::catalog::PermissionCatalog;
use widget_console::console::AdminConsole;
use widget_console::draft::{DraftState, RoleDraft};
use widget_console::errors::{ConsoleError, ConsoleResult};
use widget_console::models::{
    Permission, PermissionCategory, PermissionRef, Role, RoleCreateRequest, RoleUpdateRequest,
};
use widget_console::notify::{Notification, NotificationVariant, Notifier};
use widget_console::services::{PermissionCatalogService, RoleService};

// =============================================================================
// FAKES
// =============================================================================

struct FakeCatalogService {
    permissions: Vec<Permission>,
}

#[async_trait]
impl PermissionCatalogService for FakeCatalogService {
    async fn list_permissions(&self) -> ConsoleResult<Vec<Permission>> {
        Ok(self.permissions.clone())
    }

    async fn list_permission_categories(&self) -> ConsoleResult<Vec<PermissionCategory>> {
        Err(ConsoleError::not_found("no category endpoint"))
    }
}

#[derive(Default)]
struct FakeRoleService {
    roles: Mutex<Vec<Role>>,
    write_calls: AtomicUsize,
    fail_with: Mutex<Option<String>>,
}

impl FakeRoleService {
    fn failing(message: &str) -> Self {
        Self {
            fail_with: Mutex::new(Some(message.to_string())),
            ..Self::default()
        }
    }

    fn with_roles(roles: Vec<Role>) -> Self {
        Self {
            roles: Mutex::new(roles),
            ..Self::default()
        }
    }

    fn writes(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> ConsoleResult<()> {
        match self.fail_with.lock().unwrap().as_ref() {
            Some(message) => Err(ConsoleError::persistence(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RoleService for FakeRoleService {
    async fn list_roles(&self) -> ConsoleResult<Vec<Role>> {
        Ok(self.roles.lock().unwrap().clone())
    }

    async fn create_role(&self, request: &RoleCreateRequest) -> ConsoleResult<Role> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let mut roles = self.roles.lock().unwrap();
        let role = Role {
            id: format!("r{}", roles.len() + 1),
            name: request.name.clone(),
            description: request.description.clone(),
            is_system: false,
            permissions: request
                .permission_ids
                .iter()
                .cloned()
                .map(PermissionRef::Id)
                .collect(),
            created_at: None,
            updated_at: None,
        };
        roles.push(role.clone());
        Ok(role)
    }

    async fn update_role(&self, role_id: &str, request: &RoleUpdateRequest) -> ConsoleResult<Role> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let mut roles = self.roles.lock().unwrap();
        let role = roles
            .iter_mut()
            .find(|role| role.id == role_id)
            .ok_or_else(|| ConsoleError::not_found("role not found"))?;

        role.name = request.name.clone();
        role.description = request.description.clone();
        role.permissions = request
            .permission_ids
            .iter()
            .cloned()
            .map(PermissionRef::Id)
            .collect();
        Ok(role.clone())
    }

    async fn delete_role(&self, role_id: &str) -> ConsoleResult<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        self.roles.lock().unwrap().retain(|role| role.id != role_id);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

impl RecordingNotifier {
    fn recorded(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

fn catalog() -> PermissionCatalog {
    PermissionCatalog::new(vec![
        Permission::new("p1", "view_users").with_category("Users"),
        Permission::new("p2", "edit_users").with_category("Users"),
        Permission::new("p3", "view_billing").with_category("Billing"),
    ])
}

fn console_with(
    role_service: Arc<FakeRoleService>,
    caps: Capabilities,
) -> (AdminConsole, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let console = AdminConsole::new(
        Arc::new(FakeCatalogService {
            permissions: catalog().permissions().to_vec(),
        }),
        role_service,
        caps,
        notifier.clone(),
    );
    (console, notifier)
}

fn existing_role() -> Role {
    Role {
        id: "r1".to_string(),
        name: "support".to_string(),
        description: Some("support staff".to_string()),
        is_system: false,
        permissions: vec![
            PermissionRef::Object {
                id: Some("p1".to_string()),
                name: Some("view_users".to_string()),
            },
            PermissionRef::Object {
                id: Some("p2".to_string()),
                name: Some("edit_users".to_string()),
            },
        ],
        created_at: None,
        updated_at: None,
    }
}

fn system_role() -> Role {
    Role {
        is_system: true,
        ..existing_role()
    }
}

// =============================================================================
// SEEDING
// =============================================================================

#[test]
fn edit_draft_seeds_ids_from_permission_objects() {
    let draft = RoleDraft::edit(&existing_role(), &catalog());

    assert_eq!(draft.state(), DraftState::Editing);
    assert_eq!(draft.selection().len(), 2);
    assert!(draft.selection().contains("p1"));
    assert!(draft.selection().contains("p2"));
}

#[test]
fn edit_draft_translates_legacy_name_keys_and_prunes_stale_ids() {
    let mut role = existing_role();
    role.permissions = vec![
        PermissionRef::Id("view_billing".to_string()),
        PermissionRef::Id("deleted_permission".to_string()),
    ];

    let draft = RoleDraft::edit(&role, &catalog());

    assert_eq!(draft.selection().len(), 1);
    assert!(draft.selection().contains("p3"));
}

// =============================================================================
// VALIDATION & GATING
// =============================================================================

#[tokio::test]
async fn empty_name_never_reaches_the_role_service() {
    let service = Arc::new(FakeRoleService::default());
    let (console, notifier) = console_with(service.clone(), Capabilities::unrestricted());

    let mut draft = RoleDraft::create();
    let error = console.save_draft(&mut draft).await.unwrap_err();

    assert!(matches!(error, ConsoleError::Validation { field: "name", .. }));
    assert_eq!(service.writes(), 0);
    assert_eq!(draft.state(), DraftState::Editing);
    // local failures surface inline, not as notifications
    assert!(notifier.recorded().is_empty());
}

#[tokio::test]
async fn single_character_name_is_too_short() {
    let service = Arc::new(FakeRoleService::default());
    let (console, _) = console_with(service.clone(), Capabilities::unrestricted());

    let mut draft = RoleDraft::create();
    draft.set_name("a").unwrap();

    let error = console.save_draft(&mut draft).await.unwrap_err();
    assert!(matches!(error, ConsoleError::Validation { field: "name", .. }));
    assert_eq!(service.writes(), 0);
}

#[tokio::test]
async fn missing_capability_short_circuits_before_the_service() {
    let service = Arc::new(FakeRoleService::default());
    let caps = Capabilities::from_names([capabilities::ROLE_VIEW]);
    let (console, _) = console_with(service.clone(), caps);

    let mut draft = RoleDraft::create();
    draft.set_name("support").unwrap();

    let error = console.save_draft(&mut draft).await.unwrap_err();
    assert!(matches!(error, ConsoleError::PermissionDenied(_)));
    assert_eq!(service.writes(), 0);
}

#[tokio::test]
async fn system_roles_reject_toggles_and_saves() {
    let service = Arc::new(FakeRoleService::default());
    let (console, _) = console_with(service.clone(), Capabilities::unrestricted());

    let mut draft = RoleDraft::edit(&system_role(), &catalog());

    assert!(matches!(
        draft.toggle_permission("p3", true),
        Err(ConsoleError::PermissionDenied(_))
    ));
    assert!(matches!(
        draft.set_name("renamed"),
        Err(ConsoleError::PermissionDenied(_))
    ));
    assert!(matches!(
        console.save_draft(&mut draft).await,
        Err(ConsoleError::PermissionDenied(_))
    ));
    assert_eq!(service.writes(), 0);
}

// =============================================================================
// SAVE FLOW
// =============================================================================

#[tokio::test]
async fn create_flow_sends_sorted_ids_and_notifies_success() {
    let service = Arc::new(FakeRoleService::default());
    let (console, notifier) = console_with(service.clone(), Capabilities::unrestricted());

    let groups = catalog().categories();
    let users = &groups[0];

    let mut draft = RoleDraft::create();
    draft.set_name("support").unwrap();
    draft.set_description("support staff").unwrap();
    draft.toggle_category(&users.permissions, true).unwrap();
    draft.toggle_permission("p3", true).unwrap();

    let saved = console.save_draft(&mut draft).await.unwrap();

    assert_eq!(draft.state(), DraftState::Saved);
    assert_eq!(saved.name, "support");
    assert_eq!(service.writes(), 1);

    // deterministic wire payload: ids arrive sorted
    let roles = console.list_roles().await.unwrap();
    assert_eq!(roles.len(), 1);
    let ids: Vec<&str> = roles[0].permissions.iter().filter_map(|p| p.key()).collect();
    assert_eq!(ids, vec!["p1", "p2", "p3"]);

    let recorded = notifier.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].variant, NotificationVariant::Success);
}

#[tokio::test]
async fn failed_update_keeps_the_draft_and_notifies_with_the_message() {
    let service = Arc::new(FakeRoleService::failing("network error"));
    let (console, notifier) = console_with(service.clone(), Capabilities::unrestricted());

    let mut draft = RoleDraft::edit(&existing_role(), &catalog());
    draft.toggle_permission("p3", true).unwrap();
    let selection_before = draft.selection().clone();

    let error = console.save_draft(&mut draft).await.unwrap_err();

    assert!(matches!(error, ConsoleError::Persistence(_)));
    // dialog stays open with everything retained for retry
    assert_eq!(draft.state(), DraftState::Editing);
    assert_eq!(draft.selection(), &selection_before);
    assert_eq!(draft.name(), "support");

    let recorded = notifier.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].variant, NotificationVariant::Error);
    assert!(recorded[0].description.contains("network error"));
}

#[tokio::test]
async fn retry_after_failure_succeeds() {
    let service = Arc::new(FakeRoleService::with_roles(vec![existing_role()]));
    *service.fail_with.lock().unwrap() = Some("network error".to_string());
    let (console, _) = console_with(service.clone(), Capabilities::unrestricted());

    let mut draft = RoleDraft::edit(&existing_role(), &catalog());
    draft.set_name("support-l2").unwrap();

    assert!(console.save_draft(&mut draft).await.is_err());

    *service.fail_with.lock().unwrap() = None;
    let saved = console.save_draft(&mut draft).await.unwrap();

    assert_eq!(saved.name, "support-l2");
    assert_eq!(draft.state(), DraftState::Saved);
    assert_eq!(service.writes(), 2);
}

#[test]
fn duplicate_submit_is_rejected_while_saving() {
    let mut draft = RoleDraft::create();
    draft.set_name("support").unwrap();

    let caps = Capabilities::unrestricted();
    draft.begin_save(&caps).unwrap();
    assert_eq!(draft.state(), DraftState::Saving);

    assert!(matches!(
        draft.begin_save(&caps),
        Err(ConsoleError::Conflict(_))
    ));
}

#[test]
fn toggles_remain_possible_while_a_save_is_in_flight() {
    let mut draft = RoleDraft::create();
    draft.set_name("support").unwrap();

    let payload = draft.begin_save(&Capabilities::unrestricted()).unwrap();
    assert!(payload.permission_ids.is_empty());

    // queued visually; only the submitted state was sent
    draft.toggle_permission("p1", true).unwrap();
    assert!(draft.selection().contains("p1"));
}

// =============================================================================
// CANCEL / CLOSE
// =============================================================================

#[test]
fn cancel_discards_without_persistence() {
    let mut draft = RoleDraft::edit(&existing_role(), &catalog());

    draft.cancel().unwrap();
    assert_eq!(draft.state(), DraftState::Closed);

    assert!(matches!(
        draft.toggle_permission("p1", true),
        Err(ConsoleError::Conflict(_))
    ));
    // idempotent once closed
    draft.cancel().unwrap();
}

#[test]
fn cancel_is_rejected_mid_save() {
    let mut draft = RoleDraft::create();
    draft.set_name("support").unwrap();
    draft.begin_save(&Capabilities::unrestricted()).unwrap();

    assert!(matches!(draft.cancel(), Err(ConsoleError::Conflict(_))));
}

// =============================================================================
// CONSOLE FLOWS
// =============================================================================

#[tokio::test]
async fn permission_browser_falls_back_to_local_grouping() {
    let service = Arc::new(FakeRoleService::default());
    let (console, _) = console_with(service, Capabilities::unrestricted());

    let categories = console.permission_categories().await.unwrap();

    let labels: Vec<&str> = categories.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(labels, vec!["Users", "Billing"]);
}

#[tokio::test]
async fn delete_is_gated_and_notifies() {
    let service = Arc::new(FakeRoleService::with_roles(vec![existing_role()]));
    let (console, notifier) = console_with(service.clone(), Capabilities::unrestricted());

    let role = console.find_role("support").await.unwrap();
    console.delete_role(&role).await.unwrap();

    assert!(console.list_roles().await.unwrap().is_empty());
    assert_eq!(notifier.recorded().len(), 1);
    assert_eq!(notifier.recorded()[0].variant, NotificationVariant::Success);
}

#[tokio::test]
async fn deleting_a_system_role_is_rejected_client_side() {
    let service = Arc::new(FakeRoleService::with_roles(vec![system_role()]));
    let (console, _) = console_with(service.clone(), Capabilities::unrestricted());

    let role = console.find_role("support").await.unwrap();
    let error = console.delete_role(&role).await.unwrap_err();

    assert!(matches!(error, ConsoleError::PermissionDenied(_)));
    assert_eq!(service.writes(), 0);
}
