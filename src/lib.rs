pub mod authz;
pub mod catalog;
pub mod config;
pub mod console;
pub mod draft;
pub mod errors;
pub mod models;
pub mod notify;
pub mod selection;
pub mod services;

// Re-export commonly used items for embedders and tests
pub use authz::Capabilities;
pub use catalog::PermissionCatalog;
pub use console::AdminConsole;
pub use draft::{DraftState, RoleDraft};
pub use errors::{ConsoleError, ConsoleResult};
pub use selection::{SelectionSet, SelectionStatus};
