//! Capability gating for console actions.
//!
//! Capabilities are an explicit value injected into [`AdminConsole`](crate::console::AdminConsole),
//! never ambient state. They gate whether an affordance is offered at all;
//! the backend remains the final authority.

use std::collections::HashSet;

/// Well-known capability names.
pub mod capabilities {
    pub const ROLE_VIEW: &str = "role.view";
    pub const ROLE_CREATE: &str = "role.create";
    pub const ROLE_UPDATE: &str = "role.update";
    pub const ROLE_DELETE: &str = "role.delete";
    pub const PERMISSION_VIEW: &str = "permission.view";
}

#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    granted: HashSet<String>,
    unrestricted: bool,
}

impl Capabilities {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            granted: names.into_iter().map(Into::into).collect(),
            unrestricted: false,
        }
    }

    /// Every check passes. Used by trusted operator tooling where the backend
    /// enforces the real policy.
    pub fn unrestricted() -> Self {
        Self {
            granted: HashSet::new(),
            unrestricted: true,
        }
    }

    pub fn allows(&self, capability: &str) -> bool {
        self.unrestricted || self.granted.contains(capability)
    }

    pub fn allows_any<'a, I>(&self, capabilities: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.unrestricted || capabilities.into_iter().any(|c| self.granted.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granted_names_allow() {
        let caps = Capabilities::from_names([capabilities::ROLE_VIEW]);

        assert!(caps.allows(capabilities::ROLE_VIEW));
        assert!(!caps.allows(capabilities::ROLE_DELETE));
        assert!(caps.allows_any([capabilities::ROLE_DELETE, capabilities::ROLE_VIEW]));
    }

    #[test]
    fn unrestricted_allows_everything() {
        let caps = Capabilities::unrestricted();

        assert!(caps.allows(capabilities::ROLE_DELETE));
        assert!(caps.allows_any(Vec::<&str>::new()));
    }
}
