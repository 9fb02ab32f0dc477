//! Tenant and namespace identifiers.
//!
//! A tenant is one conversational end-user. Every tenant's vectors live in
//! their own storage namespace, named `<base_prefix>_<tenant_id>`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tenant used when a request omits `user_id` on endpoints that allow it.
pub const DEFAULT_TENANT: &str = "default_user";

/// Opaque identifier of a conversational end-user.
///
/// No validation is performed: the caller is trusted, and the value is used
/// verbatim when deriving namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The fallback tenant (`default_user`).
    pub fn default_user() -> Self {
        Self(DEFAULT_TENANT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TenantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TenantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Logical storage partition (a vector-store collection name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Wrap an already-computed namespace string.
    ///
    /// Use the resolver in `memorb-core` to derive one from a tenant.
    pub fn from_raw(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_serializes_as_plain_string() {
        let tenant = TenantId::new("alice");
        assert_eq!(serde_json::to_string(&tenant).unwrap(), "\"alice\"");
        let back: TenantId = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(back, tenant);
    }

    #[test]
    fn test_default_user() {
        assert_eq!(TenantId::default_user().as_str(), "default_user");
    }

    #[test]
    fn test_namespace_display() {
        let ns = Namespace::from_raw("memory_orb_bob");
        assert_eq!(ns.to_string(), "memory_orb_bob");
        assert_eq!(ns.as_ref(), "memory_orb_bob");
    }
}
