//! Tenant namespace resolution and per-tenant config derivation.
//!
//! Every tenant's vectors live in a namespace named `<prefix>_<tenant>`.
//! The tenant id is concatenated verbatim (no escaping), so the mapping is
//! injective over tenant ids as long as the prefix is fixed.

use memorb_types::config::MemoryConfig;
use memorb_types::tenant::{Namespace, TenantId};

/// Separator between the base prefix and the tenant id.
pub const NAMESPACE_SEPARATOR: char = '_';

/// Derive the namespace for `tenant` under `prefix`. Pure and total.
pub fn resolve(prefix: &str, tenant: &TenantId) -> Namespace {
    Namespace::from_raw(format!("{prefix}{NAMESPACE_SEPARATOR}{tenant}"))
}

/// Return a copy of `base` bound to `tenant`'s namespace.
///
/// Only `vector_store.collection_name` changes; `base` is left untouched.
pub fn derive_tenant_config(base: &MemoryConfig, tenant: &TenantId) -> MemoryConfig {
    let mut config = base.clone();
    config.vector_store.collection_name =
        resolve(&base.vector_store.collection_name, tenant).to_string();
    config
}

/// Resolver pinned to one base prefix.
#[derive(Debug, Clone)]
pub struct NamespaceResolver {
    prefix: String,
}

impl NamespaceResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn resolve(&self, tenant: &TenantId) -> Namespace {
        resolve(&self.prefix, tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_concatenates_prefix_and_tenant() {
        let ns = resolve("memory_orb", &TenantId::new("alice"));
        assert_eq!(ns.as_str(), "memory_orb_alice");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let tenant = TenantId::new("bob");
        assert_eq!(resolve("memory_orb", &tenant), resolve("memory_orb", &tenant));
    }

    #[test]
    fn test_resolve_distinct_tenants_distinct_namespaces() {
        let tenants = ["alice", "alice_", "bob", "Bob", "b0b", "alice2", "", "x"];
        let mut seen = std::collections::HashSet::new();
        for t in tenants {
            assert!(
                seen.insert(resolve("memory_orb", &TenantId::new(t))),
                "collision for {t:?}"
            );
        }
    }

    #[test]
    fn test_resolve_does_not_escape() {
        let ns = resolve("memory_orb", &TenantId::new("team/a_b c"));
        assert_eq!(ns.as_str(), "memory_orb_team/a_b c");
    }

    #[test]
    fn test_derive_tenant_config_only_changes_collection() {
        let base = MemoryConfig::default();
        let derived = derive_tenant_config(&base, &TenantId::new("alice"));

        assert_eq!(derived.vector_store.collection_name, "memory_orb_alice");
        assert_eq!(base.vector_store.collection_name, "memory_orb");

        let mut expected = base.clone();
        expected.vector_store.collection_name = "memory_orb_alice".into();
        assert_eq!(derived, expected);
    }

    #[test]
    fn test_resolver_matches_free_function() {
        let resolver = NamespaceResolver::new("episodic_memory");
        let tenant = TenantId::new("carol");
        assert_eq!(resolver.resolve(&tenant), resolve("episodic_memory", &tenant));
        assert_eq!(resolver.prefix(), "episodic_memory");
    }
}
