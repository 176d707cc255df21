//! Read-only named value bundles

use indexmap::IndexMap;

use super::Scope;
use crate::value::Value;

/// Snapshot of a namespace body's bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    members: IndexMap<String, Value>,
}

impl Namespace {
    /// Freeze the bindings of an evaluated namespace body.
    pub fn from_scope(scope: &Scope) -> Self {
        Self {
            members: scope
                .bindings()
                .map(|binding| (binding.name().to_string(), binding.value))
                .collect(),
        }
    }

    /// Look up a member.
    pub fn get(&self, member: &str) -> Option<Value> {
        self.members.get(member).copied()
    }

    /// Member names in declaration order.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }
}

/// All namespaces visible to a module, its imports' included.
#[derive(Debug, Clone, Default)]
pub struct Namespaces {
    registry: IndexMap<String, Namespace>,
}

impl Namespaces {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace. Returns `false` if the name is taken.
    pub fn declare(&mut self, name: impl Into<String>, namespace: Namespace) -> bool {
        let name = name.into();
        if self.registry.contains_key(&name) {
            return false;
        }
        self.registry.insert(name, namespace);
        true
    }

    /// Look up a namespace.
    pub fn get(&self, name: &str) -> Option<&Namespace> {
        self.registry.get(name)
    }

    /// Whether a namespace is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// Fold an imported module's registry into this one.
    ///
    /// Existing entries win over imported ones of the same name.
    pub fn merge(&mut self, other: &Namespaces) {
        for (name, namespace) in &other.registry {
            self.registry
                .entry(name.clone())
                .or_insert_with(|| namespace.clone());
        }
    }

    /// Number of registered namespaces.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Binding;

    fn namespace(pairs: &[(&str, i64)]) -> Namespace {
        let mut scope = Scope::new();
        for (name, value) in pairs {
            scope.insert(Binding::constant(*name, Value(*value)));
        }
        Namespace::from_scope(&scope)
    }

    #[test]
    fn test_declare_rejects_duplicates() {
        let mut namespaces = Namespaces::new();
        assert!(namespaces.declare("math", namespace(&[("pi", 3)])));
        assert!(!namespaces.declare("math", namespace(&[("e", 2)])));
        assert_eq!(namespaces.get("math").and_then(|ns| ns.get("pi")), Some(Value(3)));
    }

    #[test]
    fn test_merge_keeps_existing() {
        let mut local = Namespaces::new();
        local.declare("a", namespace(&[("x", 1)]));

        let mut imported = Namespaces::new();
        imported.declare("a", namespace(&[("x", 9)]));
        imported.declare("b", namespace(&[("y", 2)]));

        local.merge(&imported);
        assert_eq!(local.len(), 2);
        assert_eq!(local.get("a").and_then(|ns| ns.get("x")), Some(Value(1)));
        assert_eq!(local.get("b").and_then(|ns| ns.get("y")), Some(Value(2)));
    }

    #[test]
    fn test_member_order() {
        let ns = namespace(&[("b", 1), ("a", 2)]);
        assert_eq!(ns.members().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(ns.get("missing"), None);
    }
}
