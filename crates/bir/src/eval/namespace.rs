//! Namespace declaration and indexing

use tracing::debug;

use super::local::declare_variable;
use super::{Evaluate, FrameGuard};
use crate::ast::{NamespaceDeclaration, NamespaceIndex, Statement};
use crate::environment::Namespace;
use crate::error::{ErrorKind, Result};
use crate::module::Module;
use crate::value::Value;

/// Evaluate a namespace body and register its snapshot.
///
/// The body runs in a fresh scope and may only declare variables.
pub(super) fn declare_namespace(module: &mut Module, decl: &NamespaceDeclaration) -> Result<()> {
    let name = decl.name.name();
    if module.namespaces.contains(name) {
        return Err(module.error(
            ErrorKind::RedeclaredNamespace {
                name: name.to_string(),
            },
            decl.position,
        ));
    }

    let namespace = {
        let mut guard = FrameGuard::new(&mut *module);
        guard.push_fresh();
        for statement in decl.body.iter() {
            match statement {
                Statement::VariableDeclaration(var) => declare_variable(&mut guard, var)?,
                Statement::Comment(_) => {}
                other => {
                    return Err(guard.error(ErrorKind::NamespaceStatement, other.position()));
                }
            }
        }

        let snapshot = Namespace::from_scope(&guard.scopes.current().borrow());
        snapshot
    };

    debug!(namespace = name, members = namespace.members().count(), "namespace declared");
    module.namespaces.declare(name, namespace);
    Ok(())
}

impl Evaluate for NamespaceIndex {
    fn eval(&self, module: &mut Module) -> Result<Value> {
        let namespace_name = self.namespace.name();
        let Some(namespace) = module.namespaces.get(namespace_name) else {
            return Err(module.error(
                ErrorKind::NamespaceNotFound {
                    name: namespace_name.to_string(),
                },
                self.position,
            ));
        };

        let Some(value) = namespace.get(self.member.name()) else {
            return Err(module.error(
                ErrorKind::NamespaceMemberNotFound {
                    namespace: namespace_name.to_string(),
                    member: self.member.name().to_string(),
                },
                self.position,
            ));
        };

        if self.member.negative {
            Ok(Value(value.get().wrapping_neg()))
        } else {
            Ok(value)
        }
    }
}
