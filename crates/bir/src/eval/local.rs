//! Variable declaration evaluation

use super::Evaluate;
use crate::ast::{DeclarationKind, VariableDeclaration};
use crate::environment::BindingKind;
use crate::error::{ErrorKind, Result};
use crate::module::Module;

/// Evaluate a `let`/`const` declaration into the innermost scope.
///
/// # Errors
///
/// Returns `RedeclaredVariable` if the name is already bound in the
/// innermost scope; shadowing an outer binding is allowed.
pub(super) fn declare_variable(module: &mut Module, decl: &VariableDeclaration) -> Result<()> {
    let value = decl.right.eval(module)?;

    if !module.scopes.can_declare(decl.left.name()) {
        return Err(module.error(
            ErrorKind::RedeclaredVariable {
                name: decl.left.value.clone(),
            },
            decl.position,
        ));
    }

    let kind = match decl.kind {
        DeclarationKind::Let => BindingKind::Mutable,
        DeclarationKind::Const => BindingKind::Const,
    };
    module.scopes.add_variable(decl.left.clone(), value, kind);
    Ok(())
}
