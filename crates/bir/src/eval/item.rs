//! Block declaration evaluation

use std::rc::Rc;

use tracing::debug;

use super::literal::seed_values;
use super::{resolve_stack, FrameGuard};
use crate::ast::{empty_body, BlockDeclaration, Body, Expression};
use crate::block::{Block, BlockKind};
use crate::callstack::{CallFrame, FrameKind};
use crate::environment::{Binding, Scope, ScopeRef};
use crate::error::{ErrorKind, Result};
use crate::module::Module;
use crate::value::Value;

/// Name of the instance binding a `populate` seed overwrites with its
/// element count.
const INDEX_BINDING: &str = "index";

/// Resolve a block declaration into the innermost scope.
///
/// # Errors
///
/// - `RedeclaredBlock` if a block of that name is reachable
/// - `MissingImplementation` if an implemented block does not exist
/// - any error raised by the `init` list or the `populate` seed
pub(super) fn declare_block(module: &mut Module, decl: &BlockDeclaration) -> Result<()> {
    let name = decl.name.name();
    if module.scopes.block_exists(name) {
        return Err(module.error(
            ErrorKind::RedeclaredBlock {
                name: name.to_string(),
            },
            decl.position,
        ));
    }

    let block = if decl.implementing {
        implementing(module, decl)?
    } else {
        plain(module, decl)?
    };

    debug!(block = name, implementing = decl.implementing, "block declared");
    module.scopes.add_block(Rc::new(block));
    Ok(())
}

fn plain(module: &mut Module, decl: &BlockDeclaration) -> Result<Block> {
    let (init, program) = match &decl.body {
        Some(body) => (body.init.clone(), Rc::clone(&body.program)),
        None => (None, empty_body()),
    };

    let instance = match init {
        Some(init) => run_init(module, decl, init)?,
        None => Scope::new().into_ref(),
    };

    Ok(Block::new(
        decl.name.clone(),
        module.id,
        BlockKind::Plain {
            arguments: decl.arguments.clone(),
            verbs: decl.verbs.clone(),
            program,
        },
        instance,
    ))
}

/// Run an `init` list once; its scope becomes the block's instance.
fn run_init(
    module: &mut Module,
    decl: &BlockDeclaration,
    init: Body,
) -> Result<ScopeRef> {
    let instance = Scope::new().into_ref();

    let mut guard = FrameGuard::new(module);
    let scope_index = guard.push_scope(Rc::clone(&instance));
    guard.push_frame(CallFrame::new(
        format!("{}:init", decl.name.name()),
        FrameKind::Init,
        decl.position,
        scope_index,
        Rc::clone(&init),
    ));
    resolve_stack(&mut guard, &init)?;
    drop(guard);

    Ok(instance)
}

fn implementing(module: &mut Module, decl: &BlockDeclaration) -> Result<Block> {
    let Some(implements) = &decl.implements else {
        return Err(module.error(
            ErrorKind::MissingImplementation {
                name: String::new(),
            },
            decl.position,
        ));
    };

    let target = module
        .scopes
        .find_block(implements.name())
        .ok_or_else(|| {
            module.error(
                ErrorKind::MissingImplementation {
                    name: implements.value.clone(),
                },
                implements.position,
            )
        })?
        .block;

    let instance = Rc::clone(target.instance());
    if let Some(populate) = &decl.populate {
        populate_instance(module, &instance, populate)?;
    }

    Ok(Block::new(
        decl.name.clone(),
        module.id,
        BlockKind::Implementing { target },
        instance,
    ))
}

/// Seed `value_0..value_{n-1}` into a shared instance.
///
/// The seed is evaluated with the instance as the innermost scope. An
/// existing `index` binding is set to the element count.
fn populate_instance(module: &mut Module, instance: &ScopeRef, populate: &Expression) -> Result<()> {
    let values = {
        let mut guard = FrameGuard::new(module);
        guard.push_scope(Rc::clone(instance));
        seed_values(&mut guard, populate)?
    };

    let count = values.len();
    let mut scope = instance.borrow_mut();
    for (i, value) in values.into_iter().enumerate() {
        scope.insert(Binding::constant(format!("value_{}", i), value));
    }
    if scope.contains(INDEX_BINDING) {
        scope.set(INDEX_BINDING, Value(count as i64));
    }
    Ok(())
}
