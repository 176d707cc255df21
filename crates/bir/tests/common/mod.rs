//! Program tree builders shared by the integration tests.
//!
//! Each builder emits the JSON shape the external parser produces, so the
//! trees go through the same decoding path as real programs.

#![allow(dead_code)]

use std::rc::Rc;

use bir::{
    CapturedIo, EngineConfig, EvalError, Frontend, Host, Module, NativeRegistry, TreeFrontend,
    Value,
};
use serde_json::{json, Value as Json};

// ═══════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════

pub fn int(value: i64) -> Json {
    json!({ "operation": "primitive", "type": "int", "value": value })
}

pub fn string(value: &str) -> Json {
    json!({ "operation": "primitive", "type": "string", "value": value })
}

pub fn array(values: Vec<Json>) -> Json {
    json!({ "operation": "primitive", "type": "array", "values": values })
}

pub fn ident(name: &str) -> Json {
    json!({ "operation": "identifier", "value": name, "negative": false })
}

pub fn reference(name: &str) -> Json {
    json!({ "operation": "reference", "value": name, "negative": false })
}

pub fn negated(name: &str) -> Json {
    json!({ "operation": "reference", "value": name, "negative": true })
}

pub fn arith(op: &str, left: Json, right: Json) -> Json {
    json!({ "operation": "arithmetic", "type": op, "left": left, "right": right })
}

pub fn cond(op: &str, left: Json, right: Json) -> Json {
    json!({ "operation": "condition", "type": op, "left": left, "right": right })
}

pub fn call(name: &str, arguments: Vec<Json>) -> Json {
    call_with_verbs(name, vec![], arguments)
}

pub fn call_with_verbs(name: &str, verbs: Vec<Json>, arguments: Vec<Json>) -> Json {
    json!({
        "operation": "block_call",
        "name": reference(name),
        "verbs": verbs,
        "arguments": arguments
    })
}

pub fn mutater(name: &str, arguments: Vec<Json>) -> Json {
    json!({
        "operation": "scope_mutater_expression",
        "mutater": ident(name),
        "arguments": arguments
    })
}

pub fn ns_index(namespace: &str, member: Json) -> Json {
    json!({ "operation": "namespace_index", "namespace": ident(namespace), "member": member })
}

// ═══════════════════════════════════════════════════════════════════════
// Statements
// ═══════════════════════════════════════════════════════════════════════

pub fn let_(name: &str, right: Json) -> Json {
    json!({ "operation": "variable_declaration", "kind": "let", "left": ident(name), "right": right })
}

pub fn const_(name: &str, right: Json) -> Json {
    json!({ "operation": "variable_declaration", "kind": "const", "left": ident(name), "right": right })
}

pub fn ret(expression: Json) -> Json {
    json!({ "operation": "return_statement", "expression": expression })
}

pub fn throw(expression: Json) -> Json {
    json!({ "operation": "throw_statement", "expression": expression })
}

pub fn assign(name: &str, right: Json) -> Json {
    json!({ "operation": "assign_statement", "left": reference(name), "right": right })
}

pub fn modify(kind: &str, name: &str, right: Option<Json>) -> Json {
    json!({
        "operation": "quantity_modifier_statement",
        "type": kind,
        "statement": reference(name),
        "right": right
    })
}

pub fn block(name: &str, arguments: &[&str], program: Vec<Json>) -> Json {
    block_full(name, &[], arguments, None, program)
}

pub fn block_full(
    name: &str,
    verbs: &[&str],
    arguments: &[&str],
    init: Option<Vec<Json>>,
    program: Vec<Json>,
) -> Json {
    let verbs: Vec<Json> = verbs.iter().map(|v| ident(v)).collect();
    let arguments: Vec<Json> = arguments.iter().map(|a| ident(a)).collect();
    json!({
        "operation": "block_declaration",
        "name": ident(name),
        "verbs": verbs,
        "arguments": arguments,
        "body": { "init": init, "program": program },
        "implementing": false
    })
}

pub fn implementing(name: &str, target: &str, populate: Option<Json>) -> Json {
    json!({
        "operation": "block_declaration",
        "name": ident(name),
        "verbs": null,
        "arguments": null,
        "body": null,
        "implementing": true,
        "implements": ident(target),
        "populate": populate
    })
}

pub fn for_(count: Json, placeholder: &str, body: Vec<Json>) -> Json {
    json!({ "operation": "for_statement", "statement": count, "placeholder": placeholder, "body": body })
}

pub fn while_(condition: Json, body: Vec<Json>) -> Json {
    json!({ "operation": "while_statement", "statement": condition, "body": body })
}

pub fn if_(
    condition: Json,
    body: Vec<Json>,
    elifs: Vec<(Json, Vec<Json>)>,
    otherwise: Option<Vec<Json>>,
) -> Json {
    let elifs: Vec<Json> = elifs
        .into_iter()
        .map(|(condition, body)| json!({ "condition": condition, "body": body }))
        .collect();
    json!({
        "operation": "if_statement",
        "condition": condition,
        "body": body,
        "elifs": elifs,
        "else": otherwise
    })
}

pub fn switch(condition: Json, cases: Vec<(Json, Vec<Json>)>, default: Option<Vec<Json>>) -> Json {
    let cases: Vec<Json> = cases
        .into_iter()
        .map(|(case, body)| json!({ "case": case, "body": body }))
        .collect();
    json!({
        "operation": "switch_statement",
        "condition": condition,
        "cases": cases,
        "default": default.map(|body| json!({ "body": body }))
    })
}

pub fn namespace(name: &str, body: Vec<Json>) -> Json {
    json!({ "operation": "namespace_declaration", "name": ident(name), "body": body })
}

pub fn import(source: &str) -> Json {
    json!({ "source": { "value": source } })
}

// ═══════════════════════════════════════════════════════════════════════
// Running
// ═══════════════════════════════════════════════════════════════════════

pub fn program(statements: Vec<Json>) -> String {
    program_with_imports(vec![], statements)
}

pub fn program_with_imports(imports: Vec<Json>, statements: Vec<Json>) -> String {
    json!({ "imports": imports, "program": statements }).to_string()
}

/// Route engine events to the test output; `RUST_LOG=bir=trace` shows
/// frame traffic.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Host over the tree frontend with captured console I/O.
pub fn host_with(config: EngineConfig, io: CapturedIo) -> Rc<Host> {
    Host::new(config, TreeFrontend::new(), NativeRegistry::standard(io))
}

pub fn host() -> Rc<Host> {
    host_with(EngineConfig::new(), CapturedIo::default())
}

/// Link `statements` as a module on `host` without running it.
pub fn module_on(host: Rc<Host>, statements: Vec<Json>) -> Module {
    let tree = TreeFrontend::new()
        .parse(&program(statements))
        .expect("test program should decode");
    Module::from_program(tree, ".", host).expect("test program should link")
}

/// Run `statements` on a fresh host; the module is returned for
/// inspection.
pub fn run(statements: Vec<Json>) -> (Module, Result<Value, EvalError>) {
    let mut module = module_on(host(), statements);
    let result = module.run();
    (module, result)
}

pub fn run_ok(statements: Vec<Json>) -> Value {
    let (_, result) = run(statements);
    result.expect("program should run")
}

pub fn run_err(statements: Vec<Json>) -> EvalError {
    let (_, result) = run(statements);
    result.expect_err("program should fail")
}
