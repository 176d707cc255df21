//! Program tree consumed by the evaluator
//!
//! The external parser emits a JSON tree in which every statement and
//! expression carries an `operation` tag and a `position`. The tree is
//! decoded once into the closed enums below; the evaluator then matches on
//! them exhaustively instead of re-inspecting tags at each dispatch site.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Deserializer};

/// A shared, immutable statement list.
///
/// Block bodies are cloned into every scope that can see the block, so
/// they are reference counted instead of deep-copied.
pub type Body = Rc<[Statement]>;

/// Source location (1-indexed line, 0-indexed column as the parser emits).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct Position {
    /// Line number
    #[serde(default)]
    pub line: u32,

    /// Column number
    #[serde(default)]
    pub col: u32,
}

impl Position {
    /// Create a position.
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A name with the parser's folded unary minus.
///
/// Identifiers, references and mutater keywords share this shape in the
/// parser output, so all of them decode into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Identifier {
    /// The name itself
    pub value: String,

    /// Whether the source wrote `-name`
    #[serde(default)]
    pub negative: bool,

    /// Where the name appeared
    #[serde(default)]
    pub position: Position,
}

impl Identifier {
    /// Create a non-negated identifier with no source position.
    pub fn synthetic(name: impl Into<String>) -> Self {
        Self {
            value: name.into(),
            negative: false,
            position: Position::default(),
        }
    }

    /// The identifier's name.
    pub fn name(&self) -> &str {
        &self.value
    }
}

/// A whole parsed module.
#[derive(Debug, Clone, Deserialize)]
pub struct Program {
    /// `use` directives, in source order
    #[serde(default, deserialize_with = "nullable")]
    pub imports: Vec<Import>,

    /// Top-level statements
    #[serde(default = "empty_body", deserialize_with = "nullable_body")]
    pub program: Body,
}

impl Program {
    /// A program with no imports and no statements.
    pub fn empty() -> Self {
        Self {
            imports: Vec::new(),
            program: empty_body(),
        }
    }
}

/// A `use "prefix:name"` directive.
#[derive(Debug, Clone, Deserialize)]
pub struct Import {
    /// The quoted source, e.g. `std:io` or `module:helpers`
    pub source: StringLiteral,

    /// Where the directive appeared
    #[serde(default)]
    pub position: Position,
}

/// A string literal as it appears in import sources.
#[derive(Debug, Clone, Deserialize)]
pub struct StringLiteral {
    /// Literal text without quotes
    pub value: String,

    /// Where the literal appeared
    #[serde(default)]
    pub position: Position,
}

// ═══════════════════════════════════════════════════════════════════════
// Statements
// ═══════════════════════════════════════════════════════════════════════

/// A statement, tagged by the parser's `operation` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Statement {
    /// `let x = ...` / `const x = ...`
    VariableDeclaration(VariableDeclaration),

    /// `return expr`
    #[serde(rename = "return_statement")]
    Return(ExpressionStatement),

    /// `throw expr`
    #[serde(rename = "throw_statement")]
    Throw(ExpressionStatement),

    /// `name:verb [args] { ... }` or `name implements other { ... }`
    BlockDeclaration(BlockDeclaration),

    /// `x++`, `x += 2`, ...
    #[serde(rename = "quantity_modifier_statement")]
    QuantityModifier(QuantityModifier),

    /// `x = expr`
    #[serde(rename = "assign_statement")]
    Assign(Assign),

    /// `name:verb(args)` used as a statement
    BlockCall(BlockCall),

    /// `[Write i, v]`, `[Read i]`, `[Delete i]`
    #[serde(rename = "scope_mutater_expression")]
    ScopeMutater(ScopeMutater),

    /// `for n as i { ... }`
    #[serde(rename = "for_statement")]
    For(ForStatement),

    /// `while cond { ... }`
    #[serde(rename = "while_statement")]
    While(WhileStatement),

    /// `if cond { ... } elif cond { ... } else { ... }`
    #[serde(rename = "if_statement")]
    If(IfStatement),

    /// `switch cond { case v { ... } default { ... } }`
    #[serde(rename = "switch_statement")]
    Switch(SwitchStatement),

    /// A named read-only bundle of values
    NamespaceDeclaration(NamespaceDeclaration),

    /// `namespace.member` used as a statement
    NamespaceIndex(NamespaceIndex),

    /// Source comment, ignored
    Comment(Comment),
}

impl Statement {
    /// Where the statement appeared.
    pub fn position(&self) -> Position {
        match self {
            Statement::VariableDeclaration(s) => s.position,
            Statement::Return(s) | Statement::Throw(s) => s.position,
            Statement::BlockDeclaration(s) => s.position,
            Statement::QuantityModifier(s) => s.position,
            Statement::Assign(s) => s.position,
            Statement::BlockCall(s) => s.position,
            Statement::ScopeMutater(s) => s.position,
            Statement::For(s) => s.position,
            Statement::While(s) => s.position,
            Statement::If(s) => s.position,
            Statement::Switch(s) => s.position,
            Statement::NamespaceDeclaration(s) => s.position,
            Statement::NamespaceIndex(s) => s.position,
            Statement::Comment(s) => s.position,
        }
    }
}

/// Declaration kind of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    /// `let`: reassignable
    Let,
    /// `const`: not reassignable from its own scope
    Const,
}

/// `let`/`const` declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct VariableDeclaration {
    /// `let` or `const`
    pub kind: DeclarationKind,

    /// Declared name
    pub left: Identifier,

    /// Initializer
    pub right: Expression,

    /// Where the declaration appeared
    #[serde(default)]
    pub position: Position,
}

/// `return`/`throw` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionStatement {
    /// The value expression
    pub expression: Expression,

    /// Where the statement appeared
    #[serde(default)]
    pub position: Position,
}

/// Raw block declaration as the parser emits it.
///
/// Plain and implementing declarations share one JSON shape; the
/// `implementing` flag selects which optional fields are meaningful.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockDeclaration {
    /// Declared block name
    pub name: Identifier,

    /// Named special parameters
    #[serde(default, deserialize_with = "nullable")]
    pub verbs: Vec<Identifier>,

    /// Positional parameters
    #[serde(default, deserialize_with = "nullable")]
    pub arguments: Vec<Identifier>,

    /// `init` and `program` lists (plain blocks only)
    #[serde(default)]
    pub body: Option<BlockBody>,

    /// Whether this declaration implements another block
    #[serde(default)]
    pub implementing: bool,

    /// The implemented block (implementing blocks only)
    #[serde(default)]
    pub implements: Option<Identifier>,

    /// Optional string/array literal seeding the shared instance
    #[serde(default)]
    pub populate: Option<Expression>,

    /// Where the declaration appeared
    #[serde(default)]
    pub position: Position,
}

/// Body of a plain block.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockBody {
    /// Statements run once at declaration time
    #[serde(default)]
    pub init: Option<Body>,

    /// Statements run on every call
    #[serde(default = "empty_body", deserialize_with = "nullable_body")]
    pub program: Body,
}

/// Kind of quantity modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    /// `x++`
    Increment,
    /// `x--`
    Decrement,
    /// `x += e`
    Add,
    /// `x -= e`
    Subtract,
    /// `x *= e`
    Multiply,
    /// `x /= e`
    Divide,
}

/// `x++`, `x += e`, ...
#[derive(Debug, Clone, Deserialize)]
pub struct QuantityModifier {
    /// Increment, add, ...
    #[serde(rename = "type")]
    pub kind: ModifierKind,

    /// The modified reference
    pub statement: Identifier,

    /// Right-hand side for compound forms
    #[serde(default)]
    pub right: Option<Expression>,

    /// Where the statement appeared
    #[serde(default)]
    pub position: Position,
}

/// `x = e`
#[derive(Debug, Clone, Deserialize)]
pub struct Assign {
    /// Assigned reference
    pub left: Identifier,

    /// New value
    pub right: Expression,

    /// Where the statement appeared
    #[serde(default)]
    pub position: Position,
}

/// `name:verb1:verb2(arg1, arg2)`
#[derive(Debug, Clone, Deserialize)]
pub struct BlockCall {
    /// Called block
    pub name: Identifier,

    /// Verb expressions
    #[serde(default, deserialize_with = "nullable")]
    pub verbs: Vec<Expression>,

    /// Argument expressions
    #[serde(default, deserialize_with = "nullable")]
    pub arguments: Vec<Expression>,

    /// Where the call appeared
    #[serde(default)]
    pub position: Position,
}

/// `[Write i, v]` and friends.
#[derive(Debug, Clone, Deserialize)]
pub struct ScopeMutater {
    /// `Write`, `Read` or `Delete`
    pub mutater: Identifier,

    /// Operands
    #[serde(default, deserialize_with = "nullable")]
    pub arguments: Vec<Expression>,

    /// Where the expression appeared
    #[serde(default)]
    pub position: Position,
}

/// `for count as placeholder { ... }`
#[derive(Debug, Clone, Deserialize)]
pub struct ForStatement {
    /// Iteration count expression
    pub statement: Expression,

    /// Loop variable name
    pub placeholder: String,

    /// Loop body
    #[serde(default = "empty_body", deserialize_with = "nullable_body")]
    pub body: Body,

    /// Where the loop appeared
    #[serde(default)]
    pub position: Position,
}

/// `while cond { ... }`
#[derive(Debug, Clone, Deserialize)]
pub struct WhileStatement {
    /// Condition, re-evaluated before every iteration
    pub statement: Expression,

    /// Loop body
    #[serde(default = "empty_body", deserialize_with = "nullable_body")]
    pub body: Body,

    /// Where the loop appeared
    #[serde(default)]
    pub position: Position,
}

/// `if` with optional `elif`s and `else`.
#[derive(Debug, Clone, Deserialize)]
pub struct IfStatement {
    /// Main condition
    pub condition: Expression,

    /// Body run when the condition is truthy
    #[serde(default = "empty_body", deserialize_with = "nullable_body")]
    pub body: Body,

    /// `elif` arms in declaration order
    #[serde(default, deserialize_with = "nullable")]
    pub elifs: Vec<Elif>,

    /// `else` body
    #[serde(default, rename = "else")]
    pub otherwise: Option<Body>,

    /// Where the statement appeared
    #[serde(default)]
    pub position: Position,
}

/// One `elif` arm.
#[derive(Debug, Clone, Deserialize)]
pub struct Elif {
    /// Arm condition
    pub condition: Expression,

    /// Arm body
    #[serde(default = "empty_body", deserialize_with = "nullable_body")]
    pub body: Body,
}

/// `switch` statement.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchStatement {
    /// Switched value
    pub condition: Expression,

    /// Cases in declaration order
    #[serde(default, deserialize_with = "nullable")]
    pub cases: Vec<SwitchCase>,

    /// `default` arm
    #[serde(default)]
    pub default: Option<SwitchDefault>,

    /// Where the statement appeared
    #[serde(default)]
    pub position: Position,
}

/// One `case` arm.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchCase {
    /// Compared value
    pub case: Expression,

    /// Arm body
    #[serde(default = "empty_body", deserialize_with = "nullable_body")]
    pub body: Body,
}

/// The `default` arm.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchDefault {
    /// Arm body
    #[serde(default = "empty_body", deserialize_with = "nullable_body")]
    pub body: Body,
}

/// `namespace name { const a = 1 ... }`
#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceDeclaration {
    /// Namespace name
    pub name: Identifier,

    /// Member declarations
    #[serde(default = "empty_body", deserialize_with = "nullable_body")]
    pub body: Body,

    /// Where the declaration appeared
    #[serde(default)]
    pub position: Position,
}

/// `namespace.member`
#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceIndex {
    /// Namespace name
    pub namespace: Identifier,

    /// Member name
    pub member: Identifier,

    /// Where the expression appeared
    #[serde(default)]
    pub position: Position,
}

/// A source comment.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    /// Comment text
    #[serde(default)]
    pub value: String,

    /// Where the comment appeared
    #[serde(default)]
    pub position: Position,
}

// ═══════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════

/// An expression, tagged by the parser's `operation` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Expression {
    /// Integer, string or array literal
    Primitive(Literal),

    /// Block invocation
    BlockCall(BlockCall),

    /// Binary arithmetic
    Arithmetic(Arithmetic),

    /// Comparison or logical combination
    Condition(Condition),

    /// Variable read
    Reference(Identifier),

    /// `[Read i]` and friends
    #[serde(rename = "scope_mutater_expression")]
    ScopeMutater(ScopeMutater),

    /// `namespace.member`
    NamespaceIndex(NamespaceIndex),
}

impl Expression {
    /// Where the expression appeared.
    pub fn position(&self) -> Position {
        match self {
            Expression::Primitive(literal) => literal.position(),
            Expression::BlockCall(e) => e.position,
            Expression::Arithmetic(e) => e.position,
            Expression::Condition(e) => e.position,
            Expression::Reference(e) => e.position,
            Expression::ScopeMutater(e) => e.position,
            Expression::NamespaceIndex(e) => e.position,
        }
    }
}

/// Literal forms, tagged by the parser's `type` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Literal {
    /// Integer literal (decimal, binary, hex or octal in the source)
    Int {
        /// The value
        value: i64,
        /// Where the literal appeared
        #[serde(default)]
        position: Position,
    },

    /// String literal; only meaningful as a `populate` seed
    String {
        /// Literal text
        value: String,
        /// Where the literal appeared
        #[serde(default)]
        position: Position,
    },

    /// Array literal; only meaningful as a `populate` seed
    Array {
        /// Element expressions
        #[serde(default, deserialize_with = "nullable")]
        values: Vec<Expression>,
        /// Where the literal appeared
        #[serde(default)]
        position: Position,
    },
}

impl Literal {
    /// Where the literal appeared.
    pub fn position(&self) -> Position {
        match self {
            Literal::Int { position, .. }
            | Literal::String { position, .. }
            | Literal::Array { position, .. } => *position,
        }
    }

    /// Literal type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Int { .. } => "int",
            Literal::String { .. } => "string",
            Literal::Array { .. } => "array",
        }
    }
}

/// Arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticOp {
    /// `+`
    Addition,
    /// `-`
    Subtraction,
    /// `*`
    Multiplication,
    /// `/`
    Division,
    /// `^`
    Exponent,
    /// `%`
    Modulus,
    /// `'` (n-th root)
    Root,
    /// postfix `log`
    Log10,
}

/// `left op right`
#[derive(Debug, Clone, Deserialize)]
pub struct Arithmetic {
    /// Operator
    #[serde(rename = "type")]
    pub op: ArithmeticOp,

    /// Left operand
    pub left: Box<Expression>,

    /// Right operand
    pub right: Box<Expression>,

    /// Where the expression appeared
    #[serde(default)]
    pub position: Position,
}

/// Comparison and logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOp {
    /// `==`
    Equals,
    /// `!==`
    NotEquals,
    /// `<`
    LessThan,
    /// `<=`
    LessThanEquals,
    /// `!<`
    NotLessThan,
    /// `!<=`
    NotLessThanEquals,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanEquals,
    /// `!>`
    NotGreaterThan,
    /// `!>=`
    NotGreaterThanEquals,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `!&&`
    Nand,
    /// `!||`
    Nor,
}

/// `left op right` yielding 0/1.
#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    /// Operator
    #[serde(rename = "type")]
    pub op: ConditionOp,

    /// Left operand
    pub left: Box<Expression>,

    /// Right operand
    pub right: Box<Expression>,

    /// Where the expression appeared
    #[serde(default)]
    pub position: Position,
}

// ═══════════════════════════════════════════════════════════════════════
// Decoding helpers
// ═══════════════════════════════════════════════════════════════════════

pub(crate) fn empty_body() -> Body {
    Rc::from(Vec::new())
}

/// The parser writes `null` for absent optional lists.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_body<'de, D>(deserializer: D) -> Result<Body, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Body>::deserialize(deserializer)?.unwrap_or_else(empty_body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_variable_declaration() {
        let stmt: Statement = serde_json::from_value(json!({
            "operation": "variable_declaration",
            "kind": "const",
            "left": { "operation": "identifier", "value": "x", "negative": false,
                      "position": { "line": 1, "col": 6 } },
            "right": { "operation": "primitive", "type": "int", "value": 4,
                       "position": { "line": 1, "col": 10 } },
            "position": { "line": 1, "col": 0 }
        }))
        .unwrap();

        match stmt {
            Statement::VariableDeclaration(decl) => {
                assert_eq!(decl.kind, DeclarationKind::Const);
                assert_eq!(decl.left.name(), "x");
                assert!(matches!(decl.right, Expression::Primitive(Literal::Int { value: 4, .. })));
            }
            other => panic!("Expected variable declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_block_declaration_with_null_lists() {
        let stmt: Statement = serde_json::from_value(json!({
            "operation": "block_declaration",
            "name": { "operation": "identifier", "value": "main" },
            "verbs": [],
            "arguments": null,
            "body": { "init": null, "program": [] },
            "implementing": false,
            "position": { "line": 2, "col": 0 }
        }))
        .unwrap();

        match stmt {
            Statement::BlockDeclaration(decl) => {
                assert!(decl.arguments.is_empty());
                assert!(!decl.implementing);
                let body = decl.body.unwrap();
                assert!(body.init.is_none());
                assert!(body.program.is_empty());
            }
            other => panic!("Expected block declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_if_with_null_else() {
        let stmt: Statement = serde_json::from_value(json!({
            "operation": "if_statement",
            "condition": { "operation": "primitive", "type": "int", "value": 1 },
            "body": [],
            "elifs": [],
            "else": null
        }))
        .unwrap();

        match stmt {
            Statement::If(s) => {
                assert!(s.otherwise.is_none());
                assert!(s.elifs.is_empty());
            }
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_block_call_name_from_reference() {
        let expr: Expression = serde_json::from_value(json!({
            "operation": "block_call",
            "name": { "operation": "reference", "value": "add", "negative": false,
                      "position": { "line": 3, "col": 1 } },
            "verbs": [],
            "arguments": [
                { "operation": "primitive", "type": "int", "value": 2 },
                { "operation": "primitive", "type": "int", "value": 3 }
            ],
            "position": { "line": 3, "col": 1 }
        }))
        .unwrap();

        match expr {
            Expression::BlockCall(call) => {
                assert_eq!(call.name.name(), "add");
                assert_eq!(call.arguments.len(), 2);
                assert_eq!(call.position, Position::new(3, 1));
            }
            other => panic!("Expected block call, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_string_and_array_literals() {
        let string: Expression = serde_json::from_value(json!({
            "operation": "primitive", "type": "string", "value": "hi"
        }))
        .unwrap();
        assert!(matches!(string, Expression::Primitive(Literal::String { .. })));

        let array: Expression = serde_json::from_value(json!({
            "operation": "primitive", "type": "array",
            "values": [{ "operation": "primitive", "type": "int", "value": 1 }]
        }))
        .unwrap();
        match array {
            Expression::Primitive(Literal::Array { values, .. }) => assert_eq!(values.len(), 1),
            other => panic!("Expected array literal, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_operation_is_rejected() {
        let result: Result<Statement, _> = serde_json::from_value(json!({
            "operation": "goto_statement",
            "position": { "line": 1, "col": 0 }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(4, 12).to_string(), "4:12");
    }
}
