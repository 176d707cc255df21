//! Statement outcome within a statement list

use crate::value::Value;

/// What a statement tells the list that is running it.
///
/// `return`, a bare block call, `if` and `switch` end the list with their
/// value; everything else falls through to the next statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Continue with the next statement
    Next,
    /// Stop the list and hand this value to its caller
    Yield(Value),
}
