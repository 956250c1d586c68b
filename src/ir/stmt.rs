//! Statements of structured function bodies.

use std::sync::Arc;

use strum::{EnumIs, EnumTryAs};

use crate::affine::ExprRef;
use crate::ir::operation::{InductionVar, OpRef, Value};

/// A node of a structured function body.
#[derive(Debug, Clone, EnumIs, EnumTryAs)]
pub enum Statement {
    /// Plain operation.
    Operation(OpRef),
    /// Bounded iteration over an affine range.
    For(ForStmt),
    /// Conditional with an optional else body.
    If(IfStmt),
}

/// `for` statement. The bounds are affine expressions, the step an
/// integer constant, and the induction variable a value definition
/// visible to the loop body.
#[derive(Debug, Clone)]
pub struct ForStmt {
    pub lower: ExprRef,
    pub upper: ExprRef,
    pub step: i64,
    pub induction: Arc<InductionVar>,
    pub body: Vec<Statement>,
}

impl ForStmt {
    /// Value referencing this loop's induction variable.
    pub fn induction_value(&self) -> Value {
        self.induction.value()
    }
}

/// `if` statement. The condition is not modeled; it prints as an empty
/// placeholder.
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub then_body: Vec<Statement>,
    pub else_body: Option<Vec<Statement>>,
}
