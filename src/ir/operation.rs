//! Operations, the values they and block arguments define, and the
//! registry of custom operation printers.

use std::collections::BTreeMap;
use std::sync::Arc;

use smallvec::SmallVec;
use strum::EnumIs;

use crate::attr::NamedAttribute;
use crate::types::Type;

/// Shared handle to an operation. The handle doubles as the identity
/// of the operation's result group: every result of one operation
/// resolves to the same printed id.
pub type OpRef = Arc<Operation>;

/// A generic operation: a name, ordered operands, ordered named
/// attributes, and the types of its results.
#[derive(Debug, Clone)]
pub struct Operation {
    pub name: String,
    pub operands: Vec<Value>,
    pub attributes: Vec<NamedAttribute>,
    pub result_types: SmallVec<[Type; 1]>,
}

impl Operation {
    pub fn new(
        name: impl Into<String>,
        operands: Vec<Value>,
        attributes: Vec<NamedAttribute>,
        result_types: Vec<Type>,
    ) -> OpRef {
        Arc::new(Operation {
            name: name.into(),
            operands,
            attributes,
            result_types: SmallVec::from_vec(result_types),
        })
    }

    pub fn num_results(&self) -> usize {
        self.result_types.len()
    }

    /// Build a reference to the `index`-th result of this operation.
    pub fn result(self: &Arc<Self>, index: usize) -> Value {
        debug_assert!(index < self.result_types.len(), "result index out of range");
        Value::Result(Arc::clone(self), index)
    }
}

/// Formal argument of a basic block.
#[derive(Debug)]
pub struct BlockArgument {
    pub ty: Type,
}

impl BlockArgument {
    pub fn new(ty: Type) -> Arc<Self> {
        Arc::new(BlockArgument { ty })
    }

    /// Build a value referencing this argument.
    pub fn value(self: &Arc<Self>) -> Value {
        Value::Argument(Arc::clone(self))
    }
}

/// Induction variable bound by a structured `for` statement. Its type
/// is always the index-integer kind.
#[derive(Debug)]
pub struct InductionVar;

impl InductionVar {
    pub fn new() -> Arc<Self> {
        Arc::new(InductionVar)
    }

    /// Build a value referencing this induction variable.
    pub fn value(self: &Arc<Self>) -> Value {
        Value::Induction(Arc::clone(self))
    }
}

/// A use of an SSA value. Identity, not structure, ties a use to its
/// definition: two block arguments of the same type are still two
/// distinct values.
#[derive(Debug, Clone, EnumIs)]
pub enum Value {
    /// Argument of a basic block.
    Argument(Arc<BlockArgument>),
    /// One result of an operation. The index must be in range for the
    /// operation's result list.
    Result(OpRef, usize),
    /// Induction variable of a structured loop.
    Induction(Arc<InductionVar>),
}

impl Value {
    /// The type this value carries.
    pub fn ty(&self) -> Type {
        match self {
            Value::Argument(argument) => argument.ty.clone(),
            Value::Result(operation, index) => operation.result_types[*index].clone(),
            Value::Induction(_) => Type::AffineInt,
        }
    }
}

/// Printer hook for one registered operation name. The hook receives
/// the operation and the output sink and owns the whole line past the
/// optional `%id = ` prefix.
pub type CustomOpPrinter =
    Box<dyn Fn(&Operation, &mut dyn std::fmt::Write) -> std::fmt::Result + Send + Sync>;

/// Registry mapping operation names to custom textual forms. Lookups
/// that miss fall back to the generic verbose form.
#[derive(Default)]
pub struct OperationRegistry {
    printers: BTreeMap<String, CustomOpPrinter>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `printer` for operations named `name`, replacing any
    /// previous registration.
    pub fn register<F>(&mut self, name: impl Into<String>, printer: F)
    where
        F: Fn(&Operation, &mut dyn std::fmt::Write) -> std::fmt::Result + Send + Sync + 'static,
    {
        self.printers.insert(name.into(), Box::new(printer));
    }

    pub fn printer(&self, name: &str) -> Option<&CustomOpPrinter> {
        self.printers.get(name)
    }
}
