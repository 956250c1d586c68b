use std::sync::Arc;

use strum::{EnumIs, EnumTryAs};

use crate::ir::operation::{BlockArgument, OpRef, Value};

/// Label a basic block carries in the IR. Printing assigns positional
/// ids instead; labels only resolve branch targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockLabel(pub u32);

/// A straight-line sequence of operations ending in exactly one
/// control transfer.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub label: BlockLabel,
    pub arguments: Vec<Arc<BlockArgument>>,
    pub operations: Vec<OpRef>,
    pub terminator: Terminator,
}

#[derive(Debug, Clone, EnumIs, EnumTryAs)]
pub enum Terminator {
    Br(BrTerm),
    Ret(RetTerm),
}

/// Unconditional branch, forwarding operands to the target's arguments.
#[derive(Debug, Clone)]
pub struct BrTerm {
    pub target: BlockLabel,
    pub operands: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct RetTerm {
    pub operands: Vec<Value>,
}
