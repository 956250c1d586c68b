use strum::EnumIs;
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Hash, EnumIs, Error)]
pub enum Error {
    /// An affine map was built without any result expression.
    #[error("an affine map must produce at least one result expression")]
    EmptyAffineMapResults,

    /// A result expression names a dimension the map does not declare.
    #[error(
        "affine map declares {dims} dimension(s) but one of its expressions refers to d{position}"
    )]
    DimensionOutOfRange { dims: u32, position: u32 },

    /// A result expression names a symbol the map does not declare.
    #[error(
        "affine map declares {symbols} symbol(s) but one of its expressions refers to s{position}"
    )]
    SymbolOutOfRange { symbols: u32, position: u32 },

    /// A bounded map must carry exactly one range size per result.
    #[error("bounded affine map carries {sizes} range size(s) for {results} result(s)")]
    RangeSizeMismatch { sizes: usize, results: usize },

    /// A control-flow function must own at least one basic block.
    #[error("function `{function}` has no basic blocks")]
    EmptyFunctionBody { function: String },

    /// Two basic blocks within one function share a label.
    #[error(
        "the block label `{label}` is defined more than once within function `{function}`"
    )]
    DuplicateBlockLabel { function: String, label: u32 },

    /// A branch names a label no block of the function carries.
    #[error("a branch in function `{function}` targets the undefined block label `{label}`")]
    UndefinedBranchTarget { function: String, label: u32 },

    /// An operand references a value that this function does not define.
    #[error("an operand of function `{function}` refers to a value defined outside of it")]
    ForeignOperand { function: String },

    /// Loop steps of zero never make progress.
    #[error("a loop in function `{function}` declares a step of zero")]
    ZeroLoopStep { function: String },
}
