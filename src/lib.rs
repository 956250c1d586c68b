//! In-memory compiler IR with a canonical textual form.
//!
//! The crate models modules made of functions in three shapes — external
//! declarations, control-flow graphs of basic blocks, and trees of
//! structured statements — together with a small closed type system,
//! operation attributes, and an affine-expression sublanguage used for
//! memory indexing.
//!
//! The [`fmt`] module renders all of it to text in two passes: a
//! module-wide scan that discovers and numbers every referenced affine
//! map, then per-function value and block numbering followed by
//! emission. Printing is a best-effort diagnostic tool: it never fails
//! on partially built IR, degrading to sentinel tokens instead.

pub mod affine;
pub mod attr;
pub mod fmt;
pub mod ir;
pub mod types;
pub mod utils;
