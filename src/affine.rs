//! Affine expressions and affine maps.
//!
//! Expression nodes are immutable and shared by reference ([`ExprRef`]):
//! the same subtree may be pointed to from several parents, forming a
//! DAG rather than a tree. The printing machinery therefore keys its
//! bookkeeping on node identity, never on structure — two maps built
//! separately are two distinct entities even when they compare equal.

use std::sync::Arc;

use smallvec::SmallVec;
use strum::{EnumIs, EnumTryAs};

use crate::utils::Error;

/// Shared handle to an immutable affine expression node.
pub type ExprRef = Arc<AffineExpr>;

/// Shared handle to an immutable affine map.
pub type MapRef = Arc<AffineMap>;

/// Binary operator kinds of the affine sublanguage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum AffineOp {
    Add,
    Mul,
    FloorDiv,
    CeilDiv,
    Mod,
}

/// An affine index expression.
///
/// Example: `(d0 * 4) + s0` describes the flattened offset of a
/// two-level indexing scheme with a symbolic base.
#[derive(Debug, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
pub enum AffineExpr {
    /// Reference to the dimension at the given position.
    Dim(u32),
    /// Reference to the symbol at the given position.
    Symbol(u32),
    /// Integer constant.
    Constant(i64),
    /// Binary operation over two subexpressions.
    Binary(AffineBinaryExpr),
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct AffineBinaryExpr {
    pub op: AffineOp,
    pub lhs: ExprRef,
    pub rhs: ExprRef,
}

impl AffineExpr {
    pub fn dim(position: u32) -> ExprRef {
        Arc::new(AffineExpr::Dim(position))
    }

    pub fn symbol(position: u32) -> ExprRef {
        Arc::new(AffineExpr::Symbol(position))
    }

    pub fn constant(value: i64) -> ExprRef {
        Arc::new(AffineExpr::Constant(value))
    }

    /// Build a binary node of the given operator kind.
    pub fn binary(op: AffineOp, lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        Arc::new(AffineExpr::Binary(AffineBinaryExpr { op, lhs, rhs }))
    }

    pub fn add(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        Self::binary(AffineOp::Add, lhs, rhs)
    }

    pub fn mul(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        Self::binary(AffineOp::Mul, lhs, rhs)
    }

    pub fn floor_div(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        Self::binary(AffineOp::FloorDiv, lhs, rhs)
    }

    pub fn ceil_div(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        Self::binary(AffineOp::CeilDiv, lhs, rhs)
    }

    pub fn modulo(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        Self::binary(AffineOp::Mod, lhs, rhs)
    }

    /// Check every dimension/symbol position against the declared counts.
    fn check_positions(&self, dims: u32, symbols: u32) -> Result<(), Error> {
        match self {
            AffineExpr::Dim(position) if *position >= dims => Err(Error::DimensionOutOfRange {
                dims,
                position: *position,
            }),
            AffineExpr::Symbol(position) if *position >= symbols => {
                Err(Error::SymbolOutOfRange {
                    symbols,
                    position: *position,
                })
            }
            AffineExpr::Dim(_) | AffineExpr::Symbol(_) | AffineExpr::Constant(_) => Ok(()),
            AffineExpr::Binary(binary) => {
                binary.lhs.check_positions(dims, symbols)?;
                binary.rhs.check_positions(dims, symbols)
            }
        }
    }
}

/// An affine map: a function from dimension and symbol positions to a
/// tuple of result expressions, optionally bounded by range sizes.
///
/// A map always carries at least one result; [`AffineMap::new`] rejects
/// anything else, so downstream consumers may rely on it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct AffineMap {
    num_dims: u32,
    num_symbols: u32,
    results: SmallVec<[ExprRef; 4]>,
    range_sizes: Option<SmallVec<[ExprRef; 4]>>,
}

impl AffineMap {
    /// Validate and build a map.
    ///
    /// A map is bounded iff `range_sizes` is present, in which case it
    /// must carry exactly one size per result. Every dimension and
    /// symbol position used by any expression must be within the
    /// declared counts.
    ///
    /// ```
    /// use polyir::affine::{AffineExpr, AffineMap};
    ///
    /// let map = AffineMap::new(2, 0, vec![AffineExpr::dim(0), AffineExpr::dim(1)], None).unwrap();
    /// assert_eq!(map.to_string(), "(d0, d1) -> (d0, d1)");
    /// ```
    pub fn new(
        num_dims: u32,
        num_symbols: u32,
        results: Vec<ExprRef>,
        range_sizes: Option<Vec<ExprRef>>,
    ) -> Result<MapRef, Error> {
        if results.is_empty() {
            return Err(Error::EmptyAffineMapResults);
        }
        if let Some(sizes) = &range_sizes {
            if sizes.len() != results.len() {
                return Err(Error::RangeSizeMismatch {
                    sizes: sizes.len(),
                    results: results.len(),
                });
            }
        }
        for expr in results.iter().chain(range_sizes.iter().flatten()) {
            expr.check_positions(num_dims, num_symbols)?;
        }

        Ok(Arc::new(AffineMap {
            num_dims,
            num_symbols,
            results: SmallVec::from_vec(results),
            range_sizes: range_sizes.map(SmallVec::from_vec),
        }))
    }

    pub fn num_dims(&self) -> u32 {
        self.num_dims
    }

    pub fn num_symbols(&self) -> u32 {
        self.num_symbols
    }

    pub fn results(&self) -> &[ExprRef] {
        &self.results
    }

    /// Range sizes, present iff the map is bounded.
    pub fn range_sizes(&self) -> Option<&[ExprRef]> {
        self.range_sizes.as_deref()
    }

    pub fn is_bounded(&self) -> bool {
        self.range_sizes.is_some()
    }
}
