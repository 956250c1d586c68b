//! The closed type system.
//!
//! Every type prints to one fixed textual form: `i32`, `f32`,
//! `affineint`, `(i32, f32) -> i1`, `vector<4xf32>`, `tensor<2x?x4xi8>`,
//! `tensor<??f64>`, `memref<4x?xf32, #map0, 1>`. The set of kinds is
//! deliberately closed: the printer matches it exhaustively with no
//! default arm, so adding a kind is a compile-time-visible event.

use std::sync::Arc;

use smallvec::SmallVec;
use strum::EnumIs;

use crate::affine::MapRef;

/// One extent of a tensor or memref shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum DimSize {
    Fixed(u64),
    /// Extent unknown until runtime; prints as `?`.
    Dynamic,
}

/// A type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs)]
pub enum Type {
    /// The abstract, unsized index-integer kind.
    AffineInt,
    BF16,
    F16,
    F32,
    F64,
    /// Sized integer of the given bit width.
    Integer(u32),
    Function(Arc<FunctionType>),
    /// Fixed-shape vector.
    Vector(VectorType),
    /// Ranked tensor; dimensions may be dynamic.
    Tensor(TensorType),
    /// Tensor of unknown rank.
    UnrankedTensor(Box<Type>),
    MemRef(Arc<MemRefType>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub inputs: Vec<Type>,
    pub results: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VectorType {
    pub shape: SmallVec<[u64; 4]>,
    pub element: Box<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TensorType {
    pub shape: SmallVec<[DimSize; 4]>,
    pub element: Box<Type>,
}

/// A memory-reference type: shape, element type, an ordered list of
/// affine maps describing the indexing layout, and a memory-space tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemRefType {
    pub shape: SmallVec<[DimSize; 4]>,
    pub element: Type,
    pub layout: SmallVec<[MapRef; 1]>,
    pub memory_space: u32,
}

impl Type {
    pub fn function(inputs: Vec<Type>, results: Vec<Type>) -> Type {
        Type::Function(Arc::new(FunctionType { inputs, results }))
    }

    pub fn vector(shape: impl IntoIterator<Item = u64>, element: Type) -> Type {
        Type::Vector(VectorType {
            shape: shape.into_iter().collect(),
            element: Box::new(element),
        })
    }

    pub fn tensor(shape: impl IntoIterator<Item = DimSize>, element: Type) -> Type {
        Type::Tensor(TensorType {
            shape: shape.into_iter().collect(),
            element: Box::new(element),
        })
    }

    pub fn unranked_tensor(element: Type) -> Type {
        Type::UnrankedTensor(Box::new(element))
    }

    pub fn memref(
        shape: impl IntoIterator<Item = DimSize>,
        element: Type,
        layout: Vec<MapRef>,
        memory_space: u32,
    ) -> Type {
        Type::MemRef(Arc::new(MemRefType {
            shape: shape.into_iter().collect(),
            element,
            layout: SmallVec::from_vec(layout),
            memory_space,
        }))
    }
}
