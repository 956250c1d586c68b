use std::sync::Arc;

use polyir::affine::{AffineExpr, AffineMap, MapRef};
use polyir::attr::{Attribute, NamedAttribute};
use polyir::ir::block::{BasicBlock, BlockLabel, RetTerm, Terminator};
use polyir::ir::operation::Operation;
use polyir::ir::{CfgFunction, ExtFunction, Function, Module};
use polyir::types::{DimSize, FunctionType, Type};

fn identity_map(rank: u32) -> MapRef {
    let results = (0..rank).map(AffineExpr::dim).collect();
    AffineMap::new(rank, 0, results, None).unwrap()
}

fn ext(name: &str, inputs: Vec<Type>, results: Vec<Type>) -> Function {
    Function::Ext(ExtFunction {
        name: name.to_string(),
        ty: Arc::new(FunctionType { inputs, results }),
    })
}

/// A module using one map through a memref signature type and another
/// through an operation attribute, with the memref reused by a second
/// function.
fn sample_module() -> Module {
    let layout = identity_map(2);
    let memref = Type::memref(
        [DimSize::Fixed(4), DimSize::Dynamic],
        Type::F32,
        vec![layout],
        1,
    );

    let probe = Operation::new(
        "probe",
        vec![],
        vec![NamedAttribute::new(
            "layout",
            Attribute::AffineMap(identity_map(1)),
        )],
        vec![],
    );
    let body = CfgFunction {
        name: "use_maps".to_string(),
        ty: Arc::new(FunctionType {
            inputs: vec![memref.clone()],
            results: vec![],
        }),
        blocks: vec![BasicBlock {
            label: BlockLabel(0),
            arguments: vec![],
            operations: vec![probe],
            terminator: Terminator::Ret(RetTerm { operands: vec![] }),
        }],
    };

    Module {
        functions: vec![Function::Cfg(body), ext("again", vec![memref], vec![])],
    }
}

#[test]
fn scalar_and_shaped_types_print_their_fixed_forms() {
    assert_eq!(Type::Integer(32).to_string(), "i32");
    assert_eq!(Type::Integer(1).to_string(), "i1");
    assert_eq!(Type::AffineInt.to_string(), "affineint");
    assert_eq!(Type::BF16.to_string(), "bf16");
    assert_eq!(Type::F16.to_string(), "f16");
    assert_eq!(Type::vector([4], Type::F32).to_string(), "vector<4xf32>");
    assert_eq!(
        Type::tensor(
            [DimSize::Fixed(2), DimSize::Dynamic, DimSize::Fixed(4)],
            Type::Integer(8)
        )
        .to_string(),
        "tensor<2x?x4xi8>"
    );
    assert_eq!(Type::unranked_tensor(Type::F64).to_string(), "tensor<??f64>");
}

#[test]
fn function_types_parenthesize_all_but_single_results() {
    assert_eq!(
        Type::function(vec![Type::Integer(32), Type::F32], vec![Type::Integer(1)]).to_string(),
        "(i32, f32) -> i1"
    );
    assert_eq!(
        Type::function(vec![Type::Integer(32)], vec![]).to_string(),
        "(i32) -> ()"
    );
    assert_eq!(
        Type::function(vec![], vec![Type::F32, Type::F64]).to_string(),
        "() -> (f32, f64)"
    );
}

#[test]
fn detached_memref_prints_its_map_inline() {
    let ty = Type::memref(
        [DimSize::Fixed(4), DimSize::Dynamic],
        Type::F32,
        vec![identity_map(2)],
        2,
    );
    assert_eq!(ty.to_string(), "memref<4x?xf32, (d0, d1) -> (d0, d1), 2>");
}

#[test]
fn attributes_print_recursively() {
    let attr = Attribute::Array(vec![
        Attribute::from(1i64),
        Attribute::from(false),
        Attribute::from("fred"),
        Attribute::Array(vec![Attribute::from(2i64)]),
    ]);
    assert_eq!(attr.to_string(), "[1, false, \"fred\", [2]]");
}

#[test]
fn reachable_maps_are_hoisted_once_and_referenced_by_id() {
    let text = sample_module().fmt(None).to_string();
    let expected = "\
#map0 = (d0, d1) -> (d0, d1)
#map1 = (d0) -> (d0)
cfgfunc @use_maps(memref<4x?xf32, #map0, 1>) {
bb0:
  \"probe\"(){layout: #map1} : () -> ()
  return
}

extfunc @again(memref<4x?xf32, #map0, 1>)
";
    assert_eq!(text, expected);
}

#[test]
fn structurally_equal_maps_keep_distinct_ids() {
    let first = identity_map(1);
    let second = identity_map(1);
    assert_eq!(first, second);

    let module = Module {
        functions: vec![
            ext(
                "a",
                vec![Type::memref([DimSize::Fixed(8)], Type::F32, vec![first], 0)],
                vec![],
            ),
            ext(
                "b",
                vec![Type::memref([DimSize::Fixed(8)], Type::F32, vec![second], 0)],
                vec![],
            ),
        ],
    };
    let text = module.fmt(None).to_string();

    // Hoisting keys on identity: one definition per built map, even
    // though the two maps are structurally equal.
    assert_eq!(text.matches("#map0 = (d0) -> (d0)\n").count(), 1);
    assert_eq!(text.matches("#map1 = (d0) -> (d0)\n").count(), 1);
    assert!(text.contains("@a(memref<8xf32, #map0, 0>)"));
    assert!(text.contains("@b(memref<8xf32, #map1, 0>)"));
}

#[test]
fn printing_twice_yields_identical_text() {
    let module = sample_module();
    assert_eq!(module.fmt(None).to_string(), module.fmt(None).to_string());
}

#[test]
fn declaration_signatures_cover_result_arities() {
    let module = Module {
        functions: vec![
            ext("zero", vec![Type::Integer(32)], vec![]),
            ext("one", vec![], vec![Type::F32]),
            ext("two", vec![Type::F32], vec![Type::Integer(1), Type::Integer(8)]),
        ],
    };
    assert_eq!(
        module.fmt(None).to_string(),
        "extfunc @zero(i32)\nextfunc @one() -> f32\nextfunc @two(f32) -> (i1, i8)\n"
    );
}

#[test]
fn maps_nested_in_signature_types_are_discovered() {
    // The memref hides behind a function type input; the scan still
    // reaches it.
    let nested = Type::function(
        vec![Type::memref([DimSize::Fixed(2)], Type::F32, vec![identity_map(1)], 0)],
        vec![],
    );
    let module = Module {
        functions: vec![ext("higher", vec![nested], vec![])],
    };
    let text = module.fmt(None).to_string();
    assert!(text.starts_with("#map0 = (d0) -> (d0)\n"));
    assert!(text.contains("memref<2xf32, #map0, 0>"));
}
