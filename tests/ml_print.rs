use std::sync::Arc;

use polyir::affine::{AffineExpr, AffineMap};
use polyir::attr::{Attribute, NamedAttribute};
use polyir::ir::operation::{InductionVar, Operation};
use polyir::ir::stmt::{ForStmt, IfStmt, Statement};
use polyir::ir::{Function, MlFunction, Module};
use polyir::types::{FunctionType, Type};

fn ml(name: &str, body: Vec<Statement>) -> Function {
    Function::Ml(MlFunction {
        name: name.to_string(),
        ty: Arc::new(FunctionType {
            inputs: vec![],
            results: vec![],
        }),
        body,
    })
}

fn module(function: Function) -> Module {
    Module {
        functions: vec![function],
    }
}

#[test]
fn golden_loop_function() {
    let induction = InductionVar::new();
    let use_iv = Operation::new("use_iv", vec![induction.value()], vec![], vec![]);
    let body = vec![Statement::For(ForStmt {
        lower: AffineExpr::constant(0),
        upper: AffineExpr::constant(100),
        step: 2,
        induction,
        body: vec![Statement::Operation(use_iv)],
    })];
    let expected = "mlfunc @loops() {
  for x = 0 to 100 step 2 {
  \"use_iv\"(%0) : (affineint) -> ()
  }
  return
}

";
    assert_eq!(module(ml("loops", body)).fmt(None).to_string(), expected);
}

#[test]
fn unit_steps_are_not_printed() {
    let body = vec![Statement::For(ForStmt {
        lower: AffineExpr::constant(0),
        upper: AffineExpr::constant(10),
        step: 1,
        induction: InductionVar::new(),
        body: vec![],
    })];
    let expected = "mlfunc @walk() {
  for x = 0 to 10 {
  }
  return
}

";
    assert_eq!(module(ml("walk", body)).fmt(None).to_string(), expected);
}

#[test]
fn conditionals_print_placeholder_condition_and_both_bodies() {
    let then_op = Operation::new("a", vec![], vec![], vec![]);
    let else_op = Operation::new("b", vec![], vec![], vec![]);
    let body = vec![Statement::If(IfStmt {
        then_body: vec![Statement::Operation(then_op)],
        else_body: Some(vec![Statement::Operation(else_op)]),
    })];
    let expected = "mlfunc @cond() {
  if () {
  \"a\"() : () -> ()
  } else {
  \"b\"() : () -> ()
  }
  return
}

";
    assert_eq!(module(ml("cond", body)).fmt(None).to_string(), expected);
}

#[test]
fn else_less_conditionals_print_one_body() {
    let body = vec![Statement::If(IfStmt {
        then_body: vec![],
        else_body: None,
    })];
    let expected = "mlfunc @half() {
  if () {
  }
  return
}

";
    assert_eq!(module(ml("half", body)).fmt(None).to_string(), expected);
}

#[test]
fn nested_loops_indent_by_level() {
    let inner = Statement::For(ForStmt {
        lower: AffineExpr::constant(0),
        upper: AffineExpr::constant(20),
        step: 1,
        induction: InductionVar::new(),
        body: vec![],
    });
    let body = vec![Statement::For(ForStmt {
        lower: AffineExpr::constant(0),
        upper: AffineExpr::constant(10),
        step: 1,
        induction: InductionVar::new(),
        body: vec![inner],
    })];
    let expected = "mlfunc @nest() {
  for x = 0 to 10 {
    for x = 0 to 20 {
    }
  }
  return
}

";
    assert_eq!(module(ml("nest", body)).fmt(None).to_string(), expected);
}

#[test]
fn loop_bounds_are_affine_expressions() {
    let body = vec![Statement::For(ForStmt {
        lower: AffineExpr::add(AffineExpr::dim(0), AffineExpr::constant(-1)),
        upper: AffineExpr::mul(AffineExpr::symbol(0), AffineExpr::constant(8)),
        step: 1,
        induction: InductionVar::new(),
        body: vec![],
    })];
    let text = module(ml("bounds", body)).fmt(None).to_string();
    assert!(text.contains("  for x = (d0 - 1) to (s0 * 8) {\n"));
}

#[test]
fn induction_variables_and_results_number_in_tree_order() {
    let induction = InductionVar::new();
    let compute = Operation::new("compute", vec![induction.value()], vec![], vec![Type::F32]);
    let consume = Operation::new("consume", vec![compute.result(0)], vec![], vec![]);
    let body = vec![Statement::For(ForStmt {
        lower: AffineExpr::constant(0),
        upper: AffineExpr::constant(4),
        step: 1,
        induction,
        body: vec![Statement::Operation(compute), Statement::Operation(consume)],
    })];
    let text = module(ml("chain", body)).fmt(None).to_string();
    assert!(text.contains("  %1 = \"compute\"(%0) : (affineint) -> f32\n"));
    assert!(text.contains("  \"consume\"(%1) : (f32) -> ()\n"));
}

#[test]
fn maps_used_only_inside_structured_bodies_stay_inline() {
    let map = AffineMap::new(1, 0, vec![AffineExpr::dim(0)], None).unwrap();
    let tagged = Operation::new(
        "tagged",
        vec![],
        vec![NamedAttribute::new("layout", Attribute::AffineMap(map))],
        vec![],
    );
    let text = module(ml("hidden", vec![Statement::Operation(tagged)]))
        .fmt(None)
        .to_string();

    // Structured bodies are not scanned for maps: no hoisted
    // definition appears and the attribute prints inline.
    assert!(!text.contains("#map"));
    assert!(text.contains("{layout: (d0) -> (d0)}"));
}
