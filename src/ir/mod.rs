//! Module-level IR.
//!
//! A [`Module`] is an ordered sequence of functions. A function comes
//! in one of three shapes: an external declaration (signature only), a
//! control-flow graph of basic blocks, or a tree of structured
//! statements. The printing machinery in [`crate::fmt`] treats all of
//! it as read-only; nothing here is mutated during a print.
//!
//! Values are tied to their definitions by `Arc` identity, not by
//! structure. The [`CfgFunction::verify`] and [`MlFunction::verify`]
//! routines check that shape invariants hold; the printer deliberately
//! does not — it tolerates malformed input instead.

pub mod block;
pub mod operation;
pub mod stmt;

use std::collections::BTreeSet;
use std::sync::Arc;

use strum::{EnumIs, EnumTryAs};

use crate::ir::block::{BasicBlock, Terminator};
use crate::ir::operation::Value;
use crate::ir::stmt::Statement;
use crate::types::FunctionType;
use crate::utils::Error;

/// Ordered collection of functions; the unit of printing.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub functions: Vec<Function>,
}

/// A function in one of its three shapes.
#[derive(Debug, Clone, EnumIs, EnumTryAs)]
pub enum Function {
    /// External declaration: a signature with no body.
    Ext(ExtFunction),
    /// Body made of basic blocks ending in explicit control transfers.
    Cfg(CfgFunction),
    /// Body made of nested structured statements.
    Ml(MlFunction),
}

impl Function {
    pub fn name(&self) -> &str {
        match self {
            Function::Ext(function) => &function.name,
            Function::Cfg(function) => &function.name,
            Function::Ml(function) => &function.name,
        }
    }

    pub fn ty(&self) -> &Arc<FunctionType> {
        match self {
            Function::Ext(function) => &function.ty,
            Function::Cfg(function) => &function.ty,
            Function::Ml(function) => &function.ty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtFunction {
    pub name: String,
    pub ty: Arc<FunctionType>,
}

#[derive(Debug, Clone)]
pub struct CfgFunction {
    pub name: String,
    pub ty: Arc<FunctionType>,
    pub blocks: Vec<BasicBlock>,
}

#[derive(Debug, Clone)]
pub struct MlFunction {
    pub name: String,
    pub ty: Arc<FunctionType>,
    pub body: Vec<Statement>,
}

impl CfgFunction {
    /// Verify the control-flow shape:
    /// 1) the function owns at least one block,
    /// 2) block labels are unique,
    /// 3) every branch targets a defined label,
    /// 4) every operand is defined by an argument or operation of this
    ///    function.
    pub fn verify(&self) -> Result<(), Error> {
        if self.blocks.is_empty() {
            return Err(Error::EmptyFunctionBody {
                function: self.name.clone(),
            });
        }

        let mut labels = BTreeSet::new();
        for block in &self.blocks {
            if !labels.insert(block.label.0) {
                return Err(Error::DuplicateBlockLabel {
                    function: self.name.clone(),
                    label: block.label.0,
                });
            }
        }

        // Identities allowed to appear as operands.
        let mut defined = BTreeSet::new();
        for block in &self.blocks {
            for argument in &block.arguments {
                defined.insert(Arc::as_ptr(argument) as usize);
            }
            for operation in &block.operations {
                defined.insert(Arc::as_ptr(operation) as usize);
            }
        }

        let check = |value: &Value| -> Result<(), Error> {
            let known = match value {
                Value::Argument(argument) => {
                    defined.contains(&(Arc::as_ptr(argument) as usize))
                }
                Value::Result(operation, _) => {
                    defined.contains(&(Arc::as_ptr(operation) as usize))
                }
                // Induction variables only exist inside structured bodies.
                Value::Induction(_) => false,
            };
            if known {
                Ok(())
            } else {
                Err(Error::ForeignOperand {
                    function: self.name.clone(),
                })
            }
        };

        for block in &self.blocks {
            for operation in &block.operations {
                for operand in &operation.operands {
                    check(operand)?;
                }
            }
            match &block.terminator {
                Terminator::Br(br) => {
                    if !labels.contains(&br.target.0) {
                        return Err(Error::UndefinedBranchTarget {
                            function: self.name.clone(),
                            label: br.target.0,
                        });
                    }
                    for operand in &br.operands {
                        check(operand)?;
                    }
                }
                Terminator::Ret(ret) => {
                    for operand in &ret.operands {
                        check(operand)?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl MlFunction {
    /// Verify the structured shape: loop steps are non-zero and every
    /// operand is defined by an operation statement or induction
    /// variable of this function.
    pub fn verify(&self) -> Result<(), Error> {
        let mut defined = BTreeSet::new();
        collect_defined(&self.body, &mut defined);
        self.verify_block(&self.body, &defined)
    }

    fn verify_block(
        &self,
        statements: &[Statement],
        defined: &BTreeSet<usize>,
    ) -> Result<(), Error> {
        for statement in statements {
            match statement {
                Statement::Operation(operation) => {
                    for operand in &operation.operands {
                        self.verify_operand(operand, defined)?;
                    }
                }
                Statement::For(stmt) => {
                    if stmt.step == 0 {
                        return Err(Error::ZeroLoopStep {
                            function: self.name.clone(),
                        });
                    }
                    self.verify_block(&stmt.body, defined)?;
                }
                Statement::If(stmt) => {
                    self.verify_block(&stmt.then_body, defined)?;
                    if let Some(else_body) = &stmt.else_body {
                        self.verify_block(else_body, defined)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn verify_operand(&self, value: &Value, defined: &BTreeSet<usize>) -> Result<(), Error> {
        let known = match value {
            Value::Result(operation, _) => defined.contains(&(Arc::as_ptr(operation) as usize)),
            Value::Induction(induction) => {
                defined.contains(&(Arc::as_ptr(induction) as usize))
            }
            // Block arguments belong to control-flow bodies.
            Value::Argument(_) => false,
        };
        if known {
            Ok(())
        } else {
            Err(Error::ForeignOperand {
                function: self.name.clone(),
            })
        }
    }
}

fn collect_defined(statements: &[Statement], defined: &mut BTreeSet<usize>) {
    for statement in statements {
        match statement {
            Statement::Operation(operation) => {
                defined.insert(Arc::as_ptr(operation) as usize);
            }
            Statement::For(stmt) => {
                defined.insert(Arc::as_ptr(&stmt.induction) as usize);
                collect_defined(&stmt.body, defined);
            }
            Statement::If(stmt) => {
                collect_defined(&stmt.then_body, defined);
                if let Some(else_body) = &stmt.else_body {
                    collect_defined(else_body, defined);
                }
            }
        }
    }
}
