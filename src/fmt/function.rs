//! Per-function printing: value numbering, the shared operation
//! emission routine, and the two body printers.

use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::sync::Arc;

use crate::ir::block::{BasicBlock, BlockLabel, Terminator};
use crate::ir::operation::{BlockArgument, InductionVar, OpRef, Value};
use crate::ir::stmt::{ForStmt, IfStmt, Statement};
use crate::ir::{CfgFunction, MlFunction};

use super::Printer;

/// Token emitted in place of a value reference the numberer never saw.
pub const INVALID_VALUE_TOKEN: &str = "<<invalid value>>";

/// Token emitted in place of a branch target outside the function.
pub const INVALID_BLOCK_TOKEN: &str = "<<invalid block>>";

/// Spaces added per nesting level of structured statements.
const INDENT_WIDTH: usize = 2;

/// Dense per-function value numbering, keyed on definition identity.
#[derive(Default)]
struct ValueNumberer {
    ids: BTreeMap<usize, u32>,
    next: u32,
}

impl ValueNumberer {
    /// Assign the next id to the definition with identity `key`. Each
    /// definition is numbered exactly once.
    fn assign(&mut self, key: usize) {
        let previous = self.ids.insert(key, self.next);
        debug_assert!(previous.is_none(), "value numbered more than once");
        self.next += 1;
    }

    fn get(&self, key: usize) -> Option<u32> {
        self.ids.get(&key).copied()
    }
}

/// Identity of a value's defining group, plus the result index to
/// append when the group has other than exactly one result.
fn value_key(value: &Value) -> (usize, Option<usize>) {
    match value {
        Value::Argument(argument) => (Arc::as_ptr(argument) as usize, None),
        Value::Induction(induction) => (Arc::as_ptr(induction) as usize, None),
        Value::Result(operation, index) => {
            let key = Arc::as_ptr(operation) as usize;
            if operation.num_results() == 1 {
                (key, None)
            } else {
                (key, Some(*index))
            }
        }
    }
}

/// Printing state shared by both body shapes: the module-level printer
/// plus this function's value numbering.
struct FunctionPrinter<'p, 'a> {
    core: &'p mut Printer<'a>,
    values: ValueNumberer,
}

impl<'p, 'a> FunctionPrinter<'p, 'a> {
    fn new(core: &'p mut Printer<'a>) -> Self {
        FunctionPrinter {
            core,
            values: ValueNumberer::default(),
        }
    }

    fn number_argument(&mut self, argument: &Arc<BlockArgument>) {
        self.values.assign(Arc::as_ptr(argument) as usize);
    }

    /// Operations with at least one result get one id for the whole
    /// result group.
    fn number_operation(&mut self, operation: &OpRef) {
        if operation.num_results() != 0 {
            self.values.assign(Arc::as_ptr(operation) as usize);
        }
    }

    fn number_induction(&mut self, induction: &Arc<InductionVar>) {
        self.values.assign(Arc::as_ptr(induction) as usize);
    }

    /// Print a reference to `value`. Unnumbered values degrade to the
    /// sentinel token instead of aborting the print.
    fn value(&mut self, value: &Value, suppress_result_index: bool) -> fmt::Result {
        let (key, result_index) = value_key(value);
        let Some(id) = self.values.get(key) else {
            return write!(self.core.out, "{INVALID_VALUE_TOKEN}");
        };
        write!(self.core.out, "%{id}")?;
        if let Some(index) = result_index {
            if !suppress_result_index {
                write!(self.core.out, "#{index}")?;
            }
        }
        Ok(())
    }

    /// Emit one operation line, shared by both body shapes.
    fn operation(&mut self, operation: &OpRef) -> fmt::Result {
        write!(self.core.out, "  ")?;

        if operation.num_results() != 0 {
            self.value(&Value::Result(Arc::clone(operation), 0), true)?;
            write!(self.core.out, " = ")?;
        }

        // A registered custom form owns the rest of the line.
        if let Some(registry) = self.core.registry {
            if let Some(printer) = registry.printer(&operation.name) {
                return printer(operation, &mut *self.core.out);
            }
        }

        write!(self.core.out, "\"{}\"(", operation.name)?;
        let mut first = true;
        for operand in &operation.operands {
            if !first {
                write!(self.core.out, ", ")?;
            }
            first = false;
            self.value(operand, false)?;
        }
        write!(self.core.out, ")")?;

        if !operation.attributes.is_empty() {
            write!(self.core.out, "{{")?;
            let mut first = true;
            for attribute in &operation.attributes {
                if !first {
                    write!(self.core.out, ", ")?;
                }
                first = false;
                write!(self.core.out, "{}: ", attribute.name)?;
                self.core.attribute(&attribute.value)?;
            }
            write!(self.core.out, "}}")?;
        }

        write!(self.core.out, " : (")?;
        let mut first = true;
        for operand in &operation.operands {
            if !first {
                write!(self.core.out, ", ")?;
            }
            first = false;
            self.core.ty(&operand.ty())?;
        }
        write!(self.core.out, ") -> ")?;

        if let [single] = operation.result_types.as_slice() {
            self.core.ty(single)
        } else {
            write!(self.core.out, "(")?;
            self.core.type_list(&operation.result_types)?;
            write!(self.core.out, ")")
        }
    }
}

/// Printer for functions made of basic blocks.
pub(super) struct CfgFunctionPrinter<'p, 'a, 'f> {
    fun: FunctionPrinter<'p, 'a>,
    function: &'f CfgFunction,
    blocks: BTreeMap<u32, u32>,
}

impl<'p, 'a, 'f> CfgFunctionPrinter<'p, 'a, 'f> {
    /// Numbering happens entirely up front: block ids in block order,
    /// then per block arguments before result-bearing operations, so
    /// references to not-yet-printed blocks and values resolve during
    /// emission.
    pub(super) fn new(core: &'p mut Printer<'a>, function: &'f CfgFunction) -> Self {
        let mut printer = CfgFunctionPrinter {
            fun: FunctionPrinter::new(core),
            function,
            blocks: BTreeMap::new(),
        };
        for (position, block) in function.blocks.iter().enumerate() {
            printer.blocks.insert(block.label.0, position as u32);
            for argument in &block.arguments {
                printer.fun.number_argument(argument);
            }
            for operation in &block.operations {
                printer.fun.number_operation(operation);
            }
        }
        printer
    }

    pub(super) fn print(&mut self) -> fmt::Result {
        let function = self.function;
        write!(self.fun.core.out, "cfgfunc ")?;
        self.fun.core.signature(&function.name, &function.ty)?;
        writeln!(self.fun.core.out, " {{")?;
        for block in &function.blocks {
            self.block(block)?;
        }
        writeln!(self.fun.core.out, "}}")?;
        writeln!(self.fun.core.out)
    }

    fn block(&mut self, block: &BasicBlock) -> fmt::Result {
        self.block_reference(block.label)?;

        if !block.arguments.is_empty() {
            write!(self.fun.core.out, "(")?;
            let mut first = true;
            for argument in &block.arguments {
                if !first {
                    write!(self.fun.core.out, ", ")?;
                }
                first = false;
                self.fun.value(&argument.value(), false)?;
                write!(self.fun.core.out, ": ")?;
                self.fun.core.ty(&argument.ty)?;
            }
            write!(self.fun.core.out, ")")?;
        }
        writeln!(self.fun.core.out, ":")?;

        for operation in &block.operations {
            self.fun.operation(operation)?;
            writeln!(self.fun.core.out)?;
        }

        self.terminator(&block.terminator)?;
        writeln!(self.fun.core.out)
    }

    fn terminator(&mut self, terminator: &Terminator) -> fmt::Result {
        match terminator {
            Terminator::Br(br) => {
                write!(self.fun.core.out, "  br ")?;
                self.block_reference(br.target)?;
                if !br.operands.is_empty() {
                    write!(self.fun.core.out, "(")?;
                    let mut first = true;
                    for operand in &br.operands {
                        if !first {
                            write!(self.fun.core.out, ", ")?;
                        }
                        first = false;
                        self.fun.value(operand, false)?;
                    }
                    write!(self.fun.core.out, ") : ")?;
                    let mut first = true;
                    for operand in &br.operands {
                        if !first {
                            write!(self.fun.core.out, ", ")?;
                        }
                        first = false;
                        self.fun.core.ty(&operand.ty())?;
                    }
                }
                Ok(())
            }
            Terminator::Ret(ret) => {
                write!(self.fun.core.out, "  return")?;
                if !ret.operands.is_empty() {
                    write!(self.fun.core.out, " ")?;
                    let mut first = true;
                    for operand in &ret.operands {
                        if !first {
                            write!(self.fun.core.out, ", ")?;
                        }
                        first = false;
                        self.fun.value(operand, false)?;
                        write!(self.fun.core.out, " : ")?;
                        self.fun.core.ty(&operand.ty())?;
                    }
                }
                Ok(())
            }
        }
    }

    fn block_reference(&mut self, label: BlockLabel) -> fmt::Result {
        match self.blocks.get(&label.0) {
            Some(id) => write!(self.fun.core.out, "bb{id}"),
            None => write!(self.fun.core.out, "{INVALID_BLOCK_TOKEN}"),
        }
    }
}

/// Printer for functions made of nested structured statements.
pub(super) struct MlFunctionPrinter<'p, 'a, 'f> {
    fun: FunctionPrinter<'p, 'a>,
    function: &'f MlFunction,
    indent: usize,
}

impl<'p, 'a, 'f> MlFunctionPrinter<'p, 'a, 'f> {
    /// Numbering walks the statement tree in pre-order before any text
    /// is emitted: at each loop the induction variable first, then the
    /// body; operation statements get one id per result group.
    pub(super) fn new(core: &'p mut Printer<'a>, function: &'f MlFunction) -> Self {
        let mut printer = MlFunctionPrinter {
            fun: FunctionPrinter::new(core),
            function,
            indent: 0,
        };
        printer.number_block(&function.body);
        printer
    }

    fn number_block(&mut self, statements: &[Statement]) {
        for statement in statements {
            match statement {
                Statement::Operation(operation) => self.fun.number_operation(operation),
                Statement::For(stmt) => {
                    self.fun.number_induction(&stmt.induction);
                    self.number_block(&stmt.body);
                }
                Statement::If(stmt) => {
                    self.number_block(&stmt.then_body);
                    if let Some(else_body) = &stmt.else_body {
                        self.number_block(else_body);
                    }
                }
            }
        }
    }

    pub(super) fn print(&mut self) -> fmt::Result {
        let function = self.function;
        write!(self.fun.core.out, "mlfunc ")?;
        self.fun.core.signature(&function.name, &function.ty)?;
        writeln!(self.fun.core.out, " {{")?;
        self.block(&function.body)?;
        writeln!(self.fun.core.out, "  return")?;
        writeln!(self.fun.core.out, "}}")?;
        writeln!(self.fun.core.out)
    }

    fn block(&mut self, statements: &[Statement]) -> fmt::Result {
        self.indent += INDENT_WIDTH;
        for statement in statements {
            self.statement(statement)?;
            writeln!(self.fun.core.out)?;
        }
        self.indent -= INDENT_WIDTH;
        Ok(())
    }

    fn statement(&mut self, statement: &Statement) -> fmt::Result {
        match statement {
            Statement::Operation(operation) => self.fun.operation(operation),
            Statement::For(stmt) => self.for_stmt(stmt),
            Statement::If(stmt) => self.if_stmt(stmt),
        }
    }

    fn for_stmt(&mut self, stmt: &ForStmt) -> fmt::Result {
        self.pad()?;
        write!(self.fun.core.out, "for x = ")?;
        self.fun.core.affine_expr(&stmt.lower)?;
        write!(self.fun.core.out, " to ")?;
        self.fun.core.affine_expr(&stmt.upper)?;
        if stmt.step != 1 {
            write!(self.fun.core.out, " step {}", stmt.step)?;
        }
        writeln!(self.fun.core.out, " {{")?;
        self.block(&stmt.body)?;
        self.pad()?;
        write!(self.fun.core.out, "}}")
    }

    fn if_stmt(&mut self, stmt: &IfStmt) -> fmt::Result {
        self.pad()?;
        writeln!(self.fun.core.out, "if () {{")?;
        self.block(&stmt.then_body)?;
        self.pad()?;
        write!(self.fun.core.out, "}}")?;
        if let Some(else_body) = &stmt.else_body {
            writeln!(self.fun.core.out, " else {{")?;
            self.block(else_body)?;
            self.pad()?;
            write!(self.fun.core.out, "}}")?;
        }
        Ok(())
    }

    fn pad(&mut self) -> fmt::Result {
        write!(self.fun.core.out, "{:width$}", "", width = self.indent)
    }
}
