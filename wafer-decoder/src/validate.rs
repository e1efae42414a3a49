// wafer - wafer-decoder
//
// Copyright (c) 2025 The Wafer Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Two-pass module validation.
//!
//! Pass 1 ([`ModuleContext::build`]) walks the decoded [`crate::module::Module`]
//! once to freeze the index spaces (types, functions, tables, memories,
//! globals), check the handful of module-level invariants that don't
//! require looking inside any function body (export name uniqueness, the
//! start function's signature, the set of function indices `ref.func` may
//! legally name), and record enough per-function information for pass 2.
//!
//! Pass 2 ([`FuncValidator::validate`]) runs once per function body: a
//! stack-machine type checker carrying a value stack of
//! [`StackValue`] (a concrete type or the polymorphic `Unknown` sentinel
//! produced after `unreachable`) alongside a stack of [`ControlFrame`]s
//! for the enclosing blocks/loops/ifs, exactly mirroring the reference
//! algorithm the core specification's appendix describes.

use alloc::collections::BTreeSet;
use alloc::vec;
use alloc::vec::Vec;

use wafer_error::{kinds, Result};
use wafer_format::{
    BlockType, ExternalKind, Features, FuncType, GlobalType, ImportDesc, Limits, TableType, ValueType,
};

use crate::instructions::{decode_instruction, Instruction};
use crate::module::Module;
use crate::sections::FunctionBody;

/// The index spaces of a module, frozen after pass 1, plus the facts pass
/// 2 needs: each function's signature and whether `ref.func` may legally
/// name it.
pub struct ModuleContext<'a> {
    pub features: &'a Features,
    pub types: &'a [FuncType],
    pub func_type_indices: Vec<u32>,
    pub tables: Vec<TableType>,
    pub memories: Vec<Limits>,
    pub globals: Vec<GlobalType>,
    pub declared_funcs: BTreeSet<u32>,
    pub imported_func_count: u32,
    pub event_type_indices: Vec<u32>,
}

impl<'a> ModuleContext<'a> {
    pub fn func_type(&self, func_index: u32) -> Result<&'a FuncType> {
        let type_index = *self
            .func_type_indices
            .get(func_index as usize)
            .ok_or_else(|| kinds::index_out_of_bounds("function", func_index, self.func_type_indices.len() as u32))?;
        self.types
            .get(type_index as usize)
            .ok_or_else(|| kinds::index_out_of_bounds("type", type_index, self.types.len() as u32))
    }

    /// Builds the frozen index spaces and runs every module-level check
    /// that does not require decoding a function body.
    pub fn build(module: &'a Module, bytes: &[u8], features: &'a Features) -> Result<Self> {
        let mut func_type_indices = Vec::new();
        let mut tables = Vec::new();
        let mut memories = Vec::new();
        let mut globals = Vec::new();
        let mut event_type_indices = Vec::new();

        for import in &module.imports {
            match &import.desc {
                ImportDesc::Function(type_index) => func_type_indices.push(*type_index),
                ImportDesc::Table(table_type) => tables.push(*table_type),
                ImportDesc::Memory(limits) => memories.push(*limits),
                ImportDesc::Global(global_type) => globals.push(*global_type),
                ImportDesc::Event(type_index) => event_type_indices.push(*type_index),
            }
        }
        let imported_func_count = func_type_indices.len() as u32;

        func_type_indices.extend(module.functions.iter().copied());
        tables.extend(module.tables.iter().copied());
        memories.extend(module.memories.iter().copied());
        globals.extend(module.globals.iter().map(|g| g.global_type));
        event_type_indices.extend(module.events.iter().copied());

        if memories.len() > 1 && !features.multi_memory {
            return Err(kinds::multiple_memories());
        }

        for type_index in &func_type_indices {
            if *type_index as usize >= module.types.len() {
                return Err(kinds::index_out_of_bounds("type", *type_index, module.types.len() as u32));
            }
        }
        for type_index in &event_type_indices {
            if *type_index as usize >= module.types.len() {
                return Err(kinds::index_out_of_bounds("type", *type_index, module.types.len() as u32));
            }
        }

        let mut export_names = BTreeSet::new();
        for export in &module.exports {
            if !export_names.insert(export.name.clone()) {
                return Err(kinds::duplicate_export(export.name.clone()));
            }
            let space_len = match export.kind {
                ExternalKind::Function => func_type_indices.len(),
                ExternalKind::Table => tables.len(),
                ExternalKind::Memory => memories.len(),
                ExternalKind::Global => globals.len(),
                ExternalKind::Event => event_type_indices.len(),
            };
            if export.index as usize >= space_len {
                return Err(kinds::index_out_of_bounds(space_name(export.kind), export.index, space_len as u32));
            }
        }

        if let Some(start_index) = module.start {
            let func_type = func_type_indices
                .get(start_index as usize)
                .and_then(|&t| module.types.get(t as usize))
                .ok_or_else(|| kinds::index_out_of_bounds("function", start_index, func_type_indices.len() as u32))?;
            if !func_type.params.is_empty() || !func_type.results.is_empty() {
                return Err(kinds::invalid_start_signature(start_index));
            }
        }

        let mut declared_funcs = BTreeSet::new();
        for export in &module.exports {
            if export.kind == ExternalKind::Function {
                declared_funcs.insert(export.index);
            }
        }
        for element in &module.elements {
            match &element.items {
                wafer_format::ElementItems::Indices(indices) => {
                    declared_funcs.extend(indices.iter().copied());
                }
                wafer_format::ElementItems::Exprs(exprs) => {
                    for &(offset, _) in exprs {
                        if let (Instruction::RefFunc(idx), _) =
                            decode_instruction(bytes, offset as usize, features)?
                        {
                            declared_funcs.insert(idx);
                        }
                    }
                }
            }
        }

        Ok(Self {
            features,
            types: &module.types,
            func_type_indices,
            tables,
            memories,
            globals,
            declared_funcs,
            imported_func_count,
            event_type_indices,
        })
    }
}

fn space_name(kind: ExternalKind) -> &'static str {
    match kind {
        ExternalKind::Function => "function",
        ExternalKind::Table => "table",
        ExternalKind::Memory => "memory",
        ExternalKind::Global => "global",
        ExternalKind::Event => "event",
    }
}

/// A value-stack entry: a concrete type, or the polymorphic sentinel that
/// every pop accepts once the current frame has gone unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackValue {
    Val(ValueType),
    Unknown,
}

struct ControlFrame {
    start_types: Vec<ValueType>,
    end_types: Vec<ValueType>,
    height: usize,
    unreachable: bool,
    is_loop: bool,
}

impl ControlFrame {
    fn label_types(&self) -> &[ValueType] {
        if self.is_loop {
            &self.start_types
        } else {
            &self.end_types
        }
    }
}

/// Validates one function body's instruction stream against its declared
/// signature and locals.
pub struct FuncValidator<'a, 'ctx> {
    ctx: &'ctx ModuleContext<'ctx>,
    locals: Vec<ValueType>,
    stack: Vec<StackValue>,
    frames: Vec<ControlFrame>,
    bytes: &'a [u8],
    body_offset: usize,
    body_len: usize,
}

impl<'a, 'ctx> FuncValidator<'a, 'ctx> {
    pub fn new(ctx: &'ctx ModuleContext<'ctx>, func_type: &FuncType, body: &'a FunctionBody, bytes: &'a [u8]) -> Self {
        let mut locals = func_type.params.clone();
        for &(count, ty) in &body.locals {
            for _ in 0..count {
                locals.push(ty);
            }
        }
        let mut validator = Self {
            ctx,
            locals,
            stack: Vec::new(),
            frames: Vec::new(),
            bytes,
            body_offset: body.code_offset as usize,
            body_len: body.code_len as usize,
        };
        validator.frames.push(ControlFrame {
            start_types: Vec::new(),
            end_types: func_type.results.clone(),
            height: 0,
            unreachable: false,
            is_loop: false,
        });
        validator
    }

    fn push(&mut self, value: StackValue) {
        self.stack.push(value);
    }

    fn push_val(&mut self, ty: ValueType) {
        self.push(StackValue::Val(ty));
    }

    fn push_vals(&mut self, types: &[ValueType]) {
        for &ty in types {
            self.push_val(ty);
        }
    }

    fn pop(&mut self) -> Result<StackValue> {
        let frame = self.frames.last().expect("at least the function frame is always present");
        if self.stack.len() == frame.height {
            if frame.unreachable {
                return Ok(StackValue::Unknown);
            }
            return Err(kinds::stack_underflow());
        }
        Ok(self.stack.pop().expect("checked non-empty above"))
    }

    fn pop_expect(&mut self, expected: ValueType) -> Result<()> {
        match self.pop()? {
            StackValue::Unknown => Ok(()),
            StackValue::Val(found) if found == expected => Ok(()),
            StackValue::Val(found) => Err(kinds::type_mismatch(format_type(expected), format_type(found))),
        }
    }

    fn pop_vals(&mut self, types: &[ValueType]) -> Result<()> {
        for &ty in types.iter().rev() {
            self.pop_expect(ty)?;
        }
        Ok(())
    }

    fn push_ctrl(&mut self, start_types: Vec<ValueType>, end_types: Vec<ValueType>, is_loop: bool) {
        let height = self.stack.len();
        self.push_vals(&start_types);
        self.frames.push(ControlFrame { start_types, end_types, height, unreachable: false, is_loop });
    }

    fn pop_ctrl(&mut self) -> Result<ControlFrame> {
        let frame = self.frames.pop().ok_or_else(kinds::malformed_function_body)?;
        self.pop_vals(&frame.end_types)?;
        if self.stack.len() != frame.height {
            return Err(kinds::stack_height_mismatch());
        }
        Ok(frame)
    }

    fn set_unreachable(&mut self) {
        let frame = self.frames.last_mut().expect("at least the function frame is always present");
        self.stack.truncate(frame.height);
        frame.unreachable = true;
    }

    fn block_type_signature(&self, block_type: BlockType) -> Result<(Vec<ValueType>, Vec<ValueType>)> {
        match block_type {
            BlockType::Empty => Ok((Vec::new(), Vec::new())),
            BlockType::Value(ty) => Ok((Vec::new(), vec![ty])),
            BlockType::FuncType(type_index) => {
                let func_type = self
                    .ctx
                    .types
                    .get(type_index as usize)
                    .ok_or_else(|| kinds::index_out_of_bounds("type", type_index, self.ctx.types.len() as u32))?;
                if func_type.results.len() > 1 && !self.ctx.features.multi_value {
                    return Err(kinds::feature_disabled(0, "multi-value block type", "multi-value"));
                }
                Ok((func_type.params.clone(), func_type.results.clone()))
            }
        }
    }

    fn local_type(&self, index: u32) -> Result<ValueType> {
        self.locals
            .get(index as usize)
            .copied()
            .ok_or_else(|| kinds::index_out_of_bounds("local", index, self.locals.len() as u32))
    }

    fn global_type(&self, index: u32) -> Result<GlobalType> {
        self.ctx
            .globals
            .get(index as usize)
            .copied()
            .ok_or_else(|| kinds::index_out_of_bounds("global", index, self.ctx.globals.len() as u32))
    }

    fn branch_label_types(&self, depth: u32) -> Result<Vec<ValueType>> {
        let frame = self
            .frames
            .iter()
            .rev()
            .nth(depth as usize)
            .ok_or_else(|| kinds::unknown_label(depth))?;
        Ok(frame.label_types().to_vec())
    }

    /// Walks the full instruction stream and returns successfully only if
    /// every instruction type-checked and the body ends with exactly one
    /// well-formed `end` closing the function-level frame.
    pub fn validate(mut self) -> Result<()> {
        let mut pos = self.body_start();
        let end = self.body_end();
        loop {
            if pos >= end {
                return Err(kinds::malformed_function_body());
            }
            let (instr, len) = decode_instruction(self.bytes, pos, self.ctx.features)?;
            pos += len;
            let closed_function = self.step(&instr)?;
            if closed_function {
                break;
            }
        }
        if pos != end {
            return Err(kinds::malformed_function_body());
        }
        Ok(())
    }

    fn body_start(&self) -> usize {
        self.body_offset
    }
    fn body_end(&self) -> usize {
        self.body_offset + self.body_len
    }

    /// Applies one instruction's stack effect. Returns `true` once the
    /// outermost function frame's `end` has been processed.
    fn step(&mut self, instr: &Instruction) -> Result<bool> {
        use Instruction as I;
        match instr {
            I::Unreachable => self.set_unreachable(),
            I::Nop => {}
            I::Block(bt) => {
                let (params, results) = self.block_type_signature(*bt)?;
                self.pop_vals(&params)?;
                self.push_ctrl(params, results, false);
            }
            I::Loop(bt) => {
                let (params, results) = self.block_type_signature(*bt)?;
                self.pop_vals(&params)?;
                self.push_ctrl(params, results, true);
            }
            I::If(bt) => {
                self.pop_expect(ValueType::I32)?;
                let (params, results) = self.block_type_signature(*bt)?;
                self.pop_vals(&params)?;
                self.push_ctrl(params, results, false);
            }
            I::Else => {
                let frame = self.pop_ctrl()?;
                self.push_ctrl(frame.start_types, frame.end_types, false);
            }
            I::End => {
                let frame = self.pop_ctrl()?;
                self.push_vals(&frame.end_types);
                if self.frames.is_empty() {
                    return Ok(true);
                }
            }
            I::Br(depth) => {
                let types = self.branch_label_types(*depth)?;
                self.pop_vals(&types)?;
                self.set_unreachable();
            }
            I::BrIf(depth) => {
                self.pop_expect(ValueType::I32)?;
                let types = self.branch_label_types(*depth)?;
                self.pop_vals(&types)?;
                self.push_vals(&types);
            }
            I::BrTable(table) => {
                self.pop_expect(ValueType::I32)?;
                let default_types = self.branch_label_types(table.default)?;
                for &target in &table.targets {
                    let target_types = self.branch_label_types(target)?;
                    if target_types.len() != default_types.len() {
                        return Err(kinds::inconsistent_label_arity());
                    }
                    for (&target_ty, &default_ty) in target_types.iter().zip(&default_types) {
                        if target_ty != default_ty {
                            return Err(kinds::type_mismatch(format_type(default_ty), format_type(target_ty)));
                        }
                    }
                }
                self.pop_vals(&default_types)?;
                self.set_unreachable();
            }
            I::Return => {
                let results = self.frames[0].end_types.clone();
                self.pop_vals(&results)?;
                self.set_unreachable();
            }
            I::Call(func_index) => {
                let func_type = self.ctx.func_type(*func_index)?.clone();
                self.pop_vals(&func_type.params)?;
                self.push_vals(&func_type.results);
            }
            I::CallIndirect { type_index, table_index } => {
                let table = self
                    .ctx
                    .tables
                    .get(*table_index as usize)
                    .ok_or_else(|| kinds::index_out_of_bounds("table", *table_index, self.ctx.tables.len() as u32))?;
                if table.element != wafer_format::ReferenceType::FuncRef {
                    return Err(kinds::type_mismatch_table());
                }
                self.pop_expect(ValueType::I32)?;
                let func_type = self
                    .ctx
                    .types
                    .get(*type_index as usize)
                    .ok_or_else(|| kinds::index_out_of_bounds("type", *type_index, self.ctx.types.len() as u32))?
                    .clone();
                self.pop_vals(&func_type.params)?;
                self.push_vals(&func_type.results);
            }
            I::ReturnCall(func_index) => {
                let func_type = self.ctx.func_type(*func_index)?.clone();
                self.pop_vals(&func_type.params)?;
                self.set_unreachable();
            }
            I::ReturnCallIndirect { type_index, .. } => {
                let func_type = self
                    .ctx
                    .types
                    .get(*type_index as usize)
                    .ok_or_else(|| kinds::index_out_of_bounds("type", *type_index, self.ctx.types.len() as u32))?
                    .clone();
                self.pop_expect(ValueType::I32)?;
                self.pop_vals(&func_type.params)?;
                self.set_unreachable();
            }
            I::Drop => {
                self.pop()?;
            }
            I::Select => {
                self.pop_expect(ValueType::I32)?;
                let b = self.pop()?;
                let a = self.pop()?;
                match (a, b) {
                    (StackValue::Val(ta), StackValue::Val(tb)) if ta == tb => self.push(StackValue::Val(ta)),
                    (StackValue::Val(ta), StackValue::Unknown) => self.push(StackValue::Val(ta)),
                    (StackValue::Unknown, StackValue::Val(tb)) => self.push(StackValue::Val(tb)),
                    (StackValue::Unknown, StackValue::Unknown) => self.push(StackValue::Unknown),
                    (StackValue::Val(ta), StackValue::Val(tb)) => {
                        return Err(kinds::type_mismatch(format_type(ta), format_type(tb)))
                    }
                }
            }
            I::TypedSelect(ty) => {
                self.pop_expect(ValueType::I32)?;
                self.pop_expect(*ty)?;
                self.pop_expect(*ty)?;
                self.push_val(*ty);
            }
            I::LocalGet(index) => {
                let ty = self.local_type(*index)?;
                self.push_val(ty);
            }
            I::LocalSet(index) => {
                let ty = self.local_type(*index)?;
                self.pop_expect(ty)?;
            }
            I::LocalTee(index) => {
                let ty = self.local_type(*index)?;
                self.pop_expect(ty)?;
                self.push_val(ty);
            }
            I::GlobalGet(index) => {
                let global = self.global_type(*index)?;
                self.push_val(global.value_type);
            }
            I::GlobalSet(index) => {
                let global = self.global_type(*index)?;
                if !global.mutability.is_mutable() {
                    return Err(kinds::immutable_global(*index));
                }
                self.pop_expect(global.value_type)?;
            }
            I::TableGet(index) => {
                let table = self.table(*index)?;
                self.pop_expect(ValueType::I32)?;
                self.push_val(table.element.into());
            }
            I::TableSet(index) => {
                let table = self.table(*index)?;
                self.pop_expect(table.element.into())?;
                self.pop_expect(ValueType::I32)?;
            }
            I::TableGrow(index) => {
                let table = self.table(*index)?;
                self.pop_expect(ValueType::I32)?;
                self.pop_expect(table.element.into())?;
                self.push_val(ValueType::I32);
            }
            I::TableSize(index) => {
                self.table(*index)?;
                self.push_val(ValueType::I32);
            }
            I::TableFill(index) => {
                let table = self.table(*index)?;
                self.pop_expect(ValueType::I32)?;
                self.pop_expect(table.element.into())?;
                self.pop_expect(ValueType::I32)?;
            }
            I::TableInit { table_index, .. } => {
                self.table(*table_index)?;
                self.pop_expect(ValueType::I32)?;
                self.pop_expect(ValueType::I32)?;
                self.pop_expect(ValueType::I32)?;
            }
            I::TableCopy { dst_table, src_table } => {
                self.table(*dst_table)?;
                self.table(*src_table)?;
                self.pop_expect(ValueType::I32)?;
                self.pop_expect(ValueType::I32)?;
                self.pop_expect(ValueType::I32)?;
            }
            I::ElemDrop(_) => {}
            I::MemorySize(_) => self.push_val(ValueType::I32),
            I::MemoryGrow(_) => {
                self.pop_expect(ValueType::I32)?;
                self.push_val(ValueType::I32);
            }
            I::MemoryCopy { .. } | I::MemoryInit { .. } => {
                self.pop_expect(ValueType::I32)?;
                self.pop_expect(ValueType::I32)?;
                self.pop_expect(ValueType::I32)?;
            }
            I::MemoryFill(_) => {
                self.pop_expect(ValueType::I32)?;
                self.pop_expect(ValueType::I32)?;
                self.pop_expect(ValueType::I32)?;
            }
            I::DataDrop(_) => {}
            I::RefNull(rt) => self.push_val((*rt).into()),
            I::RefIsNull => {
                match self.pop()? {
                    StackValue::Val(ty) if ty.is_reference() => {}
                    StackValue::Unknown => {}
                    StackValue::Val(ty) => return Err(kinds::type_mismatch("reference type", format_type(ty))),
                }
                self.push_val(ValueType::I32);
            }
            I::RefFunc(func_index) => {
                if !self.ctx.declared_funcs.contains(func_index) {
                    return Err(kinds::undeclared_function_reference(*func_index));
                }
                self.push_val(ValueType::FuncRef);
            }

            // Loads
            I::I32Load(_) | I::I32Load8S(_) | I::I32Load8U(_) | I::I32Load16S(_) | I::I32Load16U(_) => {
                self.load(ValueType::I32)?
            }
            I::I64Load(_)
            | I::I64Load8S(_)
            | I::I64Load8U(_)
            | I::I64Load16S(_)
            | I::I64Load16U(_)
            | I::I64Load32S(_)
            | I::I64Load32U(_) => self.load(ValueType::I64)?,
            I::F32Load(_) => self.load(ValueType::F32)?,
            I::F64Load(_) => self.load(ValueType::F64)?,

            // Stores
            I::I32Store(_) | I::I32Store8(_) | I::I32Store16(_) => self.store(ValueType::I32)?,
            I::I64Store(_) | I::I64Store8(_) | I::I64Store16(_) | I::I64Store32(_) => self.store(ValueType::I64)?,
            I::F32Store(_) => self.store(ValueType::F32)?,
            I::F64Store(_) => self.store(ValueType::F64)?,

            // Consts
            I::I32Const(_) => self.push_val(ValueType::I32),
            I::I64Const(_) => self.push_val(ValueType::I64),
            I::F32Const(_) => self.push_val(ValueType::F32),
            I::F64Const(_) => self.push_val(ValueType::F64),

            // i32 testop/relop -> i32
            I::I32Eqz => self.unop(ValueType::I32, ValueType::I32)?,
            I::I32Eq | I::I32Ne | I::I32LtS | I::I32LtU | I::I32GtS | I::I32GtU | I::I32LeS | I::I32LeU
            | I::I32GeS | I::I32GeU => self.binop(ValueType::I32, ValueType::I32)?,
            I::I64Eqz => {
                self.pop_expect(ValueType::I64)?;
                self.push_val(ValueType::I32);
            }
            I::I64Eq | I::I64Ne | I::I64LtS | I::I64LtU | I::I64GtS | I::I64GtU | I::I64LeS | I::I64LeU
            | I::I64GeS | I::I64GeU => {
                self.pop_expect(ValueType::I64)?;
                self.pop_expect(ValueType::I64)?;
                self.push_val(ValueType::I32);
            }
            I::F32Eq | I::F32Ne | I::F32Lt | I::F32Gt | I::F32Le | I::F32Ge => {
                self.pop_expect(ValueType::F32)?;
                self.pop_expect(ValueType::F32)?;
                self.push_val(ValueType::I32);
            }
            I::F64Eq | I::F64Ne | I::F64Lt | I::F64Gt | I::F64Le | I::F64Ge => {
                self.pop_expect(ValueType::F64)?;
                self.pop_expect(ValueType::F64)?;
                self.push_val(ValueType::I32);
            }

            // i32 unop/binop
            I::I32Clz | I::I32Ctz | I::I32Popcnt | I::I32Extend8S | I::I32Extend16S => {
                self.unop(ValueType::I32, ValueType::I32)?
            }
            I::I32Add
            | I::I32Sub
            | I::I32Mul
            | I::I32DivS
            | I::I32DivU
            | I::I32RemS
            | I::I32RemU
            | I::I32And
            | I::I32Or
            | I::I32Xor
            | I::I32Shl
            | I::I32ShrS
            | I::I32ShrU
            | I::I32Rotl
            | I::I32Rotr => self.binop(ValueType::I32, ValueType::I32)?,

            // i64 unop/binop
            I::I64Clz | I::I64Ctz | I::I64Popcnt | I::I64Extend8S | I::I64Extend16S | I::I64Extend32S => {
                self.unop(ValueType::I64, ValueType::I64)?
            }
            I::I64Add
            | I::I64Sub
            | I::I64Mul
            | I::I64DivS
            | I::I64DivU
            | I::I64RemS
            | I::I64RemU
            | I::I64And
            | I::I64Or
            | I::I64Xor
            | I::I64Shl
            | I::I64ShrS
            | I::I64ShrU
            | I::I64Rotl
            | I::I64Rotr => self.binop(ValueType::I64, ValueType::I64)?,

            // f32 unop/binop
            I::F32Abs | I::F32Neg | I::F32Ceil | I::F32Floor | I::F32Trunc | I::F32Nearest | I::F32Sqrt => {
                self.unop(ValueType::F32, ValueType::F32)?
            }
            I::F32Add | I::F32Sub | I::F32Mul | I::F32Div | I::F32Min | I::F32Max | I::F32Copysign => {
                self.binop(ValueType::F32, ValueType::F32)?
            }

            // f64 unop/binop
            I::F64Abs | I::F64Neg | I::F64Ceil | I::F64Floor | I::F64Trunc | I::F64Nearest | I::F64Sqrt => {
                self.unop(ValueType::F64, ValueType::F64)?
            }
            I::F64Add | I::F64Sub | I::F64Mul | I::F64Div | I::F64Min | I::F64Max | I::F64Copysign => {
                self.binop(ValueType::F64, ValueType::F64)?
            }

            // conversions
            I::I32WrapI64 => self.unop(ValueType::I64, ValueType::I32)?,
            I::I32TruncF32S | I::I32TruncF32U | I::I32TruncSatF32S | I::I32TruncSatF32U => {
                self.unop(ValueType::F32, ValueType::I32)?
            }
            I::I32TruncF64S | I::I32TruncF64U | I::I32TruncSatF64S | I::I32TruncSatF64U => {
                self.unop(ValueType::F64, ValueType::I32)?
            }
            I::I64ExtendI32S | I::I64ExtendI32U => self.unop(ValueType::I32, ValueType::I64)?,
            I::I64TruncF32S | I::I64TruncF32U | I::I64TruncSatF32S | I::I64TruncSatF32U => {
                self.unop(ValueType::F32, ValueType::I64)?
            }
            I::I64TruncF64S | I::I64TruncF64U | I::I64TruncSatF64S | I::I64TruncSatF64U => {
                self.unop(ValueType::F64, ValueType::I64)?
            }
            I::F32ConvertI32S | I::F32ConvertI32U => self.unop(ValueType::I32, ValueType::F32)?,
            I::F32ConvertI64S | I::F32ConvertI64U => self.unop(ValueType::I64, ValueType::F32)?,
            I::F32DemoteF64 => self.unop(ValueType::F64, ValueType::F32)?,
            I::F64ConvertI32S | I::F64ConvertI32U => self.unop(ValueType::I32, ValueType::F64)?,
            I::F64ConvertI64S | I::F64ConvertI64U => self.unop(ValueType::I64, ValueType::F64)?,
            I::F64PromoteF32 => self.unop(ValueType::F32, ValueType::F64)?,
            I::I32ReinterpretF32 => self.unop(ValueType::F32, ValueType::I32)?,
            I::I64ReinterpretF64 => self.unop(ValueType::F64, ValueType::I64)?,
            I::F32ReinterpretI32 => self.unop(ValueType::I32, ValueType::F32)?,
            I::F64ReinterpretI64 => self.unop(ValueType::I64, ValueType::F64)?,

            // SIMD/threads: representative subset, v128-in-v128-out or
            // memory-shaped, enough to demonstrate prefix-byte dispatch.
            I::V128Load(_) => self.load(ValueType::V128)?,
            I::V128Store(_) => self.store(ValueType::V128)?,
            I::V128Const(_) => self.push_val(ValueType::V128),
            I::I32x4Add | I::I32x4Sub | I::F32x4Add => self.binop(ValueType::V128, ValueType::V128)?,
            I::AtomicFence => {}
            I::I32AtomicLoad(_) => self.load(ValueType::I32)?,
            I::I64AtomicLoad(_) => self.load(ValueType::I64)?,
            I::I32AtomicStore(_) => self.store(ValueType::I32)?,
            I::I64AtomicStore(_) => self.store(ValueType::I64)?,
            I::MemoryAtomicNotify { .. } => {
                self.pop_expect(ValueType::I32)?;
                self.pop_expect(ValueType::I32)?;
                self.push_val(ValueType::I32);
            }
            I::MemoryAtomicWait32 { .. } => {
                self.pop_expect(ValueType::I64)?;
                self.pop_expect(ValueType::I32)?;
                self.pop_expect(ValueType::I32)?;
                self.push_val(ValueType::I32);
            }
        }
        Ok(false)
    }

    fn table(&self, index: u32) -> Result<TableType> {
        self.ctx
            .tables
            .get(index as usize)
            .copied()
            .ok_or_else(|| kinds::index_out_of_bounds("table", index, self.ctx.tables.len() as u32))
    }

    fn load(&mut self, result: ValueType) -> Result<()> {
        self.pop_expect(ValueType::I32)?;
        self.push_val(result);
        Ok(())
    }

    fn store(&mut self, value: ValueType) -> Result<()> {
        self.pop_expect(value)?;
        self.pop_expect(ValueType::I32)?;
        Ok(())
    }

    fn unop(&mut self, operand: ValueType, result: ValueType) -> Result<()> {
        self.pop_expect(operand)?;
        self.push_val(result);
        Ok(())
    }

    fn binop(&mut self, operand: ValueType, result: ValueType) -> Result<()> {
        self.pop_expect(operand)?;
        self.pop_expect(operand)?;
        self.push_val(result);
        Ok(())
    }
}

fn format_type(ty: ValueType) -> &'static str {
    match ty {
        ValueType::I32 => "i32",
        ValueType::I64 => "i64",
        ValueType::F32 => "f32",
        ValueType::F64 => "f64",
        ValueType::V128 => "v128",
        ValueType::FuncRef => "funcref",
        ValueType::ExternRef => "externref",
        ValueType::NullRef => "nullref",
        ValueType::ExnRef => "exnref",
    }
}

/// Runs both validation passes over an already-decoded module.
pub fn validate_module(module: &Module, bytes: &[u8], features: &Features) -> Result<()> {
    let ctx = ModuleContext::build(module, bytes, features)?;
    for (i, body) in module.code.iter().enumerate() {
        let func_index = ctx.imported_func_count + i as u32;
        #[cfg(feature = "logging")]
        log::trace!("validate_module: function {func_index}, body at offset {}", body.code_offset);
        let func_type = ctx.func_type(func_index)?.clone();
        let validator = FuncValidator::new(&ctx, &func_type, body, bytes);
        validator.validate()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::decode_module;

    fn features() -> Features {
        Features::wasm_2_0()
    }

    fn module_with_body(body_bytes: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&wafer_format::MAGIC);
        bytes.extend_from_slice(&wafer_format::VERSION);
        // type section: one func type () -> (i32)
        bytes.extend_from_slice(&[0x01, 0x05, 0x01, 0x60, 0x00, 0x01, 0x7f]);
        // function section: one function, type 0
        bytes.extend_from_slice(&[0x03, 0x02, 0x01, 0x00]);
        // code section
        bytes.push(0x0a);
        let mut code_payload = Vec::new();
        code_payload.push(0x01); // 1 body
        code_payload.push((1 + body_bytes.len()) as u8); // body size
        code_payload.push(0x00); // no locals
        code_payload.extend_from_slice(body_bytes);
        bytes.push(code_payload.len() as u8);
        bytes.extend_from_slice(&code_payload);
        bytes
    }

    #[test]
    fn accepts_i32_const_returning_function() {
        let bytes = module_with_body(&[0x41, 0x2a, 0x0b]); // i32.const 42; end
        let module = decode_module(&bytes, &features()).unwrap();
        validate_module(&module, &bytes, &features()).unwrap();
    }

    #[test]
    fn rejects_type_mismatch_on_return() {
        // f32.const pushed where the function result is i32
        let bytes = module_with_body(&[0x43, 0, 0, 0, 0, 0x0b]);
        let module = decode_module(&bytes, &features()).unwrap();
        let err = validate_module(&module, &bytes, &features()).unwrap_err();
        assert_eq!(err.code, wafer_error::codes::TYPE_MISMATCH);
    }

    #[test]
    fn allows_unreachable_polymorphism() {
        // unreachable; i64.const (wrong type, but unreachable makes the
        // stack polymorphic) — still must satisfy the outer frame's i32.
        let bytes = module_with_body(&[0x00, 0x0b]);
        let module = decode_module(&bytes, &features()).unwrap();
        validate_module(&module, &bytes, &features()).unwrap();
    }
}
