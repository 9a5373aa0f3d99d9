//! Stack frame layout

use crate::frontend::ast::{Function, Program};

/// Round `n` up to the next multiple of `align`
pub fn align_to(n: i64, align: i64) -> i64 {
    (n + align - 1) / align * align
}

/// Give every local a negative `fp` offset and size the frame
///
/// Locals are laid out in declaration order, parameters first, one slot each.
/// The frame size is rounded up to 16 bytes.
pub fn assign_offsets(function: &mut Function) {
    let mut offset = 0;
    for obj in &mut function.locals {
        offset += obj.ty.size();
        obj.offset = -offset;
    }
    function.stack_size = align_to(offset, 16);
}

pub fn layout_program(program: &mut Program) {
    for function in &mut program.functions {
        assign_offsets(function);
        log::trace!(
            "frame for '{}': {} local(s), {} bytes",
            function.name,
            function.locals.len(),
            function.stack_size
        );
    }
}
