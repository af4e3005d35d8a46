use crate::wasm::encode;

/// A function-local variable, numbered in declaration order.
///
/// Slots are mapped to the function's local indices only when the body is
/// encoded, since locals must be grouped by type there.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalSlot(pub u32);

/// The subset of WebAssembly instructions the generator emits.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Instruction {
    /// `block` with an empty block type.
    Block,
    /// `loop` with an empty block type.
    Loop,
    End,
    Br(u32),
    BrIf(u32),
    Drop,
    Call(u32),

    LocalGet(LocalSlot),
    LocalSet(LocalSlot),

    I32Const(i32),
    F32Const(f32),

    I32Eqz,
    I32Add,
    I32Mul,
    I32Or,
    /// `i32.store8` with natural alignment.
    I32Store8 {
        offset: u32,
    },

    F32Eq,
    F32Lt,
    F32Gt,
    F32Add,
    F32Sub,
    F32Mul,
    F32Div,

    F32ConvertI32S,
    /// Float to integer truncation, saturating instead of trapping.
    I32TruncSatF32S,
}

const EMPTY_BLOCK_TYPE: u8 = 0x40;

impl Instruction {
    /// Appends the instruction's encoding. Local slots are resolved to local
    /// indices through `local_index`.
    pub fn encode(&self, buf: &mut Vec<u8>, local_index: impl Fn(LocalSlot) -> u32) {
        use Instruction::*;
        match *self {
            Block => buf.extend_from_slice(&[0x02, EMPTY_BLOCK_TYPE]),
            Loop => buf.extend_from_slice(&[0x03, EMPTY_BLOCK_TYPE]),
            End => buf.push(0x0b),
            Br(depth) => {
                buf.push(0x0c);
                encode::unsigned(buf, depth);
            }
            BrIf(depth) => {
                buf.push(0x0d);
                encode::unsigned(buf, depth);
            }
            Drop => buf.push(0x1a),
            Call(func) => {
                buf.push(0x10);
                encode::unsigned(buf, func);
            }
            LocalGet(slot) => {
                buf.push(0x20);
                encode::unsigned(buf, local_index(slot));
            }
            LocalSet(slot) => {
                buf.push(0x21);
                encode::unsigned(buf, local_index(slot));
            }
            I32Const(value) => {
                buf.push(0x41);
                encode::signed(buf, value);
            }
            F32Const(value) => {
                buf.push(0x43);
                encode::f32(buf, value);
            }
            I32Eqz => buf.push(0x45),
            F32Eq => buf.push(0x5b),
            F32Lt => buf.push(0x5d),
            F32Gt => buf.push(0x5e),
            I32Add => buf.push(0x6a),
            I32Mul => buf.push(0x6c),
            I32Or => buf.push(0x72),
            I32Store8 { offset } => {
                buf.push(0x3a);
                // memarg: alignment exponent, then offset
                encode::unsigned(buf, 0);
                encode::unsigned(buf, offset);
            }
            F32Add => buf.push(0x92),
            F32Sub => buf.push(0x93),
            F32Mul => buf.push(0x94),
            F32Div => buf.push(0x95),
            F32ConvertI32S => buf.push(0xb2),
            I32TruncSatF32S => {
                buf.push(0xfc);
                encode::unsigned(buf, 0);
            }
        }
    }
}
