use crate::wasm::{
    encode,
    instr::{Instruction, LocalSlot},
};

/// `\0asm`
pub const MAGIC: [u8; 4] = *b"\0asm";
pub const VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

const FUNC_TYPE: u8 = 0x60;

#[derive(Copy, Clone)]
#[repr(u8)]
enum SectionId {
    Type = 0x01,
    Import = 0x02,
    Function = 0x03,
    Memory = 0x05,
    Export = 0x07,
    Code = 0x0a,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValType {
    I32,
    F32,
}

impl ValType {
    const fn code(self) -> u8 {
        match self {
            ValType::I32 => 0x7f,
            ValType::F32 => 0x7d,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncType {
    pub params: Vec<ValType>,
    pub results: Vec<ValType>,
}

/// A function import.
#[derive(Clone, Debug)]
pub struct Import {
    pub module: &'static str,
    pub field: &'static str,
    pub type_index: u32,
}

#[derive(Copy, Clone, Debug)]
pub enum ExportKind {
    Func,
    Memory,
}

#[derive(Clone, Debug)]
pub struct Export {
    pub name: &'static str,
    pub kind: ExportKind,
    pub index: u32,
}

#[derive(Clone, Debug, Default)]
pub struct FunctionBody {
    /// The type of each local slot, indexed by [`LocalSlot`].
    pub locals: Vec<ValType>,
    /// The instruction stream, without the final `end`.
    pub instructions: Vec<Instruction>,
}

/// A module under construction. Sections are written by [`Module::finish`]
/// in the order the format requires.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub types: Vec<FuncType>,
    pub imports: Vec<Import>,
    /// The type index of each defined function.
    pub functions: Vec<u32>,
    /// Minimum number of pages of the single memory, if any.
    pub memory: Option<u32>,
    pub exports: Vec<Export>,
    pub code: Vec<FunctionBody>,
}

impl Module {
    pub fn finish(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(&MAGIC);
        buf.extend_from_slice(&VERSION);

        let payload = &mut Vec::with_capacity(128);

        section(&mut buf, payload, SectionId::Type, |b| {
            encode::vec(b, &self.types, |b, ty| {
                b.push(FUNC_TYPE);
                encode::vec(b, &ty.params, |b, v| b.push(v.code()));
                encode::vec(b, &ty.results, |b, v| b.push(v.code()));
            });
        });
        section(&mut buf, payload, SectionId::Import, |b| {
            encode::vec(b, &self.imports, |b, import| {
                encode::name(b, import.module);
                encode::name(b, import.field);
                b.push(0x00); // function import
                encode::unsigned(b, import.type_index);
            });
        });
        section(&mut buf, payload, SectionId::Function, |b| {
            encode::vec(b, &self.functions, |b, &ty| encode::unsigned(b, ty));
        });
        if let Some(min_pages) = self.memory {
            section(&mut buf, payload, SectionId::Memory, |b| {
                encode::len(b, 1);
                b.push(0x00); // limits without maximum
                encode::unsigned(b, min_pages);
            });
        }
        section(&mut buf, payload, SectionId::Export, |b| {
            encode::vec(b, &self.exports, |b, export| {
                encode::name(b, export.name);
                b.push(match export.kind {
                    ExportKind::Func => 0x00,
                    ExportKind::Memory => 0x02,
                });
                encode::unsigned(b, export.index);
            });
        });
        section(&mut buf, payload, SectionId::Code, |b| {
            encode::vec(b, &self.code, |b, body| body.encode(b));
        });

        buf
    }
}

/// Writes a section whose payload is produced by `f`, reusing the payload
/// buffer between sections.
fn section(
    buf: &mut Vec<u8>,
    payload: &mut Vec<u8>,
    id: SectionId,
    f: impl FnOnce(&mut Vec<u8>),
) {
    payload.clear();
    f(payload);
    encode::section(buf, id as u8, payload);
}

impl FunctionBody {
    fn encode(&self, buf: &mut Vec<u8>) {
        let layout = LocalLayout::new(&self.locals);
        let mut body = Vec::with_capacity(self.instructions.len() * 2);
        encode::vec(&mut body, &layout.groups, |b, &(count, ty)| {
            encode::unsigned(b, count);
            b.push(ty.code());
        });
        for instr in &self.instructions {
            instr.encode(&mut body, |slot| layout.index(slot));
        }
        Instruction::End.encode(&mut body, |slot| layout.index(slot));

        encode::len(buf, body.len());
        buf.extend_from_slice(&body);
    }
}

/// Maps local slots onto local indices so that locals of the same type are
/// contiguous: all `i32` locals first, then all `f32` ones. Within a type,
/// declaration order is kept.
struct LocalLayout {
    indices: Vec<u32>,
    /// Run-length groups of the locals declaration. Empty groups are omitted.
    groups: Vec<(u32, ValType)>,
}

impl LocalLayout {
    const GROUP_ORDER: [ValType; 2] = [ValType::I32, ValType::F32];

    fn new(slots: &[ValType]) -> LocalLayout {
        let mut indices = vec![0; slots.len()];
        let mut groups = Vec::with_capacity(Self::GROUP_ORDER.len());
        let mut next = 0;
        for group_ty in Self::GROUP_ORDER {
            let mut count = 0;
            for (index, &ty) in indices.iter_mut().zip(slots) {
                if ty == group_ty {
                    *index = next;
                    next += 1;
                    count += 1;
                }
            }
            if count > 0 {
                groups.push((count, group_ty));
            }
        }
        LocalLayout { indices, groups }
    }

    fn index(&self, LocalSlot(slot): LocalSlot) -> u32 {
        self.indices[slot as usize]
    }
}
