use crate::{
    ast::{BinaryOperator, Program},
    codegen::wasm::Generator,
    token::Spanned,
    util::intern::Interner,
};

/// Code generation settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Row width of the pixel buffer. `setpixel x y v` writes the byte at
    /// `y * pixel_width + x`.
    pub pixel_width: u16,
}

impl Default for Options {
    fn default() -> Self {
        Options { pixel_width: 100 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("undefined name `{0}`")]
    UndefinedName(Box<str>),
    #[error("condition must be a boolean (integer) expression")]
    NonBooleanCondition,
    #[error("operands of `{}` must be boolean (integer) expressions", .op.symbol())]
    LogicalOperandNotBoolean { op: BinaryOperator },
    #[error("`break` outside of a loop")]
    BreakOutsideLoop,
    #[error("`continue` outside of a loop")]
    ContinueOutsideLoop,
}

/// Generates a WebAssembly module from the provided program.
///
/// The module imports `env.print_f32` and `env.print_i32` and exports a
/// nullary `run` function. If the program writes pixels, it also exports its
/// memory as `memory`.
pub fn generate(
    program: &Program,
    ident_interner: &Interner,
    options: &Options,
) -> Result<Vec<u8>, Spanned<Error>> {
    Generator::new(ident_interner, options).generate(program)
}

/// Index space layout of the generated module.
pub mod well_known {
    pub const RUN_TYPE: u32 = 0;
    pub const PRINT_F32_TYPE: u32 = 1;
    pub const PRINT_I32_TYPE: u32 = 2;

    pub const PRINT_F32_FUNC: u32 = 0;
    pub const PRINT_I32_FUNC: u32 = 1;
    pub const RUN_FUNC: u32 = 2;

    pub const IMPORT_MODULE: &str = "env";
    pub const PRINT_F32: &str = "print_f32";
    pub const PRINT_I32: &str = "print_i32";
    pub const RUN: &str = "run";
    pub const MEMORY: &str = "memory";
}
