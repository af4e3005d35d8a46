/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The code generator takes an AST, infers the type of every expression, and
/// maps it into a WebAssembly module.
pub mod codegen {
    pub mod interface;
    pub mod scope;
    pub mod wasm;
}

/// The compiler drives the whole pipeline, from source to module bytes.
pub mod compiler;

pub mod ast;
pub mod token;
pub mod types;

/// Encoding of the WebAssembly binary format.
pub mod wasm {
    pub mod encode;
    pub mod instr;
    pub mod module;
}

pub mod util {
    pub mod fmt {
        pub mod tree;
    }
    pub mod intern;
    #[cfg(test)]
    pub(crate) mod test_utils;
}
