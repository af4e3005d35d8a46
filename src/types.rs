use crate::{
    ast::{BinaryOperator, Number},
    wasm::module::ValType,
};

/// The static type of an expression. Booleans are integers (1 or 0).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Float,
}

impl Type {
    pub fn of_number(number: Number) -> Type {
        match number {
            Number::Int(_) => Type::Int,
            Number::Float(_) => Type::Float,
        }
    }

    pub fn val_type(self) -> ValType {
        match self {
            Type::Int => ValType::I32,
            Type::Float => ValType::F32,
        }
    }
}

/// The typing rule of a binary operator: the type both operands are
/// converted to (or, for logical operators, must already have) and the type
/// of the result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub operands: Type,
    pub result: Type,
}

impl BinaryOperator {
    pub fn signature(self) -> Signature {
        use BinaryOperator::*;
        let (operands, result) = match self {
            Add | Sub | Mul | Div => (Type::Float, Type::Float),
            Eq | Lt | Gt => (Type::Float, Type::Int),
            And => (Type::Int, Type::Int),
        };
        Signature { operands, result }
    }
}
