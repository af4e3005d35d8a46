use crate::{
    ast::{BinaryOperator, Expr, ExprKind, Ident, Number, Program, Stmt, StmtKind},
    codegen::{
        interface::{well_known, Error, Options},
        scope::{Local, ScopeStack},
    },
    token::Spanned,
    types::Type,
    util::intern::Interner,
    wasm::{
        instr::Instruction,
        module::{Export, ExportKind, FuncType, FunctionBody, Import, Module, ValType},
    },
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// An open `block` or `loop`. The control stack mirrors the nesting of the
/// emitted structured instructions, so the relative depth of a branch target
/// is its distance from the top of the stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Control {
    /// Outer block of an `if`; jumping out of it skips the `else` branch.
    IfJoin,
    /// Inner block of an `if`; jumping out of it skips the `then` branch.
    IfElse,
    /// Outer block of a `while`, the `break` target.
    WhileExit,
    /// The `loop` of a `while`, the `continue` target.
    WhileLoop,
    /// Block of a `while` with an empty body, which evaluates its condition
    /// once.
    Once,
}

pub struct Generator<'ident> {
    ident_interner: &'ident Interner,
    options: Options,
    scopes: ScopeStack,
    controls: Vec<Control>,
    code: Vec<Instruction>,
    uses_memory: bool,
}

impl Generator<'_> {
    pub fn new<'ident>(ident_interner: &'ident Interner, options: &Options) -> Generator<'ident> {
        Generator {
            ident_interner,
            options: *options,
            scopes: ScopeStack::new(),
            controls: Vec::with_capacity(16),
            code: Vec::with_capacity(256),
            uses_memory: false,
        }
    }

    pub fn generate(mut self, program: &Program) -> Result<Vec<u8>> {
        self.g_program(program)?;
        Ok(self.into_module().finish())
    }

    fn g_program(&mut self, program: &Program) -> Result<()> {
        self.g_stmts(&program.body)
    }

    fn into_module(self) -> Module {
        use well_known::*;

        let locals = self
            .scopes
            .slot_types()
            .iter()
            .map(|ty| ty.val_type())
            .collect();

        let mut exports = vec![Export {
            name: RUN,
            kind: ExportKind::Func,
            index: RUN_FUNC,
        }];
        if self.uses_memory {
            exports.push(Export {
                name: MEMORY,
                kind: ExportKind::Memory,
                index: 0,
            });
        }

        let func_type = |params: Vec<ValType>| FuncType {
            params,
            results: vec![],
        };
        Module {
            // Keep in sync with the `*_TYPE` indices.
            types: vec![
                func_type(vec![]),
                func_type(vec![ValType::F32]),
                func_type(vec![ValType::I32]),
            ],
            // Keep in sync with the `*_FUNC` indices.
            imports: vec![
                Import {
                    module: IMPORT_MODULE,
                    field: PRINT_F32,
                    type_index: PRINT_F32_TYPE,
                },
                Import {
                    module: IMPORT_MODULE,
                    field: PRINT_I32,
                    type_index: PRINT_I32_TYPE,
                },
            ],
            functions: vec![RUN_TYPE],
            memory: self.uses_memory.then_some(1),
            exports,
            code: vec![FunctionBody {
                locals,
                instructions: self.code,
            }],
        }
    }
}

/// Statements.
impl Generator<'_> {
    fn g_stmts(&mut self, body: &[Stmt]) -> Result<()> {
        for stmt in body {
            self.g_stmt(stmt)?;
        }
        Ok(())
    }

    fn g_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::Print(expr) => {
                let func = match self.g_expr(expr)? {
                    Type::Int => well_known::PRINT_I32_FUNC,
                    Type::Float => well_known::PRINT_F32_FUNC,
                };
                self.emit(Instruction::Call(func));
            }
            StmtKind::Let { name, initializer } => {
                // The initializer is generated before the declaration so that
                // it still sees a shadowed binding of the same name.
                let ty = self.g_expr(initializer)?;
                let local = self.scopes.declare(name.name, ty);
                self.emit(Instruction::LocalSet(local.slot));
            }
            StmtKind::Assignment { target, value } => {
                let local = self.lookup(target)?;
                self.g_expr_as(value, local.ty)?;
                self.emit(Instruction::LocalSet(local.slot));
            }
            StmtKind::Block { body } => self.scoped(|this| this.g_stmts(body))?,
            StmtKind::If {
                condition,
                then_body,
                else_body,
            } => self.g_if(condition, then_body, else_body.as_deref())?,
            StmtKind::While { condition, body } => self.g_while(condition, body)?,
            StmtKind::Break => {
                let depth = self
                    .depth(Control::WhileExit)
                    .ok_or_else(|| stmt.span.wrap(Error::BreakOutsideLoop))?;
                self.emit(Instruction::Br(depth));
            }
            StmtKind::Continue => {
                let depth = self
                    .depth(Control::WhileLoop)
                    .ok_or_else(|| stmt.span.wrap(Error::ContinueOutsideLoop))?;
                self.emit(Instruction::Br(depth));
            }
            StmtKind::SetPixel { x, y, value } => {
                self.uses_memory = true;
                // address = y * width + x
                self.g_expr_as(x, Type::Int)?;
                self.g_expr_as(y, Type::Int)?;
                self.emit(Instruction::I32Const(i32::from(self.options.pixel_width)));
                self.emit(Instruction::I32Mul);
                self.emit(Instruction::I32Add);
                self.g_expr_as(value, Type::Int)?;
                self.emit(Instruction::I32Store8 { offset: 0 });
            }
        }
        Ok(())
    }

    // block                  ;; IfJoin
    //   block                ;; IfElse
    //     <condition>
    //     i32.eqz
    //     br_if IfElse
    //     <then>
    //     br IfJoin
    //   end
    //   <else>
    // end
    fn g_if(
        &mut self,
        condition: &Expr,
        then_body: &[Stmt],
        else_body: Option<&[Stmt]>,
    ) -> Result<()> {
        self.open(Control::IfJoin);
        self.open(Control::IfElse);
        self.g_condition(condition)?;
        self.emit(Instruction::I32Eqz);
        self.emit_branch(Control::IfElse, Instruction::BrIf);
        self.scoped(|this| this.g_stmts(then_body))?;
        self.emit_branch(Control::IfJoin, Instruction::Br);
        self.close(Control::IfElse);
        if let Some(else_body) = else_body {
            self.scoped(|this| this.g_stmts(else_body))?;
        }
        self.close(Control::IfJoin);
        Ok(())
    }

    // block                  ;; WhileExit
    //   loop                 ;; WhileLoop
    //     <condition>
    //     i32.eqz
    //     br_if WhileExit
    //     <body>
    //     br WhileLoop
    //   end
    // end
    fn g_while(&mut self, condition: &Expr, body: &[Stmt]) -> Result<()> {
        if body.is_empty() {
            self.open(Control::Once);
            self.g_condition(condition)?;
            self.emit(Instruction::Drop);
            self.close(Control::Once);
            return Ok(());
        }

        self.open(Control::WhileExit);
        self.open(Control::WhileLoop);
        self.g_condition(condition)?;
        self.emit(Instruction::I32Eqz);
        self.emit_branch(Control::WhileExit, Instruction::BrIf);
        self.scoped(|this| this.g_stmts(body))?;
        self.emit_branch(Control::WhileLoop, Instruction::Br);
        self.close(Control::WhileLoop);
        self.close(Control::WhileExit);
        Ok(())
    }

    fn g_condition(&mut self, condition: &Expr) -> Result<()> {
        match self.g_expr(condition)? {
            Type::Int => Ok(()),
            Type::Float => Err(condition.span.wrap(Error::NonBooleanCondition)),
        }
    }
}

/// Expressions.
impl Generator<'_> {
    /// Generates the expression, returning the type of the value it leaves on
    /// the stack.
    fn g_expr(&mut self, expr: &Expr) -> Result<Type> {
        match &expr.kind {
            ExprKind::Number(number) => {
                self.emit(match *number {
                    Number::Int(int) => Instruction::I32Const(int),
                    Number::Float(float) => Instruction::F32Const(float),
                });
                Ok(Type::of_number(*number))
            }
            ExprKind::Id(ident) => {
                let local = self.lookup(ident)?;
                self.emit(Instruction::LocalGet(local.slot));
                Ok(local.ty)
            }
            ExprKind::Binary { op, lhs, rhs } => self.g_binary(*op, lhs, rhs),
        }
    }

    /// Generates the expression, converting its value to `ty`.
    fn g_expr_as(&mut self, expr: &Expr, ty: Type) -> Result<()> {
        let actual = self.g_expr(expr)?;
        self.coerce(actual, ty);
        Ok(())
    }

    fn g_binary(&mut self, op: BinaryOperator, lhs: &Expr, rhs: &Expr) -> Result<Type> {
        let signature = op.signature();
        let instr = match op {
            BinaryOperator::And => {
                // Each operand is normalized to 0 or 1 by the double negation:
                // a && b == !(!a || !b)
                self.g_logical_operand(op, lhs)?;
                self.g_logical_operand(op, rhs)?;
                self.emit(Instruction::I32Or);
                self.emit(Instruction::I32Eqz);
                return Ok(signature.result);
            }
            BinaryOperator::Add => Instruction::F32Add,
            BinaryOperator::Sub => Instruction::F32Sub,
            BinaryOperator::Mul => Instruction::F32Mul,
            BinaryOperator::Div => Instruction::F32Div,
            BinaryOperator::Eq => Instruction::F32Eq,
            BinaryOperator::Lt => Instruction::F32Lt,
            BinaryOperator::Gt => Instruction::F32Gt,
        };
        self.g_expr_as(lhs, signature.operands)?;
        self.g_expr_as(rhs, signature.operands)?;
        self.emit(instr);
        Ok(signature.result)
    }

    /// Generates an operand of a logical operator, leaving its negation.
    fn g_logical_operand(&mut self, op: BinaryOperator, operand: &Expr) -> Result<()> {
        match self.g_expr(operand)? {
            Type::Int => {
                self.emit(Instruction::I32Eqz);
                Ok(())
            }
            Type::Float => Err(operand.span.wrap(Error::LogicalOperandNotBoolean { op })),
        }
    }

    fn coerce(&mut self, from: Type, to: Type) {
        match (from, to) {
            (Type::Int, Type::Float) => self.emit(Instruction::F32ConvertI32S),
            (Type::Float, Type::Int) => self.emit(Instruction::I32TruncSatF32S),
            (Type::Int, Type::Int) | (Type::Float, Type::Float) => {}
        }
    }
}

/// Utility functions.
impl Generator<'_> {
    fn emit(&mut self, instr: Instruction) {
        self.code.push(instr);
    }

    fn lookup(&self, ident: &Ident) -> Result<Local> {
        self.scopes.lookup(ident.name).ok_or_else(|| {
            let name = self.ident_interner.get(ident).into();
            ident.span.wrap(Error::UndefinedName(name))
        })
    }

    /// Runs `f` in a new scope.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.scopes.push();
        let ret = f(self);
        self.scopes.pop();
        ret
    }

    fn open(&mut self, control: Control) {
        self.emit(match control {
            Control::WhileLoop => Instruction::Loop,
            Control::IfJoin | Control::IfElse | Control::WhileExit | Control::Once => {
                Instruction::Block
            }
        });
        self.controls.push(control);
    }

    fn close(&mut self, control: Control) {
        let top = self.controls.pop();
        debug_assert_eq!(top, Some(control));
        self.emit(Instruction::End);
    }

    /// Relative branch depth of the innermost open `target`.
    fn depth(&self, target: Control) -> Option<u32> {
        let depth = self.controls.iter().rev().position(|&c| c == target)?;
        Some(u32::try_from(depth).expect("nesting depth exceeds u32"))
    }

    /// Emits a branch to a construct the caller has opened.
    fn emit_branch(&mut self, target: Control, branch: fn(u32) -> Instruction) {
        let depth = self.depth(target).expect("branch target is open");
        self.emit(branch(depth));
    }
}
