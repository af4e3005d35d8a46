use std::io::Write;

use crate::{ast::*, util::intern::Interner};

const INDENT_WIDTH: usize = 2;

pub fn print_program_string(idents: &Interner, program: &Program) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_program(&mut buf, idents, program).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_program(
    w: &mut impl Write,
    idents: &Interner,
    program: &Program,
) -> std::io::Result<()> {
    print_body(w, idents, 0, &program.body)
}

fn print_body(
    w: &mut impl Write,
    idents: &Interner,
    i: usize,
    body: &[Stmt],
) -> std::io::Result<()> {
    for stmt in body {
        print_stmt(w, idents, i, stmt)?;
    }
    Ok(())
}

pub fn print_stmt(
    w: &mut impl Write,
    idents: &Interner,
    i: usize,
    stmt: &Stmt,
) -> std::io::Result<()> {
    sp(w, i)?;
    let span = stmt.span;
    match &stmt.kind {
        StmtKind::Print(expr) => {
            writeln!(w, "print ({span})")?;
            print_expr(w, idents, i + 1, expr)?;
        }
        StmtKind::Let { name, initializer } => {
            writeln!(w, "let {} ({span})", idents.get(name))?;
            print_expr(w, idents, i + 1, initializer)?;
        }
        StmtKind::Assignment { target, value } => {
            writeln!(w, "assignment {} ({span})", idents.get(target))?;
            print_expr(w, idents, i + 1, value)?;
        }
        StmtKind::Block { body } => {
            writeln!(w, "block ({span})")?;
            print_body(w, idents, i + 1, body)?;
        }
        StmtKind::If {
            condition,
            then_body,
            else_body,
        } => {
            writeln!(w, "if ({span})")?;
            print_expr(w, idents, i + 1, condition)?;
            sp(w, i + 1)?;
            writeln!(w, "then")?;
            print_body(w, idents, i + 2, then_body)?;
            if let Some(else_body) = else_body {
                sp(w, i + 1)?;
                writeln!(w, "else")?;
                print_body(w, idents, i + 2, else_body)?;
            }
        }
        StmtKind::While { condition, body } => {
            writeln!(w, "while ({span})")?;
            print_expr(w, idents, i + 1, condition)?;
            sp(w, i + 1)?;
            writeln!(w, "body")?;
            print_body(w, idents, i + 2, body)?;
        }
        StmtKind::Break => writeln!(w, "break ({span})")?,
        StmtKind::Continue => writeln!(w, "continue ({span})")?,
        StmtKind::SetPixel { x, y, value } => {
            writeln!(w, "setpixel ({span})")?;
            print_expr(w, idents, i + 1, x)?;
            print_expr(w, idents, i + 1, y)?;
            print_expr(w, idents, i + 1, value)?;
        }
    }
    Ok(())
}

pub fn print_expr(
    w: &mut impl Write,
    idents: &Interner,
    i: usize,
    expr: &Expr,
) -> std::io::Result<()> {
    sp(w, i)?;
    let span = expr.span;
    match &expr.kind {
        ExprKind::Number(Number::Int(val)) => writeln!(w, "int {val} ({span})")?,
        ExprKind::Number(Number::Float(val)) => writeln!(w, "float {val} ({span})")?,
        ExprKind::Id(ident) => writeln!(w, "ident {} ({span})", idents.get(ident))?,
        ExprKind::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op:?} ({span})")?;
            print_expr(w, idents, i + 1, lhs)?;
            print_expr(w, idents, i + 1, rhs)?;
        }
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}
