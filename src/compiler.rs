use crate::{
    codegen::{self, interface::Options},
    lexer, parser,
    token::Spanned,
    util::intern::Interner,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0:#}")]
    Lex(#[from] Spanned<lexer::Error>),
    #[error("{0:#}")]
    Parse(#[from] Spanned<parser::Error>),
    #[error("{0:#}")]
    Codegen(#[from] Spanned<codegen::interface::Error>),
}

/// Compiles the source into a WebAssembly module with the default options.
pub fn compile(src: &str) -> Result<Vec<u8>, Error> {
    compile_with(src, &Options::default())
}

pub fn compile_with(src: &str, options: &Options) -> Result<Vec<u8>, Error> {
    let tokens = lexer::lex_in_new(src)?;
    let mut ident_interner = Interner::with_capacity(32);
    let program = parser::parse_tokens(src, &tokens, &mut ident_interner)?;
    let bytes = codegen::interface::generate(&program, &ident_interner, options)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_utils::{run_module, Run};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[track_caller]
    fn run(src: &str) -> Run {
        run_module(&compile(src).unwrap())
    }

    #[track_caller]
    fn assert_prints(src: &str, expected: &[f64]) {
        assert_eq!(run(src).prints, expected);
    }

    #[test]
    fn test_print() {
        assert_prints("print 5", &[5.0]);
        assert_prints("print 1 print 2 print 3", &[1.0, 2.0, 3.0]);
        assert_prints("print 2.5", &[2.5]);
        assert_prints("", &[]);
    }

    #[test]
    fn test_arithmetic() {
        assert_prints("print (2+3)", &[5.0]);
        assert_prints("print (10-4)", &[6.0]);
        assert_prints("print (3*4)", &[12.0]);
        assert_prints("print (20/5)", &[4.0]);
        assert_prints("print (7/2)", &[3.5]);
        assert_prints("print (1.5+1)", &[2.5]);
        assert_prints("print ((2+3)*(4+1))", &[25.0]);
    }

    #[test]
    fn test_evaluation_order() {
        assert_prints("print ((1+2)*(3+4)) print (5+6)", &[21.0, 11.0]);
        assert_prints("print (10-(2-1))", &[9.0]);
    }

    #[test]
    fn test_comparisons() {
        assert_prints("print (4==4)", &[1.0]);
        assert_prints("print (4==5)", &[0.0]);
        assert_prints("print (3<5)", &[1.0]);
        assert_prints("print (7>10)", &[0.0]);
        assert_prints("print (2.5>2)", &[1.0]);
    }

    #[test]
    fn test_logical_and() {
        assert_prints("print (1&&0)", &[0.0]);
        assert_prints("print ((2>1)&&(3<4))", &[1.0]);
        // Any non-zero integer is true.
        assert_prints("print (5&&2)", &[1.0]);
    }

    #[test]
    fn test_logical_and_rejects_floats() {
        let error = compile("print (1.5&&0)").unwrap_err();
        assert!(matches!(error, Error::Codegen(_)), "{error:?}");
        assert_eq!(
            error.to_string(),
            "7..10: operands of `&&` must be boolean (integer) expressions"
        );
        assert!(compile("print (1&&(1+1))").is_err());
    }

    #[test]
    fn test_variables() {
        assert_prints("let x = 10 print x", &[10.0]);
        assert_prints("let x = 4 print (x+6)", &[10.0]);
        assert_prints("let a = 3 let b = 5 print (a*b)", &[15.0]);
        assert_prints("let x = 5 x = (x+2) print x", &[7.0]);
    }

    #[test]
    fn test_variables_keep_declared_type() {
        assert_prints("let x = 1 x = 2.7 print x", &[2.0]);
        assert_prints("let x = 1 x = (0 - 2.7) print x", &[-2.0]);
        assert_prints("let x = 0.5 x = 3 print x", &[3.0]);
        // Float to integer conversion saturates instead of trapping.
        assert_prints(
            "let x = 0 x = 3000000000.0 print x",
            &[f64::from(i32::MAX)],
        );
    }

    #[test]
    fn test_shadowing() {
        let src = indoc! {"
            let x = 2
            {
              let x = 10
              print x
            }
            print x
        "};
        assert_prints(src, &[10.0, 2.0]);
    }

    #[test]
    fn test_nested_scopes() {
        let src = indoc! {"
            let x = 1
            {
              let y = 2
              {
                let x = 3
                print (x+y)
              }
              print x
            }
            print x
        "};
        assert_prints(src, &[5.0, 1.0, 1.0]);
    }

    #[test]
    fn test_initializer_sees_shadowed_binding() {
        assert_prints("let x = 1 { let x = (x+1) print x } print x", &[2.0, 1.0]);
        // Redeclaring in the same scope binds a new local.
        assert_prints("let x = 1 let x = 2.5 print x", &[2.5]);
    }

    #[test]
    fn test_scope_ends_with_block() {
        let error = compile("{ let a = 1 } print a").unwrap_err();
        assert_eq!(error.to_string(), "20..21: undefined name `a`");
        let error = compile("if (1) let a = 1 end a = 2").unwrap_err();
        assert_eq!(error.to_string(), "21..22: undefined name `a`");
    }

    #[test]
    fn test_if() {
        assert_prints("if (1) print 10 end", &[10.0]);
        assert_prints("if (0) print 10 end", &[]);
        assert_prints("if (1) print 1 else print 2 end", &[1.0]);
        assert_prints("if (0) print 1 else print 2 end", &[2.0]);
        assert_prints("if (3 < 5) print 7 else print 9 end", &[7.0]);
        assert_prints(
            "let x = 4 if (x == 4) print (x+1) else print 0 end",
            &[5.0],
        );
        assert_prints("if (1) end if (0) else end print 3", &[3.0]);
    }

    #[test]
    fn test_if_scope_isolation() {
        let src = indoc! {"
            let x = 1
            if (1)
              let x = 10
              print x
            end
            print x
        "};
        assert_prints(src, &[10.0, 1.0]);
    }

    #[test]
    fn test_non_boolean_condition() {
        let error = compile("if (1.5) print 1 end").unwrap_err();
        assert!(matches!(error, Error::Codegen(_)), "{error:?}");
        assert!(compile("while ((1+1)) print 1 end").is_err());
        assert!(compile("while (0.0) end").is_err());
    }

    #[test]
    fn test_while() {
        let src = indoc! {"
            let x = 0
            while (x < 3)
              print x
              x = (x + 1)
            end
        "};
        assert_prints(src, &[0.0, 1.0, 2.0]);

        let src = indoc! {"
            let x = 10
            while (x < 5)
              print x
            end
            print 99
        "};
        assert_prints(src, &[99.0]);
    }

    #[test]
    fn test_empty_while() {
        assert_prints("while (0) end print 99", &[99.0]);
        // The body never runs, so a true condition doesn't loop forever.
        assert_prints("while (1) end print 1", &[1.0]);
    }

    #[test]
    fn test_nested_while() {
        let src = indoc! {"
            let i = 0
            while (i < 2)
              let j = 0
              while (j < 2)
                print (i + j)
                j = (j + 1)
              end
              i = (i + 1)
            end
        "};
        assert_prints(src, &[0.0, 1.0, 1.0, 2.0]);
    }

    #[test]
    fn test_break_and_continue_inside_if() {
        let src = indoc! {"
            let i = 0
            while (i < 3)
              let j = 0
              while (1)
                if (j == 2)
                  break
                end
                j = (j + 1)
                if (j == 1)
                  continue
                else
                  print ((i * 10) + j)
                end
              end
              i = (i + 1)
            end
        "};
        assert_prints(src, &[2.0, 12.0, 22.0]);
    }

    #[test]
    fn test_break_and_continue_outside_loop() {
        let error = compile("if (1) break end").unwrap_err();
        assert_eq!(error.to_string(), "7..12: `break` outside of a loop");
        let error = compile("{ continue }").unwrap_err();
        assert_eq!(error.to_string(), "2..10: `continue` outside of a loop");
    }

    #[test]
    fn test_setpixel() {
        let memory = run("setpixel 1 1 7").memory.unwrap();
        assert_eq!(memory.len(), 65_536);
        assert_eq!(memory[101], 7);
        assert_eq!(memory.iter().filter(|&&byte| byte != 0).count(), 1);

        // Coordinates are converted to integers and values keep the low byte.
        let memory = run("setpixel 2.9 0 300").memory.unwrap();
        assert_eq!(memory[2], 44);
    }

    #[test]
    fn test_setpixel_width_option() {
        let options = Options { pixel_width: 10 };
        let bytes = compile_with("setpixel 1 1 7", &options).unwrap();
        let memory = run_module(&bytes).memory.unwrap();
        assert_eq!(memory[11], 7);
        assert_eq!(memory[101], 0);
    }

    #[test]
    fn test_memory_is_only_exported_when_used() {
        assert_eq!(run("print 1").memory, None);
    }

    #[test]
    fn test_mandelbrot() {
        let src = include_str!("../demos/mandelbrot.astra");
        let Run { prints, memory } = run(src);
        assert!(prints.is_empty());
        let memory = memory.unwrap();
        // c = -2.5 - i escapes on the second iteration.
        assert_eq!(memory[0], 1);
        // c = -0.4 is inside the set.
        assert_eq!(memory[50 * 100 + 60], 255);
    }

    #[test]
    fn test_deterministic_output() {
        let src = include_str!("../demos/mandelbrot.astra");
        assert_eq!(compile(src).unwrap(), compile(src).unwrap());
    }

    #[test]
    fn test_nesting_up_to_the_limit() {
        let src = format!("print {}1{}", "(".repeat(256), " + 1)".repeat(256));
        assert_prints(&src, &[257.0]);
        let src = format!("{}print 1{}", "{ ".repeat(256), " }".repeat(256));
        assert_prints(&src, &[1.0]);
    }

    #[test]
    fn test_nesting_too_deep_is_an_error() {
        let src = format!("print {}1{}", "(".repeat(1000), " + 1)".repeat(1000));
        let error = compile(&src).unwrap_err();
        assert!(matches!(error, Error::Parse(_)), "{error:?}");
        assert_eq!(error.to_string(), "262..263: nesting exceeds 256 levels");

        let src = "while (1) ".repeat(1000);
        assert!(matches!(compile(&src), Err(Error::Parse(_))));
    }

    #[test]
    fn test_stage_errors() {
        let error = compile("print 1 @").unwrap_err();
        assert!(matches!(error, Error::Lex(_)), "{error:?}");
        assert_eq!(error.to_string(), "8..9: unexpected character '@'");

        let error = compile("print").unwrap_err();
        assert!(matches!(error, Error::Parse(_)), "{error:?}");
        assert_eq!(
            error.to_string(),
            "5..5: unexpected end of input, expected expression"
        );

        let error = compile("print x").unwrap_err();
        assert!(matches!(error, Error::Codegen(_)), "{error:?}");
        assert_eq!(error.to_string(), "6..7: undefined name `x`");
    }
}
