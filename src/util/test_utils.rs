use wasmtime::{Caller, Engine, Linker, Module, Store};

use crate::{parser, util::fmt::tree, util::intern::Interner};

/// Each variant contains the input.
pub enum Test {
    ParserProgram(String),
}

pub enum Assertion {
    TreeOk(&'static str),
    ExpectedError(&'static str),
}

/// Runs the pipeline up to the tested stage, returning either the printed
/// tree or the formatted error.
#[track_caller]
pub fn run_pipeline(test: Test) -> Result<String, String> {
    let tokens_buf = &mut Vec::with_capacity(1024);
    let interner = &mut Interner::with_capacity(128);

    match test {
        Test::ParserProgram(input) => match parser::parse_program(&input, tokens_buf, interner) {
            Ok(prog) => Ok(tree::print_program_string(interner, &prog)),
            Err(error) => Err(format!("{error:#}")),
        },
    }
}

#[track_caller]
pub fn run_assertion(assertion: Assertion, actual: Result<String, String>) {
    match assertion {
        Assertion::TreeOk(expected_tree) => match actual {
            Ok(tree) => ::pretty_assertions::assert_eq!(tree.trim(), expected_tree.trim()),
            Err(error) => panic!("expected a tree, but got error: {error}"),
        },
        Assertion::ExpectedError(expected_error) => match actual {
            Ok(tree) => panic!("expected error, but got tree:\n{tree}"),
            Err(error) => ::pretty_assertions::assert_eq!(error, expected_error),
        },
    }
}

macro_rules! tree_tests {
    (
        use $test_kind:ident;

        $(
            fn $test_name:ident() {
                let $source_kind:ident = $source:expr;
                let $assertion:ident = $assertion_expected:expr;
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($test_kind, $source_kind), $source);
                let actual = crate::util::test_utils::run_pipeline(test);
                crate::util::test_utils::run_assertion(
                    tree_tests!(@@assertion, $assertion, $assertion_expected),
                    actual,
                );
            }
        )*
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, expected_error, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedError($expected)
    };

    (@@get_test(parser, program), $source:expr) => {
        crate::util::test_utils::Test::ParserProgram(::std::string::String::from($source))
    };
}
pub(crate) use tree_tests;

/// What a module did when its `run` export was called once.
#[derive(Debug)]
pub struct Run {
    /// Every printed value, in order. Both imports are recorded as `f64` so
    /// integer and float output compare uniformly.
    pub prints: Vec<f64>,
    /// Contents of the exported memory, if any.
    pub memory: Option<Vec<u8>>,
}

/// Validates the module, instantiates it with recording `env.print_*`
/// imports and calls `run`.
#[track_caller]
pub fn run_module(bytes: &[u8]) -> Run {
    wasmparser::validate(bytes).expect("invalid module");

    let engine = Engine::default();
    let module = Module::from_binary(&engine, bytes).expect("failed to load module");

    let mut linker = Linker::<Vec<f64>>::new(&engine);
    linker
        .func_wrap(
            "env",
            "print_f32",
            |mut caller: Caller<'_, Vec<f64>>, value: f32| {
                caller.data_mut().push(f64::from(value));
            },
        )
        .unwrap();
    linker
        .func_wrap(
            "env",
            "print_i32",
            |mut caller: Caller<'_, Vec<f64>>, value: i32| {
                caller.data_mut().push(f64::from(value));
            },
        )
        .unwrap();

    let mut store = Store::new(&engine, Vec::new());
    let instance = linker
        .instantiate(&mut store, &module)
        .expect("failed to instantiate");
    let run = instance
        .get_typed_func::<(), ()>(&mut store, "run")
        .expect("`run` export");
    run.call(&mut store, ()).expect("`run` trapped");

    let memory = instance
        .get_memory(&mut store, "memory")
        .map(|memory| memory.data(&store).to_vec());
    Run {
        prints: store.into_data(),
        memory,
    }
}
