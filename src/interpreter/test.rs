use crate::reader::{read, ReaderError, Source};
use crate::vm::{default_context, Config, Context, ExecutionError, Kind, ObjectRef};
use super::{interpret, InterpreterError};

use self::ExecutionError::*;

fn std_context() -> Context {
    default_context(Config {
        slots: 512,
        stack_capacity: 64,
    })
    .expect("catalog fits")
}

macro_rules! with_std {
    ($ctx:ident, $code:expr) => (interpret($code, &mut $ctx))
}

macro_rules! rt_err {
    ($err:expr) => (Err(InterpreterError::Exec($err)))
}

fn number(ctx: &Context, result: Result<ObjectRef, InterpreterError>) -> f64 {
    let value = result.expect("valid program");
    ctx.number_value(value).expect("a number")
}

fn global(ctx: &mut Context, name: &str) -> ObjectRef {
    let symbol = ctx.symbol(name).unwrap();
    ctx.lookup(symbol).unwrap()
}

#[test]
fn addition() {
    let mut ctx = std_context();
    let result = with_std![ctx, "(+ 1 2)"];
    assert_eq![number(&ctx, result), 3.0];
}

#[test]
fn assignment_and_sequence() {
    let mut ctx = std_context();
    let result = with_std![ctx, "(do (= x 5) (+ x 1))"];
    assert_eq![number(&ctx, result), 6.0];

    let x = global(&mut ctx, "x");
    assert_eq![ctx.number_value(x), Ok(5.0)];
}

#[test]
fn last_top_level_form_wins() {
    let mut ctx = std_context();
    let result = with_std![ctx, "(= a 1)\n(= b 2)\n(+ a b 10)"];
    assert_eq![number(&ctx, result), 13.0];
}

#[test]
fn empty_program() {
    let mut ctx = std_context();
    assert_eq![with_std![ctx, "  \n "], Err(InterpreterError::EOF)];
}

#[test]
fn exhausted_source_reads_nil() {
    let mut ctx = std_context();
    let mut source = Source::from_str("(+ 1 2)");
    let program = read(&mut ctx, &mut source).unwrap();
    assert_eq![ctx.kind(program), Kind::Pair];
    let again = read(&mut ctx, &mut source).unwrap();
    assert![ctx.is_nil(again)];
}

#[test]
fn conditionals() {
    let mut ctx = std_context();
    let result = with_std![ctx, "(if (< 1 2) 10 20)"];
    assert_eq![number(&ctx, result), 10.0];
    let result = with_std![ctx, "(if (< 2 1) 10 20)"];
    assert_eq![number(&ctx, result), 20.0];
    let result = with_std![ctx, "(if (< 2 1) 10)"].unwrap();
    assert![ctx.is_nil(result)];
}

#[test]
fn while_loop() {
    let mut ctx = std_context();
    let code = "
        (= i 0)
        (= sum 0)
        (while (< i 10)
            (= sum (+ sum i))
            (= i (+ i 1)))
        sum";
    let result = with_std![ctx, code];
    assert_eq![number(&ctx, result), 45.0];
}

#[test]
fn collection_during_a_long_loop() {
    let mut ctx = default_context(Config {
        slots: 96,
        stack_capacity: 64,
    })
    .unwrap();
    let code = "
        (= i 0)
        (= s \"a string spanning several chunks of the arena\")
        (while (< i 1000) (= i (+ i 1)))
        i";
    let result = with_std![ctx, code];
    assert_eq![number(&ctx, result), 1000.0];
    assert![ctx.stats().collections > 0];

    let s = global(&mut ctx, "s");
    assert_eq![ctx.string_len(s), Ok(45)];
    assert_eq![format!("{}", ctx.display(s)), "a string spanning several chunks of the arena"];
}

#[test]
fn evaluation_leaves_one_value_protected() {
    let mut ctx = std_context();
    let depth = ctx.mark();
    with_std![ctx, "(= i 0) (while (< i 50) (= i (+ i 1)))"].unwrap();
    assert_eq![ctx.mark(), depth + 1];
}

#[test]
fn non_callable() {
    let mut ctx = std_context();
    assert_eq![with_std![ctx, "(1 2)"], rt_err![NonCallable]];
    assert_eq![with_std![ctx, "()"], rt_err![NonCallable]];
    assert_eq![with_std![ctx, "(undefined 1)"], rt_err![NonCallable]];
}

#[test]
fn binding_target() {
    let mut ctx = std_context();
    assert_eq![with_std![ctx, "(= 1 2)"], rt_err![BindNonSymbol]];
}

#[test]
fn name_capacity() {
    let mut ctx = std_context();
    assert_eq![
        with_std![ctx, "(= a-very-long-symbol-name 1)"],
        Err(InterpreterError::Reader(ReaderError::Exec(NameTooLong)))
    ];
}

#[test]
fn type_errors() {
    let mut ctx = std_context();
    assert_eq![with_std![ctx, "(+ 1 \"two\")"], rt_err![ExpectedNumber]];
}

#[test]
fn errors_release_the_stack() {
    let mut ctx = std_context();
    let depth = ctx.mark();
    assert![with_std![ctx, "(do (= x 1) (+ x (1)))"].is_err()];
    assert_eq![ctx.mark(), depth];
}

#[test]
fn arena_exhaustion() {
    let mut ctx = default_context(Config {
        slots: 40,
        stack_capacity: 256,
    })
    .unwrap();
    let mut error = None;
    for i in 0..40 {
        if let Err(e) = ctx.number(i as f64) {
            error = Some(e);
            break;
        }
    }
    assert_eq![error, Some(OutOfMemory)];
    assert_eq![ctx.capacity(), 40];
}

#[test]
fn printing() {
    let mut ctx = std_context();
    let result = with_std![ctx, "(print 1 \"two\" (+ 1 2) print)"].unwrap();
    assert![ctx.is_nil(result)];
}
