use std::io::{self, Write};

use super::{sequence, Config, Context, ExecutionError, NativeFn, ObjectRef};

pub(super) static STDLIB: &[(&str, NativeFn)] = &[
    ("print", print),
    ("+", add),
    ("-", subtract),
    ("*", multiply),
    ("<", less_than),
    ("=", assign),
    ("do", sequence),
    ("if", if_),
    ("while", while_),
];

/// A fresh context with the whole catalog bound in the global environment
pub fn default_context(config: Config) -> Result<Context, ExecutionError> {
    let mut ctx = Context::new(config);

    {
        let mut scope = ctx.scope();
        for &(name, fun) in STDLIB.iter() {
            let symbol = scope.symbol(name)?;
            let native = scope.native(fun)?;
            scope.bind(symbol, native)?;
        }
    }

    Ok(ctx)
}

/// Evaluates `expression` down to a number without growing the stack
fn evaluate_number(ctx: &mut Context, expression: ObjectRef) -> Result<f64, ExecutionError> {
    let mut scope = ctx.scope();
    let value = scope.evaluate(expression)?;
    scope.number_value(value)
}

fn fold_numbers<F>(ctx: &mut Context, mut args: ObjectRef, init: f64, f: F) -> Result<f64, ExecutionError>
where
    F: Fn(f64, f64) -> f64,
{
    let mut acc = init;
    loop {
        let arg = ctx.next_argument(&mut args);
        if ctx.is_nil(arg) {
            return Ok(acc);
        }
        acc = f(acc, evaluate_number(ctx, arg)?);
    }
}

fn print(ctx: &mut Context, mut args: ObjectRef) -> Result<ObjectRef, ExecutionError> {
    let stdout = io::stdout();
    let mut scope = ctx.scope();

    loop {
        let arg = scope.next_argument(&mut args);
        if scope.is_nil(arg) {
            break;
        }
        scope.rewind();
        let value = scope.evaluate(arg)?;
        let _ = write!(stdout.lock(), "{} ", scope.display(value));
    }
    let _ = writeln!(stdout.lock());

    Ok(scope.nil())
}

fn add(ctx: &mut Context, args: ObjectRef) -> Result<ObjectRef, ExecutionError> {
    let sum = fold_numbers(ctx, args, 0.0, |a, b| a + b)?;
    ctx.number(sum)
}

fn multiply(ctx: &mut Context, args: ObjectRef) -> Result<ObjectRef, ExecutionError> {
    let product = fold_numbers(ctx, args, 1.0, |a, b| a * b)?;
    ctx.number(product)
}

fn subtract(ctx: &mut Context, mut args: ObjectRef) -> Result<ObjectRef, ExecutionError> {
    let first = ctx.next_argument(&mut args);
    if ctx.is_nil(first) {
        return ctx.number(0.0);
    }
    let first = evaluate_number(ctx, first)?;

    let result = if ctx.is_nil(args) {
        -first
    } else {
        fold_numbers(ctx, args, first, |a, b| a - b)?
    };
    ctx.number(result)
}

fn less_than(ctx: &mut Context, mut args: ObjectRef) -> Result<ObjectRef, ExecutionError> {
    let left = ctx.next_argument(&mut args);
    let right = ctx.next_argument(&mut args);
    let left = evaluate_number(ctx, left)?;
    let right = evaluate_number(ctx, right)?;

    if left < right {
        ctx.number(1.0)
    } else {
        Ok(ctx.nil())
    }
}

fn assign(ctx: &mut Context, mut args: ObjectRef) -> Result<ObjectRef, ExecutionError> {
    let symbol = ctx.next_argument(&mut args);
    let expression = ctx.next_argument(&mut args);
    let value = ctx.evaluate(expression)?;
    ctx.bind(symbol, value)?;
    Ok(ctx.nil())
}

fn if_(ctx: &mut Context, mut args: ObjectRef) -> Result<ObjectRef, ExecutionError> {
    let condition = ctx.next_argument(&mut args);
    let consequent = ctx.next_argument(&mut args);
    let alternative = ctx.next_argument(&mut args);

    let taken = {
        let mut scope = ctx.scope();
        let test = scope.evaluate(condition)?;
        if scope.is_nil(test) {
            alternative
        } else {
            consequent
        }
    };
    ctx.evaluate(taken)
}

fn while_(ctx: &mut Context, mut args: ObjectRef) -> Result<ObjectRef, ExecutionError> {
    let condition = ctx.next_argument(&mut args);
    let body = args;
    let mut scope = ctx.scope();

    loop {
        scope.rewind();
        let test = scope.evaluate(condition)?;
        if scope.is_nil(test) {
            break;
        }

        let mut cursor = body;
        loop {
            let form = scope.next_argument(&mut cursor);
            if scope.is_nil(form) {
                break;
            }
            scope.evaluate(form)?;
        }
    }

    Ok(scope.nil())
}
