//! Turn source text into objects
//!
//! A single `read` drains every remaining top-level form of the source and
//! returns them wrapped in one call to the sequencing callable, so evaluating
//! the result runs the whole program in order. Reading an exhausted source
//! gives `Nil`.
use std::error::Error;
use std::fmt;

use crate::vm::{self, Context, ExecutionError, ObjectRef};

mod source;

pub use self::source::Source;
use self::source::is_delimiter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderError {
    /// The input ended inside a list or a string
    UnexpectedEOF,
    /// A `)` with no list to close
    UnexpectedClose,
    Exec(ExecutionError),
}

impl From<ExecutionError> for ReaderError {
    fn from(e: ExecutionError) -> ReaderError {
        ReaderError::Exec(e)
    }
}

impl fmt::Display for ReaderError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ReaderError::UnexpectedEOF => fmt.write_str("unexpected end of input"),
            ReaderError::UnexpectedClose => fmt.write_str("unexpected ')'"),
            ReaderError::Exec(ref e) => e.fmt(fmt),
        }
    }
}

impl Error for ReaderError {}

/// Reads the rest of `source` as one program. The result is protected.
pub fn read(ctx: &mut Context, source: &mut Source) -> Result<ObjectRef, ReaderError> {
    source.skip_whitespace();
    if source.is_exhausted() {
        return Ok(ctx.nil());
    }
    trace!("reading from offset {}", source.position());

    let mut scope = ctx.scope();
    let forms = read_elements(&mut scope, source, None, 0)?;
    let sequence = scope.native(vm::sequence)?;
    let program = scope.pair(sequence, forms)?;
    Ok(scope.keep(program)?)
}

/// `depth` counts the lists still open around the form. It may not exceed
/// the capacity of the protection stack, so nesting fails with
/// `StackOverflow` before the native stack does.
fn read_form(ctx: &mut Context, source: &mut Source, depth: usize) -> Result<ObjectRef, ReaderError> {
    source.skip_whitespace();

    match source.peek() {
        None => Err(ReaderError::UnexpectedEOF),
        Some(b'"') => {
            source.advance(1);
            let content = source.take_while(|c| c != b'"');
            if source.is_exhausted() {
                return Err(ReaderError::UnexpectedEOF);
            }
            source.advance(1);
            Ok(ctx.string(content)?)
        }
        Some(c) if c.is_ascii_digit() => {
            let digits = source.take_while(|c| c.is_ascii_digit());
            let value = digits
                .iter()
                .fold(0.0, |acc, &d| acc * 10.0 + f64::from(d - b'0'));
            Ok(ctx.number(value)?)
        }
        Some(b'(') => {
            if depth >= ctx.stack_capacity() {
                return Err(ExecutionError::StackOverflow.into());
            }
            source.advance(1);
            read_elements(ctx, source, Some(b')'), depth + 1)
        }
        Some(b')') => Err(ReaderError::UnexpectedClose),
        Some(_) => {
            let name = source.take_while(|c| !is_delimiter(c));
            Ok(ctx.intern(name)?)
        }
    }
}

/// Reads forms into a list until `close` is consumed, or until the input
/// runs out when `close` is `None`. An empty list comes back as a pair
/// holding `Nil`, never as `Nil` itself.
fn read_elements(
    ctx: &mut Context,
    source: &mut Source,
    close: Option<u8>,
    depth: usize,
) -> Result<ObjectRef, ReaderError> {
    let nil = ctx.nil();

    source.skip_whitespace();
    let root = if close.is_some() && source.peek() == close {
        ctx.pair(nil, nil)?
    } else {
        let first = read_form(ctx, source, depth)?;
        ctx.pair(first, nil)?
    };

    let mut last = root;
    loop {
        source.skip_whitespace();
        match source.peek() {
            None if close.is_none() => return Ok(root),
            None => return Err(ReaderError::UnexpectedEOF),
            Some(c) if Some(c) == close => {
                source.advance(1);
                return Ok(root);
            }
            Some(_) => {}
        }

        // everything read for this element is reachable from `root` once
        // linked, so the scope can drop it
        let mut scope = ctx.scope();
        let element = read_form(&mut scope, source, depth)?;
        let cell = scope.pair(element, nil)?;
        scope.set_tail(last, cell)?;
        last = cell;
    }
}
