use crate::reader::{read, ReaderError, Source};
use crate::vm::{Context, ExecutionError, ObjectRef};

#[derive(Debug, PartialEq)]
pub enum InterpreterError {
    Exec(ExecutionError),
    Reader(ReaderError),
    EOF,
}

/// Reads and evaluates `code` until the source is drained. The last value
/// stays protected.
pub fn interpret(code: &str, ctx: &mut Context) -> Result<ObjectRef, InterpreterError> {
    let mut source = Source::from_str(code);
    let mut value = None;

    loop {
        let mut scope = ctx.scope();
        let program = read(&mut scope, &mut source).map_err(InterpreterError::Reader)?;
        if scope.is_nil(program) {
            break;
        }

        let result = scope.evaluate(program).map_err(InterpreterError::Exec)?;
        value = Some(scope.keep(result).map_err(InterpreterError::Exec)?);
    }

    value.ok_or(InterpreterError::EOF)
}

#[cfg(test)]
mod test;
