//! The symbol table, which is also the one global environment
use super::value::{name_bytes, Object, ObjectRef, NAME_CAPACITY};
use super::{Context, ExecutionError};

impl Context {
    /// Returns the unique symbol called `name`, creating it bound to `Nil`
    /// on first use. The result is protected either way.
    pub fn intern(&mut self, name: &[u8]) -> Result<ObjectRef, ExecutionError> {
        if name.len() >= NAME_CAPACITY {
            return Err(ExecutionError::NameTooLong);
        }

        if let Some(symbol) = self.find_symbol(name) {
            self.protect(symbol)?;
            return Ok(symbol);
        }

        let mut buffer = [0; NAME_CAPACITY];
        buffer[..name.len()].copy_from_slice(name);

        let symbol = self.allocate(Object::Symbol {
            name: buffer,
            value: ObjectRef::NIL,
            next: self.symbols,
        })?;
        self.symbols = Some(symbol);
        Ok(symbol)
    }

    pub fn symbol(&mut self, name: &str) -> Result<ObjectRef, ExecutionError> {
        self.intern(name.as_bytes())
    }

    fn find_symbol(&self, name: &[u8]) -> Option<ObjectRef> {
        self.symbols().find(|&symbol| match *self.arena.get(symbol) {
            Object::Symbol { name: ref stored, .. } => name_bytes(stored) == name,
            _ => false,
        })
    }

    /// Every interned symbol, most recent first
    pub fn symbols(&self) -> Symbols<'_> {
        Symbols {
            context: self,
            cursor: self.symbols,
        }
    }

    pub fn symbol_name(&self, symbol: ObjectRef) -> Result<&[u8], ExecutionError> {
        match *self.arena.get(symbol) {
            Object::Symbol { ref name, .. } => Ok(name_bytes(name)),
            _ => Err(ExecutionError::ExpectedSymbol),
        }
    }

    /// Overwrites the value slot of `symbol`
    pub fn bind(&mut self, symbol: ObjectRef, value: ObjectRef) -> Result<(), ExecutionError> {
        match *self.arena.get_mut(symbol) {
            Object::Symbol { value: ref mut slot, .. } => {
                *slot = value;
                Ok(())
            }
            _ => Err(ExecutionError::BindNonSymbol),
        }
    }

    pub fn lookup(&self, symbol: ObjectRef) -> Result<ObjectRef, ExecutionError> {
        match *self.arena.get(symbol) {
            Object::Symbol { value, .. } => Ok(value),
            _ => Err(ExecutionError::BindNonSymbol),
        }
    }
}

pub struct Symbols<'a> {
    context: &'a Context,
    cursor: Option<ObjectRef>,
}

impl<'a> Iterator for Symbols<'a> {
    type Item = ObjectRef;

    fn next(&mut self) -> Option<ObjectRef> {
        let current = self.cursor?;
        self.cursor = match *self.context.arena.get(current) {
            Object::Symbol { next, .. } => next,
            _ => None,
        };
        Some(current)
    }
}
