use std::fmt::{self, Debug};
use std::ops::{Deref, DerefMut};

use super::value::ObjectRef;
use super::{Context, ExecutionError};

/// Bounded stack of explicit GC roots
pub(super) struct ProtectionStack {
    entries: Vec<ObjectRef>,
    capacity: usize,
}

impl ProtectionStack {
    pub fn with_capacity(capacity: usize) -> ProtectionStack {
        ProtectionStack {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, it: ObjectRef) -> Result<(), ExecutionError> {
        if self.entries.len() >= self.capacity {
            return Err(ExecutionError::StackOverflow);
        }
        self.entries.push(it);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn truncate(&mut self, depth: usize) {
        self.entries.truncate(depth);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectRef> {
        self.entries.iter()
    }
}

/// Lists the entries top first
impl Debug for ProtectionStack {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_list().entries(self.entries.iter().rev()).finish()
    }
}

/// A `mark`/`release` bracket bound to a lexical scope. Everything protected
/// while the scope is alive is released when it drops, including on `?`
/// returns. Derefs to the context so the work happens through the scope.
pub struct Scope<'a> {
    context: &'a mut Context,
    depth: usize,
}

impl<'a> Scope<'a> {
    pub(super) fn new(context: &'a mut Context) -> Scope<'a> {
        let depth = context.mark();
        Scope { context, depth }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Releases everything protected since the scope was opened
    pub fn rewind(&mut self) {
        self.context.release(self.depth);
    }

    /// Closes the scope keeping only `value` protected
    pub fn keep(mut self, value: ObjectRef) -> Result<ObjectRef, ExecutionError> {
        self.rewind();
        self.context.protect(value)?;
        self.depth += 1;
        Ok(value)
    }
}

impl<'a> Deref for Scope<'a> {
    type Target = Context;

    fn deref(&self) -> &Context {
        self.context
    }
}

impl<'a> DerefMut for Scope<'a> {
    fn deref_mut(&mut self) -> &mut Context {
        self.context
    }
}

impl<'a> Drop for Scope<'a> {
    fn drop(&mut self) {
        self.context.release(self.depth);
    }
}
