use std::error::Error;
use std::fmt;
use std::mem;

use self::arena::{Arena, Slot};
use self::stack::ProtectionStack;
use self::value::Object;

pub use self::environment::Symbols;
pub use self::gc::GcStats;
pub use self::stack::Scope;
pub use self::stdlib::default_context;
pub use self::string::Chunks;
pub use self::value::{Kind, NativeFn, ObjectRef, Printer, CHUNK_CAPACITY, NAME_CAPACITY};

mod arena;
mod environment;
mod gc;
mod stack;
mod stdlib;
mod string;
mod value;

/// Memory budget used when none is given, in bytes
pub const DEFAULT_MEMORY: usize = 64 * 1024;
pub const DEFAULT_STACK_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionError {
    StackOverflow,
    OutOfMemory,
    NameTooLong,
    NonCallable,
    BindNonSymbol,
    ExpectedNumber,
    ExpectedString,
    ExpectedSymbol,
    ExpectedPair,
    Internal(&'static str),
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use self::ExecutionError::*;

        match *self {
            StackOverflow => fmt.write_str("protection stack overflow"),
            OutOfMemory => fmt.write_str("could not allocate more objects"),
            NameTooLong => fmt.write_str("symbol name is too long"),
            NonCallable => fmt.write_str("invoking a non callable object"),
            BindNonSymbol => fmt.write_str("binding target is not a symbol"),
            ExpectedNumber => fmt.write_str("expected a number"),
            ExpectedString => fmt.write_str("expected a string"),
            ExpectedSymbol => fmt.write_str("expected a symbol"),
            ExpectedPair => fmt.write_str("expected a pair"),
            Internal(message) => write!(fmt, "internal error: {}", message),
        }
    }
}

impl Error for ExecutionError {}

/// Sizing of a context. Both limits are fixed for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Allocatable object slots
    pub slots: usize,
    /// Maximum depth of the protection stack
    pub stack_capacity: usize,
}

impl Config {
    /// Fits as many slots as possible in a budget of `bytes`
    pub fn with_memory(bytes: usize) -> Config {
        Config {
            slots: bytes / mem::size_of::<Slot>(),
            stack_capacity: DEFAULT_STACK_CAPACITY,
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::with_memory(DEFAULT_MEMORY)
    }
}

/// One runtime instance: the arena, its protection stack and the global
/// environment. Nothing outlives it.
pub struct Context {
    arena: Arena,
    stack: ProtectionStack,
    /// Head of the symbol table
    symbols: Option<ObjectRef>,
    stats: GcStats,
}

impl Context {
    pub fn new(config: Config) -> Context {
        debug!(
            "opening context: {} slots, stack of {}",
            config.slots, config.stack_capacity
        );

        Context {
            arena: Arena::new(config.slots),
            stack: ProtectionStack::with_capacity(config.stack_capacity),
            symbols: None,
            stats: GcStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    pub fn free_slots(&self) -> usize {
        self.arena.free_count()
    }

    //
    // Protection stack
    //

    /// Current depth of the protection stack
    pub fn mark(&self) -> usize {
        self.stack.len()
    }

    /// Deepest the protection stack may grow
    pub fn stack_capacity(&self) -> usize {
        self.stack.capacity()
    }

    /// Unprotects everything pushed since `mark` returned `depth`
    pub fn release(&mut self, depth: usize) {
        self.stack.truncate(depth);
    }

    pub fn protect(&mut self, object: ObjectRef) -> Result<ObjectRef, ExecutionError> {
        self.stack.push(object)?;
        Ok(object)
    }

    pub fn scope(&mut self) -> Scope<'_> {
        Scope::new(self)
    }

    //
    // Allocation
    //

    fn allocate(&mut self, object: Object) -> Result<ObjectRef, ExecutionError> {
        let allocated = self.allocate_unprotected(object)?;
        self.protect(allocated)
    }

    /// The caller must link the result somewhere reachable before the next
    /// allocation
    fn allocate_unprotected(&mut self, object: Object) -> Result<ObjectRef, ExecutionError> {
        if self.arena.is_exhausted() {
            self.collect();
        }
        self.arena.take(object).ok_or(ExecutionError::OutOfMemory)
    }

    //
    // Constructors
    //

    pub fn nil(&self) -> ObjectRef {
        ObjectRef::NIL
    }

    pub fn number(&mut self, number: f64) -> Result<ObjectRef, ExecutionError> {
        self.allocate(Object::Number(number))
    }

    pub fn pair(&mut self, head: ObjectRef, tail: ObjectRef) -> Result<ObjectRef, ExecutionError> {
        self.allocate(Object::Pair { head, tail })
    }

    /// Builds a proper list out of `objects`; only the result stays protected
    pub fn list(&mut self, objects: &[ObjectRef]) -> Result<ObjectRef, ExecutionError> {
        let mut scope = self.scope();
        let mut list = ObjectRef::NIL;
        for &object in objects.iter().rev() {
            scope.rewind();
            scope.protect(list)?;
            list = scope.pair(object, list)?;
        }
        scope.keep(list)
    }

    pub fn native(&mut self, fun: NativeFn) -> Result<ObjectRef, ExecutionError> {
        self.allocate(Object::Native(fun))
    }

    //
    // Accessors
    //

    pub fn kind(&self, object: ObjectRef) -> Kind {
        self.arena.get(object).kind()
    }

    pub fn is_nil(&self, object: ObjectRef) -> bool {
        self.kind(object).is_nil()
    }

    pub fn number_value(&self, object: ObjectRef) -> Result<f64, ExecutionError> {
        match *self.arena.get(object) {
            Object::Number(n) => Ok(n),
            _ => Err(ExecutionError::ExpectedNumber),
        }
    }

    pub fn head(&self, pair: ObjectRef) -> Result<ObjectRef, ExecutionError> {
        match *self.arena.get(pair) {
            Object::Pair { head, .. } => Ok(head),
            _ => Err(ExecutionError::ExpectedPair),
        }
    }

    pub fn tail(&self, pair: ObjectRef) -> Result<ObjectRef, ExecutionError> {
        match *self.arena.get(pair) {
            Object::Pair { tail, .. } => Ok(tail),
            _ => Err(ExecutionError::ExpectedPair),
        }
    }

    pub(crate) fn set_tail(&mut self, pair: ObjectRef, value: ObjectRef) -> Result<(), ExecutionError> {
        match *self.arena.get_mut(pair) {
            Object::Pair { ref mut tail, .. } => {
                *tail = value;
                Ok(())
            }
            _ => Err(ExecutionError::ExpectedPair),
        }
    }

    pub fn display(&self, object: ObjectRef) -> Printer<'_> {
        Printer {
            context: self,
            object,
        }
    }

    //
    // Evaluation
    //

    pub fn evaluate(&mut self, object: ObjectRef) -> Result<ObjectRef, ExecutionError> {
        let current = *self.arena.get(object);
        match current {
            Object::Symbol { value, .. } => Ok(value),
            Object::Pair { head, tail } => {
                let callable = self.evaluate(head)?;
                let target = *self.arena.get(callable);
                match target {
                    Object::Native(fun) => {
                        trace!("calling {:?} with {:?}", callable, self.arena.get(tail));
                        fun(self, tail)
                    }
                    _ => Err(ExecutionError::NonCallable),
                }
            }
            Object::Free { .. } => Err(ExecutionError::Internal("evaluating a reclaimed object")),
            Object::Nil | Object::Number(_) | Object::String { .. } | Object::Native(_) => Ok(object),
        }
    }

    /// Pops the next raw argument off `cursor`. Once the list runs out the
    /// cursor itself (normally `Nil`) comes back unchanged.
    pub fn next_argument(&self, cursor: &mut ObjectRef) -> ObjectRef {
        match *self.arena.get(*cursor) {
            Object::Pair { head, tail } => {
                *cursor = tail;
                head
            }
            _ => *cursor,
        }
    }
}

/// Evaluates every argument in order and returns the last value, protected.
/// The reader wraps each program in a call to this.
pub fn sequence(ctx: &mut Context, mut args: ObjectRef) -> Result<ObjectRef, ExecutionError> {
    let mut scope = ctx.scope();
    let mut result = ObjectRef::NIL;

    loop {
        let arg = scope.next_argument(&mut args);
        if scope.is_nil(arg) {
            break;
        }
        scope.rewind();
        result = scope.evaluate(arg)?;
    }

    scope.keep(result)
}
