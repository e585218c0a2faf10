use std::fmt::{self, Debug, Display, Formatter};

use super::{Context, ExecutionError};

/// Maximum symbol name size, terminator included
pub const NAME_CAPACITY: usize = 16;
/// Bytes held by a single string chunk
pub const CHUNK_CAPACITY: usize = 16;

pub type NativeFn = fn(&mut Context, ObjectRef) -> Result<ObjectRef, ExecutionError>;

/// A non-owning handle to a slot in the arena. Every object is owned by the
/// arena of the context that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectRef(pub(super) u32);

impl ObjectRef {
    pub(super) const NIL: ObjectRef = ObjectRef(0);

    pub(super) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The payload of one arena slot
#[derive(Clone, Copy)]
pub(super) enum Object {
    /// Unused slot, linked into the free list
    Free { next: Option<ObjectRef> },
    Nil,
    Number(f64),
    Pair { head: ObjectRef, tail: ObjectRef },
    /// `next` links the symbol table
    Symbol {
        name: [u8; NAME_CAPACITY],
        value: ObjectRef,
        next: Option<ObjectRef>,
    },
    /// One chunk of a string; the last chunk has `next == None`
    String {
        data: [u8; CHUNK_CAPACITY],
        next: Option<ObjectRef>,
    },
    Native(NativeFn),
}

impl Object {
    pub(super) fn kind(&self) -> Kind {
        match *self {
            Object::Free { .. } => Kind::Free,
            Object::Nil => Kind::Nil,
            Object::Number(_) => Kind::Number,
            Object::Pair { .. } => Kind::Pair,
            Object::Symbol { .. } => Kind::Symbol,
            Object::String { .. } => Kind::String,
            Object::Native(_) => Kind::Native,
        }
    }
}

impl Debug for Object {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Object::Free { next } => write!(f, "Free({:?})", next),
            Object::Nil => f.write_str("Nil"),
            Object::Number(n) => write!(f, "Number({})", n),
            Object::Pair { head, tail } => write!(f, "Pair({:?}, {:?})", head, tail),
            Object::Symbol { ref name, value, .. } => {
                write!(f, "Symbol({:?} = {:?})", String::from_utf8_lossy(name_bytes(name)), value)
            }
            Object::String { next, .. } => write!(f, "String(.., {:?})", next),
            Object::Native(_) => f.write_str("Native"),
        }
    }
}

pub(super) fn name_bytes(name: &[u8; NAME_CAPACITY]) -> &[u8] {
    let len = name.iter().position(|&b| b == 0).unwrap_or(NAME_CAPACITY);
    &name[..len]
}

/// The variant of an object. `Free` is only ever observed through a handle
/// whose slot has been reclaimed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Free,
    Nil,
    Number,
    Pair,
    Symbol,
    String,
    Native,
}

macro_rules! simple_kind {
    ($name:ident, $var:pat) => (
        pub fn $name(&self) -> bool {
            match *self {
                $var => true,
                _ => false
            }
        }
    );
}

impl Kind {
    simple_kind!(is_nil, Kind::Nil);
    simple_kind!(is_number, Kind::Number);
    simple_kind!(is_pair, Kind::Pair);
    simple_kind!(is_symbol, Kind::Symbol);
    simple_kind!(is_string, Kind::String);
    simple_kind!(is_callable, Kind::Native);
}

/// Renders an object the way `print` shows it
pub struct Printer<'a> {
    pub(super) context: &'a Context,
    pub(super) object: ObjectRef,
}

impl<'a> Printer<'a> {
    fn nested(&self, object: ObjectRef) -> Printer<'a> {
        Printer {
            context: self.context,
            object,
        }
    }
}

impl<'a> Display for Printer<'a> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self.context.arena.get(self.object) {
            Object::Free { .. } => f.write_str("<free>"),
            Object::Nil => f.write_str("<nil>"),
            Object::Native(_) => f.write_str("<native>"),
            Object::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", n as i64),
            Object::Number(n) => write!(f, "{}", n),
            Object::Symbol { ref name, .. } => {
                f.write_str(&String::from_utf8_lossy(name_bytes(name)))
            }
            Object::String { .. } => {
                for chunk in self.context.chunks(self.object) {
                    f.write_str(&String::from_utf8_lossy(chunk))?;
                }
                Ok(())
            }
            Object::Pair { head, tail } => {
                write!(f, "({} . {})", self.nested(head), self.nested(tail))
            }
        }
    }
}
