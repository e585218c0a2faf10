//! A small embeddable Lisp with a fixed-size, mark-and-sweep managed arena
//!
//! Programs and data share one representation: cells in the arena of a
//! `vm::Context`. The reader turns text into cells, `Context::evaluate` walks
//! them against the single global environment, and native functions receive
//! their arguments unevaluated.
#[macro_use]
extern crate log;

pub mod reader;
pub mod vm;

#[cfg(test)]
mod interpreter;
