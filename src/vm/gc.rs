//! Mark-and-sweep over the arena
//!
//! Roots are the protection stack, every interned symbol and the value bound
//! to it. Collection only runs when an allocation finds the free list empty.
use std::fmt;

use super::arena::Arena;
use super::value::{Object, ObjectRef};
use super::Context;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GcStats {
    /// Completed collection cycles
    pub collections: usize,
    /// Slots reclaimed by the last cycle
    pub last_reclaimed: usize,
    /// Slots reclaimed over the lifetime of the context
    pub total_reclaimed: usize,
    /// Slots that survived the last cycle
    pub last_live: usize,
}

impl fmt::Display for GcStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "collections: {:6}\nreclaimed (last): {:6}\nreclaimed (total): {:6}\nlive (last): {:6}",
            self.collections, self.last_reclaimed, self.total_reclaimed, self.last_live
        )
    }
}

/// Marks everything reachable from `root`. Heads recurse and tails loop, so
/// long lists and string chains don't grow the call stack. An already marked
/// object stops the walk, which is what makes cyclic data safe.
pub(super) fn mark(arena: &mut Arena, root: ObjectRef) {
    let mut next = Some(root);

    while let Some(current) = next.take() {
        if current == ObjectRef::NIL {
            return;
        }

        let slot = arena.slot_mut(current);
        if slot.marked {
            return;
        }
        slot.marked = true;

        let (head, tail) = match slot.object {
            Object::Pair { head, tail } => (Some(head), Some(tail)),
            Object::String { next, .. } => (None, next),
            _ => (None, None),
        };

        if let Some(head) = head {
            mark(arena, head);
        }
        next = tail;
    }
}

/// Rebuilds the free list out of every unmarked slot and clears the mark bit
/// of the survivors. Returns `(reclaimed, live)`.
pub(super) fn sweep(arena: &mut Arena) -> (usize, usize) {
    let mut reclaimed = 0;
    let mut live = 0;

    arena.reset_free();
    for index in (1..arena.len()).rev() {
        let object = ObjectRef(index as u32);
        let slot = arena.slot_mut(object);

        if slot.marked {
            slot.marked = false;
            live += 1;
            continue;
        }

        if !matches!(slot.object, Object::Free { .. }) {
            reclaimed += 1;
        }
        arena.push_free(object);
    }

    (reclaimed, live)
}

impl Context {
    /// Runs one full collection cycle and returns the number of reclaimed slots
    pub fn collect(&mut self) -> usize {
        trace!("gc roots: {:?}", self.stack);
        for &root in self.stack.iter() {
            mark(&mut self.arena, root);
        }

        let mut cursor = self.symbols;
        while let Some(symbol) = cursor {
            mark(&mut self.arena, symbol);
            let (value, next) = match *self.arena.get(symbol) {
                Object::Symbol { value, next, .. } => (value, next),
                _ => (ObjectRef::NIL, None),
            };
            mark(&mut self.arena, value);
            cursor = next;
        }

        let (reclaimed, live) = sweep(&mut self.arena);

        self.stats.collections += 1;
        self.stats.last_reclaimed = reclaimed;
        self.stats.total_reclaimed += reclaimed;
        self.stats.last_live = live;

        debug!(
            "gc #{}: reclaimed {}, live {}, protected {}",
            self.stats.collections,
            reclaimed,
            live,
            self.stack.len()
        );

        reclaimed
    }

    pub fn stats(&self) -> GcStats {
        self.stats
    }
}

#[cfg(test)]
mod test {
    use super::super::{Config, Context, Kind};

    fn context(slots: usize) -> Context {
        Context::new(Config {
            slots,
            stack_capacity: 64,
        })
    }

    #[test]
    fn protected_object_survives() {
        let mut ctx = context(4);
        let number = ctx.number(42.0).unwrap();

        assert_eq!(ctx.collect(), 0);
        assert_eq!(ctx.kind(number), Kind::Number);
        assert_eq!(ctx.number_value(number), Ok(42.0));
    }

    #[test]
    fn released_object_is_reclaimed() {
        let mut ctx = context(4);
        let depth = ctx.mark();
        let number = ctx.number(1.0).unwrap();
        ctx.release(depth);

        assert_eq!(ctx.free_slots(), 3);
        assert_eq!(ctx.collect(), 1);
        assert_eq!(ctx.kind(number), Kind::Free);
        assert_eq!(ctx.free_slots(), 4);
    }

    #[test]
    fn reclaimed_slot_is_reused() {
        let mut ctx = context(1);
        let depth = ctx.mark();
        let first = ctx.number(1.0).unwrap();
        ctx.release(depth);

        // the arena is full, so this allocation has to collect `first`
        let second = ctx.number(2.0).unwrap();
        assert_eq!(first, second);
        assert_eq!(ctx.number_value(second), Ok(2.0));
        assert_eq!(ctx.stats().collections, 1);
    }

    #[test]
    fn bound_values_stay_rooted_after_release() {
        let mut ctx = context(8);
        let depth = ctx.mark();
        let value = ctx.number(5.0).unwrap();
        let symbol = ctx.symbol("x").unwrap();
        ctx.bind(symbol, value).unwrap();
        let temporary = ctx.number(6.0).unwrap();
        ctx.release(depth);

        ctx.collect();

        assert_eq!(ctx.kind(temporary), Kind::Free);
        assert_eq!(ctx.kind(symbol), Kind::Symbol);
        assert_eq!(ctx.lookup(symbol), Ok(value));
        assert_eq!(ctx.number_value(value), Ok(5.0));
    }

    #[test]
    fn nested_structure_is_marked() {
        let mut ctx = context(8);
        let depth = ctx.mark();
        let a = ctx.number(1.0).unwrap();
        let b = ctx.string(b"a string longer than one chunk").unwrap();
        let list = ctx.list(&[a, b]).unwrap();
        let symbol = ctx.symbol("l").unwrap();
        ctx.bind(symbol, list).unwrap();
        ctx.release(depth);

        ctx.collect();

        assert_eq!(ctx.kind(a), Kind::Number);
        assert_eq!(ctx.string_len(b), Ok(30));
        assert_eq!(ctx.head(list), Ok(a));
    }

    #[test]
    fn cycles_terminate() {
        let mut ctx = context(4);
        let depth = ctx.mark();
        let nil = ctx.nil();
        let cell = ctx.pair(nil, nil).unwrap();
        ctx.set_tail(cell, cell).unwrap();
        let other = ctx.pair(cell, cell).unwrap();
        ctx.set_tail(cell, other).unwrap();
        let symbol = ctx.symbol("cycle").unwrap();
        ctx.bind(symbol, cell).unwrap();
        ctx.release(depth);

        assert_eq!(ctx.collect(), 0);
        assert_eq!(ctx.tail(cell), Ok(other));
        assert_eq!(ctx.head(other), Ok(cell));
        assert_eq!(ctx.tail(other), Ok(cell));

        // once unbound the whole cycle goes away
        ctx.bind(symbol, nil).unwrap();
        assert_eq!(ctx.collect(), 2);
        assert_eq!(ctx.kind(cell), Kind::Free);
        assert_eq!(ctx.kind(other), Kind::Free);
    }

    #[test]
    fn exhaustion_with_live_objects() {
        use super::super::ExecutionError;

        let mut ctx = context(3);
        for i in 0..3 {
            ctx.number(i as f64).unwrap();
        }

        assert_eq!(ctx.number(3.0), Err(ExecutionError::OutOfMemory));
        assert_eq!(ctx.stats().collections, 1);
        assert_eq!(ctx.capacity(), 3);
    }
}
