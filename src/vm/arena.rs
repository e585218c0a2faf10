use super::value::{Object, ObjectRef};

pub(super) struct Slot {
    pub marked: bool,
    pub object: Object,
}

/// Fixed pool of object slots. Slot 0 is the `Nil` singleton and never enters
/// the free list; the storage is sized once and never grows.
pub(super) struct Arena {
    slots: Vec<Slot>,
    free: Option<ObjectRef>,
    free_count: usize,
}

impl Arena {
    pub fn new(capacity: usize) -> Arena {
        let mut slots = Vec::with_capacity(capacity + 1);
        slots.push(Slot {
            marked: false,
            object: Object::Nil,
        });
        for _ in 0..capacity {
            slots.push(Slot {
                marked: false,
                object: Object::Free { next: None },
            });
        }

        let mut arena = Arena {
            slots,
            free: None,
            free_count: 0,
        };
        for index in (1..=capacity).rev() {
            arena.push_free(ObjectRef(index as u32));
        }
        arena
    }

    /// Number of allocatable slots, `Nil` excluded
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    /// Number of slots including `Nil`
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn free_count(&self) -> usize {
        self.free_count
    }

    pub fn is_exhausted(&self) -> bool {
        self.free.is_none()
    }

    /// Pops a slot off the free list and stamps it with `object`
    pub fn take(&mut self, object: Object) -> Option<ObjectRef> {
        let taken = self.free?;
        let slot = &mut self.slots[taken.index()];
        self.free = match slot.object {
            Object::Free { next } => next,
            _ => None,
        };
        slot.object = object;
        slot.marked = false;
        self.free_count -= 1;
        Some(taken)
    }

    pub fn push_free(&mut self, object: ObjectRef) {
        self.slots[object.index()].object = Object::Free { next: self.free };
        self.free = Some(object);
        self.free_count += 1;
    }

    /// Forgets the free list; sweep rebuilds it from scratch
    pub fn reset_free(&mut self) {
        self.free = None;
        self.free_count = 0;
    }

    pub fn get(&self, object: ObjectRef) -> &Object {
        &self.slots[object.index()].object
    }

    pub fn get_mut(&mut self, object: ObjectRef) -> &mut Object {
        &mut self.slots[object.index()].object
    }

    pub fn slot_mut(&mut self, object: ObjectRef) -> &mut Slot {
        &mut self.slots[object.index()]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn take_until_exhausted() {
        let mut arena = Arena::new(3);
        assert_eq!(arena.capacity(), 3);
        assert_eq!(arena.free_count(), 3);

        let taken: Vec<_> = (0..3)
            .map(|i| arena.take(Object::Number(i as f64)).expect("free slot"))
            .collect();

        assert_eq!(taken, vec![ObjectRef(1), ObjectRef(2), ObjectRef(3)]);
        assert!(arena.is_exhausted());
        assert!(arena.take(Object::Nil).is_none());
    }

    #[test]
    fn freed_slot_is_reused() {
        let mut arena = Arena::new(2);
        let first = arena.take(Object::Number(1.0)).unwrap();
        let _second = arena.take(Object::Number(2.0)).unwrap();

        arena.push_free(first);
        assert_eq!(arena.free_count(), 1);
        assert_eq!(arena.take(Object::Number(3.0)), Some(first));
    }
}
