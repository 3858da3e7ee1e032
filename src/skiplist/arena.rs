use std::ops::{Index, IndexMut};

use crate::error::Result;

/// Stable index of a node inside an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

enum Slot<T> {
    Occupied(T),
    Vacant { next_free: Option<NodeId> },
}

/// Owns every node of a skiplist. Freed slots are threaded onto a free list
/// and handed out again by later allocations, so ids stay small and dense.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Option<NodeId>,
    len: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn alloc(&mut self, value: T) -> Result<NodeId> {
        if let Some(id) = self.free {
            let slot = &mut self.slots[id.0];
            self.free = match slot {
                Slot::Vacant { next_free } => *next_free,
                Slot::Occupied(_) => panic!("free list points at occupied slot {}", id.0),
            };
            *slot = Slot::Occupied(value);
            self.len += 1;
            return Ok(id);
        }

        self.slots.try_reserve(1)?;
        let id = NodeId(self.slots.len());
        self.slots.push(Slot::Occupied(value));
        self.len += 1;
        Ok(id)
    }

    pub fn free(&mut self, id: NodeId) -> T {
        let slot = std::mem::replace(
            &mut self.slots[id.0],
            Slot::Vacant {
                next_free: self.free,
            },
        );
        match slot {
            Slot::Occupied(value) => {
                self.free = Some(id);
                self.len -= 1;
                value
            }
            Slot::Vacant { .. } => panic!("double free of slot {}", id.0),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.len = 0;
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena::new()
    }
}

impl<T> Index<NodeId> for Arena<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("dangling node id {}", id.0),
        }
    }
}

impl<T> IndexMut<NodeId> for Arena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("dangling node id {}", id.0),
        }
    }
}
