use super::arena::NodeId;
use crate::error::Result;

pub type Link = Option<NodeId>;

fn new_links(len: usize) -> Result<Vec<Link>> {
    let mut links = Vec::new();
    links.try_reserve_exact(len)?;
    links.resize(len, None);
    Ok(links)
}

/// One stored entry. `forward[i]` is the next node at level `i`; a node
/// participates in levels `0..=level()`.
pub struct Node<K, V> {
    key: K,
    value: V,
    forward: Vec<Link>,
}

impl<K, V> Node<K, V> {
    pub fn new(key: K, value: V, level: usize) -> Result<Self> {
        Ok(Node {
            key,
            value,
            forward: new_links(level + 1)?,
        })
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub fn set_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    pub fn level(&self) -> usize {
        self.forward.len() - 1
    }

    pub fn next(&self, level: usize) -> Link {
        self.forward[level]
    }

    pub fn set_next(&mut self, level: usize, link: Link) {
        self.forward[level] = link;
    }

    pub fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}

/// The list's sentinel. It only carries successor slots, one per level up
/// to the list's max level.
pub struct Head {
    forward: Vec<Link>,
}

impl Head {
    pub fn new(max_level: usize) -> Self {
        Head {
            forward: vec![None; max_level + 1],
        }
    }

    pub fn try_new(max_level: usize) -> Result<Self> {
        Ok(Head {
            forward: new_links(max_level + 1)?,
        })
    }

    pub fn next(&self, level: usize) -> Link {
        self.forward[level]
    }

    pub fn set_next(&mut self, level: usize, link: Link) {
        self.forward[level] = link;
    }

    pub fn reset(&mut self) {
        self.forward.iter_mut().for_each(|l| *l = None);
    }
}
