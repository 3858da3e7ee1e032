use std::{borrow::Borrow, fmt, iter::FusedIterator, mem};

use rand::{rngs::StdRng, RngCore};
use tracing::{debug, trace};

use crate::{error::Result, options::Options, random::LevelGenerator};

mod arena;
mod node;

use arena::{Arena, NodeId};
use node::{Head, Link, Node};

/// A position in the list a walk can stand on: the head or a stored node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cursor {
    Head,
    Node(NodeId),
}

/// An ordered map backed by a skip list.
///
/// Nodes live in an arena and link to each other by index, so the list is the
/// only owner of every entry. Mutation needs `&mut self`; wrap the list in a
/// [`SkipMap`](crate::SkipMap) to share it between threads.
pub struct SkipList<K, V, R = StdRng> {
    head: Head,
    nodes: Arena<Node<K, V>>,
    levels: LevelGenerator<R>,
    cur_level: usize,
    // rightmost node visited at each level by the last walk
    update: Vec<Cursor>,
}

impl<K: Ord, V> SkipList<K, V> {
    pub fn new() -> Self {
        let levels = LevelGenerator::from_options(&Options::default());
        let max_level = levels.max_level();
        Self::from_parts(
            levels,
            Head::new(max_level),
            vec![Cursor::Head; max_level + 1],
        )
    }

    pub fn with_max_level(max_level: usize) -> Result<Self> {
        Self::with_options(Options::with_max_level(max_level))
    }

    pub fn with_options(opts: Options) -> Result<Self> {
        opts.validate()?;
        Self::from_generator(LevelGenerator::from_options(&opts))
    }
}

impl<K: Ord, V> Default for SkipList<K, V> {
    fn default() -> Self {
        SkipList::new()
    }
}

impl<K: Ord, V, R: RngCore> SkipList<K, V, R> {
    /// Builds a list whose levels are drawn from `rng`. `opts.seed` is ignored.
    pub fn with_rng(opts: Options, rng: R) -> Result<Self> {
        opts.validate()?;
        Self::from_generator(LevelGenerator::new(
            rng,
            opts.max_level,
            opts.branching_factor,
        ))
    }

    fn from_generator(levels: LevelGenerator<R>) -> Result<Self> {
        let max_level = levels.max_level();
        let head = Head::try_new(max_level)?;
        let mut update = Vec::new();
        update.try_reserve_exact(max_level + 1)?;
        update.resize(max_level + 1, Cursor::Head);
        Ok(Self::from_parts(levels, head, update))
    }

    fn from_parts(levels: LevelGenerator<R>, head: Head, update: Vec<Cursor>) -> Self {
        debug!(max_level = levels.max_level(), "created skiplist");
        SkipList {
            head,
            nodes: Arena::new(),
            levels,
            cur_level: 0,
            update,
        }
    }

    /// Descends from the top populated level, calling `visit` with the last
    /// node whose key is less than `key` on each level. Returns the first
    /// node at level 0 whose key is not less than `key`.
    fn walk<Q>(&self, key: &Q, mut visit: impl FnMut(usize, Cursor)) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cur = Cursor::Head;
        for level in (0..=self.cur_level).rev() {
            while let Some(next) = self.next(cur, level) {
                if self.nodes[next].key().borrow() < key {
                    cur = Cursor::Node(next);
                } else {
                    break;
                }
            }
            visit(level, cur);
        }
        self.next(cur, 0)
    }

    fn find_predecessors<Q>(&mut self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut update = mem::take(&mut self.update);
        let found = self.walk(key, |level, cur| update[level] = cur);
        self.update = update;
        found
    }

    fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.walk(key, |_, _| {})?;
        if self.nodes[id].key().borrow() == key {
            Some(id)
        } else {
            None
        }
    }

    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| self.nodes[id].value())
    }

    pub fn search_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key)?;
        Some(self.nodes[id].value_mut())
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Inserts `value` under `key`. An existing entry is overwritten in place
    /// and its previous value returned.
    ///
    /// On allocation failure the list is left untouched.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        if let Some(id) = self.find_predecessors(&key) {
            let node = &mut self.nodes[id];
            if *node.key() == key {
                trace!(level = node.level(), "updated entry in place");
                return Ok(Some(node.set_value(value)));
            }
        }

        let level = self.levels.random_level();
        let id = self.nodes.alloc(Node::new(key, value, level)?)?;

        if level > self.cur_level {
            self.update[self.cur_level + 1..=level].fill(Cursor::Head);
            trace!(from = self.cur_level, to = level, "raised list height");
            self.cur_level = level;
        }

        for l in 0..=level {
            let prev = self.update[l];
            let next = self.next(prev, l);
            self.nodes[id].set_next(l, next);
            self.set_next(prev, l, Some(id));
        }

        trace!(level, len = self.len(), "inserted entry");
        Ok(None)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find_predecessors(key)?;
        if self.nodes[id].key().borrow() != key {
            return None;
        }

        for l in 0..=self.cur_level {
            let prev = self.update[l];
            if self.next(prev, l) != Some(id) {
                break;
            }
            let next = self.nodes[id].next(l);
            self.set_next(prev, l, next);
        }
        let entry = self.nodes.free(id).into_entry();

        let height = self.cur_level;
        while self.cur_level > 0 && self.head.next(self.cur_level).is_none() {
            self.cur_level -= 1;
        }
        if self.cur_level != height {
            trace!(from = height, to = self.cur_level, "lowered list height");
        }

        trace!(len = self.len(), "removed entry");
        Some(entry)
    }
}

impl<K, V, R> SkipList<K, V, R> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn max_level(&self) -> usize {
        self.update.len() - 1
    }

    /// Highest level populated by any entry, 0 when empty.
    pub fn current_level(&self) -> usize {
        self.cur_level
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head.reset();
        self.cur_level = 0;
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            next: self.head.next(0),
            remaining: self.len(),
        }
    }

    fn next(&self, cursor: Cursor, level: usize) -> Link {
        match cursor {
            Cursor::Head => self.head.next(level),
            Cursor::Node(id) => self.nodes[id].next(level),
        }
    }

    fn set_next(&mut self, cursor: Cursor, level: usize, link: Link) {
        match cursor {
            Cursor::Head => self.head.set_next(level, link),
            Cursor::Node(id) => self.nodes[id].set_next(level, link),
        }
    }

    fn level_iter(&self, level: usize) -> impl Iterator<Item = &Node<K, V>> + '_ {
        let mut next = self.head.next(level);
        std::iter::from_fn(move || {
            let node = &self.nodes[next?];
            next = node.next(level);
            Some(node)
        })
    }
}

/// Dumps the keys of every populated level, top level first.
impl<K: fmt::Display, V, R> fmt::Display for SkipList<K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in (0..=self.cur_level).rev() {
            write!(f, "level {}:", level)?;
            for node in self.level_iter(level) {
                write!(f, " {}", node.key())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, R> fmt::Debug for SkipList<K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

pub struct Iter<'a, K, V> {
    nodes: &'a Arena<Node<K, V>>,
    next: Link,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let node = &nodes[self.next?];
        self.next = node.next(0);
        self.remaining -= 1;
        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V, R> IntoIterator for &'a SkipList<K, V, R> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
