//! The minimal set/list container the core algorithm and the CLI need.
//!
//! This is deliberately thin: it is not a general-purpose collection
//! library, just the handful of operations [`crate::index`] and the CLI's
//! list-database I/O actually call.

use serde::{Deserialize, Serialize};

/// A single member of a [`List`]: an item id plus how many times it was
/// observed. Only the id participates in hashing; the frequency rides
/// along and is aggregated by [`List::unique`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub freq: u32,
}

impl Item {
    pub fn new(id: u32) -> Self {
        Item { id, freq: 1 }
    }
}

/// An ordered sequence of [`Item`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub items: Vec<Item>,
}

impl List {
    pub fn new() -> Self {
        List { items: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        List {
            items: Vec::with_capacity(cap),
        }
    }

    pub fn from_ids<I: IntoIterator<Item = u32>>(ids: I) -> Self {
        List {
            items: ids.into_iter().map(Item::new).collect(),
        }
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn push_id(&mut self, id: u32) {
        self.push(Item::new(id));
    }

    /// Moves `other`'s items onto the end of `self`, consuming `other`.
    pub fn append(&mut self, mut other: List) {
        self.items.append(&mut other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Ascending sort by item id.
    pub fn sort_by_item(&mut self) {
        self.items.sort_by_key(|it| it.id);
    }

    /// Collapses adjacent equal ids, summing their frequencies.
    ///
    /// Requires [`List::sort_by_item`] to have been called first so equal
    /// ids are adjacent. Frequency aggregation policy: duplicates are
    /// summed, not replaced — this is the resolved meaning of "dedup" for
    /// this container (the index's own bucket-union dedup, in
    /// [`crate::index::HashIndex::query`], does not rely on this policy).
    pub fn unique(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let mut write = 0;
        for read in 1..self.items.len() {
            if self.items[read].id == self.items[write].id {
                self.items[write].freq += self.items[read].freq;
            } else {
                write += 1;
                self.items.swap(write, read);
            }
        }
        self.items.truncate(write + 1);
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.items.iter().map(|it| it.id)
    }
}

/// An indexed collection of [`List`]s sharing an item-id upper bound.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDb {
    pub lists: Vec<List>,
    pub dim: u32,
}

impl ListDb {
    pub fn new(dim: u32) -> Self {
        ListDb {
            lists: Vec::new(),
            dim,
        }
    }

    pub fn from_lists(lists: Vec<List>, dim: u32) -> Self {
        ListDb { lists, dim }
    }

    pub fn push(&mut self, list: List) {
        self.lists.push(list);
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, List> {
        self.lists.iter()
    }
}

impl std::ops::Index<usize> for ListDb {
    type Output = List;
    fn index(&self, idx: usize) -> &List {
        &self.lists[idx]
    }
}
