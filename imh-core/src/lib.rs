//! Intersection Min-Hashing: a locality-sensitive hashing scheme for
//! nearest-neighbor search over sets of sparse, item-valued lists.
//!
//! A [`HashIndex`](index::HashIndex) is built from a [`ListDb`](list::ListDb)
//! by partitioning every stored list into small random sublists and hashing
//! each sublist into several independent [`HashTable`](table::HashTable)s.
//! Two lists that share enough items are likely to share a sublist, and
//! therefore a bucket, in at least one table.
#![allow(clippy::many_single_char_names)]

pub mod dist;
mod error;
mod hash;
pub mod index;
pub mod list;
mod permutation;
pub mod prelude;
mod rng;
mod sublist;
pub mod table;

pub use error::{Error, Result};
pub use index::{HashIndex, IndexStats};
pub use list::{Item, List, ListDb};
pub use rng::Mt19937_64;
pub use table::{HashTable, TableStats};
