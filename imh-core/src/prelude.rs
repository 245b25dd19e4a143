//! Convenience re-export of the types most callers need.

pub use crate::dist::{jaccard, overlap};
pub use crate::error::{Error, Result};
pub use crate::index::{HashIndex, IndexStats};
pub use crate::list::{Item, List, ListDb};
pub use crate::rng::Mt19937_64;
pub use crate::table::{HashTable, TableStats};
