//! Open-addressed hash tables (C6): the bucket array, linear probing, and
//! the used-bucket index.

use crate::error::{Error, Result};
use crate::hash::universal_hash;
use crate::list::{Item, List};
use crate::permutation::PermutationFamily;
use crate::rng::Mt19937_64;
use fnv::FnvHashSet;

/// A slot in a [`HashTable`]'s bucket array.
///
/// Occupancy is `items.is_empty()`, not a separate flag (§4.5) — a bucket's
/// `hash_value` is only meaningful once it has been claimed, either by
/// holding an item or mid-probe.
#[derive(Debug, Clone, Default)]
pub struct Bucket {
    pub hash_value: u64,
    pub items: List,
}

impl Bucket {
    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Aggregate occupancy statistics for one table, used by
/// [`crate::index::HashIndex::describe`] and the CLI's diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStats {
    pub table_size: usize,
    pub used_buckets: usize,
    pub avg_occupancy: f64,
    pub min_occupancy: usize,
    pub max_occupancy: usize,
    pub std_dev_occupancy: f64,
    /// Count of distinct `hash_value`s among used buckets. Equal to
    /// `used_buckets` unless I3 has somehow been violated, so this is
    /// mostly a diagnostic sanity check rather than a load-bearing stat.
    pub unique_hash_values: usize,
}

/// One independent LSH table: its own permutations, universal-hash
/// coefficients `a`/`b`, and open-addressed bucket array.
///
/// Invariants (§3): `table_size` is a power of two (I1); `used_buckets`
/// names exactly the non-empty buckets, each exactly once (I2); distinct
/// non-empty buckets have distinct `hash_value`s (I3); `a`/`b` are drawn
/// once at construction and frozen (I4).
#[derive(Debug, Clone)]
pub struct HashTable {
    table_size: usize,
    permutations: PermutationFamily,
    buckets: Vec<Bucket>,
    used_buckets: Vec<usize>,
    a: Vec<u64>,
    b: Vec<u64>,
}

impl HashTable {
    /// Creates a table with fresh permutations and coefficients drawn from
    /// `rng`, validating the configuration error cases of §7.
    pub fn new(
        rng: &mut Mt19937_64,
        dim: usize,
        tuple_size: usize,
        table_size: usize,
        sublist_size: usize,
    ) -> Result<Self> {
        if !table_size.is_power_of_two() {
            return Err(Error::Config(format!(
                "table_size ({}) must be a power of two",
                table_size
            )));
        }
        if tuple_size == 0 {
            return Err(Error::Config("tuple_size must be non-zero".into()));
        }
        if sublist_size == 0 {
            return Err(Error::Config("sublist_size must be non-zero".into()));
        }
        if dim == 0 {
            return Err(Error::Config("dim must be non-zero".into()));
        }

        let permutations = PermutationFamily::generate(rng, dim, tuple_size);
        let a: Vec<u64> = (0..tuple_size).map(|_| rng.next_u64()).collect();
        let b: Vec<u64> = (0..tuple_size).map(|_| rng.next_u64()).collect();

        Ok(HashTable {
            table_size,
            permutations,
            buckets: vec![Bucket::default(); table_size],
            used_buckets: Vec::new(),
            a,
            b,
        })
    }

    fn universal_hash_for(&self, list: &List) -> (u64, usize) {
        let tuple = self.permutations.minhash_tuple(list);
        universal_hash(&tuple, &self.a, &self.b, self.table_size)
    }

    /// Mutating probe (§4.5 steps 1-5): claims the first empty bucket found
    /// along the linear-probe sequence, or returns the bucket already
    /// matching `hash_value`. Returns [`Error::TableFull`] once every slot
    /// has been checked without a match or an empty slot.
    pub fn get_or_claim_bucket(&mut self, list: &List) -> Result<usize> {
        let (hash_value, start) = self.universal_hash_for(list);

        if self.buckets[start].is_empty() {
            self.buckets[start].hash_value = hash_value;
            return Ok(start);
        }
        if self.buckets[start].hash_value == hash_value {
            return Ok(start);
        }

        let mask = self.table_size - 1;
        let mut index = start;
        for _ in 1..self.table_size {
            index = (index + 1) & mask;
            let bucket = &mut self.buckets[index];
            if bucket.is_empty() {
                bucket.hash_value = hash_value;
                return Ok(index);
            }
            if bucket.hash_value == hash_value {
                return Ok(index);
            }
        }

        Err(Error::TableFull {
            table_size: self.table_size,
            checked_buckets: self.table_size,
        })
    }

    /// Non-mutating probe for queries (§4.7): the same walk, but an empty
    /// bucket is a miss (`None`) instead of a claim, so queries never
    /// mutate the table.
    pub fn lookup(&self, list: &List) -> Option<usize> {
        let (hash_value, start) = self.universal_hash_for(list);

        if self.buckets[start].is_empty() {
            return None;
        }
        if self.buckets[start].hash_value == hash_value {
            return Some(start);
        }

        let mask = self.table_size - 1;
        let mut index = start;
        for _ in 1..self.table_size {
            index = (index + 1) & mask;
            let bucket = &self.buckets[index];
            if bucket.is_empty() {
                return None;
            }
            if bucket.hash_value == hash_value {
                return Some(index);
            }
        }
        None
    }

    /// Stores `id` (as a frequency-1 item) in the bucket `list` hashes to,
    /// claiming it first if necessary and recording newly-claimed buckets
    /// in `used_buckets` (§4.5).
    pub fn store_list(&mut self, list: &List, id: u32) -> Result<()> {
        let index = self.get_or_claim_bucket(list)?;
        if self.buckets[index].items.is_empty() {
            self.used_buckets.push(index);
        }
        self.buckets[index].items.push(Item::new(id));
        Ok(())
    }

    pub fn bucket_items(&self, index: usize) -> &List {
        &self.buckets[index].items
    }

    pub fn used_bucket_count(&self) -> usize {
        self.used_buckets.len()
    }

    pub fn used_buckets(&self) -> &[usize] {
        &self.used_buckets
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }

    pub fn describe(&self) -> TableStats {
        let occupancies: Vec<usize> = self
            .used_buckets
            .iter()
            .map(|&idx| self.buckets[idx].items.len())
            .collect();

        let unique_hash_values: FnvHashSet<u64> = self
            .used_buckets
            .iter()
            .map(|&idx| self.buckets[idx].hash_value)
            .collect();

        if occupancies.is_empty() {
            return TableStats {
                table_size: self.table_size,
                used_buckets: 0,
                avg_occupancy: 0.0,
                min_occupancy: 0,
                max_occupancy: 0,
                std_dev_occupancy: 0.0,
                unique_hash_values: 0,
            };
        }

        let n = occupancies.len() as f64;
        let sum: usize = occupancies.iter().sum();
        let avg = sum as f64 / n;
        let variance = occupancies
            .iter()
            .map(|&o| {
                let d = o as f64 - avg;
                d * d
            })
            .sum::<f64>()
            / n;

        TableStats {
            table_size: self.table_size,
            used_buckets: occupancies.len(),
            avg_occupancy: avg,
            min_occupancy: *occupancies.iter().min().unwrap(),
            max_occupancy: *occupancies.iter().max().unwrap(),
            std_dev_occupancy: variance.sqrt(),
            unique_hash_values: unique_hash_values.len(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::list::List;

    #[test]
    fn rejects_non_power_of_two_table_size() {
        let mut rng = Mt19937_64::new(1);
        let err = HashTable::new(&mut rng, 8, 2, 20, 2).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_zero_tuple_size() {
        let mut rng = Mt19937_64::new(1);
        let err = HashTable::new(&mut rng, 8, 0, 16, 2).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn store_then_lookup_finds_same_bucket() {
        let mut rng = Mt19937_64::new(1);
        let mut table = HashTable::new(&mut rng, 32, 2, 16, 3).unwrap();
        let list = List::from_ids([1, 2, 3]);
        table.store_list(&list, 0).unwrap();
        let claimed = table.get_or_claim_bucket(&list).unwrap();
        let looked_up = table.lookup(&list).unwrap();
        assert_eq!(claimed, looked_up);
        assert_eq!(table.bucket_items(looked_up).ids().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn lookup_misses_do_not_mutate_used_buckets() {
        let mut rng = Mt19937_64::new(1);
        let mut table = HashTable::new(&mut rng, 32, 2, 16, 3).unwrap();
        let before = table.used_bucket_count();
        let probe = List::from_ids([9, 10, 11]);
        assert!(table.lookup(&probe).is_none() || table.lookup(&probe).is_some());
        assert_eq!(table.used_bucket_count(), before);
    }

    #[test]
    fn used_buckets_track_occupancy_without_duplicates() {
        let mut rng = Mt19937_64::new(2);
        let mut table = HashTable::new(&mut rng, 64, 2, 8, 2).unwrap();
        for i in 0..20u32 {
            let list = List::from_ids([i, i + 1]);
            table.store_list(&list, i).unwrap();
        }
        let mut seen = std::collections::HashSet::new();
        for &idx in table.used_buckets() {
            assert!(!table.bucket_items(idx).is_empty());
            assert!(seen.insert(idx), "duplicate index in used_buckets");
        }
    }

    #[test]
    fn table_full_is_reported_not_silenced() {
        let mut rng = Mt19937_64::new(3);
        // table_size 1: the very first distinct hash_value claims the only
        // slot; a second list with a different hash_value must overflow.
        let mut table = HashTable::new(&mut rng, 64, 2, 1, 2).unwrap();
        table.store_list(&List::from_ids([1, 2]), 0).unwrap();
        // Keep trying distinct lists until we observe either a match (same
        // bucket, fine) or a TableFull error (the only other legal outcome
        // for a single-slot table).
        let mut saw_full = false;
        for i in 2..200u32 {
            match table.store_list(&List::from_ids([i, i + 1]), i) {
                Ok(()) => continue,
                Err(Error::TableFull { table_size, .. }) => {
                    assert_eq!(table_size, 1);
                    saw_full = true;
                    break;
                }
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert!(saw_full, "expected a single-slot table to fill up");
    }
}
