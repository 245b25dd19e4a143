//! The Hash Index (C7) and the Search API (C8): build, query, and re-rank.

use crate::error::{Error, Result};
use crate::list::{Item, List, ListDb};
use crate::rng::Mt19937_64;
use crate::sublist::partition_into_sublists;
use crate::table::{HashTable, TableStats};
use log::{debug, info};
use rayon::prelude::*;

/// `number_of_tables` independent [`HashTable`]s over the same sublist
/// database, each with its own permutations and universal-hash
/// coefficients (§3). No shared mutable state between tables after build.
#[derive(Debug, Clone)]
pub struct HashIndex {
    tables: Vec<HashTable>,
    number_of_tables: usize,
    tuple_size: usize,
    table_size: usize,
    sublist_size: usize,
    dim: u32,
}

/// Aggregate occupancy statistics across every table of a [`HashIndex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexStats {
    pub number_of_tables: usize,
    pub avg_used_buckets: f64,
    pub avg_occupancy: f64,
    pub min_occupancy: usize,
    pub max_occupancy: usize,
}

impl HashIndex {
    /// Builds an index from `db` with a freshly-seeded RNG (§4.7). This is
    /// the entry point the CLI and most callers use; [`HashIndex::build_with_rng`]
    /// is for callers threading an existing RNG handle.
    pub fn build(
        db: &ListDb,
        number_of_tables: usize,
        tuple_size: usize,
        table_size: usize,
        sublist_size: usize,
        seed: u64,
    ) -> Result<Self> {
        let mut rng = Mt19937_64::new(seed);
        Self::build_with_rng(db, number_of_tables, tuple_size, table_size, sublist_size, &mut rng)
    }

    /// Same as [`HashIndex::build`], but draws from a caller-supplied RNG
    /// rather than seeding a fresh one — useful for tests that need to
    /// continue drawing from the same stream afterwards.
    pub fn build_with_rng(
        db: &ListDb,
        number_of_tables: usize,
        tuple_size: usize,
        table_size: usize,
        sublist_size: usize,
        rng: &mut Mt19937_64,
    ) -> Result<Self> {
        if !table_size.is_power_of_two() {
            return Err(Error::Config(format!(
                "table_size ({}) must be a power of two",
                table_size
            )));
        }
        if number_of_tables == 0 {
            return Err(Error::Config("number_of_tables must be non-zero".into()));
        }

        let (sublist_db, owner_ids) = partition_into_sublists(db, sublist_size, rng);
        info!(
            "building HashIndex: {} tables, tuple_size={}, table_size={}, sublist_size={}, {} sublists from {} lists",
            number_of_tables,
            tuple_size,
            table_size,
            sublist_size,
            sublist_db.len(),
            db.len(),
        );

        let mut tables = Vec::with_capacity(number_of_tables);
        for t in 0..number_of_tables {
            let mut table = HashTable::new(rng, db.dim as usize, tuple_size, table_size, sublist_size)?;
            for (s, sublist) in sublist_db.iter().enumerate() {
                if sublist.is_empty() {
                    continue;
                }
                table.store_list(sublist, owner_ids[s])?;
            }
            debug!(
                "table {} built: {} used buckets of {}",
                t,
                table.used_bucket_count(),
                table_size
            );
            tables.push(table);
        }

        Ok(HashIndex {
            tables,
            number_of_tables,
            tuple_size,
            table_size,
            sublist_size,
            dim: db.dim,
        })
    }

    /// Returns the union of the owner ids whose buckets `q` collides with
    /// across every table, deduplicated (§4.7). An empty `q` always misses
    /// every table and returns an empty list (§8 S6) — `minhash` is never
    /// invoked on it.
    pub fn query(&self, q: &List) -> List {
        if q.is_empty() {
            return List::new();
        }

        let mut result = List::new();
        for table in &self.tables {
            if let Some(index) = table.lookup(q) {
                result.append(table.bucket_items(index).clone());
            }
        }

        result.sort_by_item();
        dedup_owner_ids(&mut result);
        result
    }

    /// Runs [`HashIndex::query`] independently over every element of
    /// `queries`; no cross-query state.
    pub fn query_multi(&self, queries: &ListDb) -> ListDb {
        let results: Vec<List> = queries.iter().map(|q| self.query(q)).collect();
        ListDb::from_lists(results, self.dim)
    }

    /// Parallel variant of [`HashIndex::query_multi`] over the host's
    /// work-stealing thread pool (§5, §10.4): safe because queries never
    /// mutate the index and share no state with each other.
    pub fn query_multi_par(&self, queries: &ListDb) -> ListDb {
        let results: Vec<List> = queries
            .iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|q| self.query(q))
            .collect();
        ListDb::from_lists(results, self.dim)
    }

    /// Reorders `neighbors` in place so that `score_fn(query, db[id])` is
    /// descending; ties retain their input order (§4.7, §8.7).
    pub fn sort_custom<F>(&self, query: &List, neighbors: &mut List, db: &ListDb, score_fn: F)
    where
        F: Fn(&List, &List) -> f64,
    {
        let mut scored: Vec<(f64, usize, Item)> = neighbors
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| (score_fn(query, &db[item.id as usize]), i, *item))
            .collect();

        // Stable sort by (-score, original position): descending score,
        // ties broken by input order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap().then(a.1.cmp(&b.1)));

        neighbors.items = scored.into_iter().map(|(_, _, item)| item).collect();
    }

    /// Aggregates [`HashTable::describe`] across every table — the
    /// diagnostic surface callers use to judge whether `table_size` /
    /// `number_of_tables` are well chosen for a given database (§4.7).
    pub fn describe(&self) -> IndexStats {
        let per_table: Vec<TableStats> = self.tables.iter().map(|t| t.describe()).collect();
        let n = per_table.len().max(1) as f64;

        let avg_used_buckets =
            per_table.iter().map(|s| s.used_buckets as f64).sum::<f64>() / n;
        let avg_occupancy = per_table.iter().map(|s| s.avg_occupancy).sum::<f64>() / n;
        let min_occupancy = per_table.iter().map(|s| s.min_occupancy).min().unwrap_or(0);
        let max_occupancy = per_table.iter().map(|s| s.max_occupancy).max().unwrap_or(0);

        IndexStats {
            number_of_tables: self.number_of_tables,
            avg_used_buckets,
            avg_occupancy,
            min_occupancy,
            max_occupancy,
        }
    }

    pub fn number_of_tables(&self) -> usize {
        self.number_of_tables
    }

    pub fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }

    pub fn sublist_size(&self) -> usize {
        self.sublist_size
    }

    pub fn dim(&self) -> u32 {
        self.dim
    }
}

/// Plain dedup to unique owner ids (resolution of open question d, §9):
/// no collision counts, all frequencies collapse to 1. Ranking is deferred
/// to [`HashIndex::sort_custom`] against the original stored lists, so it
/// never depends on this choice.
fn dedup_owner_ids(list: &mut List) {
    list.items.dedup_by_key(|item| item.id);
    for item in list.items.iter_mut() {
        item.freq = 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dist::overlap;

    fn db_of(sets: &[&[u32]], dim: u32) -> ListDb {
        let mut db = ListDb::new(dim);
        for s in sets {
            db.push(List::from_ids(s.iter().copied()));
        }
        db
    }

    #[test]
    fn rejects_non_power_of_two_table_size() {
        let db = db_of(&[&[1, 2, 3]], 8);
        let err = HashIndex::build(&db, 1, 1, 20, 3, 1).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn s1_self_retrieval_single_table() {
        let db = db_of(&[&[1, 2, 3, 4, 5, 6]], 8);
        let index = HashIndex::build(&db, 1, 1, 8, 3, 1).unwrap();
        let q = List::from_ids([1, 2, 3, 4, 5, 6]);
        let result = index.query(&q);
        assert_eq!(result.ids().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn s2_duplicate_lists_both_found() {
        let db = db_of(&[&[1, 2, 3, 4, 5, 6], &[1, 2, 3, 4, 5, 6]], 8);
        let index = HashIndex::build(&db, 8, 2, 16, 3, 1).unwrap();
        let q = List::from_ids([1, 2, 3, 4, 5, 6]);
        let result = index.query(&q);
        assert!(result.ids().any(|id| id == 0));
        assert!(result.ids().any(|id| id == 1));
    }

    #[test]
    fn s5_empty_query_returns_empty_no_crash() {
        let db = db_of(&[&[1, 2, 3]], 8);
        let index = HashIndex::build(&db, 4, 2, 16, 3, 1).unwrap();
        let result = index.query(&List::new());
        assert!(result.is_empty());
    }

    #[test]
    fn dedup_never_produces_duplicate_ids() {
        let db = db_of(&[&[1, 2, 3, 4, 5, 6, 7, 8, 9]], 16);
        let index = HashIndex::build(&db, 16, 2, 32, 3, 7).unwrap();
        let result = index.query(&List::from_ids([1, 2, 3, 4, 5, 6]));
        let ids: Vec<u32> = result.ids().collect();
        let mut unique = ids.clone();
        unique.dedup();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn reproducible_build_and_query() {
        let db = db_of(&[&[1, 2, 3, 4, 5, 6], &[7, 8, 9, 10, 11, 12]], 16);
        let a = HashIndex::build(&db, 8, 2, 16, 3, 42).unwrap();
        let b = HashIndex::build(&db, 8, 2, 16, 3, 42).unwrap();
        let q = List::from_ids([1, 2, 3, 4, 5, 6]);
        assert_eq!(
            a.query(&q).ids().collect::<Vec<_>>(),
            b.query(&q).ids().collect::<Vec<_>>()
        );
    }

    #[test]
    fn sort_custom_preserves_order_among_ties() {
        let db = db_of(&[&[1, 2], &[1, 2], &[1, 2]], 8);
        let index = HashIndex::build(&db, 1, 1, 8, 2, 1).unwrap();
        let query = List::from_ids([1, 2]);
        let mut neighbors = List::from_ids([0, 1, 2]);
        index.sort_custom(&query, &mut neighbors, &db, overlap);
        assert_eq!(neighbors.ids().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn sort_custom_orders_by_descending_score() {
        let db = db_of(&[&[1, 2, 3, 4], &[1, 2], &[1]], 8);
        let index = HashIndex::build(&db, 1, 1, 8, 1, 1).unwrap();
        let query = List::from_ids([1, 2, 3, 4]);
        let mut neighbors = List::from_ids([2, 0, 1]);
        index.sort_custom(&query, &mut neighbors, &db, overlap);
        assert_eq!(neighbors.ids().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn query_multi_matches_per_query_results() {
        let db = db_of(&[&[1, 2, 3], &[4, 5, 6]], 8);
        let index = HashIndex::build(&db, 4, 1, 8, 2, 3).unwrap();
        let mut queries = ListDb::new(8);
        queries.push(List::from_ids([1, 2, 3]));
        queries.push(List::from_ids([4, 5, 6]));

        let sequential = index.query_multi(&queries);
        let parallel = index.query_multi_par(&queries);

        for (s, p) in sequential.iter().zip(parallel.iter()) {
            assert_eq!(s.ids().collect::<Vec<_>>(), p.ids().collect::<Vec<_>>());
        }
    }
}
