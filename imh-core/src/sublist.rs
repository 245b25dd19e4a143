//! The Sublist Builder (C5): partitions every stored list into small random
//! fixed-size sublists, the unit of indexing in IMH.

use crate::list::{List, ListDb};
use crate::rng::Mt19937_64;

/// Splits every list in `db` into `floor(|L| / sublist_size)` random
/// sublists (§4.6) and returns the resulting sublist database together with
/// `owner_ids`, where `owner_ids[s]` is the index of the list sublist `s`
/// was derived from.
///
/// A list shorter than `sublist_size` contributes no sublists and does not
/// participate in the index (§7, input pathology — not an error).
pub fn partition_into_sublists(
    db: &ListDb,
    sublist_size: usize,
    rng: &mut Mt19937_64,
) -> (ListDb, Vec<u32>) {
    let mut sublist_db = ListDb::new(db.dim);
    let mut owner_ids = Vec::new();

    for (owner, list) in db.iter().enumerate() {
        let n = list.len() / sublist_size;
        if n == 0 {
            continue;
        }

        // Fisher-Yates-equivalent shuffle: draw one key per element and sort
        // descending. Keys are unique with overwhelming probability, so
        // stability never matters.
        let keys: Vec<f64> = (0..list.len()).map(|_| rng.next_unit_double()).collect();
        let mut order: Vec<usize> = (0..list.len()).collect();
        order.sort_by(|&i, &j| keys[j].partial_cmp(&keys[i]).unwrap());

        for chunk in 0..n {
            let start = chunk * sublist_size;
            // The last sublist absorbs whatever is left over past n full
            // blocks, so it may exceed sublist_size (§4.6 step 3).
            let end = if chunk == n - 1 {
                order.len()
            } else {
                start + sublist_size
            };

            let mut sub = List::with_capacity(end - start);
            for &pos in &order[start..end] {
                sub.push(list.items[pos]);
            }
            sub.sort_by_item();

            sublist_db.push(sub);
            owner_ids.push(owner as u32);
        }
    }

    (sublist_db, owner_ids)
}
