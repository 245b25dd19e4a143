//! Similarity scorers usable as [`crate::index::HashIndex::sort_custom`]
//! callbacks (§6.2). Both assume their inputs are canonicalized the way
//! [`crate::list::List`] documents: ids unique and sorted ascending.

use crate::list::List;

/// Raw intersection size between two lists.
pub fn overlap(a: &List, b: &List) -> f64 {
    intersection_count(a, b) as f64
}

/// Jaccard similarity: `|A ∩ B| / |A ∪ B|`. Two empty lists have a
/// similarity of `0.0` rather than `NaN`.
pub fn jaccard(a: &List, b: &List) -> f64 {
    let inter = intersection_count(a, b);
    let union = a.len() + b.len() - inter;
    if union == 0 {
        0.0
    } else {
        inter as f64 / union as f64
    }
}

fn intersection_count(a: &List, b: &List) -> usize {
    let (mut i, mut j) = (0, 0);
    let mut count = 0;
    while i < a.items.len() && j < b.items.len() {
        match a.items[i].id.cmp(&b.items[j].id) {
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    count
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn overlap_counts_shared_ids() {
        let a = List::from_ids([1, 2, 3, 4]);
        let b = List::from_ids([3, 4, 5, 6]);
        assert_eq!(overlap(&a, &b), 2.0);
    }

    #[test]
    fn jaccard_of_identical_lists_is_one() {
        let a = List::from_ids([1, 2, 3]);
        let b = List::from_ids([1, 2, 3]);
        assert_eq!(jaccard(&a, &b), 1.0);
    }

    #[test]
    fn jaccard_of_disjoint_lists_is_zero() {
        let a = List::from_ids([1, 2]);
        let b = List::from_ids([3, 4]);
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn jaccard_of_two_empty_lists_is_zero_not_nan() {
        let a = List::new();
        let b = List::new();
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn jaccard_matches_known_ratio() {
        let a = List::from_ids([1, 2, 3, 4]);
        let b = List::from_ids([3, 4, 5, 6]);
        // intersection 2, union 6
        assert!((jaccard(&a, &b) - (2.0 / 6.0)).abs() < 1e-12);
    }
}
