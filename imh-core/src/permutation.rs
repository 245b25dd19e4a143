//! Per-table minwise permutations (C2) and the MinHash kernel (C3).

use crate::list::List;
use crate::rng::{Mt19937_64, RandomValue};

/// One table's family of `tuple_size` independent rank-permutations over
/// `[0, dim)`, stored as a flat `tuple_size * dim` row-major matrix: row `k`
/// gives, for MinHash function `k`, the rank assigned to every item id.
///
/// Built once per table at construction time and read-only thereafter.
#[derive(Debug, Clone)]
pub struct PermutationFamily {
    tuple_size: usize,
    dim: usize,
    values: Vec<RandomValue>,
}

impl PermutationFamily {
    /// Draws a fresh family from `rng`: row `k` outer, item `j` inner, one
    /// joint `(int, double)` draw per cell. This is the draw order the
    /// reproducibility contract (§8.1) depends on — do not reorder it.
    pub fn generate(rng: &mut Mt19937_64, dim: usize, tuple_size: usize) -> Self {
        let mut values = Vec::with_capacity(tuple_size * dim);
        for _ in 0..tuple_size {
            for _ in 0..dim {
                values.push(rng.next_random_value());
            }
        }
        PermutationFamily {
            tuple_size,
            dim,
            values,
        }
    }

    pub fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn row(&self, k: usize) -> &[RandomValue] {
        let start = k * self.dim;
        &self.values[start..start + self.dim]
    }

    /// MinHash of `list` under row `k` (C3): the `random_int` of the item
    /// with the smallest `random_double` in that row. Comparisons use the
    /// double; the returned integer is unchanged. Depends only on the set
    /// of item ids in `list`, never their order.
    ///
    /// # Panics
    ///
    /// Panics if `list` is empty — callers skip empty lists before this
    /// point (§4.3 edge cases).
    pub fn minhash(&self, k: usize, list: &List) -> u64 {
        let row = self.row(k);
        list.iter()
            .map(|item| &row[item.id as usize])
            .min_by(|a, b| a.random_double.partial_cmp(&b.random_double).unwrap())
            .expect("minhash called on an empty list")
            .random_int
    }

    /// The full MinHash tuple `m_0..m_{tuple_size-1}` for `list`.
    pub fn minhash_tuple(&self, list: &List) -> Vec<u64> {
        (0..self.tuple_size).map(|k| self.minhash(k, list)).collect()
    }
}
