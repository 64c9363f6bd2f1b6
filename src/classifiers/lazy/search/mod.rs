mod kd_tree;
mod linear;

pub use kd_tree::KdTreeSearch;
pub use linear::LinearSearch;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum_macros::{Display, EnumIter, EnumString};

/// Interchangeable nearest-neighbour backends, fixed at configure time.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SearchStrategy {
    /// Exhaustive scan of the window; the reference implementation.
    #[default]
    Linear,
    /// Median-split k-d tree with branch-and-bound pruning.
    KdTree,
}

/// One retrieved neighbour: position in the current window (insertion order)
/// and Euclidean distance from the query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour {
    pub index: usize,
    pub distance: f64,
}

/// Search over a snapshot view of the window. Implementations must return up
/// to `k` neighbours ordered by ascending distance, ties broken by lower
/// window index, and an empty vector for an empty window.
pub trait NeighbourSearch {
    fn k_nearest(&self, query: &[f64], k: usize) -> Vec<Neighbour>;
}

/// Attribute read used for all geometry: out-of-range and missing (`NaN`)
/// entries are 0, so dense, sparse and malformed vectors are comparable.
#[inline]
pub(crate) fn component(values: &[f64], index: usize) -> f64 {
    match values.get(index) {
        Some(v) if !v.is_nan() => *v,
        _ => 0.0,
    }
}

/// Squared Euclidean distance over the attribute vector, skipping the class
/// attribute.
pub(crate) fn squared_distance(query: &[f64], candidate: &[f64], class_index: usize) -> f64 {
    let n = query.len().max(candidate.len());
    let mut total = 0.0;
    for i in 0..n {
        if i == class_index {
            continue;
        }
        let diff = component(query, i) - component(candidate, i);
        total += diff * diff;
    }
    total
}

/// Shared candidate ordering: smaller squared distance first, then earlier
/// insertion. Both strategies must rank with exactly this comparator.
#[inline]
pub(crate) fn cmp_candidates(a: &(f64, usize), b: &(f64, usize)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

pub(crate) fn into_neighbours(ranked: Vec<(f64, usize)>) -> Vec<Neighbour> {
    ranked
        .into_iter()
        .map(|(d2, index)| Neighbour {
            index,
            distance: d2.sqrt(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn distance_skips_class_attribute() {
        // class at index 2; only the first two components count
        let d2 = squared_distance(&[0.0, 0.0, 5.0], &[3.0, 4.0, 0.0], 2);
        assert_eq!(d2, 25.0);
    }

    #[test]
    fn missing_and_absent_entries_read_as_zero() {
        let d2 = squared_distance(&[f64::NAN, 1.0, 0.0], &[2.0], 2);
        assert_eq!(d2, 4.0 + 1.0);
    }

    #[test]
    fn candidate_order_breaks_ties_by_index() {
        let mut ranked = vec![(1.0, 4), (1.0, 2), (0.5, 9)];
        ranked.sort_unstable_by(cmp_candidates);
        assert_eq!(ranked, vec![(0.5, 9), (1.0, 2), (1.0, 4)]);
    }

    #[test]
    fn strategy_parses_from_kebab_case() {
        assert_eq!(SearchStrategy::from_str("linear").unwrap(), SearchStrategy::Linear);
        assert_eq!(SearchStrategy::from_str("kd-tree").unwrap(), SearchStrategy::KdTree);
        assert_eq!(SearchStrategy::KdTree.to_string(), "kd-tree");
        assert!(SearchStrategy::from_str("ball-tree").is_err());
    }
}
