use crate::classifiers::lazy::SlidingWindow;
use crate::classifiers::lazy::search::{
    Neighbour, NeighbourSearch, cmp_candidates, into_neighbours, squared_distance,
};

/// Brute-force scan of the window: O(window size x attribute count) per
/// query, always correct. The definitional implementation the k-d tree is
/// tested against.
pub struct LinearSearch<'a> {
    window: &'a SlidingWindow,
    class_index: usize,
}

impl<'a> LinearSearch<'a> {
    pub fn new(window: &'a SlidingWindow, class_index: usize) -> Self {
        Self {
            window,
            class_index,
        }
    }
}

impl NeighbourSearch for LinearSearch<'_> {
    fn k_nearest(&self, query: &[f64], k: usize) -> Vec<Neighbour> {
        if k == 0 || self.window.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(f64, usize)> = self
            .window
            .iter()
            .enumerate()
            .map(|(index, inst)| {
                (
                    squared_distance(query, inst.values(), self.class_index),
                    index,
                )
            })
            .collect();

        ranked.sort_unstable_by(cmp_candidates);
        ranked.truncate(k);
        into_neighbours(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attributes::{AttributeRef, NominalAttribute, NumericAttribute};
    use crate::core::instance_header::InstanceHeader;
    use crate::core::instances::DenseInstance;
    use std::sync::Arc;

    fn header() -> Arc<InstanceHeader> {
        let x = Arc::new(NumericAttribute::new("x".into())) as AttributeRef;
        let y = Arc::new(NumericAttribute::new("y".into())) as AttributeRef;
        let class = Arc::new(NominalAttribute::with_values(
            "class".into(),
            vec!["0".into(), "1".into()],
        )) as AttributeRef;
        Arc::new(InstanceHeader::new("rel".into(), vec![x, y, class], 2))
    }

    fn window(points: &[[f64; 2]]) -> SlidingWindow {
        let h = header();
        let mut w = SlidingWindow::new(points.len().max(1)).unwrap();
        for p in points {
            w.insert(DenseInstance::new(
                Arc::clone(&h),
                vec![p[0], p[1], 0.0],
                1.0,
            ));
        }
        w
    }

    #[test]
    fn empty_window_yields_no_neighbours() {
        let w = window(&[]);
        let search = LinearSearch::new(&w, 2);
        assert!(search.k_nearest(&[0.0, 0.0, 0.0], 3).is_empty());
    }

    #[test]
    fn orders_by_distance_then_insertion() {
        // Two points at identical distance from the query; the earlier one
        // must come first.
        let w = window(&[[2.0, 0.0], [0.0, 2.0], [1.0, 0.0]]);
        let search = LinearSearch::new(&w, 2);

        let found = search.k_nearest(&[0.0, 0.0, 0.0], 3);
        let indices: Vec<usize> = found.iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![2, 0, 1]);
        assert_eq!(found[0].distance, 1.0);
        assert_eq!(found[1].distance, 2.0);
    }

    #[test]
    fn returns_fewer_when_window_is_small() {
        let w = window(&[[1.0, 1.0], [2.0, 2.0]]);
        let search = LinearSearch::new(&w, 2);
        assert_eq!(search.k_nearest(&[0.0, 0.0, 0.0], 10).len(), 2);
    }
}
