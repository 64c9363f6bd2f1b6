use crate::classifiers::lazy::SlidingWindow;
use crate::classifiers::lazy::search::{
    Neighbour, NeighbourSearch, cmp_candidates, component, into_neighbours, squared_distance,
};
use std::cmp::Ordering;

/// Median-split k-d tree over the current window snapshot.
///
/// Splitting cycles through the non-class attributes; the class attribute
/// never partitions space because the distance metric ignores it. Pruning
/// only discards a subtree when every point in it is strictly farther than
/// the current k-th best, so the result is always identical, ordering and
/// tie-breaks included, to `LinearSearch` over the same window.
pub struct KdTreeSearch<'a> {
    window: &'a SlidingWindow,
    class_index: usize,
    nodes: Vec<Node>,
    root: Option<usize>,
}

struct Node {
    item: usize,
    dim: usize,
    left: Option<usize>,
    right: Option<usize>,
}

impl<'a> KdTreeSearch<'a> {
    pub fn build(window: &'a SlidingWindow, class_index: usize, num_attributes: usize) -> Self {
        let split_dims: Vec<usize> = (0..num_attributes).filter(|&d| d != class_index).collect();
        // With no non-class attribute there is nothing to partition on;
        // splitting on this out-of-range dimension reads 0 everywhere and
        // disables pruning.
        let sentinel_dim = num_attributes;

        let mut items: Vec<usize> = (0..window.len()).collect();
        let mut nodes = Vec::with_capacity(items.len());
        let root = build_subtree(window, &split_dims, sentinel_dim, &mut nodes, &mut items, 0);

        Self {
            window,
            class_index,
            nodes,
            root,
        }
    }

    fn search_node(&self, node_index: usize, query: &[f64], k: usize, best: &mut Vec<(f64, usize)>) {
        let node = &self.nodes[node_index];
        let d2 = squared_distance(
            query,
            self.window.get(node.item).map_or(&[][..], |i| i.values()),
            self.class_index,
        );
        consider(best, (d2, node.item), k);

        let diff = component(query, node.dim) - coord(self.window, node.item, node.dim);
        let (near, far) = if diff > 0.0 {
            (node.right, node.left)
        } else {
            (node.left, node.right)
        };

        if let Some(n) = near {
            self.search_node(n, query, k, best);
        }

        let explore_far = best.len() < k
            || best
                .last()
                .is_some_and(|&(worst_d2, _)| diff * diff <= worst_d2);
        if explore_far && let Some(f) = far {
            self.search_node(f, query, k, best);
        }
    }
}

impl NeighbourSearch for KdTreeSearch<'_> {
    fn k_nearest(&self, query: &[f64], k: usize) -> Vec<Neighbour> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }

        let mut best: Vec<(f64, usize)> = Vec::with_capacity(k + 1);
        self.search_node(root, query, k, &mut best);
        into_neighbours(best)
    }
}

fn coord(window: &SlidingWindow, item: usize, dim: usize) -> f64 {
    window.get(item).map_or(0.0, |inst| component(inst.values(), dim))
}

fn build_subtree(
    window: &SlidingWindow,
    split_dims: &[usize],
    sentinel_dim: usize,
    nodes: &mut Vec<Node>,
    items: &mut [usize],
    depth: usize,
) -> Option<usize> {
    if items.is_empty() {
        return None;
    }

    let dim = if split_dims.is_empty() {
        sentinel_dim
    } else {
        split_dims[depth % split_dims.len()]
    };

    let mid = items.len() / 2;
    items.select_nth_unstable_by(mid, |&a, &b| {
        coord(window, a, dim)
            .total_cmp(&coord(window, b, dim))
            .then(a.cmp(&b))
    });
    let item = items[mid];

    let node_index = nodes.len();
    nodes.push(Node {
        item,
        dim,
        left: None,
        right: None,
    });

    let (left_items, rest) = items.split_at_mut(mid);
    let right_items = &mut rest[1..];
    let left = build_subtree(window, split_dims, sentinel_dim, nodes, left_items, depth + 1);
    let right = build_subtree(window, split_dims, sentinel_dim, nodes, right_items, depth + 1);

    let node = &mut nodes[node_index];
    node.left = left;
    node.right = right;
    Some(node_index)
}

/// Keeps `best` sorted under the shared candidate ordering, capped at `k`.
fn consider(best: &mut Vec<(f64, usize)>, candidate: (f64, usize), k: usize) {
    let pos = best.partition_point(|entry| cmp_candidates(entry, &candidate) == Ordering::Less);
    if best.len() < k {
        best.insert(pos, candidate);
    } else if pos < k {
        best.insert(pos, candidate);
        best.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::lazy::search::LinearSearch;
    use crate::core::attributes::{AttributeRef, NominalAttribute, NumericAttribute};
    use crate::core::instance_header::InstanceHeader;
    use crate::core::instances::DenseInstance;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn header(num_numeric: usize) -> Arc<InstanceHeader> {
        let mut attrs: Vec<AttributeRef> = (0..num_numeric)
            .map(|i| Arc::new(NumericAttribute::new(format!("a{i}"))) as AttributeRef)
            .collect();
        attrs.push(Arc::new(NominalAttribute::with_values(
            "class".into(),
            vec!["0".into(), "1".into(), "2".into()],
        )) as AttributeRef);
        let class_index = attrs.len() - 1;
        Arc::new(InstanceHeader::new("rel".into(), attrs, class_index))
    }

    fn grid_window(h: &Arc<InstanceHeader>, n: usize, rng: &mut StdRng) -> SlidingWindow {
        // Values drawn from a tiny grid so distance ties are common.
        let mut w = SlidingWindow::new(n.max(1)).unwrap();
        let dims = h.number_of_attributes() - 1;
        for _ in 0..n {
            let mut values: Vec<f64> = (0..dims).map(|_| rng.random_range(0..4) as f64).collect();
            values.push(rng.random_range(0..3) as f64);
            w.insert(DenseInstance::new(Arc::clone(h), values, 1.0));
        }
        w
    }

    fn assert_same_neighbours(window: &SlidingWindow, class_index: usize, query: &[f64], k: usize) {
        let linear = LinearSearch::new(window, class_index).k_nearest(query, k);
        let tree = KdTreeSearch::build(window, class_index, query.len()).k_nearest(query, k);

        let linear_ranked: Vec<(usize, f64)> = linear.iter().map(|n| (n.index, n.distance)).collect();
        let tree_ranked: Vec<(usize, f64)> = tree.iter().map(|n| (n.index, n.distance)).collect();
        assert_eq!(linear_ranked, tree_ranked, "window size {}", window.len());
    }

    #[test]
    fn matches_linear_search_on_tie_heavy_windows() {
        let h = header(3);
        let class_index = 3;
        let mut rng = StdRng::seed_from_u64(42);

        for n in [1usize, 2, 5, 16, 37, 100] {
            let w = grid_window(&h, n, &mut rng);
            for k in [1usize, 3, 10, 200] {
                for _ in 0..8 {
                    let query: Vec<f64> = (0..3)
                        .map(|_| rng.random_range(0..4) as f64)
                        .chain([0.0])
                        .collect();
                    assert_same_neighbours(&w, class_index, &query, k);
                }
            }
        }
    }

    #[test]
    fn matches_linear_search_with_missing_values() {
        let h = header(2);
        let mut w = SlidingWindow::new(8).unwrap();
        for values in [
            vec![1.0, f64::NAN, 0.0],
            vec![f64::NAN, f64::NAN, 1.0],
            vec![0.0, 0.0, 2.0],
            vec![1.0, 0.0, 0.0],
        ] {
            w.insert(DenseInstance::new(Arc::clone(&h), values, 1.0));
        }

        for k in [1usize, 2, 4] {
            assert_same_neighbours(&w, 2, &[0.5, f64::NAN, 0.0], k);
        }
    }

    #[test]
    fn duplicate_points_keep_insertion_order() {
        let h = header(2);
        let mut w = SlidingWindow::new(4).unwrap();
        for _ in 0..4 {
            w.insert(DenseInstance::new(
                Arc::clone(&h),
                vec![1.0, 1.0, 0.0],
                1.0,
            ));
        }

        let tree = KdTreeSearch::build(&w, 2, 3);
        let found = tree.k_nearest(&[0.0, 0.0, 0.0], 3);
        let indices: Vec<usize> = found.iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn empty_window_and_zero_k() {
        let h = header(2);
        let w = SlidingWindow::new(4).unwrap();
        let tree = KdTreeSearch::build(&w, 2, 3);
        assert!(tree.k_nearest(&[0.0, 0.0, 0.0], 3).is_empty());

        let mut w = SlidingWindow::new(4).unwrap();
        w.insert(DenseInstance::new(Arc::clone(&h), vec![1.0, 1.0, 0.0], 1.0));
        let tree = KdTreeSearch::build(&w, 2, 3);
        assert!(tree.k_nearest(&[0.0, 0.0, 0.0], 0).is_empty());
    }

    #[test]
    fn class_only_schema_still_ranks_by_insertion() {
        // One attribute which is the class itself: every distance is 0.
        let class = Arc::new(NominalAttribute::with_values(
            "class".into(),
            vec!["0".into(), "1".into()],
        )) as AttributeRef;
        let h = Arc::new(InstanceHeader::new("rel".into(), vec![class], 0));

        let mut w = SlidingWindow::new(3).unwrap();
        for label in [1.0, 0.0, 1.0] {
            w.insert(DenseInstance::new(Arc::clone(&h), vec![label], 1.0));
        }

        let tree = KdTreeSearch::build(&w, 0, 1);
        let found = tree.k_nearest(&[0.0], 2);
        let indices: Vec<usize> = found.iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }
}
