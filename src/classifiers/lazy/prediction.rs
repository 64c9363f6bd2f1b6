use crate::classifiers::lazy::search::{Neighbour, cmp_candidates, squared_distance};
use crate::classifiers::lazy::{ClassCentroids, SlidingWindow};
use crate::core::instances::Instance;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// How retrieved neighbour targets collapse into one regression estimate.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AggregationMode {
    #[default]
    Mean,
    Median,
}

/// What a regression prediction yields when the window offers no neighbours.
/// An explicit choice: a silent zero would be indistinguishable from a
/// legitimate zero-valued estimate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "value", rename_all = "kebab-case")]
pub enum RegressionFallback {
    #[default]
    Abstain,
    Constant(f64),
}

/// Outcome of a single prediction.
#[derive(Clone, Debug, PartialEq)]
pub enum Prediction {
    /// Per-class vote counts, indexed by label. Winner selection and tie
    /// handling are left to the caller.
    Votes(Vec<f64>),
    /// Numeric estimate for a regression target.
    Estimate(f64),
    /// No neighbours and no fallback: the learner has nothing to say.
    Abstain,
}

impl Prediction {
    /// Flattens into the harness vote-vector convention: estimates become a
    /// single-element vector, abstention an empty one.
    pub fn into_votes(self) -> Vec<f64> {
        match self {
            Prediction::Votes(votes) => votes,
            Prediction::Estimate(estimate) => vec![estimate],
            Prediction::Abstain => Vec::new(),
        }
    }
}

/// One vote per retrieved neighbour, indexed by class label.
pub(crate) fn class_votes(
    window: &SlidingWindow,
    neighbours: &[Neighbour],
    num_labels: usize,
) -> Vec<f64> {
    let mut votes = vec![0.0; num_labels];
    for neighbour in neighbours {
        let label = window.get(neighbour.index).and_then(|i| i.class_label());
        if let Some(label) = label
            && label < votes.len()
        {
            votes[label] += 1.0;
        }
    }
    votes
}

/// Target values of the retrieved neighbour set, in retrieval order.
pub(crate) fn neighbour_targets(window: &SlidingWindow, neighbours: &[Neighbour]) -> Vec<f64> {
    neighbours
        .iter()
        .filter_map(|n| window.get(n.index).and_then(|i| i.class_value()))
        .collect()
}

/// Mean or median of the retrieved targets; `None` when there are none.
pub(crate) fn regression_estimate(targets: &[f64], mode: AggregationMode) -> Option<f64> {
    if targets.is_empty() {
        return None;
    }
    let estimate = match mode {
        AggregationMode::Mean => targets.iter().sum::<f64>() / targets.len() as f64,
        AggregationMode::Median => median(targets.to_vec()),
    };
    Some(estimate)
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// One vote for the class whose centroid lies nearest the query; equidistant
/// centroids resolve to the smaller label. Classes with a zero count carry no
/// information and are skipped.
pub(crate) fn nearest_centroid_votes(
    query: &[f64],
    centroids: &ClassCentroids,
    class_index: usize,
    num_labels: usize,
) -> Vec<f64> {
    let mut votes = vec![0.0; num_labels];
    let mut best: Option<(f64, usize)> = None;

    for (label, _) in centroids.classes() {
        let Ok(centroid) = centroids.centroid(label) else {
            continue;
        };
        let d2 = squared_distance(query, &centroid, class_index);
        let candidate = (d2, label);
        let closer = best.is_none_or(|current| {
            cmp_candidates(&candidate, &current) == std::cmp::Ordering::Less
        });
        if closer {
            best = Some(candidate);
        }
    }

    if let Some((_, label)) = best
        && label < votes.len()
    {
        votes[label] += 1.0;
    }
    votes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attributes::{AttributeRef, NominalAttribute, NumericAttribute};
    use crate::core::instance_header::InstanceHeader;
    use crate::core::instances::DenseInstance;
    use std::sync::Arc;

    fn nominal_header() -> Arc<InstanceHeader> {
        let x = Arc::new(NumericAttribute::new("x".into())) as AttributeRef;
        let class = Arc::new(NominalAttribute::with_values(
            "class".into(),
            vec!["0".into(), "1".into(), "2".into()],
        )) as AttributeRef;
        Arc::new(InstanceHeader::new("rel".into(), vec![x, class], 1))
    }

    fn window_with_labels(labels: &[usize]) -> SlidingWindow {
        let h = nominal_header();
        let mut w = SlidingWindow::new(labels.len()).unwrap();
        for (i, &label) in labels.iter().enumerate() {
            w.insert(DenseInstance::new(
                Arc::clone(&h),
                vec![i as f64, label as f64],
                1.0,
            ));
        }
        w
    }

    fn neighbours(indices: &[usize]) -> Vec<Neighbour> {
        indices
            .iter()
            .map(|&index| Neighbour {
                index,
                distance: 0.0,
            })
            .collect()
    }

    #[test]
    fn each_neighbour_votes_once() {
        let w = window_with_labels(&[0, 1, 1, 2]);
        let votes = class_votes(&w, &neighbours(&[1, 2, 3]), 3);
        assert_eq!(votes, vec![0.0, 2.0, 1.0]);
    }

    #[test]
    fn median_of_even_and_odd_sets() {
        assert_eq!(
            regression_estimate(&[1.0, 2.0, 3.0, 4.0], AggregationMode::Median),
            Some(2.5)
        );
        assert_eq!(
            regression_estimate(&[3.0, 1.0, 2.0], AggregationMode::Median),
            Some(2.0)
        );
    }

    #[test]
    fn mean_of_targets() {
        assert_eq!(
            regression_estimate(&[1.0, 2.0, 6.0], AggregationMode::Mean),
            Some(3.0)
        );
    }

    #[test]
    fn no_targets_means_no_estimate() {
        assert_eq!(regression_estimate(&[], AggregationMode::Mean), None);
        assert_eq!(regression_estimate(&[], AggregationMode::Median), None);
    }

    #[test]
    fn nearest_centroid_takes_the_single_vote() {
        let mut centroids = ClassCentroids::new();
        centroids.on_insert(0, &[0.0, 0.0]).unwrap();
        centroids.on_insert(1, &[10.0, 1.0]).unwrap();

        let votes = nearest_centroid_votes(&[1.0, 0.0], &centroids, 1, 2);
        assert_eq!(votes, vec![1.0, 0.0]);
    }

    #[test]
    fn equidistant_centroids_resolve_to_smaller_label() {
        let mut centroids = ClassCentroids::new();
        centroids.on_insert(2, &[-1.0, 2.0]).unwrap();
        centroids.on_insert(1, &[1.0, 1.0]).unwrap();

        let votes = nearest_centroid_votes(&[0.0, 0.0], &centroids, 1, 3);
        assert_eq!(votes, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn drained_classes_are_skipped() {
        let mut centroids = ClassCentroids::new();
        centroids.on_insert(0, &[0.0, 0.0]).unwrap();
        centroids.on_insert(1, &[5.0, 1.0]).unwrap();
        centroids.on_evict(0, &[0.0, 0.0]).unwrap();

        // Class 0 would be nearer, but it no longer tracks any instance.
        let votes = nearest_centroid_votes(&[0.0, 0.0], &centroids, 1, 2);
        assert_eq!(votes, vec![0.0, 1.0]);
    }

    #[test]
    fn abstain_flattens_to_empty_votes() {
        assert!(Prediction::Abstain.into_votes().is_empty());
        assert_eq!(Prediction::Estimate(1.5).into_votes(), vec![1.5]);
    }
}
