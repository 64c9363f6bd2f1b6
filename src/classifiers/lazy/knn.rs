use crate::classifiers::Classifier;
use crate::classifiers::lazy::prediction::{
    class_votes, nearest_centroid_votes, neighbour_targets, regression_estimate,
};
use crate::classifiers::lazy::search::{
    KdTreeSearch, LinearSearch, Neighbour, NeighbourSearch, SearchStrategy,
};
use crate::classifiers::lazy::{
    AggregationMode, ClassCentroids, KnnError, Prediction, RegressionFallback, SlidingWindow,
};
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::{DenseInstance, Instance};
use crate::utils::memory::{MemoryMeter, MemorySized};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Knobs of the windowed k-NN learner, fixed once a model context arrives.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnParams {
    /// Number of neighbours consulted per prediction.
    pub k: usize,
    /// Maximum number of instances kept in the sliding window.
    pub max_size: usize,
    pub search: SearchStrategy,
    /// Regression only; ignored for nominal targets.
    pub aggregation: AggregationMode,
    /// Vote with the nearest class centroid instead of raw neighbours.
    pub centroid_mode: bool,
    /// Regression behavior when no neighbour is available.
    pub fallback: RegressionFallback,
}

impl Default for KnnParams {
    fn default() -> Self {
        Self {
            k: 10,
            max_size: 1000,
            search: SearchStrategy::default(),
            aggregation: AggregationMode::default(),
            centroid_mode: false,
            fallback: RegressionFallback::default(),
        }
    }
}

impl KnnParams {
    pub fn validate(&self) -> Result<(), KnnError> {
        if self.k < 1 {
            return Err(KnnError::Configuration("k must be at least 1".into()));
        }
        if self.max_size < 1 {
            return Err(KnnError::Configuration(
                "window max_size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Validation that needs the schema as well.
    pub fn validate_for(&self, header: &InstanceHeader) -> Result<(), KnnError> {
        self.validate()?;
        if self.centroid_mode && !header.is_class_nominal() {
            return Err(KnnError::Configuration(
                "centroid mode requires a nominal class attribute".into(),
            ));
        }
        Ok(())
    }
}

/// Lazy nearest-neighbour learner over a bounded sliding window.
///
/// Training inserts into the window, evicting the oldest instance when full,
/// and keeps the per-class centroid aggregates in step with both halves of
/// that exchange. Prediction is read-only: it queries the configured search
/// strategy (or the class centroids) against the current window contents.
pub struct Knn {
    params: KnnParams,
    header: Option<Arc<InstanceHeader>>,
    window: SlidingWindow,
    centroids: ClassCentroids,
    /// Highest class label observed so far; sizes the vote vector. Owned
    /// here, never process-wide.
    max_label_seen: usize,
}

impl Knn {
    pub fn new() -> Self {
        Self::with_params(KnnParams::default()).expect("default parameters are valid")
    }

    pub fn with_params(params: KnnParams) -> Result<Self, KnnError> {
        params.validate()?;
        Ok(Self {
            window: SlidingWindow::new(params.max_size)?,
            params,
            header: None,
            centroids: ClassCentroids::new(),
            max_label_seen: 0,
        })
    }

    /// Binds the learner to a schema, clearing any previously learned state.
    pub fn configure(&mut self, header: Arc<InstanceHeader>) -> Result<(), KnnError> {
        self.params.validate_for(&header)?;
        self.header = Some(header);
        self.window.clear();
        self.centroids.clear();
        self.max_label_seen = 0;
        Ok(())
    }

    /// Back to the unconfigured state, discarding window and aggregates.
    pub fn reset(&mut self) {
        self.header = None;
        self.window.clear();
        self.centroids.clear();
        self.max_label_seen = 0;
    }

    pub fn params(&self) -> &KnnParams {
        &self.params
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn centroids(&self) -> &ClassCentroids {
        &self.centroids
    }

    pub fn max_label_seen(&self) -> usize {
        self.max_label_seen
    }

    /// Absorbs one labeled instance: evict-if-full, insert, and update the
    /// class aggregates for both the evicted and the inserted instance.
    pub fn learn(&mut self, instance: &dyn Instance) -> Result<(), KnnError> {
        let header = match self.header.as_ref() {
            Some(header) => Arc::clone(header),
            None => return Err(KnnError::Unconfigured),
        };
        if instance.number_of_attributes() != header.number_of_attributes() {
            return Err(KnnError::MalformedInstance {
                expected: header.number_of_attributes(),
                got: instance.number_of_attributes(),
            });
        }
        if instance.weight() <= 0.0 {
            return Ok(());
        }

        let nominal = header.is_class_nominal();
        let values = instance.to_vec();
        let entry = DenseInstance::new(Arc::clone(&header), values.clone(), instance.weight());

        let label = if nominal {
            match entry.class_label() {
                Some(label) => Some(label),
                // Unlabeled instances carry nothing to learn from.
                None => return Ok(()),
            }
        } else {
            if instance.class_value().is_none() {
                return Ok(());
            }
            None
        };

        let evicted = self.window.insert(entry);
        if let Some(label) = label {
            if let Some(old) = &evicted {
                let old_label = old.class_label().ok_or_else(|| {
                    KnnError::StateCorruption("windowed instance has no class label".into())
                })?;
                self.centroids.on_evict(old_label, old.values())?;
            }
            self.centroids.on_insert(label, &values)?;
            if label > self.max_label_seen {
                self.max_label_seen = label;
            }
        }
        Ok(())
    }

    /// Read-only prediction for one instance. Window and aggregates are
    /// never touched.
    pub fn prediction_for(&self, instance: &dyn Instance) -> Result<Prediction, KnnError> {
        let header = self.header.as_ref().ok_or(KnnError::Unconfigured)?;
        if instance.number_of_attributes() != header.number_of_attributes() {
            return Err(KnnError::MalformedInstance {
                expected: header.number_of_attributes(),
                got: instance.number_of_attributes(),
            });
        }

        let query = instance.to_vec();
        let class_index = header.class_index();
        let num_labels = self.max_label_seen + 1;

        if header.is_class_nominal() {
            if self.params.centroid_mode {
                let votes =
                    nearest_centroid_votes(&query, &self.centroids, class_index, num_labels);
                return Ok(Prediction::Votes(votes));
            }
            let neighbours = self.retrieve(&query, class_index, header.number_of_attributes());
            return Ok(Prediction::Votes(class_votes(
                &self.window,
                &neighbours,
                num_labels,
            )));
        }

        let neighbours = self.retrieve(&query, class_index, header.number_of_attributes());
        let targets = neighbour_targets(&self.window, &neighbours);
        match regression_estimate(&targets, self.params.aggregation) {
            Some(estimate) => Ok(Prediction::Estimate(estimate)),
            None => match self.params.fallback {
                RegressionFallback::Abstain => Ok(Prediction::Abstain),
                RegressionFallback::Constant(value) => Ok(Prediction::Estimate(value)),
            },
        }
    }

    fn retrieve(&self, query: &[f64], class_index: usize, num_attributes: usize) -> Vec<Neighbour> {
        match self.params.search {
            SearchStrategy::Linear => {
                LinearSearch::new(&self.window, class_index).k_nearest(query, self.params.k)
            }
            SearchStrategy::KdTree => KdTreeSearch::build(&self.window, class_index, num_attributes)
                .k_nearest(query, self.params.k),
        }
    }
}

impl Default for Knn {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for Knn {
    fn get_votes_for_instance(&self, instance: &dyn Instance) -> Vec<f64> {
        match self.prediction_for(instance) {
            Ok(prediction) => prediction.into_votes(),
            // One bad query must not halt the stream: empty votes for this
            // prediction only.
            Err(_) => Vec::new(),
        }
    }

    fn set_model_context(&mut self, header: Arc<InstanceHeader>) {
        if let Err(e) = self.configure(header) {
            eprintln!("knn: rejected model context: {e}");
        }
    }

    fn train_on_instance(&mut self, instance: &dyn Instance) {
        match self.learn(instance) {
            Ok(()) => {}
            Err(KnnError::Unconfigured) => {}
            Err(e @ KnnError::StateCorruption(_)) => panic!("{e}"),
            Err(e) => eprintln!("knn: skipping training instance: {e}"),
        }
    }

    fn reset(&mut self) {
        Knn::reset(self);
    }

    fn calc_memory_size(&self) -> usize {
        MemoryMeter::measure_root(self)
    }
}

impl MemorySized for Knn {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        let mut total = meter.measure_field(&self.header);
        total += meter.measure_field(&self.window);
        total += meter.measure_field(&self.centroids);
        total
    }
}
