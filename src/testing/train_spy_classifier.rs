use crate::classifiers::Classifier;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

pub struct TrainSpyHandle(Arc<AtomicU64>);

impl TrainSpyHandle {
    pub fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counts training calls; predicts like the oracle so metrics stay sane.
pub struct TrainSpyClassifier {
    count: Arc<AtomicU64>,
    num_classes: usize,
}

impl TrainSpyClassifier {
    pub fn new() -> (Self, TrainSpyHandle) {
        let counter = Arc::new(AtomicU64::new(0));
        (
            Self {
                count: counter.clone(),
                num_classes: 2,
            },
            TrainSpyHandle(counter),
        )
    }
}

impl Classifier for TrainSpyClassifier {
    fn get_votes_for_instance(&self, instance: &dyn Instance) -> Vec<f64> {
        let y = instance.class_value().unwrap_or_default() as usize;
        let mut votes = vec![0.0; self.num_classes.max(2)];
        if y < votes.len() {
            votes[y] = 1.0;
        }
        votes
    }

    fn set_model_context(&mut self, header: Arc<InstanceHeader>) {
        self.num_classes = header.number_of_classes().max(2);
    }

    fn train_on_instance(&mut self, _instance: &dyn Instance) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    fn reset(&mut self) {
        self.count.store(0, Ordering::Relaxed);
    }

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
    }
}
