use crate::classifiers::Classifier;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use std::sync::Arc;

/// Votes for the true class of every instance. Perfect accuracy by
/// construction, useful for exercising evaluators and harnesses.
#[derive(Default)]
pub struct OracleClassifier {
    num_classes: usize,
}

impl Classifier for OracleClassifier {
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

    fn train_on_instance(&mut self, _instance: &dyn Instance) {}

    fn reset(&mut self) {
        self.num_classes = 0;
    }

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
    }
}
