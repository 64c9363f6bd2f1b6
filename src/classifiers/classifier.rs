use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use std::sync::Arc;

/// Streaming train/predict contract driven by the evaluation loop, one
/// instance at a time.
pub trait Classifier {
    /// Per-class scores for a nominal target, or a single-element estimate
    /// for a numeric one. An empty vector means the learner abstains.
    fn get_votes_for_instance(&self, instance: &dyn Instance) -> Vec<f64>;

    fn set_model_context(&mut self, header: Arc<InstanceHeader>);

    fn train_on_instance(&mut self, instance: &dyn Instance);

    /// Discards all learned state; a new model context must be supplied
    /// before training resumes.
    fn reset(&mut self);

    fn calc_memory_size(&self) -> usize;
}
