mod centroids;
mod error;
mod knn;
mod prediction;
pub mod search;
mod window;

pub use centroids::{ClassAggregate, ClassCentroids};
pub use error::KnnError;
pub use knn::{Knn, KnnParams};
pub use prediction::{AggregationMode, Prediction, RegressionFallback};
pub use window::SlidingWindow;
