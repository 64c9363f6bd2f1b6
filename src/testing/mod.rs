mod classifier_none_votes;
mod oracle_classifier;
mod train_spy_classifier;
mod vec_stream;

pub use classifier_none_votes::ClassifierNoneVotes;
pub use oracle_classifier::OracleClassifier;
pub use train_spy_classifier::{TrainSpyClassifier, TrainSpyHandle};
pub use vec_stream::VecStream;
