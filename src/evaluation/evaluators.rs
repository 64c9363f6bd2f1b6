use crate::core::instances::Instance;
use crate::evaluation::{Estimator, Measurement};

/// Consumes one (instance, votes) pair per stream step and reports metrics on
/// demand. Empty vote vectors mean the learner abstained; nothing is
/// recorded for that step.
pub trait PerformanceEvaluator {
    fn add_result(&mut self, instance: &dyn Instance, votes: Vec<f64>);

    fn performance(&self) -> Vec<Measurement>;
}

pub trait PerformanceEvaluatorExt: PerformanceEvaluator {
    fn metric(&self, name: &str) -> Option<f64> {
        self.performance()
            .into_iter()
            .find(|m| m.name == name)
            .map(|m| m.value)
    }
}

impl<T: PerformanceEvaluator + ?Sized> PerformanceEvaluatorExt for T {}

/// Accuracy and Cohen's kappa over a running confusion matrix, optionally
/// macro-averaged precision/recall/F1.
pub struct BasicClassificationEvaluator<E: Estimator> {
    accuracy: E,
    // confusion[actual][predicted], grown on demand
    confusion: Vec<Vec<f64>>,
    weight_seen: f64,
    emit_per_class: bool,
}

impl<E: Estimator + Default> BasicClassificationEvaluator<E> {
    pub fn new_with_default_flags(num_classes: usize) -> Self {
        Self::new_with_flags(num_classes, false)
    }

    pub fn new_with_flags(num_classes: usize, emit_per_class: bool) -> Self {
        let n = num_classes.max(2);
        Self {
            accuracy: E::default(),
            confusion: vec![vec![0.0; n]; n],
            weight_seen: 0.0,
            emit_per_class,
        }
    }
}

impl<E: Estimator> BasicClassificationEvaluator<E> {
    fn ensure_size(&mut self, label: usize) {
        let needed = label + 1;
        if needed <= self.confusion.len() {
            return;
        }
        for row in &mut self.confusion {
            row.resize(needed, 0.0);
        }
        while self.confusion.len() < needed {
            self.confusion.push(vec![0.0; needed]);
        }
    }

    fn kappa(&self) -> f64 {
        if self.weight_seen <= 0.0 {
            return 0.0;
        }
        let total = self.weight_seen;
        let n = self.confusion.len();

        let mut correct = 0.0;
        let mut chance = 0.0;
        for i in 0..n {
            correct += self.confusion[i][i];
            let row: f64 = self.confusion[i].iter().sum();
            let col: f64 = self.confusion.iter().map(|r| r[i]).sum();
            chance += (row / total) * (col / total);
        }

        let p0 = correct / total;
        if (1.0 - chance).abs() < f64::EPSILON {
            return 0.0;
        }
        (p0 - chance) / (1.0 - chance)
    }

    fn per_class(&self) -> (f64, f64, f64) {
        let n = self.confusion.len();
        let mut precisions = Vec::new();
        let mut recalls = Vec::new();

        for i in 0..n {
            let tp = self.confusion[i][i];
            let row: f64 = self.confusion[i].iter().sum();
            let col: f64 = self.confusion.iter().map(|r| r[i]).sum();
            if row > 0.0 {
                recalls.push(tp / row);
            }
            if col > 0.0 {
                precisions.push(tp / col);
            }
        }

        let mean = |xs: &[f64]| {
            if xs.is_empty() {
                f64::NAN
            } else {
                xs.iter().sum::<f64>() / xs.len() as f64
            }
        };
        let precision = mean(&precisions);
        let recall = mean(&recalls);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            f64::NAN
        };
        (precision, recall, f1)
    }
}

impl<E: Estimator> PerformanceEvaluator for BasicClassificationEvaluator<E> {
    fn add_result(&mut self, instance: &dyn Instance, votes: Vec<f64>) {
        let Some(truth) = instance.class_value() else {
            return;
        };
        if truth < 0.0 || !truth.is_finite() {
            return;
        }
        if votes.is_empty() {
            return;
        }

        let truth = truth as usize;
        // Tied votes resolve to the lowest label.
        let mut predicted = 0;
        for (i, v) in votes.iter().enumerate() {
            if *v > votes[predicted] {
                predicted = i;
            }
        }

        let weight = instance.weight().max(0.0);
        if weight == 0.0 {
            return;
        }

        self.ensure_size(truth.max(predicted));
        self.confusion[truth][predicted] += weight;
        self.weight_seen += weight;
        self.accuracy
            .add(if truth == predicted { 1.0 } else { 0.0 }, weight);
    }

    fn performance(&self) -> Vec<Measurement> {
        let mut out = vec![
            Measurement::new("accuracy", self.accuracy.estimation()),
            Measurement::new("kappa", self.kappa()),
        ];
        if self.emit_per_class {
            let (precision, recall, f1) = self.per_class();
            out.push(Measurement::new("precision", precision));
            out.push(Measurement::new("recall", recall));
            out.push(Measurement::new("f1", f1));
        }
        out
    }
}

/// Mean absolute and root-mean-squared error for numeric targets. The
/// estimate is the first vote-vector entry.
#[derive(Default)]
pub struct BasicRegressionEvaluator {
    weight_seen: f64,
    abs_error: f64,
    squared_error: f64,
}

impl BasicRegressionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PerformanceEvaluator for BasicRegressionEvaluator {
    fn add_result(&mut self, instance: &dyn Instance, votes: Vec<f64>) {
        let Some(truth) = instance.class_value() else {
            return;
        };
        let Some(estimate) = votes.first() else {
            return;
        };
        let weight = instance.weight().max(0.0);
        if weight == 0.0 {
            return;
        }

        let error = estimate - truth;
        self.abs_error += error.abs() * weight;
        self.squared_error += error * error * weight;
        self.weight_seen += weight;
    }

    fn performance(&self) -> Vec<Measurement> {
        let mae = self.abs_error / self.weight_seen;
        let rmse = (self.squared_error / self.weight_seen).sqrt();
        vec![
            Measurement::new("accuracy", f64::NAN),
            Measurement::new("kappa", 0.0),
            Measurement::new("mae", mae),
            Measurement::new("rmse", rmse),
        ]
    }
}
