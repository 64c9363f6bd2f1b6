use crate::classifiers::Classifier;
use crate::core::instance_header::InstanceHeader;
use crate::evaluation::{LearningCurve, PerformanceEvaluator, Snapshot};
use crate::streams::Stream;
use std::collections::BTreeMap;
use std::io::{Error, ErrorKind};
use std::sync::Arc;
use std::sync::mpsc::Sender;

use cpu_time::ThreadTime;

/// Interleaved test-then-train evaluation: every instance is first predicted
/// on, then learned from, and metrics are sampled periodically into a
/// learning curve.
pub struct PrequentialEvaluator {
    learner: Box<dyn Classifier>,
    stream: Box<dyn Stream>,
    evaluator: Box<dyn PerformanceEvaluator>,

    curve: LearningCurve,

    max_instances: Option<u64>,
    max_seconds: Option<u64>,
    sample_frequency: u64,
    mem_check_frequency: u64,

    processed: u64,

    start_cpu: ThreadTime,
    last_cpu_mem: ThreadTime,

    ram_hours: f64,
    progress_tx: Option<Sender<Snapshot>>,
}

impl PrequentialEvaluator {
    pub fn new(
        mut learner: Box<dyn Classifier>,
        stream: Box<dyn Stream>,
        evaluator: Box<dyn PerformanceEvaluator>,
        max_instances: Option<u64>,
        max_seconds: Option<u64>,
        sample_frequency: u64,
        mem_check_frequency: u64,
    ) -> Result<Self, Error> {
        if sample_frequency == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "sample_frequency must be > 0",
            ));
        }
        if mem_check_frequency == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "mem_check_frequency must be > 0",
            ));
        }

        let source = stream.header();
        let header = Arc::new(InstanceHeader::new(
            source.relation_name().to_string(),
            source.attributes.clone(),
            source.class_index(),
        ));
        learner.set_model_context(header);

        let now = ThreadTime::now();
        Ok(Self {
            learner,
            stream,
            evaluator,
            curve: LearningCurve::default(),
            max_instances,
            max_seconds,
            sample_frequency,
            mem_check_frequency,
            processed: 0,
            start_cpu: now,
            last_cpu_mem: now,
            ram_hours: 0.0,
            progress_tx: None,
        })
    }

    pub fn with_progress(mut self, tx: Sender<Snapshot>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn run(&mut self) -> Result<(), Error> {
        self.start_cpu = ThreadTime::now();
        self.last_cpu_mem = self.start_cpu;

        while self.stream.has_more_instances() && !self.reached_limits() {
            let Some(instance) = self.stream.next_instance() else {
                break;
            };
            self.processed += 1;

            let votes = self.learner.get_votes_for_instance(&*instance);
            self.evaluator.add_result(&*instance, votes);
            self.learner.train_on_instance(instance.as_ref());

            if self.processed % self.mem_check_frequency == 0 {
                self.bump_ram_hours();
            }
            if self.processed % self.sample_frequency == 0 {
                self.push_snapshot();
            }
        }

        self.bump_ram_hours();
        self.push_snapshot();
        Ok(())
    }

    pub fn curve(&self) -> &LearningCurve {
        &self.curve
    }

    fn reached_limits(&self) -> bool {
        if let Some(n) = self.max_instances
            && self.processed >= n
        {
            return true;
        }
        if let Some(s) = self.max_seconds
            && self.start_cpu.elapsed().as_secs() >= s
        {
            return true;
        }
        false
    }

    fn push_snapshot(&mut self) {
        let seconds = self.start_cpu.elapsed().as_secs_f64();

        let mut accuracy = f64::NAN;
        let mut kappa = f64::NAN;
        let mut extras = BTreeMap::new();
        for m in self.evaluator.performance() {
            match m.name.as_str() {
                "accuracy" => accuracy = m.value,
                "kappa" => kappa = m.value,
                other => {
                    extras.insert(other.to_string(), m.value);
                }
            }
        }

        let snapshot = Snapshot {
            instances_seen: self.processed,
            accuracy,
            kappa,
            ram_hours: self.ram_hours,
            seconds,
            extras,
        };

        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(snapshot.clone());
        }
        self.curve.push(snapshot);
    }

    fn bump_ram_hours(&mut self) {
        let dt = self.last_cpu_mem.elapsed();
        self.last_cpu_mem = ThreadTime::now();

        let dt_hours = dt.as_secs_f64() / 3600.0;
        let model_gb = (self.learner.calc_memory_size() as f64) / (1024.0 * 1024.0 * 1024.0);
        self.ram_hours += model_gb * dt_hours;
    }
}
