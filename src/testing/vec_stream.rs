use crate::core::attributes::{AttributeRef, NominalAttribute, NumericAttribute};
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::{DenseInstance, Instance};
use crate::streams::Stream;
use std::io::Error;
use std::sync::Arc;

/// In-memory stream over a fixed list of instances.
pub struct VecStream {
    header: Arc<InstanceHeader>,
    data: Vec<DenseInstance>,
    position: usize,
}

impl VecStream {
    /// One numeric attribute mirroring the label, plus a nominal class:
    /// enough structure for harness tests.
    pub fn new(labels: Vec<usize>) -> Self {
        let num_classes = labels.iter().max().map_or(2, |m| (m + 1).max(2));
        let x = Arc::new(NumericAttribute::new("x".into())) as AttributeRef;
        let class_labels = (0..num_classes).map(|c| c.to_string()).collect();
        let class =
            Arc::new(NominalAttribute::with_values("class".into(), class_labels)) as AttributeRef;
        let header = Arc::new(InstanceHeader::new("vec".into(), vec![x, class], 1));

        let data = labels
            .into_iter()
            .map(|label| {
                DenseInstance::new(Arc::clone(&header), vec![label as f64, label as f64], 1.0)
            })
            .collect();

        Self {
            header,
            data,
            position: 0,
        }
    }

    pub fn with_instances(header: Arc<InstanceHeader>, data: Vec<DenseInstance>) -> Self {
        Self {
            header,
            data,
            position: 0,
        }
    }
}

impl Stream for VecStream {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        self.position < self.data.len()
    }

    fn next_instance(&mut self) -> Option<Box<dyn Instance>> {
        let instance = self.data.get(self.position)?.clone();
        self.position += 1;
        Some(Box::new(instance))
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.position = 0;
        Ok(())
    }
}
