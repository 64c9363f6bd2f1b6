use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::utils::memory::{MemoryMeter, MemorySized};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct DenseInstance {
    header: Arc<InstanceHeader>,
    values: Vec<f64>,
    weight: f64,
}

impl DenseInstance {
    pub fn new(header: Arc<InstanceHeader>, values: Vec<f64>, weight: f64) -> DenseInstance {
        DenseInstance {
            header,
            values,
            weight,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Class value as a non-negative integer label, when it is one.
    pub fn class_label(&self) -> Option<usize> {
        match self.class_value() {
            Some(c) if c >= 0.0 && c.is_finite() => Some(c as usize),
            _ => None,
        }
    }
}

impl Instance for DenseInstance {
    fn weight(&self) -> f64 {
        self.weight
    }

    fn value_at_index(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    fn is_missing_at_index(&self, index: usize) -> bool {
        self.values.get(index).is_none_or(|v| v.is_nan())
    }

    fn number_of_attributes(&self) -> usize {
        self.values.len()
    }

    fn class_value(&self) -> Option<f64> {
        let value = *self.values.get(self.header.class_index())?;
        if value.is_nan() { None } else { Some(value) }
    }

    fn to_vec(&self) -> Vec<f64> {
        self.values.clone()
    }

    fn header(&self) -> &InstanceHeader {
        &self.header
    }
}

impl MemorySized for DenseInstance {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        let mut total = meter.measure_field(&self.header);
        total += self.values.capacity() * size_of::<f64>();
        total
    }
}
