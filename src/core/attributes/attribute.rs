use super::{NominalAttribute, NumericAttribute};
use crate::utils::memory::{MemoryMeter, MemorySized};
use std::any::Any;
use std::sync::Arc;

pub type AttributeRef = Arc<dyn Attribute + Send + Sync>;

pub trait Attribute: Any + Send + Sync {
    fn name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    fn is_nominal(&self) -> bool {
        self.as_any().is::<NominalAttribute>()
    }

    fn calc_memory_size(&self) -> usize;
}

impl MemorySized for dyn Attribute + Send + Sync {
    fn inline_size(&self) -> usize {
        std::mem::size_of_val(self)
    }

    fn extra_heap_size(&self, _meter: &mut MemoryMeter) -> usize {
        if let Some(nominal) = self.as_any().downcast_ref::<NominalAttribute>() {
            nominal.calc_memory_size() - std::mem::size_of::<NominalAttribute>()
        } else if self.as_any().is::<NumericAttribute>() {
            self.calc_memory_size() - std::mem::size_of::<NumericAttribute>()
        } else {
            0
        }
    }
}
