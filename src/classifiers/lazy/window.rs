use crate::classifiers::lazy::KnnError;
use crate::core::instances::DenseInstance;
use crate::utils::memory::{MemoryMeter, MemorySized};
use std::collections::VecDeque;

/// Bounded FIFO buffer over the most recent training instances.
///
/// Indices are insertion-ordered within the current contents: index 0 is the
/// oldest surviving instance. The search strategies rely on that ordering for
/// deterministic tie-breaking.
pub struct SlidingWindow {
    buffer: VecDeque<DenseInstance>,
    max_size: usize,
}

impl SlidingWindow {
    pub fn new(max_size: usize) -> Result<Self, KnnError> {
        if max_size < 1 {
            return Err(KnnError::Configuration(
                "window max_size must be at least 1".into(),
            ));
        }
        Ok(Self {
            buffer: VecDeque::with_capacity(max_size.min(4096)),
            max_size,
        })
    }

    /// Appends `instance`, evicting the oldest entry first when the window is
    /// full. The evicted instance is handed back so dependent aggregates can
    /// be updated; the size bound holds at every observable point.
    pub fn insert(&mut self, instance: DenseInstance) -> Option<DenseInstance> {
        let evicted = if self.buffer.len() == self.max_size {
            self.buffer.pop_front()
        } else {
            None
        };
        self.buffer.push_back(instance);
        evicted
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn oldest(&self) -> Option<&DenseInstance> {
        self.buffer.front()
    }

    pub fn newest(&self) -> Option<&DenseInstance> {
        self.buffer.back()
    }

    pub fn get(&self, index: usize) -> Option<&DenseInstance> {
        self.buffer.get(index)
    }

    /// Ordered, restartable iteration: oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &DenseInstance> {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl MemorySized for SlidingWindow {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        meter.measure_field(&self.buffer)
    }
}
