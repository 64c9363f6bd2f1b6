use std::collections::{BTreeMap, HashSet, VecDeque};
use std::ptr;
use std::sync::Arc;

/// Utility for estimating the memory consumed by a structure and all of its
/// reachable data. Shared allocations (e.g. `Arc`) are counted once.
#[derive(Default)]
pub struct MemoryMeter {
    visited: HashSet<usize>,
}

impl MemoryMeter {
    #[inline]
    pub fn new() -> Self {
        Self {
            visited: HashSet::new(),
        }
    }

    #[inline]
    fn mark<T: ?Sized>(&mut self, value: &T) -> bool {
        let addr = ptr::from_ref(value) as *const () as usize;
        self.visited.insert(addr)
    }

    #[inline]
    fn measure<T: MemorySized + ?Sized>(&mut self, value: &T) -> usize {
        if self.mark(value) {
            value.inline_size() + value.extra_heap_size(self)
        } else {
            0
        }
    }

    #[inline]
    pub fn measure_root<T: MemorySized + ?Sized>(value: &T) -> usize {
        let mut meter = MemoryMeter::new();
        meter.measure(value)
    }

    /// Measures a field whose inline bytes are already accounted for by the
    /// owner's `inline_size`.
    #[inline]
    pub fn measure_field<T: MemorySized + ?Sized>(&mut self, value: &T) -> usize {
        let total = self.measure(value);
        total.saturating_sub(value.inline_size())
    }
}

pub trait MemorySized {
    fn inline_size(&self) -> usize {
        std::mem::size_of_val(self)
    }

    fn extra_heap_size(&self, _meter: &mut MemoryMeter) -> usize {
        0
    }

    fn deep_size(&self) -> usize
    where
        Self: Sized,
    {
        MemoryMeter::measure_root(self)
    }

    fn measure_with(&self, meter: &mut MemoryMeter) -> usize {
        meter.measure(self)
    }
}

macro_rules! impl_memory_for_primitives {
    ($($t:ty),* $(,)?) => {
        $(impl MemorySized for $t {})*
    };
}

impl_memory_for_primitives!(u8, u16, u32, u64, usize, i32, i64, f32, f64, bool, char);

impl MemorySized for String {
    fn inline_size(&self) -> usize {
        std::mem::size_of::<String>()
    }

    fn extra_heap_size(&self, _meter: &mut MemoryMeter) -> usize {
        self.capacity()
    }
}

impl<T: MemorySized> MemorySized for Vec<T> {
    fn inline_size(&self) -> usize {
        std::mem::size_of::<Vec<T>>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        let mut total = self.capacity() * std::mem::size_of::<T>();
        for item in self.iter() {
            total += meter.measure_field(item);
        }
        total
    }
}

impl<T: MemorySized> MemorySized for VecDeque<T> {
    fn inline_size(&self) -> usize {
        std::mem::size_of::<VecDeque<T>>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        let mut total = self.capacity() * std::mem::size_of::<T>();
        for item in self.iter() {
            total += meter.measure_field(item);
        }
        total
    }
}

impl<K: MemorySized, V: MemorySized> MemorySized for BTreeMap<K, V> {
    fn inline_size(&self) -> usize {
        std::mem::size_of::<BTreeMap<K, V>>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        let mut total = self.len() * (std::mem::size_of::<K>() + std::mem::size_of::<V>());
        for (k, v) in self.iter() {
            total += meter.measure_field(k);
            total += meter.measure_field(v);
        }
        total
    }
}

impl<T: MemorySized> MemorySized for Option<T> {
    fn inline_size(&self) -> usize {
        std::mem::size_of::<Option<T>>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        match self {
            Some(value) => meter.measure_field(value),
            None => 0,
        }
    }
}

impl<T: MemorySized + ?Sized> MemorySized for Arc<T> {
    fn inline_size(&self) -> usize {
        std::mem::size_of::<Arc<T>>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        self.as_ref().measure_with(meter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_counts_capacity_and_items() {
        let mut v: Vec<u64> = Vec::with_capacity(8);
        v.extend([1, 2, 3]);
        let expected = std::mem::size_of::<Vec<u64>>() + 8 * std::mem::size_of::<u64>();
        assert_eq!(v.deep_size(), expected);
    }

    #[test]
    fn shared_arc_counted_once() {
        let shared = Arc::new(String::from("abcdefgh"));
        let pair = vec![Arc::clone(&shared), Arc::clone(&shared)];

        let one = MemoryMeter::measure_root(&shared);
        let both = MemoryMeter::measure_root(&pair);

        // The second handle adds only its inline pointer, not the string again.
        assert!(both < 2 * one + std::mem::size_of::<Vec<Arc<String>>>());
    }

    #[test]
    fn string_adds_heap_capacity() {
        let s = String::with_capacity(32);
        assert_eq!(s.deep_size(), std::mem::size_of::<String>() + 32);
    }
}
