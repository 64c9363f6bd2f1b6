use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use std::sync::Arc;

/// Instance storing only the attributes that differ from zero, as sorted
/// (index, value) pairs. Absent entries read as 0; explicit `NaN` values mark
/// genuinely missing attributes.
#[derive(Clone, Debug)]
pub struct SparseInstance {
    header: Arc<InstanceHeader>,
    indices: Vec<usize>,
    values: Vec<f64>,
    weight: f64,
}

impl SparseInstance {
    pub fn new(
        header: Arc<InstanceHeader>,
        mut pairs: Vec<(usize, f64)>,
        weight: f64,
    ) -> SparseInstance {
        pairs.sort_by_key(|(i, _)| *i);
        let (indices, values) = pairs.into_iter().unzip();
        SparseInstance {
            header,
            indices,
            values,
            weight,
        }
    }

    fn stored_value(&self, index: usize) -> Option<f64> {
        self.indices
            .binary_search(&index)
            .ok()
            .map(|pos| self.values[pos])
    }
}

impl Instance for SparseInstance {
    fn weight(&self) -> f64 {
        self.weight
    }

    fn value_at_index(&self, index: usize) -> Option<f64> {
        if index >= self.number_of_attributes() {
            return None;
        }
        Some(self.stored_value(index).unwrap_or(0.0))
    }

    fn is_missing_at_index(&self, index: usize) -> bool {
        self.value_at_index(index).is_none_or(f64::is_nan)
    }

    fn number_of_attributes(&self) -> usize {
        self.header.number_of_attributes()
    }

    fn class_value(&self) -> Option<f64> {
        let value = self.value_at_index(self.header.class_index())?;
        if value.is_nan() { None } else { Some(value) }
    }

    fn to_vec(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.number_of_attributes()];
        for (pos, &index) in self.indices.iter().enumerate() {
            if index < dense.len() {
                dense[index] = self.values[pos];
            }
        }
        dense
    }

    fn header(&self) -> &InstanceHeader {
        &self.header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attributes::{AttributeRef, NominalAttribute, NumericAttribute};

    fn header(n_numeric: usize) -> Arc<InstanceHeader> {
        let mut attrs: Vec<AttributeRef> = (0..n_numeric)
            .map(|i| Arc::new(NumericAttribute::new(format!("a{i}"))) as AttributeRef)
            .collect();
        attrs.push(Arc::new(NominalAttribute::with_values(
            "class".into(),
            vec!["0".into(), "1".into()],
        )) as AttributeRef);
        let class_index = attrs.len() - 1;
        Arc::new(InstanceHeader::new("rel".into(), attrs, class_index))
    }

    #[test]
    fn absent_entries_read_as_zero() {
        let inst = SparseInstance::new(header(4), vec![(1, 3.0), (4, 1.0)], 1.0);
        assert_eq!(inst.value_at_index(0), Some(0.0));
        assert_eq!(inst.value_at_index(1), Some(3.0));
        assert_eq!(inst.class_value(), Some(1.0));
        assert_eq!(inst.to_vec(), vec![0.0, 3.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn unsorted_pairs_are_normalized() {
        let inst = SparseInstance::new(header(3), vec![(2, 5.0), (0, 1.0)], 1.0);
        assert_eq!(inst.value_at_index(0), Some(1.0));
        assert_eq!(inst.value_at_index(2), Some(5.0));
    }

    #[test]
    fn explicit_nan_is_missing_but_absent_is_not() {
        let inst = SparseInstance::new(header(3), vec![(1, f64::NAN)], 1.0);
        assert!(inst.is_missing_at_index(1));
        assert!(!inst.is_missing_at_index(0));
        assert!(inst.is_missing_at_index(99));
    }
}
