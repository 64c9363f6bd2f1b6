use crate::core::attributes::{Attribute, AttributeRef, NominalAttribute};
use crate::utils::memory::{MemoryMeter, MemorySized};
use std::fmt;

/// Schema shared by every instance of a stream: attribute list plus the index
/// of the class/target attribute.
pub struct InstanceHeader {
    relation_name: String,
    pub attributes: Vec<AttributeRef>,
    class_index: usize,
}

impl InstanceHeader {
    pub fn new(
        relation_name: String,
        attributes: Vec<AttributeRef>,
        class_index: usize,
    ) -> InstanceHeader {
        InstanceHeader {
            relation_name,
            attributes,
            class_index,
        }
    }

    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    pub fn number_of_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn attribute_at_index(&self, index: usize) -> Option<&dyn Attribute> {
        if index < self.attributes.len() {
            Some(self.attributes[index].as_ref())
        } else {
            None
        }
    }

    pub fn index_of_attribute(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name() == name)
    }

    pub fn class_index(&self) -> usize {
        self.class_index
    }

    pub fn class_attribute(&self) -> Option<&dyn Attribute> {
        self.attribute_at_index(self.class_index)
    }

    /// True when the class/target attribute is nominal, i.e. the stream is a
    /// classification problem rather than a regression one.
    pub fn is_class_nominal(&self) -> bool {
        self.class_attribute().is_some_and(|a| a.is_nominal())
    }

    /// Label cardinality of a nominal class attribute; 0 for numeric targets.
    pub fn number_of_classes(&self) -> usize {
        self.class_attribute()
            .and_then(|a| a.as_any().downcast_ref::<NominalAttribute>())
            .map(|n| n.values.len())
            .unwrap_or(0)
    }
}

impl MemorySized for InstanceHeader {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, _meter: &mut MemoryMeter) -> usize {
        let mut total = self.relation_name.capacity();
        total += self.attributes.capacity() * size_of::<AttributeRef>();
        for attr in &self.attributes {
            total += attr.calc_memory_size();
        }
        total
    }
}

impl fmt::Debug for InstanceHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceHeader")
            .field("relation_name", &self.relation_name)
            .field("class_index", &self.class_index)
            .field("n_attributes", &self.attributes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attributes::NumericAttribute;
    use std::sync::Arc;

    fn header_with_nominal_class() -> InstanceHeader {
        let x = Arc::new(NumericAttribute::new("x".into())) as AttributeRef;
        let y = Arc::new(NumericAttribute::new("y".into())) as AttributeRef;
        let class = Arc::new(NominalAttribute::with_values(
            "class".into(),
            vec!["a".into(), "b".into(), "c".into()],
        )) as AttributeRef;
        InstanceHeader::new("rel".into(), vec![x, y, class], 2)
    }

    #[test]
    fn nominal_class_reports_cardinality() {
        let h = header_with_nominal_class();
        assert!(h.is_class_nominal());
        assert_eq!(h.number_of_classes(), 3);
        assert_eq!(h.class_index(), 2);
    }

    #[test]
    fn numeric_class_has_no_cardinality() {
        let x = Arc::new(NumericAttribute::new("x".into())) as AttributeRef;
        let target = Arc::new(NumericAttribute::new("target".into())) as AttributeRef;
        let h = InstanceHeader::new("rel".into(), vec![x, target], 1);
        assert!(!h.is_class_nominal());
        assert_eq!(h.number_of_classes(), 0);
    }

    #[test]
    fn attribute_lookup_by_name_and_index() {
        let h = header_with_nominal_class();
        assert_eq!(h.index_of_attribute("y"), Some(1));
        assert_eq!(h.index_of_attribute("missing"), None);
        assert!(h.attribute_at_index(3).is_none());
        assert_eq!(h.attribute_at_index(0).unwrap().name(), "x");
    }
}
