use crate::core::attributes::Attribute;
use std::any::Any;
use std::collections::HashMap;

#[derive(Clone)]
pub struct NominalAttribute {
    pub name: String,
    pub values: Vec<String>,
    pub label_to_index: HashMap<String, usize>,
}

impl NominalAttribute {
    pub fn new(name: String) -> NominalAttribute {
        NominalAttribute {
            name,
            values: Vec::new(),
            label_to_index: HashMap::new(),
        }
    }

    pub fn with_values(name: String, values: Vec<String>) -> NominalAttribute {
        let label_to_index = values
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), i))
            .collect();
        NominalAttribute {
            name,
            values,
            label_to_index,
        }
    }

    pub fn index_of_value(&self, v: &str) -> Option<usize> {
        self.label_to_index.get(v).copied()
    }

    pub fn value_at(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn number_of_values(&self) -> usize {
        self.values.len()
    }
}

impl Attribute for NominalAttribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn calc_memory_size(&self) -> usize {
        let mut total: usize = 0;

        total += size_of::<Self>();
        total += self.name.capacity();

        total += self.values.capacity() * size_of::<String>();
        total += self.values.iter().map(|s| s.capacity()).sum::<usize>();

        total += self.label_to_index.capacity() * size_of::<(String, usize)>();
        total += self
            .label_to_index
            .keys()
            .map(|k| k.capacity())
            .sum::<usize>();

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_values_builds_reverse_lookup() {
        let attr = NominalAttribute::with_values(
            "outlook".into(),
            vec!["sunny".into(), "overcast".into(), "rainy".into()],
        );
        assert_eq!(attr.index_of_value("overcast"), Some(1));
        assert_eq!(attr.index_of_value("snow"), None);
        assert_eq!(attr.value_at(2), Some("rainy"));
        assert_eq!(attr.number_of_values(), 3);
    }

    #[test]
    fn reports_as_nominal() {
        let attr = NominalAttribute::new("class".into());
        assert!(attr.is_nominal());
    }
}
