use crate::core::attributes::Attribute;
use std::any::Any;

#[derive(Clone)]
pub struct NumericAttribute {
    pub name: String,
}

impl NumericAttribute {
    pub fn new(name: String) -> NumericAttribute {
        NumericAttribute { name }
    }
}

impl Attribute for NumericAttribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>() + self.name.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_as_numeric() {
        let attr = NumericAttribute::new("temperature".into());
        assert!(!attr.is_nominal());
        assert_eq!(attr.name(), "temperature");
    }
}
