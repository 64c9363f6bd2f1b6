use crate::core::attributes::{AttributeRef, NominalAttribute, NumericAttribute};
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::{DenseInstance, Instance};
use crate::streams::Stream;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{Error, ErrorKind};
use std::sync::Arc;

/// Unbounded synthetic stream: one isotropic Gaussian cluster per class,
/// centers drawn once from the seed. Instances are sampled by picking a class
/// uniformly and adding normal noise to its center.
pub struct ClusterGenerator {
    header: Arc<InstanceHeader>,
    centers: Vec<Vec<f64>>,
    spread: f64,
    seed: u64,
    rng: StdRng,
}

impl ClusterGenerator {
    pub fn new(
        num_classes: usize,
        num_attributes: usize,
        spread: f64,
        seed: u64,
    ) -> Result<Self, Error> {
        if num_classes < 2 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "generator needs at least 2 classes",
            ));
        }
        if num_attributes < 1 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "generator needs at least 1 attribute",
            ));
        }
        if !(spread.is_finite() && spread >= 0.0) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "spread must be finite and non-negative",
            ));
        }

        let mut attributes: Vec<AttributeRef> = (0..num_attributes)
            .map(|i| Arc::new(NumericAttribute::new(format!("a{i}"))) as AttributeRef)
            .collect();
        let labels = (0..num_classes).map(|c| format!("c{c}")).collect();
        attributes
            .push(Arc::new(NominalAttribute::with_values("class".into(), labels)) as AttributeRef);
        let class_index = num_attributes;
        let header = Arc::new(InstanceHeader::new(
            "clusters".into(),
            attributes,
            class_index,
        ));

        let mut center_rng = StdRng::seed_from_u64(seed);
        let centers = (0..num_classes)
            .map(|_| {
                (0..num_attributes)
                    .map(|_| center_rng.random::<f64>() * 10.0)
                    .collect()
            })
            .collect();

        Ok(Self {
            header,
            centers,
            spread,
            seed,
            rng: Self::data_rng(seed),
        })
    }

    fn data_rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed.wrapping_add(1))
    }

    /// Standard normal deviate via Box-Muller.
    fn normal(&mut self) -> f64 {
        let u1 = 1.0 - self.rng.random::<f64>();
        let u2 = self.rng.random::<f64>();
        libm::sqrt(-2.0 * libm::log(u1)) * libm::cos(2.0 * std::f64::consts::PI * u2)
    }
}

impl Stream for ClusterGenerator {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        true
    }

    fn next_instance(&mut self) -> Option<Box<dyn Instance>> {
        let label = self.rng.random_range(0..self.centers.len());

        let num_attributes = self.header.number_of_attributes() - 1;
        let mut values = Vec::with_capacity(num_attributes + 1);
        for dim in 0..num_attributes {
            let noise = self.spread * self.normal();
            values.push(self.centers[label][dim] + noise);
        }
        values.push(label as f64);

        Some(Box::new(DenseInstance::new(
            Arc::clone(&self.header),
            values,
            1.0,
        )))
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.rng = Self::data_rng(self.seed);
        Ok(())
    }
}
