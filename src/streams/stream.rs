use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use std::io::Error;

/// Ordered source of labeled instances, consumed one at a time.
pub trait Stream {
    fn header(&self) -> &InstanceHeader;

    fn has_more_instances(&self) -> bool;

    fn next_instance(&mut self) -> Option<Box<dyn Instance>>;

    /// Rewinds to the first instance, when the source supports it.
    fn restart(&mut self) -> Result<(), Error>;
}
