//! The boundary between the history recorder and trajectory storage.

use crate::error::SimError;
use crate::vector::Vec3;

/// Destination for flushed trajectory samples.
pub trait TrajectorySink {
    /// Write the buffered samples of one body, oldest first.
    fn write_samples(&mut self, name: &str, samples: &[Vec3]) -> Result<(), SimError>;

    /// Complete a flush. Called once after every body has been written.
    fn finish(&mut self) -> Result<(), SimError>;
}
