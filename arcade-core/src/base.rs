//! Interfaces of replay buffers.
use anyhow::Result;

/// Interface of buffers that store experiences.
pub trait ExperienceBufferBase {
    /// Items pushed into the buffer.
    type Item;

    /// Pushes an item.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// The number of items currently retrievable.
    fn len(&self) -> usize;
}

/// Interface of replay buffers that generate batches for training.
pub trait ReplayBufferBase {
    /// Configuration of the replay buffer.
    type Config: Clone;

    /// Batch generated for training.
    type Batch;

    /// Builds a replay buffer.
    fn build(config: &Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Samples a batch of `size` items.
    fn batch(&mut self, size: usize) -> Result<Self::Batch>;
}
