//! Replay buffer storing compressed end-states.
mod base;
mod batch;
mod config;
pub use base::{CompressedReplayBuffer, Transition};
pub use batch::{Batch, BatchView};
pub use config::ReplayBufferConfig;
