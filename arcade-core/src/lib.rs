#![warn(missing_docs)]
//! Compressed experience replay for Atari reinforcement learning.
//!
//! [`CompressedReplayBuffer`] stores transitions `(action, reward, end_state, done)`
//! in fixed-size circular arrays. Only the end-state of each transition is kept,
//! LZ4-compressed; the start-state of transition `i` is the end-state of
//! transition `i - 1`. Batches are written into caller-owned memory through
//! [`BatchView`], which can also address a sub-range of a larger allocation.
//!
//! ```
//! use arcade_core::{Batch, CompressedReplayBuffer, ReplayBufferConfig};
//! # fn main() -> anyhow::Result<()> {
//! let config = ReplayBufferConfig::default().capacity(8).state_len(16).seed(Some(42));
//! let mut buffer = CompressedReplayBuffer::new(&config)?;
//! for t in 0..10u8 {
//!     buffer.add(t, 1.0, &[t; 16], false)?;
//! }
//!
//! let mut batch = Batch::with_capacity(32, 16);
//! buffer.sample_range(batch.view_mut(), 4, 5)?;
//! # Ok(())
//! # }
//! ```
pub mod codec;
pub mod error;
pub mod random;
pub mod replay_buffer;

mod base;
pub use base::{ExperienceBufferBase, ReplayBufferBase};

mod shape;
pub use shape::{ObsConfig, FRAME_WIDTH, STACK_DEPTH};

pub use error::ArcadeError;
pub use replay_buffer::{Batch, BatchView, CompressedReplayBuffer, ReplayBufferConfig, Transition};
