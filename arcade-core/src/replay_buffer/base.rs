//! Replay buffer storing compressed end-states.
use super::{Batch, BatchView, ReplayBufferConfig};
use crate::{
    codec::{Lz4Codec, StateCodec},
    error::ArcadeError,
    random::{RangeSource, StdRangeSource},
    ExperienceBufferBase, ReplayBufferBase,
};
use anyhow::Result;
use log::{info, trace};

/// A transition pushed through [`ExperienceBufferBase::push`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Action taken.
    pub action: u8,

    /// Reward received.
    pub reward: f32,

    /// State after the action.
    pub end_state: Vec<u8>,

    /// Episode ended with this transition.
    pub done: bool,
}

/// A fixed-capacity circular replay buffer.
///
/// Only the end-state of each transition is stored; the start-state of the
/// transition at slot `i` is the end-state at slot `i - 1`. Slots are
/// overwritten in circular order and never removed or reordered, which keeps
/// that pairing valid for every slot except the oldest one.
pub struct CompressedReplayBuffer<C = Lz4Codec, R = StdRangeSource>
where
    C: StateCodec,
    R: RangeSource,
{
    capacity: usize,
    state_len: usize,

    // Next slot to write.
    i: usize,

    // Number of retrievable transitions.
    size: usize,

    actions: Vec<u8>,
    rewards: Vec<f32>,
    end_states: Vec<Box<[u8]>>,
    dones: Vec<f32>,

    codec: C,
    source: R,
    scratch: Vec<u8>,
}

impl CompressedReplayBuffer {
    /// Constructs a buffer with the LZ4 codec and a [`StdRangeSource`].
    pub fn new(config: &ReplayBufferConfig) -> Result<Self> {
        Self::with_parts(config, Lz4Codec, StdRangeSource::new(config.seed))
    }
}

impl<C, R> CompressedReplayBuffer<C, R>
where
    C: StateCodec,
    R: RangeSource,
{
    /// Constructs a buffer with the given codec and random source.
    pub fn with_parts(config: &ReplayBufferConfig, codec: C, source: R) -> Result<Self> {
        let capacity = config.capacity;
        if capacity < 2 {
            return Err(ArcadeError::SamplingUnderflow { len: capacity }.into());
        }
        info!(
            "Construct replay buffer with capacity = {}, state length = {}",
            capacity, config.state_len
        );
        let scratch = vec![0; codec.compress_bound(config.state_len)];

        Ok(Self {
            capacity,
            state_len: config.state_len,
            i: 0,
            size: 0,
            actions: vec![0; capacity],
            rewards: vec![0.0; capacity],
            end_states: vec![Box::default(); capacity],
            dones: vec![0.0; capacity],
            codec,
            source,
            scratch,
        })
    }

    /// The number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Length of a state in bytes.
    pub fn state_len(&self) -> usize {
        self.state_len
    }

    /// The slot written by the next [`add`](Self::add).
    pub fn position(&self) -> usize {
        self.i
    }

    /// The number of stored transitions.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if nothing was added yet.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Stores a transition, overwriting the oldest one when full.
    ///
    /// Nothing is written if compression fails.
    pub fn add(&mut self, action: u8, reward: f32, end_state: &[u8], done: bool) -> Result<()> {
        if end_state.len() != self.state_len {
            return Err(ArcadeError::BufferLength {
                what: "end_state",
                expected: self.state_len,
                actual: end_state.len(),
            }
            .into());
        }
        let compressed = self.codec.compress(end_state, &mut self.scratch)?;
        trace!(
            "Add transition at {} ({} -> {} bytes)",
            self.i,
            end_state.len(),
            compressed.len()
        );

        self.end_states[self.i] = compressed;
        self.actions[self.i] = action;
        self.rewards[self.i] = reward;
        self.dones[self.i] = if done { 1.0 } else { 0.0 };

        self.i = if self.i + 1 == self.capacity { 0 } else { self.i + 1 };
        if self.size < self.capacity {
            self.size += 1;
        }

        Ok(())
    }

    /// Draws `n` slot indices whose predecessor holds the matching start-state.
    ///
    /// Indices are uniform over `[1, len - 1]`. Once the buffer has wrapped,
    /// the slot at [`position`](Self::position) holds the oldest transition and
    /// its predecessor the newest one, so it is left out.
    pub fn sample_indices(&mut self, n: usize) -> Result<Vec<usize>> {
        let wrapped = self.size == self.capacity && self.i != 0;
        let n_valid = if wrapped { self.size - 2 } else { self.size.saturating_sub(1) };
        if n_valid == 0 {
            return Err(ArcadeError::SamplingUnderflow { len: self.size }.into());
        }

        let ixs = (0..n)
            .map(|_| {
                let ix = self.source.draw(1, n_valid);
                if wrapped && ix >= self.i {
                    ix + 1
                } else {
                    ix
                }
            })
            .collect();
        Ok(ixs)
    }

    /// Fills `batch` with uniformly sampled transitions.
    ///
    /// The number of samples is `batch.len()`.
    pub fn sample_into(&mut self, mut batch: BatchView<'_>) -> Result<()> {
        if batch.state_len() != self.state_len {
            return Err(ArcadeError::BufferLength {
                what: "batch state",
                expected: self.state_len,
                actual: batch.state_len(),
            }
            .into());
        }
        let ixs = self.sample_indices(batch.len())?;
        trace!("Sampled indices {:?}", ixs);

        for (k, &ix) in ixs.iter().enumerate() {
            let prev = if ix == 0 { self.capacity - 1 } else { ix - 1 };
            self.codec
                .decompress(&self.end_states[prev], batch.state_mut(k))?;
            self.codec
                .decompress(&self.end_states[ix], batch.end_state_mut(k))?;
            batch.set_scalars(k, self.actions[ix], self.rewards[ix], self.dones[ix]);
        }

        Ok(())
    }

    /// Fills the items `offset..offset + count` of `batch` with sampled transitions.
    ///
    /// The rest of `batch` is left untouched, so several buffers can fill
    /// disjoint ranges of one shared batch.
    pub fn sample_range(&mut self, batch: BatchView<'_>, offset: usize, count: usize) -> Result<()> {
        self.sample_into(batch.into_range(offset, count)?)
    }

    /// Draws an integer uniformly from `[1, n]`. Returns `None` if `n` is zero.
    pub fn sample_integer(&mut self, n: usize) -> Option<usize> {
        if n == 0 {
            None
        } else {
            Some(self.source.draw(1, n))
        }
    }
}

impl<C, R> ExperienceBufferBase for CompressedReplayBuffer<C, R>
where
    C: StateCodec,
    R: RangeSource,
{
    type Item = Transition;

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        self.add(tr.action, tr.reward, &tr.end_state, tr.done)
    }

    fn len(&self) -> usize {
        self.size
    }
}

impl ReplayBufferBase for CompressedReplayBuffer {
    type Config = ReplayBufferConfig;
    type Batch = Batch;

    fn build(config: &Self::Config) -> Result<Self> {
        Self::new(config)
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        let mut batch = Batch::with_capacity(size, self.state_len);
        self.sample_into(batch.view_mut())?;
        Ok(batch)
    }
}
