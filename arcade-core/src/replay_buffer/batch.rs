//! Destinations of sampled transitions.
//!
//! A [`BatchView`] is five parallel mutable slices: start-states, actions,
//! rewards, end-states and done flags. It usually points into memory owned by
//! someone else (a tensor allocation, or a [`Batch`]). A view over an
//! oversized batch can be narrowed with [`BatchView::into_range`] or split with
//! [`BatchView::split_at`], so that several producers fill disjoint parts of
//! one allocation.
use crate::error::ArcadeError;
use anyhow::Result;

/// Mutable views of the five parallel buffers of a batch.
#[derive(Debug)]
pub struct BatchView<'a> {
    states: &'a mut [u8],
    actions: &'a mut [u8],
    rewards: &'a mut [f32],
    end_states: &'a mut [u8],
    dones: &'a mut [f32],
    state_len: usize,
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(ArcadeError::BufferLength {
            what,
            expected,
            actual,
        }
        .into());
    }
    Ok(())
}

impl<'a> BatchView<'a> {
    /// Creates a view, checking that the five buffers hold the same number of items.
    ///
    /// The number of items is taken from `actions`.
    pub fn new(
        states: &'a mut [u8],
        actions: &'a mut [u8],
        rewards: &'a mut [f32],
        end_states: &'a mut [u8],
        dones: &'a mut [f32],
        state_len: usize,
    ) -> Result<Self> {
        let n = actions.len();
        check_len("states", n * state_len, states.len())?;
        check_len("rewards", n, rewards.len())?;
        check_len("end_states", n * state_len, end_states.len())?;
        check_len("dones", n, dones.len())?;

        Ok(Self {
            states,
            actions,
            rewards,
            end_states,
            dones,
            state_len,
        })
    }

    /// The number of items in the view.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if the view holds no items.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Length of a state in bytes.
    pub fn state_len(&self) -> usize {
        self.state_len
    }

    /// Narrows the view to the items `offset..offset + count`.
    pub fn into_range(self, offset: usize, count: usize) -> Result<Self> {
        let capacity = self.len();
        let end = match offset.checked_add(count) {
            Some(end) if end <= capacity => end,
            _ => {
                return Err(ArcadeError::BatchRange {
                    offset,
                    count,
                    capacity,
                }
                .into())
            }
        };
        let Self {
            states,
            actions,
            rewards,
            end_states,
            dones,
            state_len: sl,
        } = self;

        Ok(Self {
            states: &mut states[offset * sl..end * sl],
            actions: &mut actions[offset..end],
            rewards: &mut rewards[offset..end],
            end_states: &mut end_states[offset * sl..end * sl],
            dones: &mut dones[offset..end],
            state_len: sl,
        })
    }

    /// Splits the view into the items `..mid` and `mid..`.
    pub fn split_at(self, mid: usize) -> Result<(Self, Self)> {
        let capacity = self.len();
        if mid > capacity {
            return Err(ArcadeError::BatchRange {
                offset: 0,
                count: mid,
                capacity,
            }
            .into());
        }
        let Self {
            states,
            actions,
            rewards,
            end_states,
            dones,
            state_len: sl,
        } = self;
        let (s0, s1) = states.split_at_mut(mid * sl);
        let (a0, a1) = actions.split_at_mut(mid);
        let (r0, r1) = rewards.split_at_mut(mid);
        let (e0, e1) = end_states.split_at_mut(mid * sl);
        let (d0, d1) = dones.split_at_mut(mid);

        Ok((
            Self {
                states: s0,
                actions: a0,
                rewards: r0,
                end_states: e0,
                dones: d0,
                state_len: sl,
            },
            Self {
                states: s1,
                actions: a1,
                rewards: r1,
                end_states: e1,
                dones: d1,
                state_len: sl,
            },
        ))
    }

    /// Mutable start-state of the `k`-th item.
    pub(super) fn state_mut(&mut self, k: usize) -> &mut [u8] {
        &mut self.states[k * self.state_len..(k + 1) * self.state_len]
    }

    /// Mutable end-state of the `k`-th item.
    pub(super) fn end_state_mut(&mut self, k: usize) -> &mut [u8] {
        &mut self.end_states[k * self.state_len..(k + 1) * self.state_len]
    }

    /// Writes the scalars of the `k`-th item.
    pub(super) fn set_scalars(&mut self, k: usize, action: u8, reward: f32, done: f32) {
        self.actions[k] = action;
        self.rewards[k] = reward;
        self.dones[k] = done;
    }
}

/// An owned batch of transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Start-states, `len * state_len` bytes.
    pub states: Vec<u8>,

    /// Actions.
    pub actions: Vec<u8>,

    /// Rewards.
    pub rewards: Vec<f32>,

    /// End-states, `len * state_len` bytes.
    pub end_states: Vec<u8>,

    /// Done flags, `1.0` or `0.0`.
    pub dones: Vec<f32>,

    state_len: usize,
}

impl Batch {
    /// Creates a zero-filled batch of `capacity` items.
    pub fn with_capacity(capacity: usize, state_len: usize) -> Self {
        Self {
            states: vec![0; capacity * state_len],
            actions: vec![0; capacity],
            rewards: vec![0.0; capacity],
            end_states: vec![0; capacity * state_len],
            dones: vec![0.0; capacity],
            state_len,
        }
    }

    /// The number of items in the batch.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if the batch holds no items.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Start-state of the `k`-th item.
    pub fn state(&self, k: usize) -> &[u8] {
        &self.states[k * self.state_len..(k + 1) * self.state_len]
    }

    /// End-state of the `k`-th item.
    pub fn end_state(&self, k: usize) -> &[u8] {
        &self.end_states[k * self.state_len..(k + 1) * self.state_len]
    }

    /// A view of the whole batch.
    pub fn view_mut(&mut self) -> BatchView<'_> {
        BatchView {
            states: &mut self.states,
            actions: &mut self.actions,
            rewards: &mut self.rewards,
            end_states: &mut self.end_states,
            dones: &mut self.dones,
            state_len: self.state_len,
        }
    }
}
