//! Geometry of stacked observations.
use serde::{Deserialize, Serialize};

/// Default side length of a downscaled frame.
pub const FRAME_WIDTH: usize = 84;

/// Default number of frames in an observation stack.
pub const STACK_DEPTH: usize = 4;

/// Geometry of a stacked observation: `stack` square frames of `width` x `width` pixels.
///
/// A state, as stored in the replay buffer, is one such stack laid out
/// contiguously, oldest frame first.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub struct ObsConfig {
    /// Side length of a downscaled frame.
    pub width: usize,

    /// Number of frames in the stack.
    pub stack: usize,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            width: FRAME_WIDTH,
            stack: STACK_DEPTH,
        }
    }
}

impl ObsConfig {
    /// Sets the side length of a frame.
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Sets the depth of the stack.
    pub fn stack(mut self, stack: usize) -> Self {
        self.stack = stack;
        self
    }

    /// Number of pixels in a single frame.
    pub fn frame_size(&self) -> usize {
        self.width * self.width
    }

    /// Number of pixels in a whole stack.
    pub fn state_size(&self) -> usize {
        self.stack * self.frame_size()
    }

    /// Shape of a stack as `[stack, width, width]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.stack, self.width, self.width]
    }
}
