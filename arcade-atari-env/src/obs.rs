//! Observation pipeline.
//!
//! Raw grayscale frames are captured into two buffers, pooled with a pixelwise
//! max (Atari games often draw sprites on alternate frames), downscaled and
//! written into a ring of `stack` frames. Reading the ring always yields the
//! frames oldest first, wherever the write cursor currently is.
use crate::{atari_env::Emulator, Resize, Resizer};
use anyhow::Result;
use arcade_core::{ArcadeError, ObsConfig};
use ndarray::Array3;

/// Raw frame buffers and the ring of downscaled frames.
pub struct ObservationPipeline<Z: Resize = Resizer> {
    raw_width: usize,
    raw_height: usize,

    // Frames at t-1 and t. The pooled frame is written back into the first one.
    raw_frames: [Vec<u8>; 2],

    // `stack` downscaled frames, contiguous.
    window: Vec<u8>,

    // Slot written by the next update; also the oldest frame.
    cursor: usize,

    config: ObsConfig,
    resizer: Z,
}

impl<Z: Resize> ObservationPipeline<Z> {
    /// Allocates buffers for raw frames of `raw_width` x `raw_height` pixels.
    pub fn new(raw_width: usize, raw_height: usize, config: ObsConfig, resizer: Z) -> Self {
        let raw_len = raw_width * raw_height;
        Self {
            raw_width,
            raw_height,
            raw_frames: [vec![0; raw_len], vec![0; raw_len]],
            window: vec![0; config.state_size()],
            cursor: 0,
            config,
            resizer,
        }
    }

    /// Geometry of the stacked observation.
    pub fn config(&self) -> &ObsConfig {
        &self.config
    }

    /// Index of the ring slot written by the next update.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Raw frame buffer `ix` (0 for t-1, 1 for t).
    pub fn raw_frame_mut(&mut self, ix: usize) -> &mut [u8] {
        &mut self.raw_frames[ix]
    }

    /// Grabs the current screen of `emulator` into raw frame buffer `ix`.
    pub fn capture<E: Emulator + ?Sized>(&mut self, emulator: &E, ix: usize) -> Result<()> {
        let expected = emulator.width() * emulator.height();
        let actual = self.raw_width * self.raw_height;
        if expected != actual {
            return Err(ArcadeError::GeometryMismatch { expected, actual }.into());
        }
        emulator.grayscale(&mut self.raw_frames[ix])
    }

    /// Clears the ring, seeds it with the current screen of `emulator`.
    pub fn reset<E: Emulator + ?Sized>(&mut self, emulator: &E) -> Result<()> {
        self.capture(emulator, 1)?;
        self.window.fill(0);
        self.raw_frames[0].fill(0);
        self.cursor = 0;
        self.update()
    }

    /// Pools the two raw frames, downscales the result into the current slot
    /// and advances the cursor.
    pub fn update(&mut self) -> Result<()> {
        let [prev, curr] = &mut self.raw_frames;
        prev.iter_mut().zip(curr.iter()).for_each(|(a, &b)| *a = (*a).max(b));

        let fs = self.config.frame_size();
        let w = self.config.width;
        let slot = &mut self.window[self.cursor * fs..(self.cursor + 1) * fs];
        self.resizer.resize(
            &self.raw_frames[0],
            (self.raw_width, self.raw_height),
            slot,
            (w, w),
        )?;

        self.cursor += 1;
        if self.cursor == self.config.stack {
            self.cursor = 0;
        }
        Ok(())
    }

    /// Copies the stack, oldest frame first, into `buf`.
    pub fn observation(&self, buf: &mut [u8]) -> Result<()> {
        if buf.len() != self.window.len() {
            return Err(ArcadeError::BufferLength {
                what: "observation",
                expected: self.window.len(),
                actual: buf.len(),
            }
            .into());
        }
        let split = self.cursor * self.config.frame_size();
        let (newer, older) = self.window.split_at(split);
        buf[..older.len()].copy_from_slice(older);
        buf[older.len()..].copy_from_slice(newer);
        Ok(())
    }

    /// The stack as an array of shape `(stack, width, width)`, oldest frame first.
    pub fn to_array(&self) -> Result<Array3<u8>> {
        let mut buf = vec![0; self.window.len()];
        self.observation(&mut buf)?;
        let [d, h, w] = self.config.shape();
        Ok(Array3::from_shape_vec((d, h, w), buf)?)
    }
}
