//! Emulator adapter.
//!
//! [`Emulator`] is the narrow interface the step controller needs from an
//! Atari emulator. [`ale::Ale`] implements it on top of the Arcade Learning
//! Environment (feature `ale`); [`ScriptedEmulator`](crate::util::ScriptedEmulator)
//! implements it for tests.
#[cfg(feature = "ale")]
pub mod ale;
use crate::AtariAction;
use anyhow::Result;
use arcade_core::ArcadeError;

/// Interface of an Atari emulator.
///
/// Sticky actions, if any, are applied inside the emulator.
pub trait Emulator {
    /// Width of the raw screen in pixels.
    fn width(&self) -> usize;

    /// Height of the raw screen in pixels.
    fn height(&self) -> usize;

    /// The minimal set of actions of the loaded game.
    fn minimal_actions(&self) -> Result<Vec<AtariAction>>;

    /// Remaining lives.
    fn lives(&self) -> u32;

    /// Returns `true` if the game is over.
    fn is_game_over(&self) -> bool;

    /// Restarts the game.
    fn reset(&mut self);

    /// Advances one frame and returns the reward.
    fn step(&mut self, action: AtariAction) -> i32;

    /// Writes the grayscale screen, `width * height` bytes.
    fn grayscale(&self, buf: &mut [u8]) -> Result<()>;

    /// Writes the RGB screen, `3 * width * height` bytes.
    fn rgb(&self, buf: &mut [u8]) -> Result<()>;
}

impl<E: Emulator + ?Sized> Emulator for Box<E> {
    fn width(&self) -> usize {
        (**self).width()
    }
    fn height(&self) -> usize {
        (**self).height()
    }
    fn minimal_actions(&self) -> Result<Vec<AtariAction>> {
        (**self).minimal_actions()
    }
    fn lives(&self) -> u32 {
        (**self).lives()
    }
    fn is_game_over(&self) -> bool {
        (**self).is_game_over()
    }
    fn reset(&mut self) {
        (**self).reset()
    }
    fn step(&mut self, action: AtariAction) -> i32 {
        (**self).step(action)
    }
    fn grayscale(&self, buf: &mut [u8]) -> Result<()> {
        (**self).grayscale(buf)
    }
    fn rgb(&self, buf: &mut [u8]) -> Result<()> {
        (**self).rgb(buf)
    }
}

/// Checks that `buf` holds exactly `channels` bytes per pixel of the screen of `emulator`.
pub fn check_screen_len<E: Emulator + ?Sized>(emulator: &E, buf: &[u8], channels: usize) -> Result<()> {
    let expected = channels * emulator.width() * emulator.height();
    if buf.len() != expected {
        return Err(ArcadeError::GeometryMismatch {
            expected,
            actual: buf.len(),
        }
        .into());
    }
    Ok(())
}
