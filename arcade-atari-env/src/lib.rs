//! Atari games as a source of experience for value-based agents.
//!
//! [`AtariEnv`] steps a game with frame skipping, turns the raw screens into
//! a stack of downscaled grayscale frames and records the transitions in a
//! compressed replay buffer from which training batches are sampled.
//!
//! The emulator is accessed through the [`Emulator`] trait. The Arcade
//! Learning Environment backend is behind the `ale` feature, which builds
//! the C++ library. ROM images are loaded from the directory given by the
//! environment variable `ATARI_ROM_DIR`. An easy way to obtain them is
//! [AutoROM](https://pypi.org/project/AutoROM/).
//!
//! ```bash
//! pip install autorom
//! mkdir $HOME/atari_rom
//! AutoROM --install-dir $HOME/atari_rom
//! export ATARI_ROM_DIR=$HOME/atari_rom
//! ```
//!
//! Here is an episode of a scripted game without the emulator.
//!
//! ```
//! use anyhow::Result;
//! use arcade_atari_env::{util::ScriptedEmulator, AtariEnv, AtariEnvConfig, Mode};
//! use arcade_core::ReplayBufferConfig;
//!
//! fn main() -> Result<()> {
//!     let emulator = ScriptedEmulator::new(160, 210).game_over_at(40);
//!     let config = AtariEnvConfig::default()
//!         .replay(ReplayBufferConfig::default().capacity(100));
//!     let mut env = AtariEnv::with_emulator(emulator, &config)?;
//!
//!     while !env.done() {
//!         env.act(fastrand::usize(..env.n_actions()), Mode::Train)?;
//!     }
//!     assert_eq!(env.episode_steps(), 10);
//!     assert_eq!(env.memory().len(), 10);
//!     Ok(())
//! }
//! ```
mod act;
pub mod atari_env;
mod env;
mod obs;
mod resize;
pub mod util;
pub use act::AtariAction;
pub use atari_env::Emulator;
pub use env::{AtariEnv, AtariEnvConfig, Mode};
pub use obs::ObservationPipeline;
pub use resize::{Resize, ResizeFilter, Resizer};
