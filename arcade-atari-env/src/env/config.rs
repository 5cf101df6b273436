//! Configuration of [`AtariEnv`](super::AtariEnv).
//!
//! If environment variable `ATARI_ROM_DIR` exists, it is used as the directory
//! from which ROM images of the Atari games are loaded. Otherwise `~/atari_rom`.
use crate::ResizeFilter;
use anyhow::Result;
use arcade_core::{ObsConfig, ReplayBufferConfig};
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    env,
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`AtariEnv`](super::AtariEnv).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct AtariEnvConfig {
    /// Directory of ROM images.
    pub rom_dir: String,

    /// Name of the game; the ROM image is `<rom_dir>/<name>.bin`.
    pub name: String,

    /// Emulator frames per step.
    pub frame_skip: usize,

    /// Steps after which an episode is cut.
    pub max_episode_steps: usize,

    /// Probability that the emulator repeats the previous action.
    pub repeat_action_probability: f32,

    /// Seed of the emulator. `None` seeds from the clock.
    pub seed: Option<i32>,

    /// Number of transitions in a training batch.
    pub batch_size: usize,

    /// Geometry of stacked observations.
    pub obs: ObsConfig,

    /// Replay buffer. Its state length follows `obs`.
    pub replay: ReplayBufferConfig,

    /// Resampling of raw frames.
    pub resize: ResizeFilter,
}

impl Default for AtariEnvConfig {
    fn default() -> Self {
        let rom_dir = if let Ok(var) = env::var("ATARI_ROM_DIR") {
            var
        } else if let Some(home) = dirs::home_dir() {
            home.join("atari_rom").to_string_lossy().into_owned()
        } else {
            "".to_string()
        };

        Self {
            rom_dir,
            name: "".to_string(),
            frame_skip: 4,
            max_episode_steps: 27000,
            repeat_action_probability: 0.25,
            seed: None,
            batch_size: 32,
            obs: ObsConfig::default(),
            replay: ReplayBufferConfig::default(),
            resize: ResizeFilter::Area,
        }
    }
}

impl AtariEnvConfig {
    /// Sets the name of the game.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the directory of ROM images.
    pub fn rom_dir(mut self, rom_dir: impl Into<String>) -> Self {
        self.rom_dir = rom_dir.into();
        self
    }

    /// Sets the number of emulator frames per step.
    pub fn frame_skip(mut self, frame_skip: usize) -> Self {
        self.frame_skip = frame_skip;
        self
    }

    /// Sets the step cap of an episode.
    pub fn max_episode_steps(mut self, max_episode_steps: usize) -> Self {
        self.max_episode_steps = max_episode_steps;
        self
    }

    /// Sets the sticky action probability.
    pub fn repeat_action_probability(mut self, p: f32) -> Self {
        self.repeat_action_probability = p;
        self
    }

    /// Sets the seed of the emulator.
    pub fn seed(mut self, seed: Option<i32>) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the observation geometry.
    pub fn obs(mut self, obs: ObsConfig) -> Self {
        self.obs = obs;
        self
    }

    /// Sets the replay buffer configuration.
    pub fn replay(mut self, replay: ReplayBufferConfig) -> Self {
        self.replay = replay;
        self
    }

    /// Sets the resampling of raw frames.
    pub fn resize(mut self, resize: ResizeFilter) -> Self {
        self.resize = resize;
        self
    }

    /// Path of the ROM image of the game.
    pub fn rom_path(&self) -> PathBuf {
        Path::new(&self.rom_dir).join(format!("{}.bin", self.name))
    }

    /// Replay buffer configuration with the state length of `obs`.
    pub fn replay_config(&self) -> ReplayBufferConfig {
        self.replay.clone().state_len(self.obs.state_size())
    }

    /// Constructs [`AtariEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`AtariEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_env_config() -> Result<()> {
        let config = AtariEnvConfig::default()
            .name("breakout")
            .rom_dir("/roms")
            .frame_skip(3)
            .seed(Some(1))
            .replay(ReplayBufferConfig::default().capacity(500))
            .resize(ResizeFilter::Triangle);

        let dir = TempDir::new("atari_env_config")?;
        let path = dir.path().join("atari_env_config.yaml");
        config.save(&path)?;
        let config_ = AtariEnvConfig::load(&path)?;
        assert_eq!(config, config_);
        assert_eq!(config_.rom_path(), PathBuf::from("/roms/breakout.bin"));
        Ok(())
    }

    #[test]
    fn test_replay_state_len_follows_obs() {
        let config = AtariEnvConfig::default()
            .obs(ObsConfig::default().width(10).stack(2))
            .replay(ReplayBufferConfig::default().state_len(1));
        assert_eq!(config.replay_config().state_len, 200);
    }
}
