//! Arcade Learning Environment through the C wrapper of `atari-env-sys`.
use super::{check_screen_len, Emulator};
use crate::{AtariAction, AtariEnvConfig};
use anyhow::{Context, Result};
use arcade_core::ArcadeError;
use c_str_macro::c_str;
use log::info;
use std::ffi::CString;
use std::path::Path;

/// Settings passed to ALE before loading a ROM.
#[derive(Clone, Debug)]
pub struct AleConfig {
    /// Seed of the emulator; ALE seeds from time when 0.
    pub random_seed: i32,

    /// Probability of repeating the previous action instead of the given one.
    pub repeat_action_probability: f32,

    /// Frames per `act()` inside ALE; 1 leaves frame skipping to the caller.
    pub frame_skip: i32,

    /// Game difficulty.
    pub difficulty_setting: i32,
}

impl Default for AleConfig {
    fn default() -> Self {
        Self {
            random_seed: 0,
            repeat_action_probability: 0.25,
            frame_skip: 1,
            difficulty_setting: 0,
        }
    }
}

/// Handle of an ALE instance.
pub struct Ale {
    inner: *mut atari_env_sys::ALEInterface,
    width: usize,
    height: usize,
}

// TODO: ALE is not thread-safe; this only allows moving the handle, verify before sharing.
unsafe impl Send for Ale {}

impl Drop for Ale {
    fn drop(&mut self) {
        unsafe {
            atari_env_sys::ALE_del(self.inner);
        }
    }
}

impl Ale {
    /// Loads a ROM image.
    pub fn new(rom_path: &Path, config: &AleConfig) -> Result<Self> {
        if !rom_path.is_file() {
            return Err(ArcadeError::RomNotFound(rom_path.to_path_buf()).into());
        }
        let rom = CString::new(rom_path.to_str().context("ROM path is not UTF-8")?)?;

        let ale = unsafe { atari_env_sys::ALE_new() };
        unsafe {
            atari_env_sys::setInt(ale, c_str!("random_seed").as_ptr(), config.random_seed);
            atari_env_sys::setFloat(
                ale,
                c_str!("repeat_action_probability").as_ptr(),
                config.repeat_action_probability,
            );
            atari_env_sys::setInt(ale, c_str!("frame_skip").as_ptr(), config.frame_skip);
            atari_env_sys::setBool(ale, c_str!("color_averaging").as_ptr(), false);
            atari_env_sys::loadROM(ale, rom.as_ptr());
            atari_env_sys::setDifficulty(ale, config.difficulty_setting);
            atari_env_sys::reset_game(ale);
        }
        let (width, height) = unsafe {
            (
                atari_env_sys::getScreenWidth(ale) as usize,
                atari_env_sys::getScreenHeight(ale) as usize,
            )
        };
        info!(
            "Loaded {:?} ({}x{}, seed = {})",
            rom_path, width, height, config.random_seed
        );

        Ok(Self {
            inner: ale,
            width,
            height,
        })
    }

    /// Loads the game named in `config`. A missing seed is taken from the clock.
    pub fn open(config: &AtariEnvConfig) -> Result<Self> {
        let random_seed = match config.seed {
            Some(seed) => seed,
            None => std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)?
                .as_secs() as i32,
        };
        let ale_config = AleConfig {
            random_seed,
            repeat_action_probability: config.repeat_action_probability,
            ..AleConfig::default()
        };
        Self::new(&config.rom_path(), &ale_config)
    }

    /// Frame number of the current episode.
    pub fn episode_frame_number(&self) -> i32 {
        unsafe { atari_env_sys::getEpisodeFrameNumber(self.inner) }
    }
}

impl Emulator for Ale {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn minimal_actions(&self) -> Result<Vec<AtariAction>> {
        let n = unsafe { atari_env_sys::getMinimalActionSize(self.inner) } as usize;
        let mut buf = vec![0i32; n];
        unsafe {
            atari_env_sys::getMinimalActionSet(self.inner, buf.as_mut_ptr());
        }
        AtariAction::from_ids(&buf)
    }

    fn lives(&self) -> u32 {
        unsafe { atari_env_sys::lives(self.inner) as u32 }
    }

    fn is_game_over(&self) -> bool {
        unsafe { atari_env_sys::game_over(self.inner) }
    }

    fn reset(&mut self) {
        unsafe {
            atari_env_sys::reset_game(self.inner);
        }
    }

    fn step(&mut self, action: AtariAction) -> i32 {
        unsafe { atari_env_sys::act(self.inner, action as i32) }
    }

    fn grayscale(&self, buf: &mut [u8]) -> Result<()> {
        check_screen_len(self, buf, 1)?;
        unsafe {
            atari_env_sys::getScreenGrayscale(self.inner, buf.as_mut_ptr());
        }
        Ok(())
    }

    fn rgb(&self, buf: &mut [u8]) -> Result<()> {
        check_screen_len(self, buf, 3)?;
        unsafe {
            atari_env_sys::getScreenRGB2(self.inner, buf.as_mut_ptr());
        }
        Ok(())
    }
}
