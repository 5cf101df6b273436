//! C interface to [`AtariEnv`].
//!
//! An environment lives behind an opaque pointer created by
//! [`arcade_new_env`] (feature `ale`) or [`into_handle`] and released by
//! [`arcade_del_env`]. Buffers are passed as pointer/length pairs and are
//! checked against the geometry of the environment before being written.
//!
//! Functions returning `i32` status give [`ARCADE_OK`] on success and a
//! negative code on error; the error itself is logged with [`log::error!`].
//! Nothing here is thread-safe: a handle must be driven by one thread at a time.
use anyhow::Result;
use arcade_atari_env::{AtariEnv, Emulator, Mode};
use arcade_core::{ArcadeError, BatchView};
use log::error;
use std::slice;

/// An environment over any emulator.
pub type EnvHandle = AtariEnv<Box<dyn Emulator>>;

/// Success.
pub const ARCADE_OK: i32 = 0;
/// A required pointer was null.
pub const ARCADE_ERR_NULL_PTR: i32 = -1;
/// An argument could not be interpreted.
pub const ARCADE_ERR_INVALID_ARG: i32 = -2;
/// Too few transitions to sample from.
pub const ARCADE_ERR_UNDERFLOW: i32 = -3;
/// A batch range outside the batch.
pub const ARCADE_ERR_BATCH_RANGE: i32 = -4;
/// A buffer of the wrong length.
pub const ARCADE_ERR_BUFFER_LENGTH: i32 = -5;
/// An action outside the minimal action set.
pub const ARCADE_ERR_INVALID_ACTION: i32 = -6;
/// The ROM image was not found.
pub const ARCADE_ERR_ROM_NOT_FOUND: i32 = -7;
/// Compression or decompression failed.
pub const ARCADE_ERR_CODEC: i32 = -8;
/// Any other error.
pub const ARCADE_ERR_OTHER: i32 = -9;

fn status_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ArcadeError>() {
        Some(ArcadeError::SamplingUnderflow { .. }) => ARCADE_ERR_UNDERFLOW,
        Some(ArcadeError::BatchRange { .. }) => ARCADE_ERR_BATCH_RANGE,
        Some(ArcadeError::BufferLength { .. }) | Some(ArcadeError::GeometryMismatch { .. }) => {
            ARCADE_ERR_BUFFER_LENGTH
        }
        Some(ArcadeError::InvalidAction { .. }) => ARCADE_ERR_INVALID_ACTION,
        Some(ArcadeError::RomNotFound(_)) => ARCADE_ERR_ROM_NOT_FOUND,
        Some(ArcadeError::Compression(_)) | Some(ArcadeError::Decompression { .. }) => {
            ARCADE_ERR_CODEC
        }
        None => ARCADE_ERR_OTHER,
    }
}

fn status(what: &str, result: Result<()>) -> i32 {
    match result {
        Ok(()) => ARCADE_OK,
        Err(err) => {
            error!("{}: {:#}", what, err);
            status_code(&err)
        }
    }
}

/// Moves an environment to the heap and returns its handle.
///
/// The handle must be released with [`arcade_del_env`].
pub fn into_handle(env: EnvHandle) -> *mut EnvHandle {
    Box::into_raw(Box::new(env))
}

/// Creates an environment for `game` with a replay buffer of `capacity` transitions.
///
/// Returns null on error.
///
/// # Safety
/// `game` must be a NUL-terminated string.
#[cfg(feature = "ale")]
#[no_mangle]
pub unsafe extern "C" fn arcade_new_env(
    game: *const std::os::raw::c_char,
    capacity: usize,
) -> *mut EnvHandle {
    use arcade_atari_env::{atari_env::ale::Ale, AtariEnvConfig};
    use arcade_core::ReplayBufferConfig;

    if game.is_null() {
        error!("arcade_new_env: null game name");
        return std::ptr::null_mut();
    }
    let build = || -> Result<EnvHandle> {
        let name = std::ffi::CStr::from_ptr(game).to_str()?;
        let config = AtariEnvConfig::default()
            .name(name)
            .replay(ReplayBufferConfig::default().capacity(capacity));
        let ale: Box<dyn Emulator> = Box::new(Ale::open(&config)?);
        AtariEnv::with_emulator(ale, &config)
    };
    match build() {
        Ok(env) => into_handle(env),
        Err(err) => {
            error!("arcade_new_env: {:#}", err);
            std::ptr::null_mut()
        }
    }
}

/// Releases an environment. A null handle is ignored.
///
/// # Safety
/// `env` must come from [`arcade_new_env`] or [`into_handle`] and not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn arcade_del_env(env: *mut EnvHandle) {
    if !env.is_null() {
        drop(Box::from_raw(env));
    }
}

/// Clears the done flags.
///
/// # Safety
/// `env` must be a live handle or null.
#[no_mangle]
pub unsafe extern "C" fn arcade_reset_env(env: *mut EnvHandle) -> i32 {
    match env.as_mut() {
        Some(env) => {
            env.soft_reset();
            ARCADE_OK
        }
        None => ARCADE_ERR_NULL_PTR,
    }
}

/// Restarts the game, clears the observation stack, the flags and the counters.
///
/// # Safety
/// `env` must be a live handle or null.
#[no_mangle]
pub unsafe extern "C" fn arcade_hard_reset_env(env: *mut EnvHandle) -> i32 {
    match env.as_mut() {
        Some(env) => status("arcade_hard_reset_env", env.hard_reset()),
        None => ARCADE_ERR_NULL_PTR,
    }
}

/// Writes the stacked observation into `buf`.
///
/// # Safety
/// `env` must be a live handle or null; `buf` must be valid for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn arcade_get_obs_env(env: *mut EnvHandle, buf: *mut u8, len: usize) -> i32 {
    let env = match env.as_ref() {
        Some(env) if !buf.is_null() => env,
        _ => return ARCADE_ERR_NULL_PTR,
    };
    let buf = slice::from_raw_parts_mut(buf, len);
    status("arcade_get_obs_env", env.observation(buf))
}

/// Width of the raw screen, or a negative code.
///
/// # Safety
/// `env` must be a live handle or null.
#[no_mangle]
pub unsafe extern "C" fn arcade_raw_width_env(env: *mut EnvHandle) -> i32 {
    env.as_ref()
        .map_or(ARCADE_ERR_NULL_PTR, |env| env.raw_width() as i32)
}

/// Height of the raw screen, or a negative code.
///
/// # Safety
/// `env` must be a live handle or null.
#[no_mangle]
pub unsafe extern "C" fn arcade_raw_height_env(env: *mut EnvHandle) -> i32 {
    env.as_ref()
        .map_or(ARCADE_ERR_NULL_PTR, |env| env.raw_height() as i32)
}

/// Writes the raw RGB screen into `buf`.
///
/// # Safety
/// `env` must be a live handle or null; `buf` must be valid for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn arcade_get_rgb_env(env: *mut EnvHandle, buf: *mut u8, len: usize) -> i32 {
    let env = match env.as_ref() {
        Some(env) if !buf.is_null() => env,
        _ => return ARCADE_ERR_NULL_PTR,
    };
    let buf = slice::from_raw_parts_mut(buf, len);
    status("arcade_get_rgb_env", env.rgb(buf))
}

/// Size of the minimal action set, or a negative code.
///
/// # Safety
/// `env` must be a live handle or null.
#[no_mangle]
pub unsafe extern "C" fn arcade_action_length_env(env: *mut EnvHandle) -> i32 {
    env.as_ref()
        .map_or(ARCADE_ERR_NULL_PTR, |env| env.n_actions() as i32)
}

/// Steps of the last finished episode, or a negative code.
///
/// # Safety
/// `env` must be a live handle or null.
#[no_mangle]
pub unsafe extern "C" fn arcade_episode_steps_env(env: *mut EnvHandle) -> i32 {
    env.as_ref()
        .map_or(ARCADE_ERR_NULL_PTR, |env| env.episode_steps() as i32)
}

/// Score of the last finished episode. Scores can be negative, so a null
/// handle is only reported through the log and gives 0.
///
/// # Safety
/// `env` must be a live handle or null.
#[no_mangle]
pub unsafe extern "C" fn arcade_episode_score_env(env: *mut EnvHandle) -> i32 {
    match env.as_ref() {
        Some(env) => env.episode_score(),
        None => {
            error!("arcade_episode_score_env: null handle");
            0
        }
    }
}

/// Steps the game. The transition is stored unless `evalmode` is set.
///
/// The reward is written to `reward` when it is not null.
///
/// # Safety
/// `env` must be a live handle or null; `reward` must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn arcade_act_env(
    env: *mut EnvHandle,
    action: u8,
    evalmode: bool,
    reward: *mut i32,
) -> i32 {
    let env = match env.as_mut() {
        Some(env) => env,
        None => return ARCADE_ERR_NULL_PTR,
    };
    let mode = if evalmode { Mode::Eval } else { Mode::Train };
    let result = env.act(action as usize, mode).map(|r| {
        if let Some(out) = reward.as_mut() {
            *out = r;
        }
    });
    status("arcade_act_env", result)
}

/// The episode ended in the last step. False for a null handle.
///
/// # Safety
/// `env` must be a live handle or null.
#[no_mangle]
pub unsafe extern "C" fn arcade_done_env(env: *mut EnvHandle) -> bool {
    env.as_ref().map_or(false, |env| env.done())
}

/// The game was over in the last step. False for a null handle.
///
/// # Safety
/// `env` must be a live handle or null.
#[no_mangle]
pub unsafe extern "C" fn arcade_game_over_env(env: *mut EnvHandle) -> bool {
    env.as_ref().map_or(false, |env| env.game_over())
}

/// The last step hit the step cap. False for a null handle.
///
/// # Safety
/// `env` must be a live handle or null.
#[no_mangle]
pub unsafe extern "C" fn arcade_max_step_reached_env(env: *mut EnvHandle) -> bool {
    env.as_ref().map_or(false, |env| env.max_step_reached())
}

/// Fills items `offset..offset + count` of a batch of `batch_capacity` items
/// with transitions sampled from the replay buffer of `env`.
///
/// States are `batch_capacity * state_size` bytes, the other buffers
/// `batch_capacity` items.
///
/// # Safety
/// `env` must be a live handle or null. Each buffer must be valid for the
/// length given above and must not overlap with another.
#[no_mangle]
pub unsafe extern "C" fn arcade_prefetch_batch_env(
    env: *mut EnvHandle,
    states: *mut u8,
    actions: *mut u8,
    rewards: *mut f32,
    end_states: *mut u8,
    dones: *mut f32,
    batch_capacity: usize,
    offset: usize,
    count: usize,
) -> i32 {
    let env = match env.as_mut() {
        Some(env) => env,
        None => return ARCADE_ERR_NULL_PTR,
    };
    if states.is_null()
        || actions.is_null()
        || rewards.is_null()
        || end_states.is_null()
        || dones.is_null()
    {
        return ARCADE_ERR_NULL_PTR;
    }
    let state_len = env.state_size();
    let state_bytes = match batch_capacity.checked_mul(state_len) {
        Some(n) => n,
        None => return ARCADE_ERR_INVALID_ARG,
    };

    let view = BatchView::new(
        slice::from_raw_parts_mut(states, state_bytes),
        slice::from_raw_parts_mut(actions, batch_capacity),
        slice::from_raw_parts_mut(rewards, batch_capacity),
        slice::from_raw_parts_mut(end_states, state_bytes),
        slice::from_raw_parts_mut(dones, batch_capacity),
        state_len,
    );
    let result = view.and_then(|view| env.prefetch(view, offset, count));
    status("arcade_prefetch_batch_env", result)
}
