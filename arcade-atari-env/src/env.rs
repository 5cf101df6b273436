//! Step controller.
mod config;
use crate::{atari_env::Emulator, obs::ObservationPipeline, AtariAction, Resizer};
use anyhow::{bail, Result};
use arcade_core::{ArcadeError, Batch, BatchView, CompressedReplayBuffer};
use log::{info, trace};
use ndarray::Array3;
pub use config::AtariEnvConfig;

/// Whether [`AtariEnv::act`] records transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Transitions are stored in the replay buffer.
    Train,

    /// Nothing is stored.
    Eval,
}

/// An Atari game with frame skipping, frame stacking and a replay buffer.
///
/// One call to [`step`](Self::step) runs the emulator for `frame_skip`
/// frames with the same action. The episode is done when the game is
/// over, a life is lost, or the step cap is hit. On a game over or the step
/// cap the emulator restarts; in every done case the observation stack is
/// cleared. The caller acknowledges done with [`soft_reset`](Self::soft_reset).
pub struct AtariEnv<E: Emulator> {
    emulator: E,
    pipeline: ObservationPipeline<Resizer>,
    memory: CompressedReplayBuffer,
    action_map: Vec<AtariAction>,

    frame_skip: usize,
    max_episode_steps: usize,
    batch_size: usize,

    done: bool,
    game_over: bool,
    max_step_reached: bool,

    step_count: usize,
    score: i32,
    last_episode_steps: usize,
    last_episode_score: i32,

    // End-state scratch for `act`
    state: Vec<u8>,
}

#[cfg(feature = "ale")]
impl AtariEnv<crate::atari_env::ale::Ale> {
    /// Loads the game named in `config` into the Arcade Learning Environment.
    pub fn build(config: &AtariEnvConfig) -> Result<Self> {
        let ale = crate::atari_env::ale::Ale::open(config)?;
        Self::with_emulator(ale, config)
    }
}

impl<E: Emulator> AtariEnv<E> {
    /// Wraps an emulator.
    pub fn with_emulator(emulator: E, config: &AtariEnvConfig) -> Result<Self> {
        if config.frame_skip == 0 {
            bail!("frame_skip must be positive");
        }
        let action_map = emulator.minimal_actions()?;
        if action_map.is_empty() || action_map.len() > u8::MAX as usize {
            bail!("unsupported size of action set: {}", action_map.len());
        }
        let mut pipeline = ObservationPipeline::new(
            emulator.width(),
            emulator.height(),
            config.obs,
            Resizer::new(config.resize),
        );
        pipeline.reset(&emulator)?;
        let memory = CompressedReplayBuffer::new(&config.replay_config())?;
        info!(
            "Initialized {:?}: screen {}x{}, {} actions",
            config.name,
            emulator.width(),
            emulator.height(),
            action_map.len()
        );

        Ok(Self {
            emulator,
            pipeline,
            memory,
            action_map,
            frame_skip: config.frame_skip,
            max_episode_steps: config.max_episode_steps,
            batch_size: config.batch_size,
            done: false,
            game_over: false,
            max_step_reached: false,
            step_count: 0,
            score: 0,
            last_episode_steps: 0,
            last_episode_score: 0,
            state: vec![0; config.obs.state_size()],
        })
    }

    /// Size of the minimal action set.
    pub fn n_actions(&self) -> usize {
        self.action_map.len()
    }

    /// Width of the raw screen.
    pub fn raw_width(&self) -> usize {
        self.emulator.width()
    }

    /// Height of the raw screen.
    pub fn raw_height(&self) -> usize {
        self.emulator.height()
    }

    /// Length of a stacked observation in bytes.
    pub fn state_size(&self) -> usize {
        self.state.len()
    }

    /// Steps the game with the `action`-th action of the minimal action set.
    ///
    /// Returns the reward summed over the skipped frames.
    pub fn step(&mut self, action: usize) -> Result<i32> {
        let a = match self.action_map.get(action) {
            Some(&a) => a,
            None => {
                return Err(ArcadeError::InvalidAction {
                    action,
                    n_actions: self.action_map.len(),
                }
                .into())
            }
        };
        self.step_count += 1;
        self.max_step_reached = self.step_count == self.max_episode_steps;
        let lives = self.emulator.lives();
        let mut reward = 0;

        for t in 0..self.frame_skip {
            let r = self.emulator.step(a);
            reward += r;
            self.score += r;
            let life_lost = self.emulator.lives() < lives;
            self.game_over = self.emulator.is_game_over();
            self.done = self.game_over || life_lost || self.max_step_reached;

            if self.done {
                if self.game_over || self.max_step_reached {
                    self.emulator.reset();
                    info!(
                        "Episode finished: score = {}, steps = {}",
                        self.score, self.step_count
                    );
                    self.last_episode_score = self.score;
                    self.last_episode_steps = self.step_count;
                    self.step_count = 0;
                    self.score = 0;
                }
                self.pipeline.reset(&self.emulator)?;
                break;
            }

            // Only the last two frames of the window are pooled
            if t + 2 >= self.frame_skip {
                self.pipeline
                    .capture(&self.emulator, t + 2 - self.frame_skip)?;
            }
        }
        self.pipeline.update()?;
        trace!("step(): action = {:?}, reward = {}, done = {}", a, reward, self.done);

        Ok(reward)
    }

    /// Steps the game and, in [`Mode::Train`], stores the transition.
    ///
    /// Steps cut by the step cap are not stored.
    pub fn act(&mut self, action: usize, mode: Mode) -> Result<i32> {
        let reward = self.step(action)?;
        if mode == Mode::Train {
            self.pipeline.observation(&mut self.state)?;
            if !self.max_step_reached {
                self.memory
                    .add(action as u8, reward as f32, &self.state, self.done)?;
            }
        }
        Ok(reward)
    }

    /// Steps the game, writes the new observation into `buf` and stores the transition.
    ///
    /// A `buf` of the wrong length is rejected before the game moves.
    pub fn act_into(&mut self, action: usize, buf: &mut [u8]) -> Result<i32> {
        if buf.len() != self.state.len() {
            return Err(ArcadeError::BufferLength {
                what: "observation",
                expected: self.state.len(),
                actual: buf.len(),
            }
            .into());
        }
        let reward = self.step(action)?;
        self.pipeline.observation(buf)?;
        if !self.max_step_reached {
            self.memory.add(action as u8, reward as f32, buf, self.done)?;
        }
        Ok(reward)
    }

    /// The episode ended in the last step.
    pub fn done(&self) -> bool {
        self.done
    }

    /// The game was over in the last step.
    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// The last step hit the step cap.
    pub fn max_step_reached(&self) -> bool {
        self.max_step_reached
    }

    /// Steps taken in the running episode.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Score of the running episode.
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Steps of the last finished episode.
    pub fn episode_steps(&self) -> usize {
        self.last_episode_steps
    }

    /// Score of the last finished episode.
    pub fn episode_score(&self) -> i32 {
        self.last_episode_score
    }

    /// Clears the done flags. Must be called after a done step.
    pub fn soft_reset(&mut self) {
        self.done = false;
        self.game_over = false;
        self.max_step_reached = false;
    }

    /// Zeroes the counters of the running episode.
    pub fn reset_counts(&mut self) {
        self.step_count = 0;
        self.score = 0;
    }

    /// Restarts the game from scratch.
    pub fn hard_reset(&mut self) -> Result<()> {
        self.emulator.reset();
        self.reset_observations()?;
        self.soft_reset();
        self.reset_counts();
        Ok(())
    }

    /// Clears the observation stack and seeds it with the current screen.
    pub fn reset_observations(&mut self) -> Result<()> {
        self.pipeline.reset(&self.emulator)
    }

    /// Writes the stacked observation, oldest frame first.
    pub fn observation(&self, buf: &mut [u8]) -> Result<()> {
        self.pipeline.observation(buf)
    }

    /// The stacked observation as an array of shape `(stack, width, width)`.
    pub fn observation_array(&self) -> Result<Array3<u8>> {
        self.pipeline.to_array()
    }

    /// Writes the raw RGB screen, `3 * raw_width * raw_height` bytes.
    pub fn rgb(&self, buf: &mut [u8]) -> Result<()> {
        self.emulator.rgb(buf)
    }

    /// The replay buffer.
    pub fn memory(&self) -> &CompressedReplayBuffer {
        &self.memory
    }

    /// The replay buffer, mutably.
    pub fn memory_mut(&mut self) -> &mut CompressedReplayBuffer {
        &mut self.memory
    }

    /// Fills items `offset..offset + count` of `batch` from the replay buffer.
    pub fn prefetch(&mut self, batch: BatchView<'_>, offset: usize, count: usize) -> Result<()> {
        self.memory.sample_range(batch, offset, count)
    }

    /// Samples a batch of the configured batch size.
    pub fn sample_batch(&mut self) -> Result<Batch> {
        let mut batch = Batch::with_capacity(self.batch_size, self.state.len());
        self.memory.sample_into(batch.view_mut())?;
        Ok(batch)
    }

    /// The emulator.
    pub fn emulator(&self) -> &E {
        &self.emulator
    }
}
