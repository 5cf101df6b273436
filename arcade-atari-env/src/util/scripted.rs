//! An emulator replaying a fixed script.
use crate::{
    atari_env::{check_screen_len, Emulator},
    AtariAction,
};
use anyhow::Result;
use std::collections::HashSet;

/// A deterministic [`Emulator`] for tests.
///
/// Frames are numbered from 1 in the order of [`Emulator::step`] calls,
/// across resets. Rewards, life losses and game overs are keyed by frame
/// number; the screen is uniform with a value computed from the frame number.
pub struct ScriptedEmulator {
    width: usize,
    height: usize,
    actions: Vec<AtariAction>,
    initial_lives: u32,
    rewards: Vec<i32>,
    life_lost_at: HashSet<usize>,
    game_over_at: HashSet<usize>,
    screen_value: Box<dyn Fn(usize) -> u8>,

    frame: usize,
    lives: u32,
    game_over: bool,
    n_resets: usize,
    taken: Vec<AtariAction>,
}

impl ScriptedEmulator {
    /// A screen of `width` x `height` pixels showing the frame number.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            actions: vec![AtariAction::Noop, AtariAction::Fire, AtariAction::Right, AtariAction::Left],
            initial_lives: 3,
            rewards: vec![],
            life_lost_at: HashSet::new(),
            game_over_at: HashSet::new(),
            screen_value: Box::new(|frame| (frame % 256) as u8),
            frame: 0,
            lives: 3,
            game_over: false,
            n_resets: 0,
            taken: vec![],
        }
    }

    /// Sets the minimal action set.
    pub fn actions(mut self, actions: Vec<AtariAction>) -> Self {
        self.actions = actions;
        self
    }

    /// Sets the number of lives at start and after each reset.
    pub fn lives(mut self, lives: u32) -> Self {
        self.initial_lives = lives;
        self.lives = lives;
        self
    }

    /// Rewards of frames 1, 2, ...; later frames give 0.
    pub fn rewards(mut self, rewards: Vec<i32>) -> Self {
        self.rewards = rewards;
        self
    }

    /// A life is lost at `frame`.
    pub fn life_lost_at(mut self, frame: usize) -> Self {
        self.life_lost_at.insert(frame);
        self
    }

    /// The game is over from `frame` until the next reset.
    pub fn game_over_at(mut self, frame: usize) -> Self {
        self.game_over_at.insert(frame);
        self
    }

    /// Pixel value of the screen after a given frame (0 before the first step).
    pub fn screen_value(mut self, f: impl Fn(usize) -> u8 + 'static) -> Self {
        self.screen_value = Box::new(f);
        self
    }

    /// The number of frames stepped so far.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// The number of [`Emulator::reset`] calls.
    pub fn n_resets(&self) -> usize {
        self.n_resets
    }

    /// Actions received, one per frame.
    pub fn taken(&self) -> &[AtariAction] {
        &self.taken
    }
}

impl Emulator for ScriptedEmulator {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn minimal_actions(&self) -> Result<Vec<AtariAction>> {
        Ok(self.actions.clone())
    }

    fn lives(&self) -> u32 {
        self.lives
    }

    fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn reset(&mut self) {
        self.lives = self.initial_lives;
        self.game_over = false;
        self.n_resets += 1;
    }

    fn step(&mut self, action: AtariAction) -> i32 {
        self.frame += 1;
        self.taken.push(action);
        if self.life_lost_at.contains(&self.frame) {
            self.lives = self.lives.saturating_sub(1);
        }
        if self.game_over_at.contains(&self.frame) {
            self.game_over = true;
        }
        self.rewards.get(self.frame - 1).copied().unwrap_or(0)
    }

    fn grayscale(&self, buf: &mut [u8]) -> Result<()> {
        check_screen_len(self, buf, 1)?;
        buf.fill((self.screen_value)(self.frame));
        Ok(())
    }

    fn rgb(&self, buf: &mut [u8]) -> Result<()> {
        check_screen_len(self, buf, 3)?;
        buf.fill((self.screen_value)(self.frame));
        Ok(())
    }
}
