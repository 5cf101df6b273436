use anyhow::Result;
use arcade_atari_env::{util::ScriptedEmulator, AtariAction, AtariEnv, AtariEnvConfig, Mode};
use arcade_core::{ArcadeError, ObsConfig, ReplayBufferConfig};

// 8x8 screens downscaled to 4x4, stack of 4
const FRAME: usize = 16;
const STATE: usize = 4 * FRAME;

fn config() -> AtariEnvConfig {
    AtariEnvConfig::default()
        .name("scripted")
        .obs(ObsConfig::default().width(4))
        .replay(ReplayBufferConfig::default().capacity(16).seed(Some(0)))
}

fn env(emulator: ScriptedEmulator) -> Result<AtariEnv<ScriptedEmulator>> {
    AtariEnv::with_emulator(emulator, &config())
}

/// Observation as one value per stacked frame; screens are uniform.
fn frames(env: &AtariEnv<ScriptedEmulator>) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; STATE];
    env.observation(&mut buf)?;
    for f in buf.chunks(FRAME) {
        assert!(f.iter().all(|&p| p == f[0]));
    }
    Ok(buf.chunks(FRAME).map(|f| f[0]).collect())
}

#[test]
fn test_game_over_inside_skip_window() -> Result<()> {
    let emulator = ScriptedEmulator::new(8, 8)
        .rewards(vec![1, 2, 4, 8])
        .game_over_at(3);
    let mut env = env(emulator)?;

    let reward = env.step(1)?;
    assert_eq!(reward, 1 + 2 + 4);
    assert!(env.done());
    assert!(env.game_over());
    assert!(!env.max_step_reached());
    assert_eq!(env.emulator().frame(), 3);
    assert_eq!(env.emulator().n_resets(), 1);
    assert_eq!(env.episode_score(), 7);
    assert_eq!(env.episode_steps(), 1);
    assert_eq!(env.score(), 0);
    assert_eq!(env.step_count(), 0);

    env.soft_reset();
    assert!(!env.done());
    assert!(!env.game_over());
    assert_eq!(env.episode_score(), 7);
    assert_eq!(env.episode_steps(), 1);
    Ok(())
}

#[test]
fn test_life_loss_keeps_counters() -> Result<()> {
    let emulator = ScriptedEmulator::new(8, 8)
        .rewards(vec![1; 16])
        .life_lost_at(6);
    let mut env = env(emulator)?;

    assert_eq!(env.act(0, Mode::Train)?, 4);
    assert!(!env.done());
    assert_eq!(env.act(2, Mode::Train)?, 2);
    assert!(env.done());
    assert!(!env.game_over());
    assert_eq!(env.emulator().n_resets(), 0);
    assert_eq!(env.step_count(), 2);
    assert_eq!(env.score(), 6);

    env.soft_reset();
    assert!(!env.done());
    assert_eq!(env.step_count(), 2);
    assert_eq!(env.score(), 6);

    env.reset_counts();
    assert_eq!(env.step_count(), 0);
    assert_eq!(env.score(), 0);
    assert_eq!(env.episode_steps(), 0);

    // Only the second transition has a predecessor
    let batch = env.sample_batch()?;
    assert_eq!(batch.len(), 32);
    assert!(batch.actions.iter().all(|&a| a == 2));
    assert!(batch.rewards.iter().all(|&r| r == 2.0));
    assert!(batch.dones.iter().all(|&d| d == 1.0));
    Ok(())
}

#[test]
fn test_observation_after_termination() -> Result<()> {
    let emulator = ScriptedEmulator::new(8, 8)
        .game_over_at(3)
        .screen_value(|frame| 50 + frame as u8);
    let mut env = env(emulator)?;
    env.step(0)?;
    assert!(env.done());
    assert_eq!(frames(&env)?, vec![0, 0, 53, 53]);
    Ok(())
}

#[test]
fn test_last_two_frames_are_pooled() -> Result<()> {
    let emulator = ScriptedEmulator::new(8, 8).screen_value(|frame| match frame {
        0 => 7,
        1 | 2 => 250,
        3 | 7 => 100,
        _ => frame as u8,
    });
    let mut env = env(emulator)?;
    assert_eq!(frames(&env)?, vec![0, 0, 0, 7]);

    env.step(0)?;
    assert_eq!(frames(&env)?, vec![0, 0, 7, 100]);
    env.step(0)?;
    assert_eq!(frames(&env)?, vec![0, 7, 100, 100]);
    env.step(0)?;
    env.step(0)?;
    assert_eq!(frames(&env)?, vec![100, 100, 12, 16]);

    let array = env.observation_array()?;
    assert_eq!(array.shape(), &[4, 4, 4]);
    assert_eq!(array[[3, 3, 3]], 16);
    Ok(())
}

#[test]
fn test_step_cap_is_not_recorded() -> Result<()> {
    let emulator = ScriptedEmulator::new(8, 8).rewards(vec![1; 100]);
    let config = config().max_episode_steps(3);
    let mut env = AtariEnv::with_emulator(emulator, &config)?;

    for _ in 0..3 {
        assert!(!env.done());
        env.act(1, Mode::Train)?;
    }
    assert!(env.done());
    assert!(env.max_step_reached());
    assert!(!env.game_over());
    assert_eq!(env.memory().len(), 2);
    assert_eq!(env.episode_steps(), 3);
    assert_eq!(env.episode_score(), 9);
    assert_eq!(env.emulator().n_resets(), 1);
    // The cap cuts the window after its first frame
    assert_eq!(env.emulator().frame(), 9);

    env.soft_reset();
    assert!(!env.max_step_reached());
    env.act(1, Mode::Train)?;
    assert_eq!(env.memory().len(), 3);
    Ok(())
}

#[test]
fn test_eval_mode_does_not_record() -> Result<()> {
    let mut env = env(ScriptedEmulator::new(8, 8))?;
    for _ in 0..5 {
        env.act(3, Mode::Eval)?;
    }
    assert!(env.memory().is_empty());
    assert_eq!(env.emulator().taken(), &[AtariAction::Left; 20][..]);
    Ok(())
}

#[test]
fn test_act_into_writes_observation() -> Result<()> {
    let mut env = env(ScriptedEmulator::new(8, 8))?;
    let mut buf = vec![0u8; STATE];
    env.act_into(0, &mut buf)?;
    env.act_into(0, &mut buf)?;

    let mut obs = vec![0u8; STATE];
    env.observation(&mut obs)?;
    assert_eq!(buf, obs);
    assert_eq!(env.memory().len(), 2);
    Ok(())
}

#[test]
fn test_act_into_rejects_wrong_buffer_without_stepping() -> Result<()> {
    let emulator = ScriptedEmulator::new(8, 8).rewards(vec![1; 100]);
    let mut env = env(emulator)?;
    let err = env.act_into(0, &mut [0u8; 3]).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ArcadeError>(),
        Some(&ArcadeError::BufferLength {
            what: "observation",
            expected: STATE,
            actual: 3
        })
    );
    assert_eq!(env.emulator().frame(), 0);
    assert_eq!(env.step_count(), 0);
    assert_eq!(env.score(), 0);
    assert!(env.memory().is_empty());

    // The next transitions still pair with the right start-states
    let mut buf = vec![0u8; STATE];
    env.act_into(0, &mut buf)?;
    env.act_into(1, &mut buf)?;
    let batch = env.sample_batch()?;
    assert!(batch.actions.iter().all(|&a| a == 1));
    Ok(())
}

#[test]
fn test_invalid_action() -> Result<()> {
    let mut env = env(ScriptedEmulator::new(8, 8))?;
    assert_eq!(env.n_actions(), 4);
    let err = env.step(4).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ArcadeError>(),
        Some(&ArcadeError::InvalidAction {
            action: 4,
            n_actions: 4
        })
    );
    assert_eq!(env.step_count(), 0);
    assert_eq!(env.emulator().frame(), 0);
    Ok(())
}

#[test]
fn test_hard_reset() -> Result<()> {
    let emulator = ScriptedEmulator::new(8, 8)
        .rewards(vec![5; 100])
        .screen_value(|frame| frame as u8 * 2);
    let mut env = env(emulator)?;
    env.step(0)?;
    env.step(0)?;
    assert_eq!(env.score(), 40);

    env.hard_reset()?;
    assert_eq!(env.score(), 0);
    assert_eq!(env.step_count(), 0);
    assert_eq!(env.emulator().n_resets(), 1);
    assert_eq!(frames(&env)?, vec![0, 0, 0, 16]);
    Ok(())
}

#[test]
fn test_raw_screen() -> Result<()> {
    let env = env(ScriptedEmulator::new(8, 6).screen_value(|_| 9))?;
    assert_eq!((env.raw_width(), env.raw_height()), (8, 6));
    let mut rgb = vec![0u8; 3 * 8 * 6];
    env.rgb(&mut rgb)?;
    assert!(rgb.iter().all(|&p| p == 9));
    assert!(env.rgb(&mut [0u8; 10]).is_err());
    Ok(())
}
