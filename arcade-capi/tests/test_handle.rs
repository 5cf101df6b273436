use anyhow::Result;
use arcade_atari_env::{util::ScriptedEmulator, AtariEnv, AtariEnvConfig, Emulator};
use arcade_capi::*;
use arcade_core::{ObsConfig, ReplayBufferConfig};
use std::ptr;

const STATE: usize = 4 * 4 * 4;

fn handle(emulator: ScriptedEmulator) -> Result<*mut EnvHandle> {
    let config = AtariEnvConfig::default()
        .obs(ObsConfig::default().width(4))
        .replay(ReplayBufferConfig::default().capacity(32).seed(Some(3)));
    let emulator: Box<dyn Emulator> = Box::new(emulator);
    Ok(into_handle(AtariEnv::with_emulator(emulator, &config)?))
}

#[test]
fn test_episode_through_handle() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let emulator = ScriptedEmulator::new(8, 8)
        .rewards(vec![1; 100])
        .game_over_at(22);
    let env = handle(emulator)?;

    unsafe {
        assert_eq!(arcade_action_length_env(env), 4);
        assert_eq!(arcade_raw_width_env(env), 8);
        assert_eq!(arcade_raw_height_env(env), 8);

        let mut reward = 0;
        while !arcade_done_env(env) {
            assert_eq!(arcade_act_env(env, 1, false, &mut reward), ARCADE_OK);
        }
        assert_eq!(reward, 2);
        assert!(arcade_game_over_env(env));
        assert!(!arcade_max_step_reached_env(env));
        assert_eq!(arcade_episode_steps_env(env), 6);
        assert_eq!(arcade_episode_score_env(env), 22);

        assert_eq!(arcade_reset_env(env), ARCADE_OK);
        assert!(!arcade_done_env(env));
        assert!(!arcade_game_over_env(env));

        let mut obs = vec![0u8; STATE];
        assert_eq!(arcade_get_obs_env(env, obs.as_mut_ptr(), obs.len()), ARCADE_OK);
        assert_eq!(
            arcade_get_obs_env(env, obs.as_mut_ptr(), obs.len() - 1),
            ARCADE_ERR_BUFFER_LENGTH
        );
        let mut rgb = vec![0u8; 3 * 8 * 8];
        assert_eq!(arcade_get_rgb_env(env, rgb.as_mut_ptr(), rgb.len()), ARCADE_OK);

        assert_eq!(arcade_act_env(env, 9, true, ptr::null_mut()), ARCADE_ERR_INVALID_ACTION);
        assert_eq!(arcade_hard_reset_env(env), ARCADE_OK);
        arcade_del_env(env);
    }
    Ok(())
}

#[test]
fn test_prefetch_into_sub_range() -> Result<()> {
    let env = handle(ScriptedEmulator::new(8, 8).rewards(vec![1; 100]))?;
    let n = 8;
    let mut states = vec![0u8; n * STATE];
    let mut actions = vec![7u8; n];
    let mut rewards = vec![-1f32; n];
    let mut end_states = vec![0u8; n * STATE];
    let mut dones = vec![-1f32; n];

    unsafe {
        // Nothing recorded yet
        assert_eq!(
            arcade_prefetch_batch_env(
                env,
                states.as_mut_ptr(),
                actions.as_mut_ptr(),
                rewards.as_mut_ptr(),
                end_states.as_mut_ptr(),
                dones.as_mut_ptr(),
                n,
                0,
                n,
            ),
            ARCADE_ERR_UNDERFLOW
        );

        for _ in 0..5 {
            assert_eq!(arcade_act_env(env, 2, false, ptr::null_mut()), ARCADE_OK);
        }
        assert_eq!(
            arcade_prefetch_batch_env(
                env,
                states.as_mut_ptr(),
                actions.as_mut_ptr(),
                rewards.as_mut_ptr(),
                end_states.as_mut_ptr(),
                dones.as_mut_ptr(),
                n,
                2,
                3,
            ),
            ARCADE_OK
        );
        assert_eq!(
            arcade_prefetch_batch_env(
                env,
                states.as_mut_ptr(),
                actions.as_mut_ptr(),
                rewards.as_mut_ptr(),
                end_states.as_mut_ptr(),
                dones.as_mut_ptr(),
                n,
                6,
                3,
            ),
            ARCADE_ERR_BATCH_RANGE
        );
        arcade_del_env(env);
    }

    assert_eq!(actions, vec![7, 7, 2, 2, 2, 7, 7, 7]);
    assert_eq!(rewards, vec![-1.0, -1.0, 4.0, 4.0, 4.0, -1.0, -1.0, -1.0]);
    assert_eq!(dones, vec![-1.0, -1.0, 0.0, 0.0, 0.0, -1.0, -1.0, -1.0]);
    assert!(states[..2 * STATE].iter().all(|&p| p == 0));
    assert!(end_states[2 * STATE..5 * STATE].iter().any(|&p| p != 0));
    Ok(())
}

#[test]
fn test_null_handle() {
    unsafe {
        assert_eq!(arcade_reset_env(ptr::null_mut()), ARCADE_ERR_NULL_PTR);
        assert_eq!(arcade_hard_reset_env(ptr::null_mut()), ARCADE_ERR_NULL_PTR);
        assert_eq!(arcade_action_length_env(ptr::null_mut()), ARCADE_ERR_NULL_PTR);
        assert_eq!(
            arcade_act_env(ptr::null_mut(), 0, false, ptr::null_mut()),
            ARCADE_ERR_NULL_PTR
        );
        assert!(!arcade_done_env(ptr::null_mut()));
        assert_eq!(arcade_episode_score_env(ptr::null_mut()), 0);
        arcade_del_env(ptr::null_mut());
    }
}
