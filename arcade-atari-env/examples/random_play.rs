use anyhow::Result;
use arcade_atari_env::{AtariEnv, AtariEnvConfig, Mode};
use arcade_core::ReplayBufferConfig;
use log::info;

const N_EPISODES: usize = 3;

struct RandomPolicy {
    n_acts: usize,
}

impl RandomPolicy {
    fn sample(&self) -> usize {
        fastrand::usize(..self.n_acts)
    }
}

fn env_config(name: &str) -> AtariEnvConfig {
    AtariEnvConfig::default()
        .name(name)
        .seed(Some(42))
        .replay(ReplayBufferConfig::default().capacity(50_000).seed(Some(42)))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    fastrand::seed(42);

    // Pong environment
    let env_config = env_config("pong");
    let mut env = AtariEnv::build(&env_config)?;
    let policy = RandomPolicy {
        n_acts: env.n_actions(),
    };

    // Life losses end a transition sequence but not the episode
    let mut n_episodes = 0;
    while n_episodes < N_EPISODES {
        env.act(policy.sample(), Mode::Train)?;
        if env.done() {
            if env.game_over() || env.max_step_reached() {
                n_episodes += 1;
                info!(
                    "Episode {}: score = {}, steps = {}",
                    n_episodes,
                    env.episode_score(),
                    env.episode_steps()
                );
            }
            env.soft_reset();
        }
    }

    let batch = env.sample_batch()?;
    info!(
        "Sampled {} transitions from {} stored, mean reward = {}",
        batch.len(),
        env.memory().len(),
        batch.rewards.iter().sum::<f32>() / batch.len() as f32
    );

    Ok(())
}
