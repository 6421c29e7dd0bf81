#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy)]
pub struct FuzzParams {
    pub seed: u64,
    pub steps: usize,
    /// Number of distinct segments per key level.
    pub fanout: u64,
}

fn env_flag(name: &str) -> bool {
    matches!(
        std::env::var(name).ok().as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok()?.trim().parse::<u64>().ok()
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok()?.trim().parse::<usize>().ok()
}

fn mix_seed(mut seed: u64, tag: &str) -> u64 {
    // Each test gets its own deterministic stream from the shared base seed.
    for (i, b) in tag.as_bytes().iter().enumerate() {
        seed ^= (*b as u64) << ((i % 8) * 8);
        seed = seed.rotate_left(13).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    }
    seed
}

pub fn params(test_tag: &str, default_steps: usize, default_fanout: u64) -> FuzzParams {
    let base_seed = env_u64("CONFMAP_FUZZ_SEED").unwrap_or(0xA1B2_C3D4_E5F6_0708);
    let steps = env_usize("CONFMAP_FUZZ_STEPS").unwrap_or(default_steps);
    let fanout = env_u64("CONFMAP_FUZZ_FANOUT").unwrap_or(default_fanout);

    FuzzParams {
        seed: mix_seed(base_seed, test_tag),
        steps,
        fanout: fanout.max(1),
    }
}

pub fn verbose() -> bool {
    env_flag("CONFMAP_FUZZ_VERBOSE")
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Random dotted key of one to four levels, e.g. `s2.s0.s1`.
pub fn choose_key(rng: &mut StdRng, fanout: u64) -> String {
    let depth = rng.gen_range(1..=4);
    (0..depth)
        .map(|_| format!("s{}", rng.gen_range(0..fanout)))
        .collect::<Vec<_>>()
        .join(".")
}

pub fn choose_value(rng: &mut StdRng) -> String {
    rng.gen::<u32>().to_string()
}
