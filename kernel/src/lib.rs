#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick orchestration for the gridsight simulation kernel.
//!
//! One [`tick`] call resolves a whole batch of per-agent intents against a
//! driver-owned world buffer and writes every agent's occluded window back
//! into a driver-owned output buffer. The kernel holds no state across
//! calls: the world is decoded fresh each time and the scheduling RNG is
//! reseeded from the driver-supplied seed.

use gridsight_core::{Action, AGENT_RECORD_WORDS};
use gridsight_system_vision as vision;
use gridsight_world::{query, write_agent_record, DecodeError, World};
use thiserror::Error;

/// Number of 32-bit words one agent's output record occupies.
///
/// Drivers size their output buffer as `n_agents` times this constant.
pub const RECORD_WORDS: usize = AGENT_RECORD_WORDS;

/// Queryable form of [`RECORD_WORDS`] for drivers binding by call.
#[must_use]
pub const fn agent_record_words() -> usize {
    RECORD_WORDS
}

/// Driver precondition violations detected at the tick boundary.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TickError {
    /// The world buffer failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The action buffer holds fewer words than there are agents.
    #[error("action buffer holds {actual} words, {expected} agents present")]
    ActionBufferTooSmall {
        /// Words required, one per agent.
        expected: usize,
        /// Words actually supplied.
        actual: usize,
    },
    /// The output buffer cannot hold one record per agent.
    #[error("output buffer holds {actual} words, {expected} required")]
    OutputBufferTooSmall {
        /// Words required for every agent record.
        expected: usize,
        /// Words actually supplied.
        actual: usize,
    },
}

/// Resolves one simulation step.
///
/// Agents' intents are applied in a seed-derived rotation so that
/// conflicting intents are not always resolved in the same agent's favor,
/// then every agent's occluded window record is written in plain index
/// order. A zero `seed` selects the default generator state. With zero
/// agents the call returns immediately and writes nothing.
pub fn tick(
    world_words: &mut [u32],
    agent_records: &mut [u32],
    actions: &[u32],
    seed: u32,
) -> Result<(), TickError> {
    let mut world = World::parse(world_words, seed)?;

    let n_agents = world.agent_count();
    if n_agents == 0 {
        return Ok(());
    }

    if actions.len() < n_agents {
        return Err(TickError::ActionBufferTooSmall {
            expected: n_agents,
            actual: actions.len(),
        });
    }

    let record_words = n_agents
        .checked_mul(RECORD_WORDS)
        .ok_or(TickError::OutputBufferTooSmall {
            expected: usize::MAX,
            actual: agent_records.len(),
        })?;
    if agent_records.len() < record_words {
        return Err(TickError::OutputBufferTooSmall {
            expected: record_words,
            actual: agent_records.len(),
        });
    }

    let mut index = world.next_random() as usize % n_agents;
    let step = if world.next_random() % 2 == 0 {
        1
    } else {
        n_agents - 1
    };

    for _ in 0..n_agents {
        index = (index + step) % n_agents;
        world.apply_action(index, Action::from_code(actions[index]));
    }

    for (agent, slot) in agent_records[..record_words]
        .chunks_exact_mut(RECORD_WORDS)
        .enumerate()
    {
        let pose = query::pose(&world, agent);
        let window = vision::observe(query::grid(&world), pose.position, pose.heading);
        write_agent_record(slot, &window);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{agent_record_words, RECORD_WORDS};

    #[test]
    fn record_size_query_matches_constant() {
        assert_eq!(agent_record_words(), RECORD_WORDS);
        assert_eq!(RECORD_WORDS, 11);
    }
}
