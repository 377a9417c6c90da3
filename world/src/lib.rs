#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Transient world state decoded from a driver-owned word buffer.
//!
//! A [`World`] borrows the caller's buffer for the duration of one tick:
//! agent positions and headings are mutated in place, tile bytes are read
//! and written through the packed grid words, and nothing survives the
//! borrow except what the driver re-supplies on the next call. Action
//! resolution follows a strict silent-failure policy: blocked moves,
//! mistargeted door toggles and unknown intents leave the world untouched.

use gridsight_core::{Action, Heading, Tile};

mod codec;

pub use codec::{write_agent_record, DecodeError, GridView};

use codec::TileSlab;

const RNG_LCG_MUL: u32 = 1_664_525;
const RNG_LCG_INC: u32 = 1_013_904_223;

/// Mutable view over one tick's world state.
///
/// Positions, headings and tiles all live in the driver's buffer; the only
/// owned state is the scheduling RNG, which is seeded per call and never
/// written back.
#[derive(Debug)]
pub struct World<'buffer> {
    pub(crate) rng_state: u32,
    pub(crate) positions: &'buffer mut [u32],
    pub(crate) headings: &'buffer mut [u32],
    pub(crate) n_rows: u32,
    pub(crate) n_cols: u32,
    pub(crate) tiles: TileSlab<'buffer>,
}

impl<'buffer> World<'buffer> {
    /// Decodes a world from the driver's word buffer without copying.
    ///
    /// A zero `seed` selects the default generator state. Buffer-shape
    /// violations surface as [`DecodeError`] values from this single
    /// boundary; no further validation happens during the tick.
    pub fn parse(words: &'buffer mut [u32], seed: u32) -> Result<Self, DecodeError> {
        codec::parse(words, seed)
    }

    /// Number of agents decoded from the buffer.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.positions.len()
    }

    /// Flat grid cell currently occupied by the agent.
    #[must_use]
    pub fn position(&self, agent: usize) -> u32 {
        self.positions[agent]
    }

    /// Direction the agent currently faces.
    #[must_use]
    pub fn heading(&self, agent: usize) -> Heading {
        Heading::from_code(self.headings[agent]).unwrap_or(Heading::Up)
    }

    /// Read-only view of the tile grid for systems and drivers.
    #[must_use]
    pub fn grid(&self) -> GridView<'_> {
        GridView::new(
            self.n_rows,
            self.n_cols,
            self.tiles.cell_count(),
            self.tiles.words(),
        )
    }

    /// Advances the scheduling RNG one linear-congruential step.
    #[must_use]
    pub fn next_random(&mut self) -> u32 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(RNG_LCG_MUL)
            .wrapping_add(RNG_LCG_INC);
        self.rng_state
    }

    /// Resolves one agent's intent against the shared grid.
    ///
    /// Every disallowed outcome (stepping into a blocked cell, toggling a
    /// cell that is not the matching door state, an out-of-range intent
    /// code) leaves the world unchanged without signalling an error.
    pub fn apply_action(&mut self, agent: usize, action: Action) {
        match action {
            Action::None => {}
            Action::Turn90 | Action::Turn180 | Action::Turn270 => self.turn(agent, action),
            Action::MoveUp | Action::MoveRight | Action::MoveDown | Action::MoveLeft => {
                self.try_move(agent, action);
            }
            Action::OpenDoor => self.try_open_door(agent),
            Action::CloseDoor => self.try_close_door(agent),
        }
    }

    /// Cell one step from `position` in the given direction.
    ///
    /// Steps that would leave the grid return `position` itself; there is
    /// no wrap-around between rows or columns.
    #[must_use]
    pub fn ahead(&self, position: u32, heading: Heading) -> u32 {
        match heading {
            Heading::Up => {
                if position >= self.n_cols {
                    return position - self.n_cols;
                }
            }
            Heading::Right => {
                if (position % self.n_cols) + 1 < self.n_cols {
                    return position + 1;
                }
            }
            Heading::Down => {
                if position + self.n_cols < self.n_rows * self.n_cols {
                    return position + self.n_cols;
                }
            }
            Heading::Left => {
                if position % self.n_cols > 0 {
                    return position - 1;
                }
            }
        }

        position
    }

    fn try_move(&mut self, agent: usize, action: Action) {
        let Some(direction) = action.move_heading() else {
            return;
        };

        let origin = self.positions[agent];
        let target = self.ahead(origin, direction);
        let target_cell = target as usize;

        let tile = self.tiles.get(target_cell);
        if tile.is_blocked() {
            return;
        }

        self.tiles.set(target_cell, tile.mark_occupied());
        if target != origin {
            let origin_cell = origin as usize;
            let origin_tile = self.tiles.get(origin_cell);
            self.tiles.set(origin_cell, origin_tile.mark_vacated());
        }
        self.positions[agent] = target;
    }

    fn turn(&mut self, agent: usize, action: Action) {
        let Some(quarter_turns) = action.turn_quarter_turns() else {
            return;
        };
        self.headings[agent] = self.heading(agent).rotated_clockwise(quarter_turns).code();
    }

    fn try_open_door(&mut self, agent: usize) {
        let target = self.ahead(self.positions[agent], self.heading(agent)) as usize;
        if self.tiles.get(target) == Tile::CLOSED_DOOR {
            self.tiles.set(target, Tile::OPEN_DOOR);
        }
    }

    fn try_close_door(&mut self, agent: usize) {
        let target = self.ahead(self.positions[agent], self.heading(agent)) as usize;
        if self.tiles.get(target) == Tile::OPEN_DOOR {
            self.tiles.set(target, Tile::CLOSED_DOOR);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use gridsight_core::Heading;

    use super::{GridView, World};

    /// Number of agents present this tick.
    #[must_use]
    pub fn agent_count(world: &World<'_>) -> usize {
        world.agent_count()
    }

    /// Captures the position and heading of one agent.
    #[must_use]
    pub fn pose(world: &World<'_>, agent: usize) -> Pose {
        Pose {
            position: world.position(agent),
            heading: world.heading(agent),
        }
    }

    /// Read-only view of the tile grid.
    #[must_use]
    pub fn grid<'world>(world: &'world World<'_>) -> GridView<'world> {
        world.grid()
    }

    /// Position and heading of a single agent at a point in time.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Pose {
        /// Flat grid cell the agent occupies.
        pub position: u32,
        /// Direction the agent faces.
        pub heading: Heading,
    }
}
