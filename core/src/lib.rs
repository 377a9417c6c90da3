#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the gridsight kernel.
//!
//! This crate defines the vocabulary that connects the world codec, the
//! action resolver, the vision system and external drivers: the one-byte
//! tile codes stored in the grid, the headings agents face, the wire-level
//! action codes drivers submit each tick, and the fixed format of the
//! per-agent output records the kernel writes back.

use serde::{Deserialize, Serialize};

/// Edge length of the square field-of-view window sampled for each agent.
pub const FOV_EDGE: u32 = 5;

/// Number of cells contained in one field-of-view window.
pub const FOV_CELLS: usize = (FOV_EDGE * FOV_EDGE) as usize;

/// Flattened window index of the observing agent's own cell.
///
/// The window is heading-normalized, so the agent always sits at the
/// bottom-center cell regardless of which way it faces in the world.
pub const FOV_SELF_INDEX: u32 = 22;

/// Version tag written as the first word of every agent output record.
pub const AGENT_RECORD_VERSION: u32 = 0x0001_0001;

/// Number of 32-bit words occupied by one agent output record.
///
/// Four header words (version, window rows, window columns, self index)
/// followed by the 25 window tile bytes packed four to a word.
pub const AGENT_RECORD_WORDS: usize = 4 + FOV_CELLS.div_ceil(4);

/// Seed substituted when a driver passes zero to request the default.
pub const DEFAULT_RNG_SEED: u32 = 0x1234_5678;

/// Bit within a tile code marking the cell as impassable.
const TILE_BLOCKED_BIT: u8 = 0x10;

/// One-byte code describing a single grid cell.
///
/// The low nibble carries the base kind of the cell while the `0x10` bit
/// flags it as blocked. Walls and closed doors carry the flag intrinsically;
/// floors and open doors gain it only while an agent stands on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile(u8);

impl Tile {
    /// Marker for cells outside the grid or hidden by occlusion.
    pub const UNSEEN: Self = Self(0x00);
    /// Impassable wall cell.
    pub const WALL: Self = Self(0x11);
    /// Walkable floor cell with no agent on it.
    pub const FLOOR: Self = Self(0x02);
    /// Floor cell currently occupied by an agent.
    pub const FLOOR_OCCUPIED: Self = Self(0x12);
    /// Open door cell with no agent on it.
    pub const OPEN_DOOR: Self = Self(0x03);
    /// Open door cell currently occupied by an agent.
    pub const OPEN_DOOR_OCCUPIED: Self = Self(0x13);
    /// Closed door cell; impassable until opened.
    pub const CLOSED_DOOR: Self = Self(0x33);

    /// Wraps a raw tile byte without interpretation.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        Self(code)
    }

    /// Raw byte stored in the grid for this tile.
    #[must_use]
    pub const fn code(&self) -> u8 {
        self.0
    }

    /// Reports whether an agent is barred from entering the cell.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.0 & TILE_BLOCKED_BIT == TILE_BLOCKED_BIT
    }

    /// Returns the tile with its blocked flag raised.
    ///
    /// Only meaningful for floor and open-door cells; base-kind bits are
    /// left untouched.
    #[must_use]
    pub const fn mark_occupied(self) -> Self {
        Self(self.0 | TILE_BLOCKED_BIT)
    }

    /// Returns the tile with its blocked flag cleared.
    ///
    /// Only meaningful for floor and open-door cells; applying this to a
    /// wall or closed door clears the intrinsic flag, and callers must not
    /// rely on that.
    #[must_use]
    pub const fn mark_vacated(self) -> Self {
        Self(self.0 & !TILE_BLOCKED_BIT)
    }
}

/// Facing direction of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Facing toward decreasing row indices.
    Up,
    /// Facing toward increasing column indices.
    Right,
    /// Facing toward increasing row indices.
    Down,
    /// Facing toward decreasing column indices.
    Left,
}

impl Heading {
    /// Decodes a wire-level heading word, rejecting codes outside 0–3.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Up),
            1 => Some(Self::Right),
            2 => Some(Self::Down),
            3 => Some(Self::Left),
            _ => None,
        }
    }

    /// Wire-level code for this heading.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    /// Heading reached after rotating clockwise by the given quarter turns.
    #[must_use]
    pub const fn rotated_clockwise(self, quarter_turns: u32) -> Self {
        match (self.code() + quarter_turns % 4) % 4 {
            0 => Self::Up,
            1 => Self::Right,
            2 => Self::Down,
            _ => Self::Left,
        }
    }
}

/// Discrete intent submitted by a driver for one agent and one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Leave the agent untouched.
    None,
    /// Rotate the agent clockwise by 90 degrees.
    Turn90,
    /// Rotate the agent clockwise by 180 degrees.
    Turn180,
    /// Rotate the agent clockwise by 270 degrees.
    Turn270,
    /// Step one cell toward decreasing row indices.
    MoveUp,
    /// Step one cell toward increasing column indices.
    MoveRight,
    /// Step one cell toward increasing row indices.
    MoveDown,
    /// Step one cell toward decreasing column indices.
    MoveLeft,
    /// Open a closed door in the cell directly ahead.
    OpenDoor,
    /// Close an open, unoccupied door in the cell directly ahead.
    CloseDoor,
}

impl Action {
    /// Decodes a wire-level action word.
    ///
    /// Codes outside the defined enumeration decode to [`Action::None`]:
    /// malformed intents are ignored, never reported as errors.
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Turn90,
            2 => Self::Turn180,
            3 => Self::Turn270,
            4 => Self::MoveUp,
            5 => Self::MoveRight,
            6 => Self::MoveDown,
            7 => Self::MoveLeft,
            8 => Self::OpenDoor,
            9 => Self::CloseDoor,
            _ => Self::None,
        }
    }

    /// Wire-level code for this action.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Turn90 => 1,
            Self::Turn180 => 2,
            Self::Turn270 => 3,
            Self::MoveUp => 4,
            Self::MoveRight => 5,
            Self::MoveDown => 6,
            Self::MoveLeft => 7,
            Self::OpenDoor => 8,
            Self::CloseDoor => 9,
        }
    }

    /// Direction of travel for move actions, `None` otherwise.
    #[must_use]
    pub const fn move_heading(&self) -> Option<Heading> {
        match self {
            Self::MoveUp => Some(Heading::Up),
            Self::MoveRight => Some(Heading::Right),
            Self::MoveDown => Some(Heading::Down),
            Self::MoveLeft => Some(Heading::Left),
            _ => None,
        }
    }

    /// Clockwise quarter turns for turn actions, `None` otherwise.
    #[must_use]
    pub const fn turn_quarter_turns(&self) -> Option<u32> {
        match self {
            Self::Turn90 => Some(1),
            Self::Turn180 => Some(2),
            Self::Turn270 => Some(3),
            _ => None,
        }
    }
}
