//! Word-buffer layout shared with external drivers.
//!
//! A world buffer is a flat sequence of unsigned 32-bit words:
//! `[n_agents, pos_0..pos_{n-1}, heading_0..heading_{n-1}, n_rows, n_cols,
//! tile_bytes...]` where the tile grid is addressed byte-by-byte, four
//! tiles to a word, using little-endian byte order within each word. All
//! offsets are computed here, once, and the buffer shape is validated at
//! this boundary only; past it the kernel trusts the decoded views.

use gridsight_core::{
    Heading, Tile, AGENT_RECORD_VERSION, AGENT_RECORD_WORDS, DEFAULT_RNG_SEED, FOV_CELLS, FOV_EDGE,
    FOV_SELF_INDEX,
};
use thiserror::Error;

use crate::World;

/// Number of bytes packed into one buffer word.
const BYTES_PER_WORD: usize = 4;

/// Violations of the world-buffer shape detected while decoding.
///
/// These are driver preconditions, not tick-time failures: a conforming
/// driver never observes them. Malformed *intents* (blocked moves, invalid
/// action codes) are silent no-ops and never surface here.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer is too short to hold the leading agent-count word.
    #[error("world buffer is empty")]
    MissingAgentCount,
    /// The buffer ends inside the agent table or grid header.
    #[error("world buffer holds {actual} words after the agent count, {expected} required")]
    TruncatedHeader {
        /// Words required for positions, headings and grid dimensions.
        expected: usize,
        /// Words actually present after the agent count.
        actual: usize,
    },
    /// The buffer ends inside the tile grid.
    #[error("tile grid requires {expected} words, {actual} present")]
    TruncatedGrid {
        /// Words required to hold every tile byte.
        expected: usize,
        /// Words actually present after the grid dimensions.
        actual: usize,
    },
    /// An agent's heading word lies outside the defined 0–3 range.
    #[error("agent {agent} has heading code {code}, expected 0-3")]
    InvalidHeading {
        /// Index of the offending agent.
        agent: usize,
        /// Raw heading word found in the buffer.
        code: u32,
    },
    /// An agent's position word does not name a grid cell.
    #[error("agent {agent} sits at position {position}, grid holds {cells} cells")]
    PositionOutOfBounds {
        /// Index of the offending agent.
        agent: usize,
        /// Raw position word found in the buffer.
        position: u32,
        /// Number of cells in the decoded grid.
        cells: usize,
    },
}

/// Decodes a world buffer into borrowed views without copying.
///
/// A zero `seed` selects [`DEFAULT_RNG_SEED`]; zero is the "use default"
/// sentinel, never a valid generator state.
pub(crate) fn parse(words: &mut [u32], seed: u32) -> Result<World<'_>, DecodeError> {
    let (count_word, rest) = words
        .split_first_mut()
        .ok_or(DecodeError::MissingAgentCount)?;
    let n_agents = usize::try_from(*count_word).unwrap_or(usize::MAX);

    let header_words = n_agents
        .checked_mul(2)
        .and_then(|agents| agents.checked_add(2))
        .ok_or(DecodeError::TruncatedHeader {
            expected: usize::MAX,
            actual: rest.len(),
        })?;
    if rest.len() < header_words {
        return Err(DecodeError::TruncatedHeader {
            expected: header_words,
            actual: rest.len(),
        });
    }

    let (positions, rest) = rest.split_at_mut(n_agents);
    let (headings, rest) = rest.split_at_mut(n_agents);
    let (dimensions, grid_words) = rest.split_at_mut(2);

    let n_rows = dimensions[0];
    let n_cols = dimensions[1];
    let cell_count = usize::try_from(u64::from(n_rows) * u64::from(n_cols)).unwrap_or(usize::MAX);
    let grid_word_count = cell_count.div_ceil(BYTES_PER_WORD);
    if grid_words.len() < grid_word_count {
        return Err(DecodeError::TruncatedGrid {
            expected: grid_word_count,
            actual: grid_words.len(),
        });
    }

    for (agent, &code) in headings.iter().enumerate() {
        if Heading::from_code(code).is_none() {
            return Err(DecodeError::InvalidHeading { agent, code });
        }
    }
    for (agent, &position) in positions.iter().enumerate() {
        if usize::try_from(position).map_or(true, |cell| cell >= cell_count) {
            return Err(DecodeError::PositionOutOfBounds {
                agent,
                position,
                cells: cell_count,
            });
        }
    }

    Ok(World {
        rng_state: if seed == 0 { DEFAULT_RNG_SEED } else { seed },
        positions,
        headings,
        n_rows,
        n_cols,
        tiles: TileSlab {
            words: &mut grid_words[..grid_word_count],
            cell_count,
        },
    })
}

/// Mutable byte-addressed view over the packed tile grid words.
#[derive(Debug)]
pub(crate) struct TileSlab<'buffer> {
    words: &'buffer mut [u32],
    cell_count: usize,
}

impl TileSlab<'_> {
    /// Tile stored at the given flat cell index.
    pub(crate) fn get(&self, cell: usize) -> Tile {
        debug_assert!(cell < self.cell_count);
        Tile::from_code(get_byte(self.words, cell))
    }

    /// Overwrites the tile stored at the given flat cell index.
    pub(crate) fn set(&mut self, cell: usize, tile: Tile) {
        debug_assert!(cell < self.cell_count);
        set_byte(self.words, cell, tile.code());
    }

    /// Number of cells addressable through the slab.
    pub(crate) fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Packed grid words backing the slab.
    pub(crate) fn words(&self) -> &[u32] {
        self.words
    }
}

/// Read-only view of the tile grid handed to systems.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'world> {
    n_rows: u32,
    n_cols: u32,
    cell_count: usize,
    words: &'world [u32],
}

impl<'world> GridView<'world> {
    pub(crate) fn new(n_rows: u32, n_cols: u32, cell_count: usize, words: &'world [u32]) -> Self {
        Self {
            n_rows,
            n_cols,
            cell_count,
            words,
        }
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.n_rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.n_cols
    }

    /// Tile stored at the given flat cell index.
    ///
    /// The index must name a cell inside the grid.
    #[must_use]
    pub fn tile(&self, position: u32) -> Tile {
        let cell = usize::try_from(position).unwrap_or(usize::MAX);
        debug_assert!(cell < self.cell_count);
        Tile::from_code(get_byte(self.words, cell))
    }
}

/// Writes one agent's output record into its fixed-stride slot.
///
/// The record is `[version, window rows, window columns, self cell index]`
/// followed by the window's tile bytes packed four to a word; trailing
/// padding bytes in the final word are zeroed.
pub fn write_agent_record(slot: &mut [u32], window: &[Tile; FOV_CELLS]) {
    debug_assert!(slot.len() == AGENT_RECORD_WORDS);
    slot[0] = AGENT_RECORD_VERSION;
    slot[1] = FOV_EDGE;
    slot[2] = FOV_EDGE;
    slot[3] = FOV_SELF_INDEX;

    let payload = &mut slot[4..];
    for word in payload.iter_mut() {
        *word = 0;
    }
    for (cell, tile) in window.iter().enumerate() {
        set_byte(payload, cell, tile.code());
    }
}

fn get_byte(words: &[u32], index: usize) -> u8 {
    let shift = (index % BYTES_PER_WORD) * 8;
    ((words[index / BYTES_PER_WORD] >> shift) & 0xff) as u8
}

fn set_byte(words: &mut [u32], index: usize, value: u8) {
    let shift = (index % BYTES_PER_WORD) * 8;
    let word = &mut words[index / BYTES_PER_WORD];
    *word = (*word & !(0xff_u32 << shift)) | (u32::from(value) << shift);
}
