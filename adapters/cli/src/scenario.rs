//! Shareable scenario strings for the demo driver.
//!
//! A scenario captures a complete starting world (grid dimensions, tile
//! bytes and agent poses) as a single line suitable for clipboard
//! transfer: `gridsight:v1:<cols>x<rows>:<base64 payload>`.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use gridsight_core::{Heading, Tile};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SCENARIO_DOMAIN: &str = "gridsight";
const SCENARIO_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded scenario payload.
pub(crate) const SCENARIO_HEADER: &str = "gridsight:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Complete starting world for one demo run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Scenario {
    /// Number of tile rows in the grid.
    pub rows: u32,
    /// Number of tile columns in the grid.
    pub cols: u32,
    /// Row-major tile codes, one per cell.
    pub tiles: Vec<Tile>,
    /// Agents present in the world, in index order.
    pub agents: Vec<ScenarioAgent>,
}

/// Starting pose of one agent within a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScenarioAgent {
    /// Flat grid cell the agent occupies.
    pub position: u32,
    /// Direction the agent faces.
    pub heading: Heading,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableScenario {
    tiles: Vec<Tile>,
    agents: Vec<ScenarioAgent>,
}

/// Errors that can occur while decoding scenario strings.
#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    /// The provided string was empty or contained only whitespace.
    #[error("scenario string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded scenario.
    #[error("scenario string is missing the prefix")]
    MissingPrefix,
    /// The encoded scenario did not contain a version segment.
    #[error("scenario string is missing the version")]
    MissingVersion,
    /// The encoded scenario did not include grid dimensions.
    #[error("scenario string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded scenario did not include the payload segment.
    #[error("scenario string is missing the payload")]
    MissingPayload,
    /// The encoded scenario used an unexpected prefix segment.
    #[error("scenario prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded scenario used an unsupported version identifier.
    #[error("scenario version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded scenario.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode scenario payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse scenario payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    /// The payload's tile count disagrees with the grid dimensions.
    #[error("grid is {cols}x{rows} but payload holds {tiles} tiles")]
    TileCountMismatch {
        /// Columns announced in the dimensions segment.
        cols: u32,
        /// Rows announced in the dimensions segment.
        rows: u32,
        /// Tiles actually present in the payload.
        tiles: usize,
    },
    /// An agent's position lies outside the announced grid.
    #[error("agent {agent} sits at position {position}, outside the grid")]
    AgentOutOfBounds {
        /// Index of the offending agent.
        agent: usize,
        /// Position found in the payload.
        position: u32,
    },
}

impl Scenario {
    /// Encodes the scenario into a single-line string suitable for
    /// clipboard transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableScenario {
            tiles: self.tiles.clone(),
            agents: self.agents.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("scenario serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SCENARIO_HEADER}:{}x{}:{encoded}", self.cols, self.rows)
    }

    /// Decodes a scenario from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, ScenarioError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ScenarioError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(ScenarioError::MissingPrefix)?;
        let version = parts.next().ok_or(ScenarioError::MissingVersion)?;
        let dimensions = parts.next().ok_or(ScenarioError::MissingDimensions)?;
        let payload = parts.next().ok_or(ScenarioError::MissingPayload)?;

        if domain != SCENARIO_DOMAIN {
            return Err(ScenarioError::InvalidPrefix(domain.to_owned()));
        }
        if version != SCENARIO_VERSION {
            return Err(ScenarioError::UnsupportedVersion(version.to_owned()));
        }

        let (cols, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        let decoded: SerializableScenario = serde_json::from_slice(&bytes)?;

        let cells = (rows as usize) * (cols as usize);
        if decoded.tiles.len() != cells {
            return Err(ScenarioError::TileCountMismatch {
                cols,
                rows,
                tiles: decoded.tiles.len(),
            });
        }
        for (agent, entry) in decoded.agents.iter().enumerate() {
            if entry.position as usize >= cells {
                return Err(ScenarioError::AgentOutOfBounds {
                    agent,
                    position: entry.position,
                });
            }
        }

        Ok(Self {
            rows,
            cols,
            tiles: decoded.tiles,
            agents: decoded.agents,
        })
    }

    /// Builds the kernel's world buffer for this scenario.
    #[must_use]
    pub(crate) fn world_words(&self) -> Vec<u32> {
        let mut words = vec![self.agents.len() as u32];
        words.extend(self.agents.iter().map(|agent| agent.position));
        words.extend(self.agents.iter().map(|agent| agent.heading.code()));
        words.push(self.rows);
        words.push(self.cols);

        let mut grid_words = vec![0u32; self.tiles.len().div_ceil(4)];
        for (index, tile) in self.tiles.iter().enumerate() {
            grid_words[index / 4] |= u32::from(tile.code()) << ((index % 4) * 8);
        }
        words.extend(grid_words);
        words
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), ScenarioError> {
    let (cols, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| ScenarioError::InvalidDimensions(dimensions.to_owned()))?;

    let cols = cols
        .trim()
        .parse::<u32>()
        .map_err(|_| ScenarioError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| ScenarioError::InvalidDimensions(dimensions.to_owned()))?;

    if cols == 0 || rows == 0 {
        return Err(ScenarioError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((cols, rows))
}
