#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the gridsight kernel.
//!
//! Builds a demo room (or decodes a shared scenario string), then runs the
//! kernel for a number of ticks with reproducible random intents, printing
//! the world and every agent's occluded window after each step.

mod scenario;

use anyhow::{ensure, Context};
use clap::Parser;
use gridsight_core::{Heading, Tile, FOV_EDGE};
use gridsight_kernel::{tick, RECORD_WORDS};
use gridsight_world::{query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::scenario::{Scenario, ScenarioAgent};

/// Drives the simulation kernel through a demo world.
#[derive(Debug, Parser)]
#[command(name = "gridsight")]
struct Args {
    /// Number of grid rows in the generated demo room.
    #[arg(long, default_value_t = 8)]
    rows: u32,
    /// Number of grid columns in the generated demo room.
    #[arg(long, default_value_t = 12)]
    cols: u32,
    /// Number of agents seeded into the demo room.
    #[arg(long, default_value_t = 3)]
    agents: u32,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 10)]
    ticks: u32,
    /// Seed for the intent script and per-tick scheduling.
    #[arg(long, default_value_t = 7)]
    seed: u32,
    /// Scenario string to run instead of the generated room.
    #[arg(long)]
    scenario: Option<String>,
    /// Print the starting scenario string and exit.
    #[arg(long)]
    export: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let scenario = match &args.scenario {
        Some(value) => Scenario::decode(value).context("invalid --scenario string")?,
        None => demo_room(args.rows, args.cols, args.agents)?,
    };

    if args.export {
        println!("{}", scenario.encode());
        return Ok(());
    }

    let n_agents = scenario.agents.len();
    let mut words = scenario.world_words();
    let mut records = vec![0u32; n_agents * RECORD_WORDS];
    let mut actions = vec![0u32; n_agents];
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(args.seed));

    for step in 1..=args.ticks {
        for action in actions.iter_mut() {
            *action = rng.gen_range(0..10);
        }
        let tick_seed = rng.gen();
        tick(&mut words, &mut records, &actions, tick_seed)
            .context("kernel rejected the demo buffers")?;

        println!("tick {step}");
        render_world(&mut words)?;
        render_windows(&records, n_agents);
    }

    Ok(())
}

/// Generates a bordered room with a doored dividing wall and seeded agents.
fn demo_room(rows: u32, cols: u32, agents: u32) -> anyhow::Result<Scenario> {
    ensure!(rows >= 3 && cols >= 3, "demo room needs at least a 3x3 grid");

    let cell = |row: u32, col: u32| (row * cols + col) as usize;
    let mut tiles = vec![Tile::FLOOR; (rows * cols) as usize];
    for col in 0..cols {
        tiles[cell(0, col)] = Tile::WALL;
        tiles[cell(rows - 1, col)] = Tile::WALL;
    }
    for row in 0..rows {
        tiles[cell(row, 0)] = Tile::WALL;
        tiles[cell(row, cols - 1)] = Tile::WALL;
    }
    if cols >= 5 {
        let divider = cols / 2;
        for row in 1..rows - 1 {
            tiles[cell(row, divider)] = Tile::WALL;
        }
        tiles[cell(rows / 2, divider)] = Tile::CLOSED_DOOR;
    }

    let headings = [Heading::Down, Heading::Right, Heading::Up, Heading::Left];
    let mut seeded = Vec::new();
    for (index, tile) in tiles.iter_mut().enumerate() {
        if seeded.len() == agents as usize {
            break;
        }
        if *tile == Tile::FLOOR {
            *tile = Tile::FLOOR_OCCUPIED;
            seeded.push(ScenarioAgent {
                position: index as u32,
                heading: headings[seeded.len() % headings.len()],
            });
        }
    }
    ensure!(
        seeded.len() == agents as usize,
        "demo room has only {} free cells for {agents} agents",
        seeded.len()
    );

    Ok(Scenario {
        rows,
        cols,
        tiles,
        agents: seeded,
    })
}

/// Prints the world grid with agents overlaid as heading arrows.
fn render_world(words: &mut [u32]) -> anyhow::Result<()> {
    let world = World::parse(words, 1).context("demo world buffer failed to decode")?;
    let poses: Vec<query::Pose> = (0..query::agent_count(&world))
        .map(|agent| query::pose(&world, agent))
        .collect();
    let grid = query::grid(&world);

    for row in 0..grid.rows() {
        let mut line = String::new();
        for col in 0..grid.cols() {
            let position = row * grid.cols() + col;
            let glyph = poses
                .iter()
                .find(|pose| pose.position == position)
                .map_or_else(|| tile_glyph(grid.tile(position)), heading_glyph);
            line.push(glyph);
        }
        println!("{line}");
    }

    Ok(())
}

/// Prints each agent's occluded window decoded from the record buffer.
fn render_windows(records: &[u32], n_agents: usize) {
    for agent in 0..n_agents {
        let record = &records[agent * RECORD_WORDS..(agent + 1) * RECORD_WORDS];
        println!("agent {agent} sees:");
        for window_row in 0..FOV_EDGE {
            let mut line = String::new();
            for window_col in 0..FOV_EDGE {
                let cell = (window_row * FOV_EDGE + window_col) as usize;
                let byte = (record[4 + cell / 4] >> ((cell % 4) * 8)) & 0xff;
                line.push(tile_glyph(Tile::from_code(byte as u8)));
            }
            println!("  {line}");
        }
    }
}

fn tile_glyph(tile: Tile) -> char {
    match tile {
        Tile::UNSEEN => ' ',
        Tile::WALL => '#',
        Tile::FLOOR => '.',
        Tile::FLOOR_OCCUPIED | Tile::OPEN_DOOR_OCCUPIED => 'x',
        Tile::OPEN_DOOR => '/',
        Tile::CLOSED_DOOR => '+',
        _ => '?',
    }
}

fn heading_glyph(pose: &query::Pose) -> char {
    match pose.heading {
        Heading::Up => '^',
        Heading::Right => '>',
        Heading::Down => 'v',
        Heading::Left => '<',
    }
}
