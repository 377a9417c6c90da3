#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure vision system that samples and occludes per-agent windows.
//!
//! Each agent observes a fixed 5×5 window of the grid, normalized so that
//! the cell ahead of the agent always maps to decreasing local rows and the
//! agent itself always sits at the same bottom-center cell. A fixed
//! shadow-casting table then expunges cells whose line of sight from that
//! viewpoint is blocked. The system only reads world views; it never
//! mutates the grid.

use gridsight_core::{Heading, Tile, FOV_CELLS, FOV_EDGE};
use gridsight_world::GridView;

const EDGE: i64 = FOV_EDGE as i64;

/// World-to-window affine mapping for one heading.
///
/// Scanning the window's rows and columns top-to-bottom, left-to-right
/// visits world cells starting at the agent-relative origin, while the
/// local index of each visited cell is `row_stride * row + col_stride *
/// col + offset`. The four headings are reflections and transposes of the
/// heading-up case, which keeps the agent at the bottom-center cell.
struct WindowMapping {
    row_stride: i64,
    col_stride: i64,
    offset: i64,
    row_origin: i64,
    col_origin: i64,
}

/// Per-heading mappings indexed by heading code.
const WINDOW_MAPPINGS: [WindowMapping; 4] = [
    // Up
    WindowMapping {
        row_stride: EDGE,
        col_stride: 1,
        offset: 0,
        row_origin: -(EDGE - 1),
        col_origin: -(EDGE / 2),
    },
    // Right
    WindowMapping {
        row_stride: 1,
        col_stride: -EDGE,
        offset: EDGE * (EDGE - 1),
        row_origin: -(EDGE / 2),
        col_origin: 0,
    },
    // Down
    WindowMapping {
        row_stride: -EDGE,
        col_stride: -1,
        offset: EDGE * EDGE - 1,
        row_origin: 0,
        col_origin: -(EDGE / 2),
    },
    // Left
    WindowMapping {
        row_stride: -1,
        col_stride: EDGE,
        offset: EDGE - 1,
        row_origin: -(EDGE / 2),
        col_origin: -(EDGE - 1),
    },
];

/// Samples and occludes one agent's window in a single pass.
#[must_use]
pub fn observe(grid: GridView<'_>, position: u32, heading: Heading) -> [Tile; FOV_CELLS] {
    let mut window = sample_window(grid, position, heading);
    apply_occlusion(&mut window);
    window
}

/// Samples the heading-normalized window around one agent.
///
/// World cells outside the grid bounds yield [`Tile::UNSEEN`]; the agent's
/// own cell lands at [`gridsight_core::FOV_SELF_INDEX`] for every heading.
#[must_use]
pub fn sample_window(grid: GridView<'_>, position: u32, heading: Heading) -> [Tile; FOV_CELLS] {
    let rows = i64::from(grid.rows());
    let cols = i64::from(grid.cols());
    let agent_row = i64::from(position / grid.cols());
    let agent_col = i64::from(position % grid.cols());
    let mapping = &WINDOW_MAPPINGS[heading.code() as usize];

    let mut window = [Tile::UNSEEN; FOV_CELLS];
    for window_row in 0..EDGE {
        for window_col in 0..EDGE {
            let world_row = agent_row + mapping.row_origin + window_row;
            let world_col = agent_col + mapping.col_origin + window_col;
            let local = mapping.row_stride * window_row
                + mapping.col_stride * window_col
                + mapping.offset;

            if (0..rows).contains(&world_row) && (0..cols).contains(&world_col) {
                window[local as usize] = grid.tile((world_row * cols + world_col) as u32);
            }
        }
    }

    window
}

/// Replaces window cells hidden from the agent's viewpoint with
/// [`Tile::UNSEEN`].
///
/// The hidden mask is a fixed combinatorial table over the window's own
/// blocked flags, tuned for this exact window size; visible cells pass
/// through unchanged and the agent's own cell is always visible.
pub fn apply_occlusion(window: &mut [Tile; FOV_CELLS]) {
    let mut blocked = [false; FOV_CELLS];
    for (cell, tile) in window.iter().enumerate() {
        blocked[cell] = tile.is_blocked();
    }

    for (cell, hidden) in hidden_cells(&blocked).into_iter().enumerate() {
        if hidden {
            window[cell] = Tile::UNSEEN;
        }
    }
}

/// Fixed shadow table over the window's blocked flags.
///
/// Window indexing, with the agent at cell 22 facing up:
///
/// ```text
///  0  1  2  3  4
///  5  6  7  8  9
/// 10 11 12 13 14
/// 15 16 17 18 19
/// 20 21 22 23 24
/// ```
///
/// Each entry states when every sight line from cell 22 to that cell is
/// interrupted: cell 1 is hidden when 12 or 17 blocks, cell 13 only when
/// 17 and 18 both block. Blocked cells adjacent to the agent (17, 21, 23)
/// shadow themselves; cell 22 is never hidden.
fn hidden_cells(m: &[bool; FOV_CELLS]) -> [bool; FOV_CELLS] {
    [
        m[11] || m[17] || (m[6] && (m[5] || m[16])), // 0
        m[12] || m[17],                              // 1
        m[7] || m[12] || m[17],                      // 2
        m[12] || m[17],                              // 3
        m[13] || m[17] || (m[8] && (m[9] || m[18])), // 4
        m[11] || m[16] || m[17],                     // 5
        m[17] || (m[12] && (m[11] || m[16])),        // 6
        m[12] || m[17],                              // 7
        m[17] || (m[12] && (m[13] || m[18])),        // 8
        m[13] || m[17] || m[18],                     // 9
        m[16] || ((m[11] || m[17]) && (m[15] || m[21])), // 10
        m[16] && m[17],                              // 11
        m[17],                                       // 12
        m[17] && m[18],                              // 13
        m[18] || ((m[13] || m[17]) && (m[19] || m[23])), // 14
        m[21],                                       // 15
        m[17] && m[21],                              // 16
        m[17],                                       // 17
        m[17] && m[23],                              // 18
        m[23],                                       // 19
        m[21],                                       // 20
        m[21],                                       // 21
        false,                                       // 22
        m[23],                                       // 23
        m[23],                                       // 24
    ]
}

#[cfg(test)]
mod tests {
    use super::{apply_occlusion, hidden_cells, observe, sample_window};
    use gridsight_core::{Heading, Tile, FOV_CELLS, FOV_SELF_INDEX};
    use gridsight_world::{query, World};

    const O: Tile = Tile::FLOOR;
    const X: Tile = Tile::FLOOR_OCCUPIED;
    const W: Tile = Tile::WALL;
    const D: Tile = Tile::OPEN_DOOR;
    const H: Tile = Tile::UNSEEN;

    const ROWS: u32 = 6;
    const COLS: u32 = 7;

    #[rustfmt::skip]
    fn sample_map() -> Vec<Tile> {
        vec![
            X, O, O, O, O, W, O,
            O, X, O, O, O, W, O,
            O, O, O, O, O, W, O,
            W, D, W, W, W, W, O,
            O, O, W, O, O, O, O,
            O, O, W, O, O, O, O,
        ]
    }

    fn world_words(tiles: &[Tile]) -> Vec<u32> {
        let mut words = vec![2u32, 0, 8, 0, 0, ROWS, COLS];
        let mut grid_words = vec![0u32; tiles.len().div_ceil(4)];
        for (index, tile) in tiles.iter().enumerate() {
            grid_words[index / 4] |= u32::from(tile.code()) << ((index % 4) * 8);
        }
        words.extend(grid_words);
        words
    }

    fn sampled(heading: Heading) -> [Tile; FOV_CELLS] {
        let mut words = world_words(&sample_map());
        let world = World::parse(&mut words, 1).expect("world decodes");
        sample_window(query::grid(&world), 8, heading)
    }

    #[test]
    fn window_facing_up_reads_rows_above_the_agent() {
        #[rustfmt::skip]
        let expected = [
            H, H, H, H, H,
            H, H, H, H, H,
            H, H, H, H, H,
            H, X, O, O, O,
            H, O, X, O, O,
        ];
        assert_eq!(sampled(Heading::Up), expected);
    }

    #[test]
    fn window_facing_right_reads_columns_right_of_the_agent() {
        #[rustfmt::skip]
        let expected = [
            H, W, W, W, W,
            H, O, O, O, W,
            H, O, O, O, W,
            H, O, O, O, W,
            H, O, X, O, D,
        ];
        assert_eq!(sampled(Heading::Right), expected);
    }

    #[test]
    fn window_facing_down_reads_rows_below_the_agent() {
        #[rustfmt::skip]
        let expected = [
            O, W, O, O, H,
            O, W, O, O, H,
            W, W, D, W, H,
            O, O, O, O, H,
            O, O, X, O, H,
        ];
        assert_eq!(sampled(Heading::Down), expected);
    }

    #[test]
    fn window_facing_left_reads_columns_left_of_the_agent() {
        #[rustfmt::skip]
        let expected = [
            H, H, H, H, H,
            H, H, H, H, H,
            H, H, H, H, H,
            W, O, O, X, H,
            D, O, X, O, H,
        ];
        assert_eq!(sampled(Heading::Left), expected);
    }

    #[test]
    fn agent_cell_lands_at_self_index_for_every_heading() {
        for heading in [Heading::Up, Heading::Right, Heading::Down, Heading::Left] {
            assert_eq!(sampled(heading)[FOV_SELF_INDEX as usize], X);
        }
    }

    #[test]
    fn wall_ahead_shadows_everything_past_it() {
        let mut tiles = vec![O; (ROWS * COLS) as usize];
        tiles[8] = X;
        tiles[1] = W;
        let mut words = vec![1u32, 8, 0, ROWS, COLS];
        let mut grid_words = vec![0u32; tiles.len().div_ceil(4)];
        for (index, tile) in tiles.iter().enumerate() {
            grid_words[index / 4] |= u32::from(tile.code()) << ((index % 4) * 8);
        }
        words.extend(grid_words);

        let world = World::parse(&mut words, 1).expect("world decodes");
        let window = observe(query::grid(&world), 8, Heading::Up);

        #[rustfmt::skip]
        let expected = [
            H, H, H, H, H,
            H, H, H, H, H,
            H, H, H, H, H,
            H, O, H, O, O,
            H, O, X, O, O,
        ];
        assert_eq!(window, expected);
    }

    fn hidden(blocked: &[usize]) -> [bool; FOV_CELLS] {
        let mut mask = [false; FOV_CELLS];
        for &cell in blocked {
            mask[cell] = true;
        }
        hidden_cells(&mask)
    }

    #[test]
    fn cell_0_occluders() {
        assert!(hidden(&[11])[0]);
        assert!(hidden(&[17])[0]);
        assert!(hidden(&[6, 5])[0]);
        assert!(hidden(&[6, 16])[0]);
        assert!(!hidden(&[6])[0]);
        assert!(!hidden(&[5])[0]);
    }

    #[test]
    fn cell_1_occluders() {
        assert!(hidden(&[12])[1]);
        assert!(hidden(&[17])[1]);
        assert!(!hidden(&[11])[1]);
    }

    #[test]
    fn cell_2_occluders() {
        assert!(hidden(&[7])[2]);
        assert!(hidden(&[12])[2]);
        assert!(hidden(&[17])[2]);
        assert!(!hidden(&[6])[2]);
    }

    #[test]
    fn cell_3_occluders() {
        assert!(hidden(&[12])[3]);
        assert!(hidden(&[17])[3]);
        assert!(!hidden(&[13])[3]);
    }

    #[test]
    fn cell_4_occluders() {
        assert!(hidden(&[13])[4]);
        assert!(hidden(&[17])[4]);
        assert!(hidden(&[8, 9])[4]);
        assert!(hidden(&[8, 18])[4]);
        assert!(!hidden(&[8])[4]);
        assert!(!hidden(&[9])[4]);
    }

    #[test]
    fn cell_5_occluders() {
        assert!(hidden(&[11])[5]);
        assert!(hidden(&[16])[5]);
        assert!(hidden(&[17])[5]);
        assert!(!hidden(&[6])[5]);
    }

    #[test]
    fn cell_6_occluders() {
        assert!(hidden(&[17])[6]);
        assert!(hidden(&[12, 11])[6]);
        assert!(hidden(&[12, 16])[6]);
        assert!(!hidden(&[12])[6]);
        assert!(!hidden(&[11])[6]);
    }

    #[test]
    fn cell_7_occluders() {
        assert!(hidden(&[12])[7]);
        assert!(hidden(&[17])[7]);
        assert!(!hidden(&[8])[7]);
    }

    #[test]
    fn cell_8_occluders() {
        assert!(hidden(&[17])[8]);
        assert!(hidden(&[12, 13])[8]);
        assert!(hidden(&[12, 18])[8]);
        assert!(!hidden(&[12])[8]);
        assert!(!hidden(&[13])[8]);
    }

    #[test]
    fn cell_9_occluders() {
        assert!(hidden(&[13])[9]);
        assert!(hidden(&[17])[9]);
        assert!(hidden(&[18])[9]);
        assert!(!hidden(&[8])[9]);
    }

    #[test]
    fn cell_10_occluders() {
        assert!(hidden(&[16])[10]);
        assert!(hidden(&[11, 15])[10]);
        assert!(hidden(&[11, 21])[10]);
        assert!(hidden(&[17, 15])[10]);
        assert!(!hidden(&[11])[10]);
        assert!(!hidden(&[15])[10]);
    }

    #[test]
    fn cell_11_occluders() {
        assert!(hidden(&[16, 17])[11]);
        assert!(!hidden(&[16])[11]);
        assert!(!hidden(&[17])[11]);
    }

    #[test]
    fn cell_12_occluders() {
        assert!(hidden(&[17])[12]);
        assert!(!hidden(&[16])[12]);
        assert!(!hidden(&[18])[12]);
    }

    #[test]
    fn cell_13_occluders() {
        assert!(hidden(&[17, 18])[13]);
        assert!(!hidden(&[17])[13]);
        assert!(!hidden(&[18])[13]);
    }

    #[test]
    fn cell_14_occluders() {
        assert!(hidden(&[18])[14]);
        assert!(hidden(&[13, 19])[14]);
        assert!(hidden(&[17, 23])[14]);
        assert!(!hidden(&[13])[14]);
        assert!(!hidden(&[19])[14]);
    }

    #[test]
    fn cell_15_occluders() {
        assert!(hidden(&[21])[15]);
        assert!(!hidden(&[16])[15]);
    }

    #[test]
    fn cell_16_occluders() {
        assert!(hidden(&[17, 21])[16]);
        assert!(!hidden(&[17])[16]);
        assert!(!hidden(&[21])[16]);
    }

    #[test]
    fn cell_17_shadows_itself_when_blocked() {
        assert!(hidden(&[17])[17]);
        assert!(!hidden(&[12])[17]);
    }

    #[test]
    fn cell_18_occluders() {
        assert!(hidden(&[17, 23])[18]);
        assert!(!hidden(&[23])[18]);
        assert!(!hidden(&[17])[18]);
    }

    #[test]
    fn cell_19_occluders() {
        assert!(hidden(&[23])[19]);
        assert!(!hidden(&[18])[19]);
    }

    #[test]
    fn cell_20_occluders() {
        assert!(hidden(&[21])[20]);
        assert!(!hidden(&[15])[20]);
    }

    #[test]
    fn cell_21_shadows_itself_when_blocked() {
        assert!(hidden(&[21])[21]);
        assert!(!hidden(&[17])[21]);
    }

    #[test]
    fn cell_22_is_always_visible() {
        let everything: Vec<usize> = (0..FOV_CELLS).filter(|cell| *cell != 22).collect();
        assert!(!hidden(&everything)[22]);
    }

    #[test]
    fn cell_23_shadows_itself_when_blocked() {
        assert!(hidden(&[23])[23]);
        assert!(!hidden(&[21])[23]);
    }

    #[test]
    fn cell_24_occluders() {
        assert!(hidden(&[23])[24]);
        assert!(!hidden(&[19])[24]);
    }

    #[test]
    fn occlusion_preserves_visible_tile_codes() {
        let mut window = [O; FOV_CELLS];
        window[22] = X;
        window[18] = D;
        apply_occlusion(&mut window);

        assert_eq!(window[22], X);
        assert_eq!(window[18], D);
        assert!(window.iter().all(|tile| *tile != H));
    }
}
