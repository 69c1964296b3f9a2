use crate::grid::Grid;
use crate::state::State;
use crate::transforms::guard_single;

/// `identity` — returns the input unchanged. Cost 1, unlisted (it never
/// participates in DAG expansion; it exists purely so the library's name
/// list is complete and so root nodes can be re-validated through the same
/// machinery other transforms use).
pub fn identity(state: &State) -> Option<State> {
    guard_single(state, 1, state.first_image().clone())
}

pub fn rotate90(grid: &Grid) -> Grid {
    let (w, h) = (grid.width(), grid.height());
    let mut pixels = vec![0i16; w * h];
    for row in 0..h {
        for col in 0..w {
            // (row, col) in source -> (col, h-1-row) in a 90 deg clockwise rotation
            pixels[col * h + (h - 1 - row)] = grid.at(row, col);
        }
    }
    Grid::from_pixels(h, w, pixels).expect("rotation preserves area and colours")
}

pub fn rotate180(grid: &Grid) -> Grid {
    rotate90(&rotate90(grid))
}

pub fn rotate270(grid: &Grid) -> Grid {
    rotate90(&rotate180(grid))
}

pub fn flip_h(grid: &Grid) -> Grid {
    let (w, h) = (grid.width(), grid.height());
    let mut pixels = vec![0i16; w * h];
    for row in 0..h {
        for col in 0..w {
            pixels[row * w + (w - 1 - col)] = grid.at(row, col);
        }
    }
    Grid::from_pixels(w, h, pixels).expect("flip preserves area and colours")
}

pub fn flip_v(grid: &Grid) -> Grid {
    let (w, h) = (grid.width(), grid.height());
    let mut pixels = vec![0i16; w * h];
    for row in 0..h {
        for col in 0..w {
            pixels[(h - 1 - row) * w + col] = grid.at(row, col);
        }
    }
    Grid::from_pixels(w, h, pixels).expect("flip preserves area and colours")
}

pub fn transpose_grid(grid: &Grid) -> Grid {
    let (w, h) = (grid.width(), grid.height());
    let mut pixels = vec![0i16; w * h];
    for row in 0..h {
        for col in 0..w {
            pixels[col * h + row] = grid.at(row, col);
        }
    }
    Grid::from_pixels(h, w, pixels).expect("transpose preserves area and colours")
}

pub fn transpose(state: &State) -> Option<State> {
    guard_single(state, 2, transpose_grid(state.first_image()))
}

pub fn flip_horizontal(state: &State) -> Option<State> {
    guard_single(state, 2, flip_h(state.first_image()))
}

pub fn flip_vertical(state: &State) -> Option<State> {
    guard_single(state, 2, flip_v(state.first_image()))
}

/// `toOrigin` — rewrites the grid's offset to `(0, 0)`, leaving pixels
/// untouched. Applying it twice yields the same grid content as applying
/// it once (the offset is already zero), satisfying the idempotence
/// property even though it still advances depth by one each call.
pub fn to_origin(state: &State) -> Option<State> {
    let grid = state.first_image().with_offset(0, 0);
    guard_single(state, 1, grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(pixels: Vec<i16>, w: usize, h: usize) -> Grid {
        Grid::from_pixels(w, h, pixels).unwrap()
    }

    #[test]
    fn rotate_four_times_is_identity() {
        let grid = g(vec![1, 2, 3, 4, 5, 6], 3, 2);
        let spun = rotate90(&rotate90(&rotate90(&rotate90(&grid))));
        assert_eq!(spun, grid);
    }

    #[test]
    fn flip_h_is_involution() {
        let grid = g(vec![1, 2, 3, 4, 5, 6], 3, 2);
        assert_eq!(flip_h(&flip_h(&grid)), grid);
    }

    #[test]
    fn flip_v_is_involution() {
        let grid = g(vec![1, 2, 3, 4, 5, 6], 3, 2);
        assert_eq!(flip_v(&flip_v(&grid)), grid);
    }

    #[test]
    fn transpose_is_involution() {
        let grid = g(vec![1, 2, 3, 4, 5, 6], 3, 2);
        assert_eq!(transpose_grid(&transpose_grid(&grid)), grid);
    }

    #[test]
    fn rotate90_matches_hand_example() {
        // [[1,2,3],[4,5,6]] rotated 90deg clockwise -> [[4,1],[5,2],[6,3]]
        let grid = g(vec![1, 2, 3, 4, 5, 6], 3, 2);
        let spun = rotate90(&grid);
        assert_eq!(spun.to_rows(), vec![vec![4, 1], vec![5, 2], vec![6, 3]]);
    }
}
