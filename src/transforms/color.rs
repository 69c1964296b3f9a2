use crate::grid::Grid;
use crate::state::State;
use crate::transforms::guard_single;

fn filter_colour(grid: &Grid, colour: i16) -> Grid {
    grid.map_pixels(|p| if p == colour { p } else { 0 })
}

/// `filterCol_0..filterCol_9` — keep pixels matching `colour`, zero the
/// rest. Implemented as one parametrised function registered ten times
/// under the contractual names.
pub fn filter_col(colour: i16) -> impl Fn(&State) -> Option<State> {
    move |state: &State| guard_single(state, 2, filter_colour(state.first_image(), colour))
}

/// `invert` — swaps colours 0 and 1 across every pixel, leaving all other
/// colours untouched (a binary figure/ground swap for tasks expressed in
/// colours 0/1).
pub fn invert(state: &State) -> Option<State> {
    let grid = state.first_image().map_pixels(|p| match p {
        0 => 1,
        1 => 0,
        other => other,
    });
    guard_single(state, 2, grid)
}

/// `colorMap` — cycles every non-zero colour to the next one, wrapping
/// 9 -> 1. Zero (background) is left alone. A parameter-free recolouring
/// probe: composed with itself 9 times it's the identity on colour, which
/// the DAG discovers naturally via depth rather than this function special
///-casing it.
pub fn color_map(state: &State) -> Option<State> {
    let grid = state.first_image().map_pixels(|p| {
        if p == 0 {
            0
        } else {
            (p % 9) + 1
        }
    });
    guard_single(state, 4, grid)
}
