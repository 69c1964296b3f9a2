use crate::state::State;
use crate::transforms::geometry::{flip_h, rotate180, rotate270, rotate90};
use crate::transforms::guard_single;

/// The 8 elements of the dihedral group D4 acting on the first image:
/// 4 rotations, and each of those composed with a horizontal flip.
/// `rigid_0` is the identity rotation (distinct from the unlisted
/// `identity` transform, per the contractual name list in the transform
/// family table).
///
/// Inverses: `rigid_0`, `rigid_2`, and `rigid_4..rigid_7` are each
/// self-inverse (pure rotations by 0/180 degrees, and every flip-composed
/// element is a reflection); `rigid_1` and `rigid_3` invert each other.
pub fn rigid_0(state: &State) -> Option<State> {
    guard_single(state, 2, state.first_image().clone())
}

pub fn rigid_1(state: &State) -> Option<State> {
    guard_single(state, 2, rotate90(state.first_image()))
}

pub fn rigid_2(state: &State) -> Option<State> {
    guard_single(state, 2, rotate180(state.first_image()))
}

pub fn rigid_3(state: &State) -> Option<State> {
    guard_single(state, 2, rotate270(state.first_image()))
}

pub fn rigid_4(state: &State) -> Option<State> {
    guard_single(state, 2, flip_h(state.first_image()))
}

pub fn rigid_5(state: &State) -> Option<State> {
    guard_single(state, 2, rotate90(&flip_h(state.first_image())))
}

pub fn rigid_6(state: &State) -> Option<State> {
    guard_single(state, 2, rotate180(&flip_h(state.first_image())))
}

pub fn rigid_7(state: &State) -> Option<State> {
    guard_single(state, 2, rotate270(&flip_h(state.first_image())))
}

/// Index of the group inverse of `rigid_i`, used by the idempotence test
/// suite (`rigid_i(rigid_inverse(i)(g)) == g`).
pub const fn rigid_inverse(i: usize) -> usize {
    match i {
        0 => 0,
        1 => 3,
        2 => 2,
        3 => 1,
        4 => 4,
        5 => 5,
        6 => 6,
        7 => 7,
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    const FNS: [fn(&State) -> Option<State>; 8] = [
        rigid_0, rigid_1, rigid_2, rigid_3, rigid_4, rigid_5, rigid_6, rigid_7,
    ];

    #[test]
    fn rigid_0_is_identity() {
        let grid = Grid::from_pixels(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let state = State::single(grid.clone(), 0);
        let out = rigid_0(&state).unwrap();
        assert_eq!(out.first_image(), &grid);
    }

    #[test]
    fn every_rigid_motion_round_trips_with_its_inverse() {
        let grid = Grid::from_pixels(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        for i in 0..8 {
            let state = State::single(grid.clone(), 0);
            let applied = FNS[i](&state).unwrap();
            let inv = rigid_inverse(i);
            let back = FNS[inv](&applied).unwrap();
            assert_eq!(back.first_image(), &grid, "rigid_{i} did not invert via rigid_{inv}");
        }
    }
}
