use std::collections::HashMap;
use std::collections::VecDeque;

use crate::grid::Grid;
use crate::state::State;
use crate::transforms::{guard_single, guard_vector, NEIGHBORS4};

struct Component {
    min_row: usize,
    min_col: usize,
    max_row: usize,
    max_col: usize,
    cells: Vec<(usize, usize, i16)>,
}

/// Raster-order scan for 4-connected components of cells matching `want_zero`
/// (`false` groups non-zero pixels together irrespective of colour, used by
/// `cut` and `extractPattern`; `true` groups zero pixels, used by
/// `fillHoles`). Deterministic: components are discovered in the order
/// their first (top-left-most) cell is visited.
fn components(grid: &Grid, want_zero: bool) -> Vec<Component> {
    let (w, h) = (grid.width(), grid.height());
    let mut visited = vec![false; w * h];
    let mut out = Vec::new();
    for row in 0..h {
        for col in 0..w {
            let idx = row * w + col;
            if visited[idx] {
                continue;
            }
            let value = grid.at(row, col);
            let matches = (value == 0) == want_zero;
            if !matches {
                continue;
            }
            let mut cells = Vec::new();
            let mut queue = VecDeque::from([(row, col)]);
            visited[idx] = true;
            let (mut min_row, mut max_row, mut min_col, mut max_col) = (row, row, col, col);
            while let Some((r, c)) = queue.pop_front() {
                let v = grid.at(r, c);
                cells.push((r, c, v));
                min_row = min_row.min(r);
                max_row = max_row.max(r);
                min_col = min_col.min(c);
                max_col = max_col.max(c);
                for (dr, dc) in NEIGHBORS4 {
                    let (nr, nc) = (r as isize + dr, c as isize + dc);
                    if nr < 0 || nc < 0 || nr as usize >= h || nc as usize >= w {
                        continue;
                    }
                    let (nr, nc) = (nr as usize, nc as usize);
                    let nidx = nr * w + nc;
                    if visited[nidx] {
                        continue;
                    }
                    let nv = grid.at(nr, nc);
                    if (nv == 0) == want_zero {
                        visited[nidx] = true;
                        queue.push_back((nr, nc));
                    }
                }
            }
            out.push(Component {
                min_row,
                min_col,
                max_row,
                max_col,
                cells,
            });
        }
    }
    out
}

fn crop_component(grid: &Grid, comp: &Component) -> Grid {
    let (bw, bh) = (comp.max_col - comp.min_col + 1, comp.max_row - comp.min_row + 1);
    let mut pixels = vec![0i16; bw * bh];
    for &(r, c, v) in &comp.cells {
        pixels[(r - comp.min_row) * bw + (c - comp.min_col)] = v;
    }
    let (ox, oy) = grid.offset();
    Grid::from_pixels(bw, bh, pixels)
        .expect("component crop stays within parent bounds")
        .with_offset(ox + comp.min_col as i32, oy + comp.min_row as i32)
}

/// `compress` — strips rows and columns that are entirely zero; a fully
/// zero grid collapses to a single 1x1 zero pixel.
pub fn compress(state: &State) -> Option<State> {
    let grid = state.first_image();
    let (w, h) = (grid.width(), grid.height());
    let rows: Vec<usize> = (0..h).filter(|&r| (0..w).any(|c| grid.at(r, c) != 0)).collect();
    let cols: Vec<usize> = (0..w).filter(|&c| (0..h).any(|r| grid.at(r, c) != 0)).collect();
    let out = if rows.is_empty() || cols.is_empty() {
        Grid::make(1, 1, 0).expect("1x1 zero grid is always valid")
    } else {
        let mut pixels = Vec::with_capacity(rows.len() * cols.len());
        for &r in &rows {
            for &c in &cols {
                pixels.push(grid.at(r, c));
            }
        }
        Grid::from_pixels(cols.len(), rows.len(), pixels).expect("compress only removes cells")
    };
    guard_single(state, 3, out)
}

/// `cut` — splits the first image into its 4-connected non-zero components,
/// each cropped to its own bounding box, yielding a vector-State.
pub fn cut(state: &State) -> Option<State> {
    let grid = state.first_image();
    let comps = components(grid, false);
    if comps.is_empty() {
        return None;
    }
    let images = comps.iter().map(|c| crop_component(grid, c)).collect();
    guard_vector(state, 5, images)
}

/// `splitCols` — one full-size image per distinct non-zero colour present,
/// each masked to just that colour (like `filterCol` run once per present
/// colour), ordered by ascending colour for determinism.
pub fn split_cols(state: &State) -> Option<State> {
    let grid = state.first_image();
    let mut colours: Vec<i16> = grid.pixels().iter().copied().filter(|&p| p != 0).collect();
    colours.sort_unstable();
    colours.dedup();
    if colours.is_empty() {
        return None;
    }
    let images = colours
        .into_iter()
        .map(|colour| grid.map_pixels(|p| if p == colour { p } else { 0 }))
        .collect();
    guard_vector(state, 5, images)
}

/// `fillHoles` — flood-fills zero regions fully enclosed (not touching the
/// frame border) by a single surrounding non-zero colour with that colour.
/// Holes bordered by more than one distinct colour, or touching the border,
/// are left unchanged.
pub fn fill_holes(state: &State) -> Option<State> {
    let grid = state.first_image();
    let (w, h) = (grid.width(), grid.height());
    let mut out = grid.clone();
    for comp in components(grid, true) {
        let touches_border =
            comp.min_row == 0 || comp.min_col == 0 || comp.max_row == h - 1 || comp.max_col == w - 1;
        if touches_border {
            continue;
        }
        let mut neighbour_colours: Vec<i16> = Vec::new();
        for &(r, c, _) in &comp.cells {
            for (dr, dc) in NEIGHBORS4 {
                let (nr, nc) = (r as isize + dr, c as isize + dc);
                if nr < 0 || nc < 0 || nr as usize >= h || nc as usize >= w {
                    continue;
                }
                let v = grid.at(nr as usize, nc as usize);
                if v != 0 && !neighbour_colours.contains(&v) {
                    neighbour_colours.push(v);
                }
            }
        }
        if let [colour] = neighbour_colours[..] {
            for &(r, c, _) in &comp.cells {
                out.set(r, c, colour);
            }
        }
    }
    guard_single(state, 4, out)
}

/// `removeNoise` — zeroes any non-zero pixel that has zero 4-connected
/// non-zero neighbours (isolated speckle removal).
pub fn remove_noise(state: &State) -> Option<State> {
    let grid = state.first_image();
    let (w, h) = (grid.width(), grid.height());
    let mut out = grid.clone();
    for row in 0..h {
        for col in 0..w {
            if grid.at(row, col) == 0 {
                continue;
            }
            let has_neighbour = NEIGHBORS4.iter().any(|(dr, dc)| {
                grid.safe(row as isize + dr, col as isize + dc) != 0
            });
            if !has_neighbour {
                out.set(row, col, 0);
            }
        }
    }
    guard_single(state, 3, out)
}

/// `extractPattern` — groups the non-zero 4-connected components by a
/// translation-normalised `(shape, colour)` signature and returns the
/// bounding-box crop of the first occurrence of the most frequent
/// signature. With a single component this degenerates to that
/// component's own crop.
pub fn extract_pattern(state: &State) -> Option<State> {
    let grid = state.first_image();
    let comps = components(grid, false);
    if comps.is_empty() {
        return None;
    }
    let signature = |c: &Component| -> Vec<(usize, usize, i16)> {
        let mut cells: Vec<(usize, usize, i16)> = c
            .cells
            .iter()
            .map(|&(r, col, v)| (r - c.min_row, col - c.min_col, v))
            .collect();
        cells.sort_unstable();
        cells
    };
    let mut counts: HashMap<Vec<(usize, usize, i16)>, usize> = HashMap::new();
    let sigs: Vec<Vec<(usize, usize, i16)>> = comps.iter().map(signature).collect();
    for sig in &sigs {
        *counts.entry(sig.clone()).or_insert(0) += 1;
    }
    let mut best_idx = 0;
    let mut best_count = 0;
    for (i, sig) in sigs.iter().enumerate() {
        let count = counts[sig];
        if count > best_count {
            best_count = count;
            best_idx = i;
        }
    }
    let out = crop_component(grid, &comps[best_idx]);
    guard_single(state, 6, out)
}

/// `replicate` — tiles the first image 2x2; returns `None` rather than a
/// grid that would exceed the construction area cap.
pub fn replicate(state: &State) -> Option<State> {
    let grid = state.first_image();
    let (w, h) = (grid.width(), grid.height());
    let (nw, nh) = (w * 2, h * 2);
    let mut pixels = vec![0i16; nw * nh];
    for row in 0..nh {
        for col in 0..nw {
            pixels[row * nw + col] = grid.at(row % h, col % w);
        }
    }
    let out = Grid::from_pixels(nw, nh, pixels).ok()?;
    guard_single(state, 6, out)
}
