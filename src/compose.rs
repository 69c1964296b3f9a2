use crate::bitset::Bitset;
use crate::dag::Dag;
use crate::grid::Grid;
use crate::grid::UNFILLED;
use crate::piece::PieceCollection;
use crate::piece::PieceRecord;

/// Maximum number of distinct depth-threshold passes the outer driver
/// tries before giving up, per SPEC_FULL.md §4.E.
pub const MAX_ITERATIONS: usize = 10;

/// A proposed solution: one grid per DAG (the first `d-1` are attempts at
/// the training outputs, the last is the test answer), plus the bookkeeping
/// the scorer needs.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub images: Vec<Grid>,
    pub piece_count: u32,
    pub sum_depth: u64,
    pub max_depth: u16,
}

struct SlotLayout {
    offsets: Vec<usize>,
    total: usize,
}

impl SlotLayout {
    fn new(targets: &[Grid]) -> Self {
        let mut offsets = Vec::with_capacity(targets.len());
        let mut total = 0;
        for t in targets {
            offsets.push(total);
            total += t.area();
        }
        Self { offsets, total }
    }
}

/// The three ways a piece can be applied to the working buffer, per
/// SPEC_FULL.md §4.E step 1.
#[derive(Clone, Copy)]
enum ApplyMode {
    /// fill the non-zero holes: write where the piece's image is zero
    Complement,
    /// use the piece's non-zero footprint directly
    Active,
    /// overwrite every matching-shape pixel regardless of colour
    Full,
}

const MODES: [ApplyMode; 3] = [ApplyMode::Complement, ApplyMode::Active, ApplyMode::Full];

struct PiecePlan {
    valid: Bitset,
    active: Bitset,
    bad: Bitset,
}

fn plan_for_piece(
    dags: &[Dag],
    record: &PieceRecord,
    collection: &PieceCollection,
    targets: &[Grid],
    layout: &SlotLayout,
) -> PiecePlan {
    let mut valid = Bitset::new(layout.total);
    let mut active = Bitset::new(layout.total);
    let mut bad = Bitset::new(layout.total);
    let is_training = |slot: usize| slot + 1 < targets.len();

    for (slot, (&node_id, dag)) in collection.nodes(record).iter().zip(dags.iter()).enumerate() {
        let piece_image = dag.node_image(node_id);
        let target = &targets[slot];
        if piece_image.width() != target.width() || piece_image.height() != target.height() {
            continue;
        }
        let base = layout.offsets[slot];
        for (i, &value) in piece_image.pixels().iter().enumerate() {
            let pos = base + i;
            valid.set(pos);
            if value != 0 {
                active.set(pos);
            }
            if is_training(slot) {
                let target_value = target.pixels()[i];
                if target_value != UNFILLED as i16 && target_value != value {
                    bad.set(pos);
                }
            }
        }
    }

    PiecePlan { valid, active, bad }
}

fn applied_mask(plan: &PiecePlan, mode: ApplyMode, layout: &SlotLayout) -> Bitset {
    match mode {
        ApplyMode::Full => plan.valid.clone(),
        ApplyMode::Active => plan.active.and(&plan.valid),
        ApplyMode::Complement => {
            let mut not_active = Bitset::new(layout.total);
            for i in 0..layout.total {
                if !plan.active.get(i) {
                    not_active.set(i);
                }
            }
            not_active.and(&plan.valid)
        }
    }
}

/// The compositor's working buffer: one mutable candidate grid per slot,
/// plus the claimed-pixel bitset and bookkeeping the outer driver needs to
/// finalize a [`Candidate`].
struct Workspace {
    buffers: Vec<Grid>,
    current: Bitset,
    care_mask: Bitset,
    piece_count: u32,
    sum_depth: u64,
    max_depth: u16,
}

impl Workspace {
    fn new(targets: &[Grid], layout: &SlotLayout) -> Self {
        let buffers = targets
            .iter()
            .map(|t| Grid::from_pixels_permissive(t.width(), t.height(), vec![UNFILLED; t.area()]).unwrap())
            .collect();
        let mut care_mask = Bitset::new(layout.total);
        for i in 0..layout.total {
            care_mask.set(i);
        }
        Self {
            buffers,
            current: Bitset::new(layout.total),
            care_mask,
            piece_count: 0,
            sum_depth: 0,
            max_depth: 0,
        }
    }

    fn apply(&mut self, layout: &SlotLayout, dags: &[Dag], collection: &PieceCollection, record: &PieceRecord, mask: &Bitset) {
        for (slot, (&node_id, dag)) in collection.nodes(record).iter().zip(dags.iter()).enumerate() {
            let piece_image = dag.node_image(node_id);
            let buffer = &mut self.buffers[slot];
            if piece_image.width() != buffer.width() || piece_image.height() != buffer.height() {
                continue;
            }
            let base = layout.offsets[slot];
            for row in 0..buffer.height() {
                for col in 0..buffer.width() {
                    let pos = base + row * buffer.width() + col;
                    if !mask.get(pos) {
                        continue;
                    }
                    if buffer.at(row, col) == UNFILLED {
                        buffer.set(row, col, piece_image.at(row, col));
                    }
                }
            }
        }
        self.current.or_assign(mask);
        self.piece_count += 1;
        self.sum_depth += record.depth as u64;
        self.max_depth = self.max_depth.max(record.depth);
    }

    fn into_candidate(self) -> Candidate {
        Candidate {
            images: self.buffers,
            piece_count: self.piece_count,
            sum_depth: self.sum_depth,
            max_depth: self.max_depth,
        }
    }
}

/// Runs `greedyComposeCore` once at a fixed depth threshold: repeatedly
/// picks the admissible (piece, mode) pair that claims the most new "care"
/// bits, applies it, and stops when no admissible choice makes progress.
fn greedy_compose_core(
    dags: &[Dag],
    collection: &PieceCollection,
    targets: &[Grid],
    layout: &SlotLayout,
    depth_threshold: u16,
) -> Candidate {
    let mut workspace = Workspace::new(targets, layout);
    let plans: Vec<(usize, PiecePlan)> = collection
        .pieces()
        .iter()
        .enumerate()
        .filter(|(_, record)| record.depth <= depth_threshold)
        .map(|(i, record)| (i, plan_for_piece(dags, record, collection, targets, layout)))
        .collect();

    loop {
        let mut best: Option<(usize, Bitset, u32)> = None;
        for (piece_idx, plan) in &plans {
            for &mode in &MODES {
                let mask = applied_mask(plan, mode, layout);
                let conflicts = mask.and(&plan.bad);
                if conflicts.any() {
                    continue;
                }
                let gained = mask.and(&workspace.care_mask).and_not(&workspace.current);
                let score = gained.popcount();
                if score == 0 {
                    continue;
                }
                if best.as_ref().map_or(true, |(_, _, best_score)| score > *best_score) {
                    best = Some((*piece_idx, mask, score));
                }
            }
        }
        match best {
            Some((piece_idx, mask, _)) => {
                let record = &collection.pieces()[piece_idx];
                workspace.apply(layout, dags, collection, record, &mask);
            }
            None => break,
        }
    }

    workspace.into_candidate()
}

/// Fills any remaining unfilled sentinel pixels with colour 0 (background).
/// Chosen over a training-output-majority fallback because 0 is the
/// corpus-wide background convention the transform library already
/// special-cases (`filterCol`, `compress`, `invert`); see DESIGN.md.
fn greedy_fill_black(mut candidate: Candidate) -> Candidate {
    for grid in &mut candidate.images {
        *grid = grid.map_pixels(|p| if p == UNFILLED { 0 } else { p });
    }
    candidate
}

/// Runs the compositor over every distinct piece depth up to
/// [`MAX_ITERATIONS`] thresholds, plus a black-filled completion of each,
/// accumulating every produced candidate (duplicates are pruned later by
/// the scorer).
pub fn compose(dags: &[Dag], collection: &PieceCollection, training_outputs: &[Grid], test_slot: &Grid) -> Vec<Candidate> {
    let mut targets: Vec<Grid> = training_outputs.to_vec();
    targets.push(test_slot.clone());
    let layout = SlotLayout::new(&targets);

    let mut thresholds: Vec<u16> = collection.pieces().iter().map(|p| p.depth).collect();
    thresholds.sort_unstable();
    thresholds.dedup();
    thresholds.truncate(MAX_ITERATIONS);
    if thresholds.is_empty() {
        thresholds.push(0);
    }

    let mut candidates = Vec::new();
    for threshold in thresholds {
        let candidate = greedy_compose_core(dags, collection, &targets, &layout, threshold);
        let filled = greedy_fill_black(candidate.clone());
        candidates.push(candidate);
        candidates.push(filled);
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::DagConfig;
    use crate::library::Library;
    use crate::piece::extract_pieces;
    use crate::piece::PieceConfig;
    use crate::state::State;

    fn dag_from(pixels: Vec<i16>, w: usize, h: usize) -> Dag {
        let grid = Grid::from_pixels(w, h, pixels).unwrap();
        let mut dag = Dag::new(DagConfig::default());
        dag.add_root(State::single(grid, 0));
        dag.build(Library::global());
        dag
    }

    #[test]
    fn identity_task_reconstructs_training_and_test() {
        let train_in = dag_from(vec![1, 2, 3, 4], 2, 2);
        let test_in = dag_from(vec![5, 6, 7, 8], 2, 2);
        let dags = vec![train_in, test_in];
        let collection = extract_pieces(&dags, Library::global(), PieceConfig::default());
        let train_out = Grid::from_pixels(2, 2, vec![1, 2, 3, 4]).unwrap();
        let test_placeholder = Grid::make(2, 2, UNFILLED).unwrap();
        let candidates = compose(&dags, &collection, &[train_out.clone()], &test_placeholder);
        let expected = Grid::from_pixels(2, 2, vec![5, 6, 7, 8]).unwrap();
        assert!(candidates.iter().any(|c| c.images[0] == train_out && c.images[1] == expected));
    }

    #[test]
    fn no_contradiction_in_composition() {
        let train_in = dag_from(vec![1, 2, 3, 4], 2, 2);
        let test_in = dag_from(vec![5, 6, 7, 8], 2, 2);
        let dags = vec![train_in, test_in];
        let collection = extract_pieces(&dags, Library::global(), PieceConfig::default());
        let train_out = Grid::from_pixels(2, 2, vec![1, 2, 3, 4]).unwrap();
        let test_placeholder = Grid::make(2, 2, UNFILLED).unwrap();
        let candidates = compose(&dags, &collection, &[train_out.clone()], &test_placeholder);
        for candidate in &candidates {
            let produced_train = &candidate.images[0];
            for (a, b) in produced_train.pixels().iter().zip(train_out.pixels()) {
                assert!(*a == UNFILLED || a == b, "candidate disagreed with training output");
            }
        }
    }
}
