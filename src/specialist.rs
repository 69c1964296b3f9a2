use crate::grid::Grid;
use crate::task::Pair;

/// A confidence-scored candidate contributed by a specialist matcher.
#[derive(Debug, Clone)]
pub struct SpecialistAnswer {
    pub grid: Grid,
    pub confidence: f32,
}

/// Opaque external-matcher hook. The core never calls into specialists
/// recursively; it only asks whether one applies and, if so, pools its
/// answers alongside the core's own candidates.
///
/// Narrow pattern matchers (tiling, chess, symmetry, ML-feature,
/// color-counter, grid, repeating, submatrix, ...) implement this trait
/// outside the core; none ship here by default.
pub trait SpecialistSolver {
    fn can_solve(&self, train: &[Pair], test_input: &Grid) -> bool;
    fn solve(&self, train: &[Pair], test_input: &Grid) -> Vec<SpecialistAnswer>;
}

/// The crate's default specialist set: empty. Keeps the orchestrator
/// exercised end-to-end by the test suite without requiring real
/// specialists to be supplied.
pub struct NoSpecialists;

impl SpecialistSolver for NoSpecialists {
    fn can_solve(&self, _train: &[Pair], _test_input: &Grid) -> bool {
        false
    }

    fn solve(&self, _train: &[Pair], _test_input: &Grid) -> Vec<SpecialistAnswer> {
        Vec::new()
    }
}

/// Confidence above which a specialist answer may shortcut the core pipeline
/// entirely, per §6's integration contract.
pub const SHORTCUT_CONFIDENCE: f32 = 0.95;

/// Runs every specialist's `can_solve`/`solve` against one test input,
/// pooling whichever answers it produces. Returns `(answers, shortcut)`
/// where `shortcut` is true iff some returned answer met
/// [`SHORTCUT_CONFIDENCE`] and the caller should skip the core pipeline.
pub fn run_specialists(
    specialists: &[Box<dyn SpecialistSolver>],
    train: &[Pair],
    test_input: &Grid,
) -> (Vec<SpecialistAnswer>, bool) {
    let mut answers = Vec::new();
    let mut shortcut = false;
    for specialist in specialists {
        if !specialist.can_solve(train, test_input) {
            continue;
        }
        for answer in specialist.solve(train, test_input) {
            if answer.confidence >= SHORTCUT_CONFIDENCE {
                shortcut = true;
            }
            answers.push(answer);
        }
    }
    (answers, shortcut)
}
