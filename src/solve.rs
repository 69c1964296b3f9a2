use std::panic::AssertUnwindSafe;
use std::time::Duration;

use crate::compose::compose;
use crate::compose::Candidate;
use crate::dag::Dag;
use crate::dag::DagConfig;
use crate::error::SolveError;
use crate::grid::Grid;
use crate::grid::UNFILLED;
use crate::library::Library;
use crate::piece::extract_pieces;
use crate::piece::PieceCollection;
use crate::piece::PieceConfig;
use crate::score::rank_candidates;
use crate::score::rank_pooled;
use crate::score::ScoreConfig;
use crate::specialist::run_specialists;
use crate::specialist::SpecialistSolver;
use crate::state::State;
use crate::task::predict_output_size;
use crate::task::Pair;
use crate::task::Task;

/// Upper bound on how many distinct test-slot sizes a single solve tries.
/// `predict_output_size` is one candidate among these, never the sole one —
/// per SPEC_FULL.md §4.G/§8, size prediction is advisory and must never
/// reject a candidate outright.
const MAX_TEST_SIZES: usize = 8;

/// The test-slot sizes worth trying: every distinct `(width, height)` a
/// test-DAG piece image actually has, plus the heuristic prediction, sorted
/// and capped at [`MAX_TEST_SIZES`]. A piece whose image size never matches
/// any slot the compositor builds can never be placed (`plan_for_piece`
/// skips size mismatches), so a dimension-changing transform like transpose
/// needs its own slot to ever surface as an answer.
fn candidate_test_sizes(dags: &[Dag], collection: &PieceCollection, predicted: (usize, usize)) -> Vec<(usize, usize)> {
    let test_dag = match dags.last() {
        Some(dag) => dag,
        None => return vec![predicted],
    };
    let mut sizes: Vec<(usize, usize)> = collection
        .pieces()
        .iter()
        .filter_map(|record| collection.nodes(record).last())
        .map(|&node_id| {
            let image = test_dag.node_image(node_id);
            (image.width(), image.height())
        })
        .collect();
    sizes.push(predicted);
    sizes.sort_unstable();
    sizes.dedup();
    sizes.truncate(MAX_TEST_SIZES);
    sizes
}

/// Public configuration surface, per SPEC_FULL.md §6.
#[derive(Debug, Clone, Copy)]
pub struct SolveConfig {
    pub max_depth: u16,
    pub max_side: usize,
    pub max_area: usize,
    pub max_pixels: usize,
    pub complexity_penalty: f64,
    pub max_answers: usize,
    pub time_limit_seconds: f64,
    pub enable_logging: bool,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            max_depth: 20,
            max_side: 40,
            max_area: crate::grid::MAX_AREA,
            max_pixels: crate::state::MAX_TOTAL_PIXELS,
            complexity_penalty: 0.01,
            max_answers: 3,
            time_limit_seconds: 60.0,
            enable_logging: false,
        }
    }
}

impl SolveConfig {
    fn dag_config(&self) -> DagConfig {
        DagConfig {
            max_depth: self.max_depth,
            max_nodes: 100_000,
            max_total_pixels: self.max_pixels,
            max_side: self.max_side,
            time_limit: Duration::from_secs_f64(self.time_limit_seconds.max(0.0)),
        }
    }
}

fn build_dag(root_images: Vec<Grid>, config: &DagConfig) -> Dag {
    let mut dag = Dag::new(*config);
    for image in root_images {
        dag.add_root(State::single(image, 0));
    }
    dag.build(Library::global());
    dag
}

/// Builds the `D` per-input DAGs (one per training pair, seeded with its
/// input and output as distinct roots, plus one for the test input) across
/// a rayon thread pool — the only parallelism the orchestrator performs,
/// since each DAG build shares no mutable state beyond the read-only
/// [`Library`].
#[cfg(feature = "parallel")]
fn build_all_dags(train: &[Pair], test_input: &Grid, config: &DagConfig) -> Vec<Dag> {
    use rayon::iter::IntoParallelIterator;
    use rayon::iter::ParallelIterator;

    let mut seeds: Vec<Vec<Grid>> = train
        .iter()
        .map(|pair| vec![pair.input.clone(), pair.output.clone()])
        .collect();
    seeds.push(vec![test_input.clone()]);
    seeds
        .into_par_iter()
        .map(|roots| build_dag(roots, config))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn build_all_dags(train: &[Pair], test_input: &Grid, config: &DagConfig) -> Vec<Dag> {
    let mut dags: Vec<Dag> = train
        .iter()
        .map(|pair| build_dag(vec![pair.input.clone(), pair.output.clone()], config))
        .collect();
    dags.push(build_dag(vec![test_input.clone()], config));
    dags
}

/// Runs the core pipeline up through composition (DAG build, piece
/// extraction, composition at every candidate test-slot size) for one test
/// input, returning the pooled, unranked candidates and the training
/// outputs they were composed against. Any panic inside a library transform
/// is treated as the `InternalInvariant` error kind from §7: the caller
/// sees an empty candidate list instead of a propagated panic.
fn core_candidates(train: &[Pair], test_input: &Grid, config: &SolveConfig) -> (Vec<Candidate>, Vec<Grid>) {
    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let dag_config = config.dag_config();
        let predicted = predict_output_size(train, test_input);
        let dags = build_all_dags(train, test_input, &dag_config);
        let collection = extract_pieces(&dags, Library::global(), PieceConfig::default());
        let training_outputs: Vec<Grid> = train.iter().map(|p| p.output.clone()).collect();

        let mut candidates = Vec::new();
        for (w, h) in candidate_test_sizes(&dags, &collection, predicted) {
            let test_slot = Grid::make(w, h, UNFILLED)
                .unwrap_or_else(|_| Grid::make(test_input.width(), test_input.height(), UNFILLED).unwrap());
            candidates.extend(compose(&dags, &collection, &training_outputs, &test_slot));
        }
        (candidates, training_outputs)
    }));

    match outcome {
        Ok(result) => result,
        Err(_) => {
            if config.enable_logging {
                log::warn!("core_candidates: transform violated its contract, returning empty answer");
            }
            (Vec::new(), train.iter().map(|p| p.output.clone()).collect())
        }
    }
}

/// Runs the core pipeline (DAG build, piece extraction, composition,
/// scoring) for one test input.
fn solve_one(train: &[Pair], test_input: &Grid, config: &SolveConfig) -> Vec<Grid> {
    let (candidates, training_outputs) = core_candidates(train, test_input, config);
    let score_config = ScoreConfig {
        complexity_penalty: config.complexity_penalty,
        max_answers: config.max_answers,
    };
    let ranked = rank_candidates(&candidates, &training_outputs, score_config);
    ranked.into_iter().map(|c| c.images.last().unwrap().clone()).collect()
}

/// Runs specialists (if any) ahead of the core pipeline. If one meets the
/// shortcut confidence threshold, its answers are returned directly per
/// §6; otherwise the core's candidates and the specialists' answers are
/// pooled and scored together by §4.F, rather than appending raw specialist
/// grids after the core's own ranking has already been truncated.
fn solve_with_specialists(
    train: &[Pair],
    test_input: &Grid,
    config: &SolveConfig,
    specialists: &[Box<dyn SpecialistSolver>],
) -> Vec<Grid> {
    let (specialist_answers, shortcut) = run_specialists(specialists, train, test_input);
    if shortcut {
        let mut sorted = specialist_answers;
        sorted.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
        return sorted.into_iter().take(config.max_answers).map(|a| a.grid).collect();
    }

    let (candidates, training_outputs) = core_candidates(train, test_input, config);
    let score_config = ScoreConfig {
        complexity_penalty: config.complexity_penalty,
        max_answers: config.max_answers,
    };
    let ranked = rank_pooled(&candidates, &specialist_answers, &training_outputs, score_config);
    ranked.into_iter().map(|c| c.images.last().unwrap().clone()).collect()
}

/// The public entry point: ingests `task`, runs the core pipeline (plus
/// any supplied specialists) per test input, and returns one answer list
/// per test input, index-aligned with `task.test`.
///
/// Per §7's propagation policy, the only error this can return is
/// [`SolveError::InvalidInput`] — but ingestion already happened by the
/// time a caller has a [`Task`], so in practice this always succeeds; the
/// `Result` wrapper exists to mirror the contract precisely and leave room
/// for callers that pass a `Task` through further validation.
pub fn solve(task: &Task, config: SolveConfig, specialists: &[Box<dyn SpecialistSolver>]) -> Result<Vec<Vec<Grid>>, SolveError> {
    if task.train.is_empty() {
        return Err(SolveError::invalid("task has no training pairs"));
    }
    let answers = task
        .test
        .iter()
        .map(|test_input| solve_with_specialists(&task.train, test_input, &config, specialists))
        .collect();
    Ok(answers)
}
