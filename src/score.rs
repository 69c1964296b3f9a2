use crate::compose::Candidate;
use crate::grid::Grid;
use crate::specialist::SpecialistAnswer;

/// Emitted-grid side cap — stricter than the construction-time cap in
/// [`crate::grid::MAX_CONSTRUCT_SIDE`]; this is the competition's own limit.
pub const MAX_EMIT_SIDE: usize = 30;

#[derive(Debug, Clone, Copy)]
pub struct ScoreConfig {
    pub complexity_penalty: f64,
    pub max_answers: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            complexity_penalty: 0.01,
            max_answers: 3,
        }
    }
}

/// A scored candidate, ready for ranking. `matches` counts exact training
/// hits; `complexity` is the raw `prior` term the penalty is applied to.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub images: Vec<Grid>,
    pub matches: usize,
    pub complexity: f64,
    pub score: f64,
}

fn is_emittable(candidate: &Candidate) -> bool {
    match candidate.images.last() {
        Some(test_answer) => test_answer.is_emittable(MAX_EMIT_SIDE),
        None => false,
    }
}

fn score_one(candidate: &Candidate, training_outputs: &[Grid], config: &ScoreConfig) -> ScoredCandidate {
    let matches = training_outputs
        .iter()
        .zip(candidate.images.iter())
        .filter(|(expected, actual)| expected == actual)
        .count();
    let complexity = candidate.max_depth as f64 + candidate.piece_count as f64 * 1e-3;
    let score = matches as f64 - complexity * config.complexity_penalty;
    ScoredCandidate {
        images: candidate.images.clone(),
        matches,
        complexity,
        score,
    }
}

/// Sorts by score descending (ties broken by lower complexity), deduplicates
/// by the test-answer's pixel bytes, and truncates to `max_answers` — the
/// tail of §4.F shared by [`rank_candidates`] and [`rank_pooled`].
fn sort_dedup_truncate(mut scored: Vec<ScoredCandidate>, max_answers: usize) -> Vec<ScoredCandidate> {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.complexity.partial_cmp(&b.complexity).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut seen: Vec<Vec<i16>> = Vec::new();
    let mut out = Vec::new();
    for candidate in scored {
        let key: Vec<i16> = candidate.images.last().map(|g| g.pixels().to_vec()).unwrap_or_default();
        if seen.iter().any(|prior| *prior == key) {
            continue;
        }
        seen.push(key);
        out.push(candidate);
        if out.len() >= max_answers {
            break;
        }
    }
    out
}

/// Ranks candidates per SPEC_FULL.md §4.F: rejects unemittable test answers,
/// scores the rest, sorts by score descending (ties broken by lower
/// complexity), deduplicates by the test-answer's pixel bytes, and returns
/// at most `config.max_answers`.
pub fn rank_candidates(candidates: &[Candidate], training_outputs: &[Grid], config: ScoreConfig) -> Vec<ScoredCandidate> {
    let scored: Vec<ScoredCandidate> = candidates
        .iter()
        .filter(|c| is_emittable(c))
        .map(|c| score_one(c, training_outputs, &config))
        .collect();
    sort_dedup_truncate(scored, config.max_answers)
}

/// Scores a specialist's answer on the same `matches - complexity * penalty`
/// scale used by [`score_one`], so it can be pooled and ranked alongside core
/// candidates instead of being appended after the core's own ranking has
/// already been truncated (§6: "pooled and scored together by §4.F"). A
/// specialist predicts only the test output — it has no per-training
/// reconstruction to compare pixel-for-pixel against `training_outputs` — so
/// its advertised `confidence` stands in for the `matches` term
/// (`confidence * training_count`, rounded), and it carries no DAG
/// complexity (`piece_count = sum_depth = max_depth = 0`, i.e. `complexity
/// == 0.0`). Returns `None` for an answer that fails the same emission check
/// core candidates are held to.
fn score_specialist(answer: &SpecialistAnswer, training_count: usize, config: &ScoreConfig) -> Option<ScoredCandidate> {
    if !answer.grid.is_emittable(MAX_EMIT_SIDE) {
        return None;
    }
    let matches = (answer.confidence.clamp(0.0, 1.0) as f64 * training_count as f64).round() as usize;
    let complexity = 0.0;
    let score = matches as f64 - complexity * config.complexity_penalty;
    Some(ScoredCandidate {
        images: vec![answer.grid.clone()],
        matches,
        complexity,
        score,
    })
}

/// Pools core candidates together with specialist answers and ranks the
/// union on one shared scale (§6's non-shortcut integration path), rather
/// than concatenating an already-ranked core answer list with raw specialist
/// grids. Applies the identical sort/dedup/truncate tail as
/// [`rank_candidates`].
pub fn rank_pooled(
    candidates: &[Candidate],
    specialist_answers: &[SpecialistAnswer],
    training_outputs: &[Grid],
    config: ScoreConfig,
) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .filter(|c| is_emittable(c))
        .map(|c| score_one(c, training_outputs, &config))
        .collect();
    scored.extend(
        specialist_answers
            .iter()
            .filter_map(|a| score_specialist(a, training_outputs.len(), &config)),
    );
    sort_dedup_truncate(scored, config.max_answers)
}

/// Exposed for evaluation harnesses: true iff some candidate's test answer
/// equals the (normally hidden) target, per the exactness lemma in §4.F.
pub fn score_candidates(candidates: &[Candidate], hidden_target: &Grid) -> bool {
    candidates
        .iter()
        .filter_map(|c| c.images.last())
        .any(|last| last == hidden_target)
}
