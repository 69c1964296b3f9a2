use std::collections::BTreeMap;
use std::io::Read;

use anyhow::Context;
use serde::Deserialize;

use crate::error::SolveError;
use crate::grid::Grid;

/// The JSON shape of a Grid: outer vec is rows, inner vec is columns.
pub type WireGrid = Vec<Vec<u8>>;

#[derive(Debug, Deserialize)]
struct WirePair {
    input: WireGrid,
    output: WireGrid,
}

/// The competition's test entries appear either as a bare grid or wrapped
/// in `{input: ...}`; this crate accepts both shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireTestEntry {
    Wrapped { input: WireGrid },
    Bare(WireGrid),
}

impl WireTestEntry {
    fn into_grid(self) -> WireGrid {
        match self {
            WireTestEntry::Wrapped { input } => input,
            WireTestEntry::Bare(grid) => grid,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireTask {
    train: Vec<WirePair>,
    test: Vec<WireTestEntry>,
}

/// One training example, already validated into [`Grid`]s.
#[derive(Debug, Clone)]
pub struct Pair {
    pub input: Grid,
    pub output: Grid,
}

/// A fully-ingested task: training pairs plus test inputs, both already
/// validated at construction time.
#[derive(Debug, Clone)]
pub struct Task {
    pub train: Vec<Pair>,
    pub test: Vec<Grid>,
}

/// At most `max_answers` candidate grids per test input, in best-first order.
pub type Answer = Vec<WireGrid>;

fn wire_to_grid(wire: WireGrid) -> Result<Grid, SolveError> {
    let height = wire.len();
    if height == 0 {
        return Err(SolveError::invalid("grid has no rows"));
    }
    let width = wire[0].len();
    if width == 0 || wire.iter().any(|row| row.len() != width) {
        return Err(SolveError::invalid("grid rows are non-rectangular"));
    }
    let pixels: Vec<i16> = wire.into_iter().flatten().map(|p| p as i16).collect();
    Grid::from_pixels(width, height, pixels)
}

fn grid_to_wire(grid: &Grid) -> WireGrid {
    grid.to_rows()
        .into_iter()
        .map(|row| row.into_iter().map(|p| p as u8).collect())
        .collect()
}

impl Task {
    fn from_wire(wire: WireTask) -> Result<Self, SolveError> {
        let train = wire
            .train
            .into_iter()
            .map(|p| -> Result<Pair, SolveError> {
                Ok(Pair {
                    input: wire_to_grid(p.input)?,
                    output: wire_to_grid(p.output)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let test = wire
            .test
            .into_iter()
            .map(|entry| wire_to_grid(entry.into_grid()))
            .collect::<Result<Vec<_>, _>>()?;
        if train.is_empty() {
            return Err(SolveError::invalid("task has no training pairs"));
        }
        Ok(Self { train, test })
    }

    /// Parses one JSON document: either a single task `{train, test}`, or the
    /// competition's challenges-file shape (a map of task id to `{train,
    /// test}`), selected by sniffing the top-level JSON value kind.
    pub fn from_reader(mut reader: impl Read) -> anyhow::Result<Vec<Task>> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf).context("reading task JSON")?;
        let value: serde_json::Value = serde_json::from_str(&buf).context("parsing task JSON")?;
        match value {
            serde_json::Value::Object(map) if map.contains_key("train") => {
                let wire: WireTask = serde_json::from_value(serde_json::Value::Object(map))
                    .context("parsing single-task document")?;
                Ok(vec![Task::from_wire(wire)?])
            }
            serde_json::Value::Object(map) => {
                let challenges: BTreeMap<String, WireTask> = map
                    .into_iter()
                    .map(|(k, v)| -> anyhow::Result<(String, WireTask)> {
                        Ok((k, serde_json::from_value(v).context("parsing challenge entry")?))
                    })
                    .collect::<anyhow::Result<BTreeMap<_, _>>>()?;
                challenges
                    .into_values()
                    .map(|wire| Task::from_wire(wire).map_err(anyhow::Error::from))
                    .collect()
            }
            other => anyhow::bail!("unrecognised task JSON shape: {other}"),
        }
    }
}

/// Serializes an answer envelope as a JSON array of arrays of small
/// non-negative integers, index-aligned with `Task::test`.
pub fn answer_to_json(answers: &[Vec<Grid>]) -> serde_json::Value {
    let envelope: Vec<Answer> = answers
        .iter()
        .map(|grids| grids.iter().map(grid_to_wire).collect())
        .collect();
    serde_json::to_value(envelope).expect("answer envelope is always serializable")
}

/// Predicts the test slot's output shape from training (Open Question 4
/// resolution, SPEC_FULL.md §4.G): if every training output shares a size,
/// predict that; otherwise fall back to the test input's own size. This is
/// advisory only: the orchestrator composes against this size plus every
/// size a test-DAG piece actually produces (`solve::candidate_test_sizes`),
/// so a dimension-changing transform is never hard-rejected for disagreeing
/// with this prediction.
pub fn predict_output_size(train: &[Pair], test_input: &Grid) -> (usize, usize) {
    let mut sizes = train.iter().map(|p| (p.output.width(), p.output.height()));
    let Some(first) = sizes.next() else {
        return (test_input.width(), test_input.height());
    };
    if sizes.all(|s| s == first) {
        first
    } else {
        (test_input.width(), test_input.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_rectangular_rows() {
        let wire = vec![vec![0, 1], vec![0]];
        assert!(wire_to_grid(wire).is_err());
    }

    #[test]
    fn accepts_bare_and_wrapped_test_entries() {
        let json = r#"{"train":[{"input":[[1]],"output":[[1]]}],"test":[[[2]],{"input":[[3]]}]}"#;
        let tasks = Task::from_reader(json.as_bytes()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].test.len(), 2);
    }

    #[test]
    fn predicts_uniform_training_output_size() {
        let train = vec![
            Pair {
                input: Grid::from_pixels(1, 1, vec![0]).unwrap(),
                output: Grid::make(3, 2, 0).unwrap(),
            },
            Pair {
                input: Grid::from_pixels(1, 1, vec![0]).unwrap(),
                output: Grid::make(3, 2, 0).unwrap(),
            },
        ];
        let test_input = Grid::make(5, 5, 0).unwrap();
        assert_eq!(predict_output_size(&train, &test_input), (3, 2));
    }

    #[test]
    fn falls_back_to_test_input_size_when_outputs_vary() {
        let train = vec![
            Pair {
                input: Grid::from_pixels(1, 1, vec![0]).unwrap(),
                output: Grid::make(3, 2, 0).unwrap(),
            },
            Pair {
                input: Grid::from_pixels(1, 1, vec![0]).unwrap(),
                output: Grid::make(4, 4, 0).unwrap(),
            },
        ];
        let test_input = Grid::make(5, 5, 0).unwrap();
        assert_eq!(predict_output_size(&train, &test_input), (5, 5));
    }
}
