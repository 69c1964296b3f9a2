//! End-to-end scenarios grounded in SPEC_FULL.md §8: each exercises the
//! public `solve()` surface against a small, hand-checkable task.

use arc_solver::grid::Grid;
use arc_solver::solve;
use arc_solver::task::Pair;
use arc_solver::task::Task;
use arc_solver::SolveConfig;

fn task_of(train: Vec<(Grid, Grid)>, test: Vec<Grid>) -> Task {
    Task {
        train: train.into_iter().map(|(input, output)| Pair { input, output }).collect(),
        test,
    }
}

#[test]
fn s1_identity_task() {
    let train_in = Grid::from_pixels(2, 2, vec![1, 2, 3, 4]).unwrap();
    let train_out = train_in.clone();
    let test_in = Grid::from_pixels(2, 2, vec![5, 6, 7, 8]).unwrap();
    let task = task_of(vec![(train_in, train_out)], vec![test_in.clone()]);
    let answers = solve(&task, SolveConfig::default(), &[]).unwrap();
    assert_eq!(answers[0].first(), Some(&test_in));
}

#[test]
fn s2_global_transpose() {
    let train_in = Grid::from_pixels(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
    let train_out = Grid::from_pixels(2, 3, vec![1, 4, 2, 5, 3, 6]).unwrap();
    let test_in = Grid::from_pixels(2, 3, vec![9, 8, 7, 6, 5, 4]).unwrap();
    let expected = Grid::from_pixels(3, 2, vec![9, 7, 5, 8, 6, 4]).unwrap();
    let task = task_of(vec![(train_in, train_out)], vec![test_in]);
    let answers = solve(&task, SolveConfig::default(), &[]).unwrap();
    assert!(answers[0].contains(&expected));
}

#[test]
fn s3_colour_filter() {
    let train_in_1 = Grid::from_pixels(3, 2, vec![1, 0, 2, 0, 1, 0]).unwrap();
    let train_out_1 = Grid::from_pixels(3, 2, vec![1, 0, 0, 0, 1, 0]).unwrap();
    let train_in_2 = Grid::from_pixels(3, 2, vec![2, 2, 1, 1, 0, 2]).unwrap();
    let train_out_2 = Grid::from_pixels(3, 2, vec![0, 0, 1, 1, 0, 0]).unwrap();
    let test_in = Grid::from_pixels(3, 2, vec![1, 2, 1, 2, 1, 2]).unwrap();
    let expected = Grid::from_pixels(3, 2, vec![1, 0, 1, 0, 1, 0]).unwrap();
    let task = task_of(vec![(train_in_1, train_out_1), (train_in_2, train_out_2)], vec![test_in]);
    let answers = solve(&task, SolveConfig::default(), &[]).unwrap();
    assert!(answers[0].contains(&expected));
}

#[test]
fn s4_tiling_beyond_core_capability_still_returns_best_effort() {
    let train_in = Grid::from_pixels(2, 2, vec![1, 2, 2, 3]).unwrap();
    let tiled_row = [1, 2, 1, 2, 1, 2];
    let train_out = Grid::from_pixels(
        6,
        6,
        tiled_row
            .iter()
            .chain([2, 3, 2, 3, 2, 3].iter())
            .chain(tiled_row.iter())
            .chain([2, 3, 2, 3, 2, 3].iter())
            .chain(tiled_row.iter())
            .chain([2, 3, 2, 3, 2, 3].iter())
            .copied()
            .collect(),
    )
    .unwrap();
    let test_in = Grid::from_pixels(2, 2, vec![4, 5, 5, 6]).unwrap();
    let target = Grid::from_pixels(6, 6, vec![4; 36]).unwrap();
    let task = task_of(vec![(train_in, train_out)], vec![test_in]);
    let answers = solve(&task, SolveConfig::default(), &[]).unwrap();
    assert!(answers[0].len() <= 3);
    assert!(!answers[0].contains(&target), "core should not solve tiling without a tile transform");
}

#[test]
fn s5_invalid_input_is_rejected() {
    let json = r#"{"train":[{"input":[[1,11]],"output":[[1,0]]}],"test":[[[1,0]]]}"#;
    let result = Task::from_reader(json.as_bytes());
    assert!(result.is_err());
}

#[test]
fn s6_resource_exhaustion_returns_short_list_without_panicking() {
    let train_in = Grid::from_pixels(3, 3, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();
    let train_out = Grid::from_pixels(3, 3, vec![9, 8, 7, 6, 5, 4, 3, 2, 1]).unwrap();
    let test_in = Grid::from_pixels(3, 3, vec![1, 1, 1, 2, 2, 2, 3, 3, 3]).unwrap();
    let task = task_of(vec![(train_in, train_out)], vec![test_in]);
    let config = SolveConfig {
        max_depth: 0,
        time_limit_seconds: 0.000_001,
        ..Default::default()
    };
    let answers = solve(&task, config, &[]).unwrap();
    assert!(answers[0].len() <= 1);
}

#[test]
fn answer_envelope_round_trips_as_small_nonnegative_integers() {
    let train_in = Grid::from_pixels(1, 1, vec![3]).unwrap();
    let train_out = train_in.clone();
    let test_in = Grid::from_pixels(1, 1, vec![7]).unwrap();
    let task = task_of(vec![(train_in, train_out)], vec![test_in]);
    let answers = solve(&task, SolveConfig::default(), &[]).unwrap();
    let json = arc_solver::task::answer_to_json(&answers);
    let rows = json[0][0].as_array().unwrap();
    for row in rows {
        for cell in row.as_array().unwrap() {
            let value = cell.as_u64().unwrap();
            assert!(value <= 9);
        }
    }
}

#[test]
fn logging_is_opt_in() {
    // solve() never touches the filesystem by itself — only the explicit
    // `init()` call (wired up by the CLI binary) creates logs/. No other
    // test in this binary calls `init()`, so a plain existence check
    // against the crate's working directory is safe under parallel
    // test execution.
    let train_in = Grid::from_pixels(1, 1, vec![1]).unwrap();
    let train_out = train_in.clone();
    let test_in = Grid::from_pixels(1, 1, vec![2]).unwrap();
    let task = task_of(vec![(train_in, train_out)], vec![test_in]);
    let _ = solve(&task, SolveConfig::default(), &[]).unwrap();

    assert!(!std::path::Path::new("logs").exists(), "solve() must never write logs/ unless init() is called explicitly");
}
