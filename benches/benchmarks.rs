criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        building_dag_small_grid,
        building_dag_medium_grid,
        building_dag_large_grid,
        extracting_pieces_two_dags,
        composing_identity_task,
        solving_identity_task_end_to_end,
}

use arc_solver::dag::Dag;
use arc_solver::dag::DagConfig;
use arc_solver::grid::Grid;
use arc_solver::library::Library;
use arc_solver::piece::extract_pieces;
use arc_solver::piece::PieceConfig;
use arc_solver::state::State;
use arc_solver::task::Pair;
use arc_solver::task::Task;

fn checkerboard(side: usize) -> Grid {
    let pixels: Vec<i16> = (0..side * side).map(|i| ((i / side + i % side) % 2) as i16).collect();
    Grid::from_pixels(side, side, pixels).unwrap()
}

fn dag_for(side: usize) -> Dag {
    let mut dag = Dag::new(DagConfig {
        max_depth: 6,
        ..Default::default()
    });
    dag.add_root(State::single(checkerboard(side), 0));
    dag.build(Library::global());
    dag
}

fn building_dag_small_grid(c: &mut criterion::Criterion) {
    c.bench_function("build DAG from a 4x4 grid", |b| {
        b.iter(|| dag_for(4))
    });
}

fn building_dag_medium_grid(c: &mut criterion::Criterion) {
    c.bench_function("build DAG from a 10x10 grid", |b| {
        b.iter(|| dag_for(10))
    });
}

fn building_dag_large_grid(c: &mut criterion::Criterion) {
    c.bench_function("build DAG from a 20x20 grid", |b| {
        b.iter(|| dag_for(20))
    });
}

fn extracting_pieces_two_dags(c: &mut criterion::Criterion) {
    c.bench_function("extract pieces across two 8x8 DAGs", |b| {
        b.iter(|| {
            let dags = vec![dag_for(8), dag_for(8)];
            extract_pieces(&dags, Library::global(), PieceConfig::default())
        })
    });
}

fn composing_identity_task(c: &mut criterion::Criterion) {
    let train_in = checkerboard(6);
    let train_out = train_in.clone();
    let test_in = checkerboard(6);
    c.bench_function("compose candidates for a 6x6 identity task", |b| {
        b.iter(|| {
            let mut in_dag = Dag::new(DagConfig { max_depth: 6, ..Default::default() });
            in_dag.add_root(State::single(train_in.clone(), 0));
            in_dag.add_root(State::single(train_out.clone(), 0));
            in_dag.build(Library::global());
            let mut test_dag = Dag::new(DagConfig { max_depth: 6, ..Default::default() });
            test_dag.add_root(State::single(test_in.clone(), 0));
            test_dag.build(Library::global());
            let dags = vec![in_dag, test_dag];
            let collection = extract_pieces(&dags, Library::global(), PieceConfig::default());
            let test_slot = Grid::make(6, 6, arc_solver::grid::UNFILLED).unwrap();
            arc_solver::compose::compose(&dags, &collection, &[train_out.clone()], &test_slot)
        })
    });
}

fn solving_identity_task_end_to_end(c: &mut criterion::Criterion) {
    let train_in = checkerboard(5);
    let train_out = train_in.clone();
    let test_in = checkerboard(5);
    let task = Task {
        train: vec![Pair { input: train_in, output: train_out }],
        test: vec![test_in],
    };
    c.bench_function("solve a 5x5 identity task end to end", |b| {
        b.iter(|| arc_solver::solve(&task, arc_solver::SolveConfig::default(), &[]))
    });
}
