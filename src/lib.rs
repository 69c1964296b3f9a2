pub mod bitset;
pub mod compose;
pub mod dag;
pub mod error;
pub mod grid;
pub mod library;
pub mod piece;
pub mod score;
pub mod solve;
pub mod specialist;
pub mod state;
pub mod task;
mod transforms;

pub use error::SolveError;
pub use solve::solve;
pub use solve::SolveConfig;

/// Initializes structured logging: a terminal logger at `level` and a debug
/// file logger under `logs/`. Gated behind `enable_logging` at call sites —
/// unlike the teacher's always-on `init()`, this crate is a library first,
/// so embedders must opt in rather than have every `solve()` call write to
/// disk.
#[cfg(feature = "cli")]
pub fn init(level: log::LevelFilter) {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{time}.log")).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        level,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
