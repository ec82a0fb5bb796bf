pub mod batch;
pub mod recorder;
pub mod runner;
pub mod selector;
pub mod strategy;

pub use batch::{run_batch, select_jobs, BatchReport, JobOutcome, JobSelection, SelectionError};
pub use recorder::Recorder;
pub use runner::JobRunner;
pub use selector::Selection;
pub use strategy::{
    DeletionStrategy, HttpStrategies, RadarrStrategy, RunSession, SonarrStrategy,
    StaticStrategies, StrategyProvider,
};
