pub mod candidate;
pub mod coerce;
pub mod config;
pub mod history;
pub mod job;
pub mod run;

pub use candidate::{Candidate, CandidateTarget};
pub use config::{AppConfig, Endpoint};
pub use history::RunHistory;
pub use job::{Application, DeletionMode, Job, RawJob};
pub use run::{DeletedEntry, DeletedItem, RunState, RunStatus};
