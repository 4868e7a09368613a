pub mod engine;
pub mod scheduler;
pub mod window;

pub use engine::{EngineSettings, Phase, PlaylistEngine, SchedulerStatus, TickOutcome};
pub use scheduler::Scheduler;
pub use window::{Entry, EntryKind, LiveWindow, WindowSnapshot};
