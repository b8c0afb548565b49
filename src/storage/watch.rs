//! Watch runtime: notify events converted into ordered tree event batches.

mod events;
mod runtime;

pub use events::WatchConfig;
pub use runtime::WatchRuntime;
