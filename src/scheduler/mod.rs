mod debounce_scheduler;
mod tier;

pub use debounce_scheduler::*;
pub use tier::*;
