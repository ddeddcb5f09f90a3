mod event_coalescer;

pub use event_coalescer::*;

#[cfg(test)]
mod event_coalescer_test;
