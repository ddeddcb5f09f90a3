//! the test_utils folder here will share utils or test components between unit
//! tests and integrations tests
mod common;
mod event_builder;
mod recording;

pub use common::*;
pub use event_builder::*;
pub use recording::*;
