//! IO utilities for batch screening files.

pub mod batch_csv;

pub use batch_csv::{read_inputs, screen_csv, write_outcomes, BatchSummary, InputRow};
