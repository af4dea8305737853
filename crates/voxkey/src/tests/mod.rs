//! Unit tests for the voxkey application crate.

mod output_handler;
mod worker;
