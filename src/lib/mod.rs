//! Shared library modules providing error types, the process runner, and telemetry initialization.

pub mod errors;
pub mod paths;
pub mod process;
pub mod telemetry;
