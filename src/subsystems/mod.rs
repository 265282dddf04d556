//! Subsystem modules for the assistant.

pub mod comms;
pub mod runtime;
