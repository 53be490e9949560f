//! Background Tasks Module
//!
//! Contains the worker task that serializes every cache operation.

mod worker;

pub use worker::{no_shutdown, ShutdownSignal};

pub(crate) use worker::Worker;
