//! Branded marketing image generation: prompt in, a set of sized, logo-stamped variants out.

#![allow(clippy::multiple_crate_versions)]
#![deny(clippy::all)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::complexity)]
#![deny(clippy::correctness)]
#![deny(clippy::disallowed_methods)]
#![deny(clippy::expect_used)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::panic)]
#![deny(clippy::perf)]
#![deny(clippy::trivially_copy_pass_by_ref)]
#![deny(clippy::unreachable)]
#![deny(clippy::unwrap_used)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod batch;
pub mod cli;
pub mod composite;
pub mod config;
pub mod constants;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod producer;
pub mod render;
pub mod secrets;
pub mod writer;
