// Library target for the criterion benchmarks and the integration tests.
// The binary entry point is main.rs; this file re-declares the module tree so
// that outside harnesses can reach `dictr::engine::*`, `dictr::session::*`
// and `dictr::store::*`. The rest is only driven through the binary.
#![allow(dead_code)]

pub mod engine;
pub mod session;
pub mod store;

mod app;
mod audio;
mod config;
mod event;
mod ui;
