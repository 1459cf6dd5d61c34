// Library crate for volunteer-match
// Exports modules for use by the worker binary and tests

pub mod config;
pub mod entity;
pub mod error;
pub mod models;
pub mod queue;
pub mod repositories;
pub mod services;
pub mod state;
