//! Shared library surface for the routeforge server and its tests.

pub mod activity;
pub mod api;
pub mod config;
pub mod indicator;
pub mod session;
pub mod state;
