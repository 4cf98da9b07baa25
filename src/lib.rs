//! Headless trainer and formation runner for evolved drone controllers.

pub mod app;
pub mod model;
