//! Core data structures for the Aviary simulation.

pub mod body;
pub mod controller;
pub mod history;
