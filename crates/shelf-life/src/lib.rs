//! Shelf life simulation for a shop inventory.
//!
//! Categories bind a name to a [`rules::Rule`], items carry their own quality,
//! price and removal state, and the [`simulation::ShelfSimulation`] steps the
//! inventory one day at a time. Data sources are resolved from `key:payload`
//! strings through the loader registries in [`loaders`].

pub mod config;
pub mod error;
pub mod inventory;
pub mod loaders;
pub mod rules;
pub mod simulation;
pub mod telemetry;
pub mod view;
