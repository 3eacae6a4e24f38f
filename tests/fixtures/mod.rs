//! Test fixtures for carpool-planner.
//!
//! Real Las Vegas / Henderson coordinates (from OpenStreetMap) and builders
//! for participants and drivers.

#![allow(dead_code)]

pub mod las_vegas_locations;
pub mod builders;

pub use builders::*;
