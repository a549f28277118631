//! EcoFarm Greenhouse Backend Library
//!
//! This library provides the core functionality for the EcoFarm greenhouse
//! control service, including:
//! - The greenhouse control-state data model and its invariants
//! - Device registry, pre-sunrise heating rules and mode transitions
//! - Entity store backends (in-memory and remote document store)
//! - AI setpoint recommendations via the Gemini API
//!
//! The service sits between the operator dashboard and the entity store and
//! enforces every validation rule before a record is persisted.

pub mod api;
pub mod models;
pub mod services;
pub mod store;
