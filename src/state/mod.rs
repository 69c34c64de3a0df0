/// State management module
///
/// This module handles all application state, including:
/// - The actor data model (data.rs)
/// - The role-partitioned roster (catalog.rs)
/// - Per-role selection and random draws (pairing.rs)
/// - User configuration (config.rs)

pub mod catalog;
pub mod config;
pub mod data;
pub mod pairing;
