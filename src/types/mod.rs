// Shared type definitions
// Each submodule defines plain data used across managers and services.

pub mod config;
pub mod errors;
pub mod item;
pub mod overlay;
pub mod reaction;
pub mod tab;
pub mod token;
