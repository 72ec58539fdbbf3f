//! CLI commands

pub mod classify;
pub mod demo;
pub mod doctor;
