//! Shared API types for pomod services

pub mod types;
