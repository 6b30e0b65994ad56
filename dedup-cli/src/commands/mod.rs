//! CLI Commands

pub mod contacts;
pub mod duplicates;
