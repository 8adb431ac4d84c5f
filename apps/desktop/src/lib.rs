//! Pieces shared by the `billed` client and the maintenance tools.

pub mod config;
pub mod proof;
