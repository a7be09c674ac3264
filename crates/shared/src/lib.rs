//! Domain types shared by the bill store adapters, the controllers and the CLI.

pub mod domain;
pub mod error;
pub mod protocol;
