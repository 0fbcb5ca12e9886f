//! Atelier application layer: collaborator contracts, the booking desk, configuration and
//! logging setup.

pub mod config;
pub mod desk;
pub mod domain;
pub mod gateway;
pub mod observability;

#[cfg(test)]
mod test;
