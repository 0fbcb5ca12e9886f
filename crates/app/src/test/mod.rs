//! Test support for desk and service tests.

mod context;
mod memory;

pub use context::TestContext;
pub use memory::InMemoryServer;
