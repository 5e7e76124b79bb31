#![allow(dead_code)] // Each test binary uses a different subset of fixtures

pub mod builders;
pub mod strategies;

pub use builders::*;
pub use strategies::*;
