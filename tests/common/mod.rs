#![allow(dead_code)]

pub mod handlers;
pub mod project;

pub use handlers::*;
pub use project::*;
