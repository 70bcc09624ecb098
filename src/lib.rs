pub mod backend;
pub mod direct;
pub mod error;
pub mod extract;
pub mod model;
pub mod pattern;
pub mod render;
pub mod solver;
pub mod types;
