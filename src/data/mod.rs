pub mod curve;
pub mod peaks;
pub mod registry;
