// src/physics/mod.rs
pub mod diffraction;
pub mod resolver;
pub mod unit_cell;

pub use resolver::{resolve, resolve_with};
pub use unit_cell::{Space, UnitCell};
