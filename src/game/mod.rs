pub mod actions;
pub mod catalog;
pub mod combat;
pub mod effects;
pub mod encounter;
pub mod mutator;
pub mod narrative;
pub mod session;
pub mod shop;
pub mod types;
