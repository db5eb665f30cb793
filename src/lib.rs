//! Conway's Game of Life on a bounded grid: [`engine`] owns the board and
//! the transition rule, [`patterns`] holds the canonical seed fixtures,
//! [`draw`] is the terminal host that drives the engine.

pub mod draw;
pub mod engine;
pub mod patterns;
