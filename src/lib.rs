//! **mazes** carves perfect mazes with the growing tree algorithm and finds the route through
//! them with A*, both one observable step at a time.

// `error_chain!` can recurse deeply
#![recursion_limit = "1024"]

#[macro_use]
extern crate error_chain;

pub mod cells;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod pathing;
pub mod session;
pub mod solvers;
pub mod units;
