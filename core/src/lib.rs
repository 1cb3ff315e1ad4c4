//! Rover dispatch over a mined grid.
//!
//! A rover executes a flat command string (`M`ove, turn `R`ight or `L`eft,
//! `D`isarm) on a rectangular grid. [`dispatch`] computes the trajectory,
//! mine interactions and terminal status. [`dispatch_rover`] wraps it with
//! lookup and write-back against a repository.

#![no_std]

extern crate alloc;

pub use command::*;
pub use engine::*;
pub use error::*;
pub use grid::*;
pub use mine::*;
pub use orientation::*;
pub use rover::*;
pub use store::*;
pub use types::*;

mod command;
mod engine;
mod error;
mod grid;
mod mine;
mod orientation;
mod rover;
mod store;
mod types;
