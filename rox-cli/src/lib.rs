//! RoX command-line tool
//!
//! Imports scene files into RoX models and animations and inspects the
//! resulting `.modl` and `.anim` files.

pub mod cli;
pub mod commands;
pub mod utils;
