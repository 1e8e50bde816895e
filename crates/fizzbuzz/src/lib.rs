#![doc = include_str!("../README.md")]

mod error;
mod lock;
mod sequence;
mod tracker;

pub use crate::error::*;
pub use crate::sequence::*;
pub use crate::tracker::*;
