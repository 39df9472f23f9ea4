mod autocomplete;
mod boundary;
mod config;
mod controller;
mod core;
mod normalize;
mod ops;
mod paste;
mod serialize;
mod session;
mod weight;

pub use crate::autocomplete::*;
pub use crate::boundary::{
    is_word_grapheme, next_grapheme_end, previous_grapheme_start, word_start_before,
};
pub use crate::config::*;
pub use crate::controller::*;
pub use crate::core::*;
pub use crate::normalize::*;
pub use crate::ops::*;
pub use crate::paste::*;
pub use crate::serialize::*;
pub use crate::session::*;
pub use crate::weight::*;
