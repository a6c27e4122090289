#![cfg_attr(not(feature = "std"), no_std)]

pub mod assets;
pub mod forwarding;

pub use assets::*;
pub use forwarding::*;
