#![cfg_attr(not(test), no_std)]

//! Board drivers for the multi-mode clock
//!
//! Everything here is generic over `embedded-hal` / `embedded-storage`
//! traits so it builds and tests on the host; the CH32V203 binary in
//! `main.rs` wires it to the real peripherals.

pub use clock_core::*;

pub mod expander;
pub mod flash_store;
pub mod keys;
pub mod line;
pub mod loopback;

pub use crate::expander::ExpanderBoard;
pub use crate::flash_store::FlashStore;
pub use crate::keys::UserKeyPins;
pub use crate::line::LineAssembler;
pub use crate::loopback::LoopbackBoard;
