//! Plain data types shared by the registry, runners and controller.

pub mod challenge;
pub mod interaction;
pub mod state;
