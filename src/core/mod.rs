//! Game machinery: content registry, text generation, challenge runners and
//! the progression controller.

pub mod challenges;
pub mod controller;
pub mod driver;
pub mod grammar;
pub mod registry;
pub mod textgen;
pub mod view;
