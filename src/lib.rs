//! CRAPCHA: a CAPTCHA parody played as a fixed run of rigged challenges.
//!
//! The player clicks through eight levels that range from trivial to
//! impossible to nonsensical. Failing one ends the run with a generated
//! taunt; passing all of them earns a generated admin code. The library is
//! a pure state machine driven through effects; hosts own clocks and text
//! backends.

pub mod config;
pub mod core;
pub mod schema;
