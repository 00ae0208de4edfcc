//! Prelim - guided client for the pet-service prelim exam
//!
//! Walks a user through fifteen ordered requests against the service. Each
//! step unlocks the next when the response carries that step's `ITMC{N.`
//! token; the step engine decides what every response means and the
//! terminal wizard is one way of presenting it.

pub mod api;
pub mod app;
pub mod config;
pub mod logging;
pub mod presenter;
pub mod session;
pub mod steps;
pub mod ui;
