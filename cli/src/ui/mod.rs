//! UI Module
//!
//! Terminal interface for the fuel-credit platform:
//!
//! - `app`: screen state, key routing and the event loop
//! - `owner`: customer list, onboarding and top-up for station owners
//! - `customer`: login, grade selection, session start and dispense
//! - `views`: rendering for every screen
//!
//! Workflows never touch the network themselves. They hand back an
//! `Action` and `app` runs the call and routes the reply.

mod app;
mod customer;
mod form;
mod owner;
mod requests;
mod views;

pub use app::{run_app, App};
