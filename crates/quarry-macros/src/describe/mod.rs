//! Implementation of the `#[derive(Describe)]` macro.
//!
//! The derive publishes a static member table for a struct so that property
//! paths such as `"Address.City"` can be resolved against it, and adds a
//! name constant for every readable member.

mod attrs;
mod derive;

pub use derive::describe_derive_impl;
