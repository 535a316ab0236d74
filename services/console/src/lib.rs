//! Train-R Console Library Crate
//!
//! Command-line parsing and terminal rendering for the console front-end.
//! The `console` binary is a thin loop around these pieces and a
//! [`train_r_client::Session`].

pub mod args;
pub mod render;
