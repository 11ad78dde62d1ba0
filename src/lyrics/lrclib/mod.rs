//! LRCLIB integration
//!
//! Searches lrclib.net for lyrics by track, artist and album. Search results
//! usually carry the full lyrics inline, so follow-up fetches are rare.
//!
//! API docs: https://lrclib.net/docs

pub mod dto;
mod adapter;
mod client;

pub use client::LrclibClient;
