//! lyrics.ovh integration
//!
//! Fetches plain lyrics by artist and title. No API key required.

pub mod dto;
mod client;

pub use client::LyricsOvhClient;
