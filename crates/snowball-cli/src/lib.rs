//! Snowball Fight session host.
//!
//! Reads one JSON request per line, runs it through the game's command and
//! query handlers, and writes one JSON response per line. The binary wires it
//! to stdin and stdout; tests drive it with in-memory buffers.

pub mod config;
pub mod error;
pub mod requests;
pub mod state;
