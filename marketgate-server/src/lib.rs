//! marketgate-server
//!
//! JSON-RPC 2.0 stdio server exposing the marketgate router as a closed set
//! of tools. Fatal configuration errors abort startup; a clean end of the
//! stdin stream exits 0.

pub mod protocol;
pub mod server;
pub mod tools;
pub mod wiring;
