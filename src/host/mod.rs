//! Stdio host: versioned JSON command contract, router and bridge.

pub mod channel;
pub mod contract;
pub mod stdio;
