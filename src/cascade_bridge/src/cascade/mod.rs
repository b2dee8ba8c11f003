pub mod client;
pub mod fingerprint;
pub mod metadata;

pub use client::run_cascade_session;
