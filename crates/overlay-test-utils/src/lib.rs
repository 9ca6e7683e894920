//! Shared test utilities for the overlay workspace.
//!
//! This crate provides standardised fixtures to eliminate duplication across
//! crate test suites. It is a dev-dependency only — never published.
//!
//! # Modules
//!
//! - [`dir`] — [`TestConfigDir`] for real on-disk config directories
//! - [`memory`] — [`MemoryFileSystem`], an in-memory filesystem that counts probes and reads
//! - [`clock`] — [`ManualClock`], a clock that only moves when told to

pub mod clock;
pub mod dir;
pub mod memory;

pub use clock::ManualClock;
pub use dir::TestConfigDir;
pub use memory::MemoryFileSystem;
