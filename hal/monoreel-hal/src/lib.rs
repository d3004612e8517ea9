//! Monoreel Hardware Abstraction Layer
//!
//! This crate defines the storage abstraction the playback core is written
//! against, so the same scheduler runs on a RAM disk, an SD card or a flash
//! file system.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  monoreel-core (scheduler, hot-swap)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  monoreel-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  MemStorage   │       │ board storage │
//! │  (RAM disk)   │       │  (FAT, flash) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`storage::Storage`] - Named byte streams with owned handles

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod mem;
pub mod storage;

// Re-export key types at crate root for convenience
pub use mem::{MemHandle, MemStorage};
pub use storage::{Storage, StorageError, MAX_NAME_LEN};
