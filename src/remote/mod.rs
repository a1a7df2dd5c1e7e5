//! Remote transport
//!
//! Concrete implementation of the directory capability against the admin
//! REST API. The core never depends on this module directly; it sees only
//! the [`crate::core::traits::DirectoryClient`] trait.

pub mod client;

pub use client::RestDirectoryClient;
