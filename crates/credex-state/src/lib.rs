//! # credex-state — Offer and Exchange Registries
//!
//! Pending credential offers and presentation requests are shared by every
//! concurrent request. They live behind the [`Registry`] trait so the
//! services can be handed any backing store; [`MemoryRegistry`] is the
//! in-process implementation.
//!
//! Every entry carries an expiry. Expired entries are invisible to lookups
//! and updates as soon as they expire, and are physically removed by
//! [`Registry::evict_expired`], which the server calls on a fixed period.

pub mod memory;
pub mod registry;

pub use memory::MemoryRegistry;
pub use registry::Registry;
