//! Snowball Event Store — process-local event persistence.
//!
//! Sessions live for the lifetime of the hosting process; the store keeps one
//! ordered stream per aggregate and enforces optimistic concurrency on append.

pub mod memory_event_repository;
