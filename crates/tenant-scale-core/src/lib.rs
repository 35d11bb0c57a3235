//! Core containers for tenant-scale.
//!
//! This crate provides the shared pieces every tenant-scale round is built from:
//! - [`KeyedStore`]: a thread-safe key/value store written by many workers and
//!   read once, as a [`Snapshot`], after they have joined
//! - [`ErrorCollector`]: one single-use outcome slot per key, drained into a
//!   single [`AggregateError`]
//! - Error classification ([`ErrorClass`], [`Classify`]) for collaborator errors
//! - Event system for observability

pub mod cell;
pub mod collector;
pub mod error;
pub mod events;
pub mod store;

use std::fmt;
use std::hash::Hash;

pub use cell::{result_cell, Pending, Publisher};
pub use collector::{CollectorError, ErrorCollector, Slot};
pub use error::{AggregateError, Cause, Classify, ErrorClass, WorkerError};
pub use events::{EventListener, EventListeners, FnListener, ScaleEvent};
pub use store::{KeyedStore, Snapshot};

/// Bound shared by every key used in a round.
///
/// `Ord` keeps snapshots and aggregate reports deterministic, `Display` renders
/// keys into error messages and events.
pub trait Key: Clone + Eq + Hash + Ord + fmt::Display + Send + Sync + 'static {}

impl<T> Key for T where T: Clone + Eq + Hash + Ord + fmt::Display + Send + Sync + 'static {}
