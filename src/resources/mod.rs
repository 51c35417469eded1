//! # Resource model: identities, handles and snapshots.
//!
//! This module provides the resource-side types the notifier works with:
//! - [`Resource`] / [`ResourceRef`] - named resource handle with an optional initial state
//! - [`ResourceId`] - `(name, instance)` key under which snapshots are tracked
//! - [`ResourceSnapshot`] - immutable point-in-time state record
//! - [`KnownStates`] - well-known state labels (`Running`, `Exited`, ...)

mod id;
mod resource;
mod snapshot;
mod states;

pub use id::ResourceId;
pub use resource::{InitialState, Resource, ResourceRef};
pub use snapshot::{EnvVar, Property, ResourceSnapshot, ResourceState};
pub use states::KnownStates;

pub(crate) use states::{eq_ignore_case, fold_name};
