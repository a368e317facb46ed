//! A pluggable command dispatch layer for management-style CLI subsystems.
//!
//! This crate locates and runs named commands the way a web framework's
//! management-command machinery does, with three additions on top of the
//! conventional lookup: exact name-to-path overrides, extra search locations
//! beyond the per-component convention, and aliases that expand to one or more
//! underlying invocations. The heart of it is the resolution algorithm in
//! [`resolver`]: a deterministic walk over every candidate location that stops
//! at the first valid implementation.
//!
//! The main entry point is [`Dispatcher`], configured from [`Settings`] (four
//! TOML-backed settings, eagerly validated) and backed by any
//! [`CommandLoader`](registry::CommandLoader), usually a
//! [`ModuleRegistry`](registry::ModuleRegistry), the in-memory stand-in for
//! dynamic module loading. The public modules [`command`], [`registry`],
//! [`resolver`] and [`settings`] expose the pieces for embedding and testing.

mod builtin;
pub mod command;
mod dispatcher;
mod error;
pub mod registry;
pub mod resolver;
pub mod settings;

pub use command::{Command, ExitCode};
pub use dispatcher::Dispatcher;
pub use error::Error;
pub use registry::{CommandLoader, Component, ComponentSet, LoadOutcome, ModuleRegistry};
pub use settings::Settings;
