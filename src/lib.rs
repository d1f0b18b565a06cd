//! Declarative provisioning of containerized services for a composed
//! application host.
//!
//! `berth` turns a resource declaration into everything the surrounding host
//! needs to run and observe it:
//!
//! - a deterministic launch command and environment, assembled inline at
//!   declaration time ([`redis::command`]);
//! - a rendered container config for the runtime ([`launch`]);
//! - a one-shot readiness flow that resolves the connection descriptor after
//!   the runtime reports the instance reachable, and a health probe that
//!   fails closed until it does ([`redis::readiness`], [`health`]).
//!
//! The container runtime itself is an external collaborator: `berth` renders
//! what to launch and coordinates when it is usable, nothing more.

pub mod builder;
pub mod config;
pub mod error;
pub mod events;
pub mod health;
pub mod launch;
pub mod redis;

pub use builder::{AppBuilder, RedisHandle};
pub use config::AppConfig;
pub use error::{ConfigError, ResolveError};
pub use launch::LaunchSpec;
