//! Error types for resource declaration and readiness resolution.

use thiserror::Error;

/// Errors detected while declaring resources on the application graph.
///
/// All of these are fatal at declaration time; none are retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A resource was declared without a name.
    #[error("resource declared without a name")]
    MissingName,

    /// Two resources were declared under the same name.
    #[error("resource '{name}' is already declared")]
    DuplicateResource {
        /// Name of the offending resource.
        name: String,
    },

    /// Two health checks were registered under the same key.
    #[error("health check '{key}' is already registered")]
    DuplicateHealthCheck {
        /// The duplicated registry key.
        key: String,
    },

    /// An environment variable held a value that does not parse.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// Environment variable name.
        key: String,
        /// What was wrong with the value.
        message: String,
    },
}

/// Errors raised while resolving a connection descriptor.
///
/// Both variants are terminal for the resource instance; resolution is never
/// reattempted after either.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The reachable notification carried an empty endpoint.
    #[error("reachable notification for '{name}' carried an empty endpoint")]
    EmptyEndpoint {
        /// Name of the resource that failed to resolve.
        name: String,
    },

    /// The owning host shut down before the instance became reachable.
    #[error("resource '{name}' was abandoned before it became reachable")]
    Abandoned {
        /// Name of the abandoned resource.
        name: String,
    },
}
