//! Resolved connection descriptor for a live instance.

use secrecy::{ExposeSecret, SecretString};

/// Address/credential bundle clients use to connect to a live instance.
///
/// Computed once per instance by the readiness coordinator after the runtime
/// reports the instance reachable, then cached for the instance's lifetime.
#[derive(Clone)]
pub struct ConnectionDescriptor {
    /// Host address of the published endpoint.
    pub host: String,
    /// Host-side port of the published endpoint.
    pub port: u16,
    /// Password clients must authenticate with, if any.
    pub password: Option<SecretString>,
}

impl ConnectionDescriptor {
    /// Render the connection string clients consume.
    ///
    /// Includes the password in plaintext; treat the result as a secret.
    pub fn connection_string(&self) -> String {
        match &self.password {
            Some(password) => format!(
                "{}:{},password={}",
                self.host,
                self.port,
                password.expose_secret()
            ),
            None => format!("{}:{}", self.host, self.port),
        }
    }

    /// The endpoint address without credentials.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.is_some())
            .finish()
    }
}

impl std::fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
