//! Session capability interface and driver registry.
//!
//! Each vendor crate provides a [`SessionFactory`]. The set of factories is
//! fixed at compile time (by cargo features) and collected into a
//! [`DriverRegistry`]; the `LoadDriver` stage is a lookup in that registry.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::dialect::Dialect;
use crate::error::ProbeResult;
use crate::mask::{MASK, mask_url};
use crate::parser::ConnectionTarget;

/// Everything a factory needs to open a session.
#[derive(Clone, Copy)]
pub struct ConnectRequest<'a> {
    /// The connection string, as given.
    pub url: &'a str,
    /// Host and port extracted by the parser.
    pub target: &'a ConnectionTarget,
    /// Username, if supplied.
    pub username: Option<&'a str>,
    /// Password, if supplied.
    pub password: Option<&'a str>,
}

impl fmt::Debug for ConnectRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectRequest")
            .field("url", &mask_url(self.url))
            .field("target", &self.target)
            .field("username", &self.username)
            .field("password", &self.password.map(|_| MASK))
            .finish()
    }
}

/// Opens sessions for one dialect.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Dialect served by this factory.
    fn dialect(&self) -> Dialect;

    /// Vendor driver identifier shown in status output.
    fn driver_id(&self) -> &'static str {
        self.dialect().driver_id()
    }

    /// Open a new session.
    async fn connect(&self, request: ConnectRequest<'_>) -> ProbeResult<Box<dyn Session>>;
}

/// An open database session.
#[async_trait]
pub trait Session: Send {
    /// Run a parameterless query and render the first column of the first row.
    ///
    /// Returns `Ok(None)` when the query produced no rows.
    async fn query_first_value(&mut self, sql: &str) -> ProbeResult<Option<String>>;

    /// Close the session. Calling it more than once is a no-op.
    async fn close(&mut self) -> ProbeResult<()>;
}

/// Static mapping from dialect to a compiled-in session factory.
#[derive(Default)]
pub struct DriverRegistry {
    factories: HashMap<Dialect, Box<dyn SessionFactory>>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any previous one for the same dialect.
    pub fn register(mut self, factory: impl SessionFactory + 'static) -> Self {
        self.factories.insert(factory.dialect(), Box::new(factory));
        self
    }

    /// Look up the factory for a dialect.
    pub fn get(&self, dialect: Dialect) -> Option<&dyn SessionFactory> {
        self.factories.get(&dialect).map(|f| f.as_ref())
    }

    /// Check if a factory is registered for a dialect.
    pub fn is_available(&self, dialect: Dialect) -> bool {
        self.factories.contains_key(&dialect)
    }

    /// Registered dialects, in priority order.
    pub fn dialects(&self) -> Vec<Dialect> {
        Dialect::ALL
            .into_iter()
            .filter(|d| self.is_available(*d))
            .collect()
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if no factory is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("dialects", &self.dialects())
            .finish()
    }
}
