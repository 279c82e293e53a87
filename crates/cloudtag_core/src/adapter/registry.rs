//! In-process adapter registry keyed by service short name.

use crate::adapter::ResourceAdapter;
use crate::aws::s3::S3Adapter;
use crate::aws::session::{AwsSession, SessionError};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Adapter registration/lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidServiceName(String),
    DuplicateServiceName(String),
    ServiceNotFound(String),
    Session(SessionError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidServiceName(value) => write!(f, "service name is invalid: {value}"),
            Self::DuplicateServiceName(value) => {
                write!(f, "service already registered: {value}")
            }
            Self::ServiceNotFound(value) => write!(f, "service not found: {value}"),
            Self::Session(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Session(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SessionError> for RegistryError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

/// Runtime registry of resource adapters.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<String, Arc<dyn ResourceAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry holding every AWS adapter for `session`.
    pub fn with_aws_defaults(session: &AwsSession) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(Arc::new(S3Adapter::from_session(session)?))?;
        Ok(registry)
    }

    /// Registers one adapter under its descriptor's short name.
    pub fn register(&mut self, adapter: Arc<dyn ResourceAdapter>) -> Result<(), RegistryError> {
        let short_name = adapter.descriptor().short_name.trim().to_string();
        if !is_valid_short_name(&short_name) {
            return Err(RegistryError::InvalidServiceName(short_name));
        }
        if self.adapters.contains_key(short_name.as_str()) {
            return Err(RegistryError::DuplicateServiceName(short_name));
        }

        self.adapters.insert(short_name, adapter);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Returns sorted short names.
    pub fn short_names(&self) -> Vec<String> {
        self.adapters.keys().cloned().collect()
    }

    /// Returns one adapter by short name.
    pub fn get(&self, short_name: &str) -> Option<Arc<dyn ResourceAdapter>> {
        self.adapters.get(short_name.trim()).cloned()
    }

    /// Returns one adapter or a `ServiceNotFound` error.
    pub fn require(&self, short_name: &str) -> Result<Arc<dyn ResourceAdapter>, RegistryError> {
        self.get(short_name)
            .ok_or_else(|| RegistryError::ServiceNotFound(short_name.trim().to_string()))
    }
}

fn is_valid_short_name(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
