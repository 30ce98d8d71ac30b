pub mod events;
pub mod server;
pub mod service;
pub mod status;
pub mod variable;

use std::fmt;

use maxscale_common::error::{ExporterError, Result};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::{catalog::Catalog, types::MetricSample};

/// One JSON collection exposed by the MaxScale API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Servers,
    Services,
    Status,
    Variables,
    Events,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Self::Servers,
        Self::Services,
        Self::Status,
        Self::Variables,
        Self::Events,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Servers => "/servers",
            Self::Services => "/services",
            Self::Status => "/status",
            Self::Variables => "/variables",
            Self::Events => "/event/times",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Servers => "servers",
            Self::Services => "services",
            Self::Status => "status",
            Self::Variables => "variables",
            Self::Events => "events",
        }
    }

    /// Decodes an unwrapped payload into this resource's records and maps them
    /// to samples.
    pub fn translate(&self, payload: Value, catalog: &Catalog) -> Result<Vec<MetricSample>> {
        match self {
            Self::Servers => Ok(server::translate(&decode_records(*self, payload)?)),
            Self::Services => Ok(service::translate(&decode_records(*self, payload)?)),
            Self::Status => Ok(status::translate(&decode_records(*self, payload)?, catalog)),
            Self::Variables => variable::translate(&decode_records(*self, payload)?, catalog),
            Self::Events => events::translate(&decode_records(*self, payload)?),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn decode_records<T: DeserializeOwned>(resource: Resource, payload: Value) -> Result<Vec<T>> {
    serde_json::from_value(payload).map_err(|err| ExporterError::decode(resource.path(), err))
}

/// Decodes `null` as the type's default, the way MaxScale's `NULL` counters
/// are meant to be read.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
