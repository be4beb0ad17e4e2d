//! HTTP client for the instance metadata service.

use std::time::Duration;

use thiserror::Error;

use crate::config::MetadataConfig;
use crate::metadata::instance::{local_hostname, InstanceInfo};
use crate::observability::metrics;

/// Header the metadata service requires on every request.
pub const METADATA_FLAVOR: (&str, &str) = ("Metadata-Flavor", "Google");

/// A value looked up from the metadata service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Zone,
    Template,
    MachineType,
}

impl MetadataField {
    /// Path below the instance metadata root.
    pub fn path(&self) -> &'static str {
        match self {
            MetadataField::Zone => "zone",
            MetadataField::Template => "attributes/instance-template",
            MetadataField::MachineType => "attributes/machine-type",
        }
    }

    /// Resource path segment preceding the value.
    pub fn marker(&self) -> &'static str {
        match self {
            MetadataField::Zone => "zones/",
            MetadataField::Template => "instanceTemplates/",
            MetadataField::MachineType => "machineTypes/",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetadataField::Zone => "zone",
            MetadataField::Template => "template",
            MetadataField::MachineType => "machine_type",
        }
    }
}

/// Why a lookup fell back to unknown.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata lookups are disabled")]
    Disabled,

    #[error("metadata request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("metadata service returned status {0}")]
    Status(u16),
}

/// Client for zone, template and machine type lookups.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    client: Option<reqwest::Client>,
    base_url: String,
}

impl MetadataClient {
    /// Build a client from configuration.
    pub fn new(config: &MetadataConfig) -> Result<Self, MetadataError> {
        if !config.enabled {
            return Ok(Self::disabled());
        }
        Self::with_base_url(&config.base_url, config.timeout())
    }

    /// Build a client against an explicit metadata root.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            client: Some(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// A client that reports every field as unknown without any I/O.
    pub fn disabled() -> Self {
        Self {
            client: None,
            base_url: String::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Look up one field. Failures become an empty string.
    pub async fn lookup(&self, field: MetadataField) -> String {
        match self.fetch(field).await {
            Ok(value) => value,
            Err(MetadataError::Disabled) => String::new(),
            Err(e) => {
                tracing::warn!(field = field.label(), error = %e, "Metadata lookup failed");
                metrics::record_metadata_failure(field.label());
                String::new()
            }
        }
    }

    pub async fn zone(&self) -> String {
        self.lookup(MetadataField::Zone).await
    }

    pub async fn template(&self) -> String {
        self.lookup(MetadataField::Template).await
    }

    pub async fn machine_type(&self) -> String {
        self.lookup(MetadataField::MachineType).await
    }

    /// Everything the index page shows about this instance.
    pub async fn instance_info(&self) -> InstanceInfo {
        let (zone, template, machine_type) =
            tokio::join!(self.zone(), self.template(), self.machine_type());

        InstanceInfo {
            hostname: local_hostname(),
            zone,
            template,
            machine_type,
        }
    }

    async fn fetch(&self, field: MetadataField) -> Result<String, MetadataError> {
        let client = self.client.as_ref().ok_or(MetadataError::Disabled)?;
        let url = format!("{}/{}", self.base_url, field.path());

        let response = client
            .get(&url)
            .header(METADATA_FLAVOR.0, METADATA_FLAVOR.1)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(MetadataError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(strip_resource_prefix(&body, field.marker()).to_string())
    }
}

/// Drop everything up to and including the last `marker` that has text on
/// both sides. Text without such a marker is returned unchanged.
pub fn strip_resource_prefix<'a>(text: &'a str, marker: &str) -> &'a str {
    text.rmatch_indices(marker)
        .map(|(idx, _)| idx)
        .find(|&idx| idx > 0 && idx + marker.len() < text.len())
        .map_or(text, |idx| &text[idx + marker.len()..])
}
