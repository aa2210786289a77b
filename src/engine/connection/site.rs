//! Site provisioning: network, image, routed container, start.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

use super::EngineConnector;
use super::client::{ContainerCreator, ContainerLifecycleClient, ImageClient, NetworkClient};
use super::create_container::{
    CreateContainerRequest, CreatedContainer, HostPort, NameDisambiguation,
};
use crate::config::{AppConfig, ProxyConfig};
use crate::error::{DockliteError, ValidationError};
use crate::metadata::{ResourceMetadata, SiteMetadata};
use crate::naming::{site_container_name, validate_domain};
use crate::site_files::site_directory;
use crate::template::SiteTemplate;

/// Listen port for Node sites when the caller does not choose one.
pub const DEFAULT_NODE_PORT: u16 = 3000;

/// A validated site-creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRequest {
    /// Trimmed domain.
    pub domain: String,
    /// Runtime template.
    pub template: SiteTemplate,
    /// Whether `www.<domain>` is routed too.
    pub include_www: bool,
    /// Port the workload listens on inside the container.
    pub internal_port: u16,
}

impl SiteRequest {
    /// Normalise and validate caller input.
    ///
    /// `port` is only consulted for Node sites, where it defaults to
    /// [`DEFAULT_NODE_PORT`] and must otherwise lie in `[1, 65535]`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for a blank or path-like domain, an
    /// unknown template, or an out-of-range Node port.
    pub fn new(
        domain: &str,
        template: &str,
        include_www: bool,
        port: Option<u32>,
    ) -> Result<Self, ValidationError> {
        let domain = validate_domain(domain)?;
        let template = SiteTemplate::parse(template)?;
        let requested = if template == SiteTemplate::Node {
            Some(node_port(port)?)
        } else {
            None
        };
        Ok(Self {
            domain,
            template,
            include_www,
            internal_port: template.internal_port(requested),
        })
    }

    /// Routing metadata for this site under `proxy`.
    #[must_use]
    pub fn metadata(&self, proxy: &ProxyConfig) -> SiteMetadata {
        SiteMetadata::new(
            self.domain.clone(),
            self.template,
            self.include_www,
            self.internal_port,
            proxy,
        )
    }
}

fn node_port(port: Option<u32>) -> Result<u16, ValidationError> {
    let Some(raw) = port else {
        return Ok(DEFAULT_NODE_PORT);
    };
    u16::try_from(raw)
        .ok()
        .filter(|value| *value != 0)
        .ok_or(ValidationError::InvalidPort { port: raw })
}

/// Deployment settings shared by every provisioning call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSettings {
    /// Shared isolated network.
    pub network: String,
    /// Reverse-proxy names written into routing labels.
    pub proxy: ProxyConfig,
    /// Parent of every site's mount source directory.
    pub sites_base_dir: Utf8PathBuf,
}

impl ProvisionSettings {
    /// Extract provisioning settings from application configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            network: config.network.name.clone(),
            proxy: config.proxy.clone(),
            sites_base_dir: config.sites.base_dir.clone(),
        }
    }

    /// Mount source directory for `domain`.
    #[must_use]
    pub fn site_directory(&self, domain: &str) -> Utf8PathBuf {
        site_directory(&self.sites_base_dir, domain)
    }
}

impl EngineConnector {
    /// Provision and start a site container.
    ///
    /// The container is left in place if start fails.
    ///
    /// # Errors
    ///
    /// Returns the first engine failure among network ensure, image pull,
    /// create (after one conflict retry), and start.
    pub async fn create_site_async<C>(
        client: &C,
        request: &SiteRequest,
        settings: &ProvisionSettings,
    ) -> Result<CreatedContainer, DockliteError>
    where
        C: NetworkClient + ImageClient + ContainerCreator + ContainerLifecycleClient,
    {
        let profile = request.template.profile();

        Self::ensure_network_async(client, &settings.network).await?;
        Self::ensure_image_async(client, profile.image).await?;

        let labels = ResourceMetadata::Site(request.metadata(&settings.proxy)).to_labels();
        let bind = site_bind(
            &settings.site_directory(&request.domain),
            profile.mount_target,
            request.template.bind_mode(),
        );
        let create_request =
            CreateContainerRequest::new(profile.image, site_container_name(&request.domain))
                .with_cmd(request.template.command())
                .with_env(request.template.env(request.internal_port))
                .with_working_dir(profile.working_dir.map(String::from))
                .with_labels(labels)
                .with_binds(vec![bind])
                .with_published_port(request.internal_port, HostPort::Ephemeral)
                .with_network(settings.network.clone());

        let container =
            Self::create_container_async(client, &create_request, NameDisambiguation::Timestamp)
                .await?;
        Self::start_created_async(client, &container).await?;
        info!(
            domain = %request.domain,
            template = %request.template,
            id = %container.id,
            "site provisioned"
        );
        Ok(container)
    }
}

fn site_bind(source: &Utf8Path, target: &str, mode: &str) -> String {
    format!("{source}:{target}:{mode}")
}
