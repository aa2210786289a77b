//! Typed resource metadata and its label encoding.
//!
//! Labels are the only place docklite records what a container is: workload
//! kind, reverse-proxy routing, and database connection details. Write paths
//! build a [`ResourceMetadata`] and serialise it with
//! [`ResourceMetadata::to_labels`]; read paths decode once with
//! [`ResourceMetadata::from_labels`].

use std::collections::HashMap;

use crate::config::ProxyConfig;
use crate::naming::sanitize_domain;
use crate::template::{DATABASE_TYPE_LABEL_VALUE, SiteTemplate};

/// Marker present on every container docklite creates.
pub const MANAGED_LABEL: &str = "docklite.managed";
/// Literal site domain.
pub const DOMAIN_LABEL: &str = "docklite.domain";
/// Workload kind (`static`, `php`, `node`, `postgres`).
pub const TYPE_LABEL: &str = "docklite.type";
/// Logical database name.
pub const DATABASE_LABEL: &str = "docklite.database";
/// Database user.
pub const USERNAME_LABEL: &str = "docklite.username";
/// Database password, stored in plaintext.
pub const PASSWORD_LABEL: &str = "docklite.password";
/// Host port requested explicitly at creation time.
pub const DATABASE_PORT_LABEL: &str = "docklite.db.port";

const PROXY_ENABLE_LABEL: &str = "traefik.enable";
const LABEL_TRUE: &str = "true";

/// Routing metadata for a hosted site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMetadata {
    /// Domain exactly as requested.
    pub domain: String,
    /// Site template.
    pub template: SiteTemplate,
    /// Whether `www.<domain>` is routed too.
    pub include_www: bool,
    /// Port the proxy forwards to inside the container.
    pub internal_port: u16,
    /// Proxy entry point name.
    pub entrypoint: String,
    /// Proxy certificate resolver name.
    pub cert_resolver: String,
}

impl SiteMetadata {
    /// Build site metadata using the configured proxy names.
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        template: SiteTemplate,
        include_www: bool,
        internal_port: u16,
        proxy: &ProxyConfig,
    ) -> Self {
        Self {
            domain: domain.into(),
            template,
            include_www,
            internal_port,
            entrypoint: proxy.entrypoint.clone(),
            cert_resolver: proxy.cert_resolver.clone(),
        }
    }

    /// The proxy host rule for this site.
    #[must_use]
    pub fn host_rule(&self) -> String {
        build_host_rule(&self.domain, self.include_www)
    }
}

/// Connection metadata for a database.
///
/// Every field is optional because containers created before labelling
/// existed carry none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseMetadata {
    /// Logical database name.
    pub database: Option<String>,
    /// Database user.
    pub username: Option<String>,
    /// Database password.
    pub password: Option<String>,
    /// Host port requested explicitly at creation time.
    pub port: Option<u16>,
}

/// What a managed container is, as recorded in its labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceMetadata {
    /// A hosted site with reverse-proxy routing.
    Site(SiteMetadata),
    /// A database instance.
    Database(DatabaseMetadata),
}

impl ResourceMetadata {
    /// Serialise to the label set attached at creation.
    #[must_use]
    pub fn to_labels(&self) -> HashMap<String, String> {
        let mut labels = HashMap::new();
        labels.insert(String::from(MANAGED_LABEL), String::from(LABEL_TRUE));
        match self {
            Self::Site(site) => insert_site_labels(&mut labels, site),
            Self::Database(database) => insert_database_labels(&mut labels, database),
        }
        labels
    }

    /// Decode a label set.
    ///
    /// Returns `None` when the labels describe neither a site nor a database.
    #[must_use]
    pub fn from_labels(labels: &HashMap<String, String>) -> Option<Self> {
        let kind = labels.get(TYPE_LABEL).map(String::as_str);
        let has_database_name = labels
            .get(DATABASE_LABEL)
            .is_some_and(|name| !name.is_empty());

        if kind == Some(DATABASE_TYPE_LABEL_VALUE) || has_database_name {
            return Some(Self::Database(database_from_labels(labels)));
        }

        let template = SiteTemplate::ALL
            .into_iter()
            .find(|template| Some(template.as_str()) == kind)?;
        let domain = labels.get(DOMAIN_LABEL)?;
        Some(Self::Site(site_from_labels(labels, domain, template)))
    }
}

/// Build the proxy host rule for a domain.
///
/// The domain is trimmed and lower-cased. With `include_www` set, the rule
/// also matches `www.<domain>` unless the domain already starts with `www.`.
#[must_use]
pub fn build_host_rule(domain: &str, include_www: bool) -> String {
    let normalized = domain.trim().to_ascii_lowercase();
    if include_www && !normalized.starts_with("www.") {
        format!("Host(`{normalized}`,`www.{normalized}`)")
    } else {
        format!("Host(`{normalized}`)")
    }
}

/// Label keys for one site's proxy configuration.
struct RouterKeys {
    rule: String,
    entrypoints: String,
    tls: String,
    cert_resolver: String,
    server_port: String,
}

impl RouterKeys {
    fn for_domain(domain: &str) -> Self {
        let router = format!("docklite-{}", sanitize_domain(domain));
        Self {
            rule: format!("traefik.http.routers.{router}.rule"),
            entrypoints: format!("traefik.http.routers.{router}.entrypoints"),
            tls: format!("traefik.http.routers.{router}.tls"),
            cert_resolver: format!("traefik.http.routers.{router}.tls.certresolver"),
            server_port: format!("traefik.http.services.{router}.loadbalancer.server.port"),
        }
    }
}

fn insert_site_labels(labels: &mut HashMap<String, String>, site: &SiteMetadata) {
    let keys = RouterKeys::for_domain(&site.domain);
    labels.insert(String::from(DOMAIN_LABEL), site.domain.clone());
    labels.insert(String::from(TYPE_LABEL), String::from(site.template.as_str()));
    labels.insert(String::from(PROXY_ENABLE_LABEL), String::from(LABEL_TRUE));
    labels.insert(keys.rule, site.host_rule());
    labels.insert(keys.entrypoints, site.entrypoint.clone());
    labels.insert(keys.tls, String::from(LABEL_TRUE));
    labels.insert(keys.cert_resolver, site.cert_resolver.clone());
    labels.insert(keys.server_port, site.internal_port.to_string());
}

fn insert_database_labels(labels: &mut HashMap<String, String>, database: &DatabaseMetadata) {
    labels.insert(
        String::from(TYPE_LABEL),
        String::from(DATABASE_TYPE_LABEL_VALUE),
    );
    let optional = [
        (DATABASE_LABEL, database.database.clone()),
        (USERNAME_LABEL, database.username.clone()),
        (PASSWORD_LABEL, database.password.clone()),
        (DATABASE_PORT_LABEL, database.port.map(|port| port.to_string())),
    ];
    for (key, value) in optional {
        if let Some(present) = value {
            labels.insert(String::from(key), present);
        }
    }
}

fn site_from_labels(
    labels: &HashMap<String, String>,
    domain: &str,
    template: SiteTemplate,
) -> SiteMetadata {
    let keys = RouterKeys::for_domain(domain);
    let include_www = labels
        .get(&keys.rule)
        .is_some_and(|rule| rule.contains("`www."))
        && !domain.trim().to_ascii_lowercase().starts_with("www.");
    let internal_port = labels
        .get(&keys.server_port)
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or_else(|| template.internal_port(None));

    SiteMetadata {
        domain: String::from(domain),
        template,
        include_www,
        internal_port,
        entrypoint: labels.get(&keys.entrypoints).cloned().unwrap_or_default(),
        cert_resolver: labels.get(&keys.cert_resolver).cloned().unwrap_or_default(),
    }
}

fn database_from_labels(labels: &HashMap<String, String>) -> DatabaseMetadata {
    let non_empty = |key: &str| labels.get(key).filter(|value| !value.is_empty()).cloned();
    DatabaseMetadata {
        database: non_empty(DATABASE_LABEL),
        username: non_empty(USERNAME_LABEL),
        password: non_empty(PASSWORD_LABEL),
        port: labels
            .get(DATABASE_PORT_LABEL)
            .and_then(|port| port.parse::<u16>().ok())
            .filter(|port| *port != 0),
    }
}
