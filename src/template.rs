//! Workload templates and their fixed runtime profiles.
//!
//! Each hosted-site template is a closed variant carrying a static
//! [`TemplateProfile`]: image, mount target, writability, default port,
//! environment, and command. Adding a template is one new variant plus one
//! profile constant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Image used for every database workload.
pub const DATABASE_IMAGE: &str = "postgres:16-alpine";

/// Port the database listens on inside its container.
pub const DATABASE_INTERNAL_PORT: u16 = 5432;

/// Value of the `docklite.type` label carried by database workloads.
pub const DATABASE_TYPE_LABEL_VALUE: &str = "postgres";

/// Static runtime profile of a site template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateProfile {
    /// Immutable image reference pulled before creation.
    pub image: &'static str,
    /// Where the site directory is mounted inside the container.
    pub mount_target: &'static str,
    /// Whether the mount is read-write.
    pub writable: bool,
    /// Port the workload listens on when the caller does not choose one.
    pub default_port: u16,
    /// Whether the caller-supplied port overrides `default_port`.
    pub honours_requested_port: bool,
    /// Fixed `KEY=value` environment entries.
    pub env: &'static [&'static str],
    /// Whether `PORT=<internal port>` is appended to the environment.
    pub exports_port_env: bool,
    /// Command override; empty keeps the image default.
    pub command: &'static [&'static str],
    /// Working directory override.
    pub working_dir: Option<&'static str>,
}

const STATIC_PROFILE: TemplateProfile = TemplateProfile {
    image: "nginx:alpine",
    mount_target: "/usr/share/nginx/html",
    writable: false,
    default_port: 80,
    honours_requested_port: false,
    env: &[],
    exports_port_env: false,
    command: &[],
    working_dir: None,
};

const PHP_PROFILE: TemplateProfile = TemplateProfile {
    image: "webdevops/php-nginx:8.2-alpine",
    mount_target: "/app",
    writable: true,
    default_port: 80,
    honours_requested_port: false,
    env: &[
        "WEB_DOCUMENT_ROOT=/app",
        "PHP_DISPLAY_ERRORS=1",
        "PHP_MEMORY_LIMIT=256M",
        "PHP_MAX_EXECUTION_TIME=300",
        "PHP_POST_MAX_SIZE=50M",
        "PHP_UPLOAD_MAX_FILESIZE=50M",
    ],
    exports_port_env: false,
    command: &[],
    working_dir: None,
};

const NODE_PROFILE: TemplateProfile = TemplateProfile {
    image: "node:20-alpine",
    mount_target: "/app",
    writable: true,
    default_port: 3000,
    honours_requested_port: true,
    env: &["NODE_ENV=production"],
    exports_port_env: true,
    command: &["npm", "start"],
    working_dir: Some("/app"),
};

/// Kind of hosted site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteTemplate {
    /// Static files served by nginx.
    #[default]
    Static,
    /// PHP application behind nginx.
    Php,
    /// Node application started with `npm start`.
    Node,
}

impl SiteTemplate {
    /// Every supported template, in display order.
    pub const ALL: [Self; 3] = [Self::Static, Self::Php, Self::Node];

    /// Parse a caller-supplied template name.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace; a
    /// blank name selects [`SiteTemplate::Static`].
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnsupportedTemplate` for any other name.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "" | "static" => Ok(Self::Static),
            "php" => Ok(Self::Php),
            "node" => Ok(Self::Node),
            _ => Err(ValidationError::UnsupportedTemplate {
                template: String::from(raw.trim()),
            }),
        }
    }

    /// Label value and display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Php => "php",
            Self::Node => "node",
        }
    }

    /// The fixed runtime profile for this template.
    #[must_use]
    pub const fn profile(self) -> &'static TemplateProfile {
        match self {
            Self::Static => &STATIC_PROFILE,
            Self::Php => &PHP_PROFILE,
            Self::Node => &NODE_PROFILE,
        }
    }

    /// Resolve the port the workload listens on.
    #[must_use]
    pub fn internal_port(self, requested: Option<u16>) -> u16 {
        let profile = self.profile();
        if profile.honours_requested_port {
            requested
                .filter(|port| *port != 0)
                .unwrap_or(profile.default_port)
        } else {
            profile.default_port
        }
    }

    /// Environment entries for a container listening on `internal_port`.
    #[must_use]
    pub fn env(self, internal_port: u16) -> Vec<String> {
        let profile = self.profile();
        let mut env: Vec<String> = profile.env.iter().map(|entry| String::from(*entry)).collect();
        if profile.exports_port_env {
            env.push(format!("PORT={internal_port}"));
        }
        env
    }

    /// Command override, if the template replaces the image default.
    #[must_use]
    pub fn command(self) -> Option<Vec<String>> {
        let command = self.profile().command;
        (!command.is_empty()).then(|| command.iter().map(|part| String::from(*part)).collect())
    }

    /// Bind mode suffix (`ro` or `rw`).
    #[must_use]
    pub const fn bind_mode(self) -> &'static str {
        if self.profile().writable { "rw" } else { "ro" }
    }
}

impl fmt::Display for SiteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteTemplate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Workload kind recovered from a resource's `docklite.type` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadKind {
    /// Static site.
    Static,
    /// PHP site.
    Php,
    /// Node site.
    Node,
    /// Database instance.
    Database,
}

impl WorkloadKind {
    /// Map a `docklite.type` label value to a kind.
    #[must_use]
    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            DATABASE_TYPE_LABEL_VALUE => Some(Self::Database),
            other => SiteTemplate::ALL
                .into_iter()
                .find(|template| template.as_str() == other)
                .map(Self::from),
        }
    }
}

impl From<SiteTemplate> for WorkloadKind {
    fn from(template: SiteTemplate) -> Self {
        match template {
            SiteTemplate::Static => Self::Static,
            SiteTemplate::Php => Self::Php,
            SiteTemplate::Node => Self::Node,
        }
    }
}
