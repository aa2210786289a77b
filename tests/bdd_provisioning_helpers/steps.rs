//! Given/when step definitions for provisioning behavioural scenarios.

use std::sync::Arc;

use bollard::models::ContainerSummary;
use camino::Utf8PathBuf;
use docklite::api::{self, DatabaseParams, SiteParams};
use docklite::config::ProxyConfig;
use docklite::metadata::{DatabaseMetadata, ResourceMetadata, SiteMetadata};
use docklite::template::SiteTemplate;
use rstest_bdd_macros::{given, when};
use serde_json::json;
use tempfile::TempDir;

use super::engine::RecordingEngine;
use super::state::{Outcome, ProvisioningState, StepResult};

fn summary(value: serde_json::Value) -> StepResult<ContainerSummary> {
    serde_json::from_value(value).map_err(|e| format!("summary JSON should decode: {e}"))
}

fn run_site(
    provisioning_state: &ProvisioningState,
    domain: &str,
    template: &str,
    include_www: bool,
    port: Option<u32>,
) -> StepResult<()> {
    let engine = provisioning_state.engine()?;
    let config = provisioning_state.config()?;
    let params = SiteParams {
        domain,
        template,
        include_www,
        port,
    };

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("failed to create tokio runtime: {e}"))?;
    let outcome = match runtime.block_on(api::create_site(&engine, &config, params)) {
        Ok(container) => Outcome::Site(container),
        Err(error) => Outcome::failed(&error),
    };
    provisioning_state.outcome.set(outcome);
    Ok(())
}

fn run_database(
    provisioning_state: &ProvisioningState,
    name: &str,
    password: &str,
    port: Option<u32>,
) -> StepResult<()> {
    let engine = provisioning_state.engine()?;
    let config = provisioning_state.config()?;
    let params = DatabaseParams {
        name,
        username: "",
        password,
        port,
    };

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("failed to create tokio runtime: {e}"))?;
    let outcome = match runtime.block_on(api::create_database(&engine, &config, params)) {
        Ok(database) => Outcome::Database(database),
        Err(error) => Outcome::failed(&error),
    };
    provisioning_state.outcome.set(outcome);
    Ok(())
}

#[given("an engine with the shared network already present")]
fn engine_with_shared_network(provisioning_state: &ProvisioningState) -> StepResult<()> {
    let config = provisioning_state.config()?;
    provisioning_state
        .engine
        .set(RecordingEngine::with_networks(&[config.network.name.as_str()]));
    Ok(())
}

#[given("an engine without the shared network")]
fn engine_without_shared_network(provisioning_state: &ProvisioningState) {
    provisioning_state
        .engine
        .set(RecordingEngine::with_networks(&["bridge", "host"]));
}

#[given("the engine reports a name conflict {count} time")]
fn engine_reports_conflict_once(
    provisioning_state: &ProvisioningState,
    count: usize,
) -> StepResult<()> {
    provisioning_state.engine()?.conflict_times(count)
}

#[given("the engine reports a name conflict {count} times")]
fn engine_reports_conflicts(
    provisioning_state: &ProvisioningState,
    count: usize,
) -> StepResult<()> {
    provisioning_state.engine()?.conflict_times(count)
}

#[given("the engine assigns host port {port} to new databases")]
fn engine_assigns_database_port(
    provisioning_state: &ProvisioningState,
    port: u16,
) -> StepResult<()> {
    provisioning_state.engine()?.assign_database_port(port)
}

#[given("starter content is enabled")]
fn starter_content_enabled(provisioning_state: &ProvisioningState) -> StepResult<()> {
    let root = TempDir::new().map_err(|e| format!("failed to create sites root: {e}"))?;
    let base_dir = Utf8PathBuf::from_path_buf(root.path().to_path_buf())
        .map_err(|_| String::from("sites root should be UTF-8"))?;

    let mut config = provisioning_state.config()?;
    config.sites.base_dir = base_dir;
    config.sites.seed_default_content = true;
    provisioning_state.config.set(config);
    provisioning_state.sites_root.set(Arc::new(root));
    Ok(())
}

#[given("an engine listing a labelled database {name} on port {port}")]
fn engine_lists_labelled_database(
    provisioning_state: &ProvisioningState,
    name: String,
    port: u16,
) -> StepResult<()> {
    let labels = ResourceMetadata::Database(DatabaseMetadata {
        database: Some(name.clone()),
        username: Some(String::from("docklite")),
        password: Some(String::from("s3cret")),
        port: Some(port),
    })
    .to_labels();
    let entry = summary(json!({
        "Id": format!("{name}-id"),
        "Names": [format!("/docklite-db-{name}")],
        "Image": "postgres:15-alpine",
        "State": "running",
        "Status": "Up 2 hours",
        "Created": 1_700_000_000,
        "Labels": labels,
    }))?;
    provisioning_state.engine()?.list(entry)
}

#[given("an unlabelled postgres container {name} published on port {port}")]
fn engine_lists_unlabelled_postgres(
    provisioning_state: &ProvisioningState,
    name: String,
    port: u16,
) -> StepResult<()> {
    let entry = summary(json!({
        "Id": format!("{name}-id"),
        "Names": [format!("/{name}")],
        "Image": "docker.io/library/postgres:13",
        "State": "exited",
        "Status": "Exited (0) 3 days ago",
        "Created": 1_600_000_000,
        "Ports": [{"PrivatePort": 5432, "PublicPort": port, "Type": "tcp"}],
    }))?;
    provisioning_state.engine()?.list(entry)
}

#[given("a site container for {domain}")]
fn engine_lists_site(provisioning_state: &ProvisioningState, domain: String) -> StepResult<()> {
    let labels = ResourceMetadata::Site(SiteMetadata::new(
        domain.clone(),
        SiteTemplate::Static,
        true,
        80,
        &ProxyConfig::default(),
    ))
    .to_labels();
    let entry = summary(json!({
        "Id": "site-id",
        "Names": [format!("/docklite-site-{domain}")],
        "Image": "nginx:alpine",
        "State": "running",
        "Status": "Up 5 minutes",
        "Created": 1_700_000_100,
        "Labels": labels,
    }))?;
    provisioning_state.engine()?.list(entry)
}

#[when("the site {domain} is provisioned with the {template} template on port {port}")]
fn site_provisioned_on_port(
    provisioning_state: &ProvisioningState,
    domain: String,
    template: String,
    port: u32,
) -> StepResult<()> {
    run_site(provisioning_state, &domain, &template, true, Some(port))
}

#[when("the site {domain} is provisioned with the {template} template without www")]
fn site_provisioned_without_www(
    provisioning_state: &ProvisioningState,
    domain: String,
    template: String,
) -> StepResult<()> {
    run_site(provisioning_state, &domain, &template, false, None)
}

#[when("the site {domain} is provisioned with the {template} template")]
fn site_provisioned(
    provisioning_state: &ProvisioningState,
    domain: String,
    template: String,
) -> StepResult<()> {
    run_site(provisioning_state, &domain, &template, true, None)
}

#[when("the database {name} is provisioned without a password")]
fn database_provisioned_without_password(
    provisioning_state: &ProvisioningState,
    name: String,
) -> StepResult<()> {
    run_database(provisioning_state, &name, "", None)
}

#[when("the database {name} is provisioned on port {port} with password {password}")]
fn database_provisioned_with_port_and_password(
    provisioning_state: &ProvisioningState,
    name: String,
    port: u32,
    password: String,
) -> StepResult<()> {
    run_database(provisioning_state, &name, &password, Some(port))
}

#[when("databases are listed")]
fn databases_are_listed(provisioning_state: &ProvisioningState) -> StepResult<()> {
    let engine = provisioning_state.engine()?;
    let config = provisioning_state.config()?;
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("failed to create tokio runtime: {e}"))?;
    let outcome = match runtime.block_on(api::list_databases(&engine, &config)) {
        Ok(records) => Outcome::Databases(records),
        Err(error) => Outcome::failed(&error),
    };
    provisioning_state.outcome.set(outcome);
    Ok(())
}
