//! Name → ID resolution for tenant/project scope.
//!
//! The API is ID-addressed. For UX, the CLI accepts either IDs or names and
//! resolves names by listing within the appropriate scope.

use anyhow::Result;
use photon_sdk::Client;

use crate::error::CliError;

pub async fn resolve_tenant_id(client: &Client, tenant_ident: &str) -> Result<String> {
    let tenant_ident = tenant_ident.trim();
    if tenant_ident.is_empty() {
        anyhow::bail!("Tenant cannot be empty");
    }

    let response = client.list_tenants().await.map_err(CliError::Client)?;

    let mut matches: Vec<String> = Vec::new();
    for tenant in response.items {
        if tenant.id == tenant_ident {
            return Ok(tenant.id);
        }
        if tenant.name == tenant_ident {
            matches.push(tenant.id);
        }
    }

    match matches.as_slice() {
        [] => Err(CliError::NotFound(format!("Tenant '{tenant_ident}' not found")).into()),
        [only] => Ok(only.clone()),
        many => {
            anyhow::bail!(
                "Tenant name '{}' is ambiguous ({}). Use an explicit tenant ID.",
                tenant_ident,
                many.join(", ")
            );
        }
    }
}

pub async fn resolve_project_id(
    client: &Client,
    tenant_id: &str,
    project_ident: &str,
) -> Result<String> {
    let project_ident = project_ident.trim();
    if project_ident.is_empty() {
        anyhow::bail!("Project cannot be empty");
    }

    let response = client
        .list_projects(tenant_id)
        .await
        .map_err(CliError::Client)?;

    let mut matches: Vec<String> = Vec::new();
    for project in response.items {
        if project.id == project_ident {
            return Ok(project.id);
        }
        if project.name == project_ident {
            matches.push(project.id);
        }
    }

    match matches.as_slice() {
        [] => Err(CliError::NotFound(format!("Project '{project_ident}' not found")).into()),
        [only] => Ok(only.clone()),
        many => {
            anyhow::bail!(
                "Project name '{}' is ambiguous ({}). Use an explicit project ID.",
                project_ident,
                many.join(", ")
            );
        }
    }
}
