//! GitHub repository, issue and branch operations.

use qa_generator::github::{
    HostingGateway, OctocrabHostingGateway, RepositoryInsights, RepositoryRef,
};
use qa_generator::{BranchService, QaGeneratorConfig};

use super::Session;
use super::error::CliError;
use super::output::{
    to_stdout, write_branches, write_repositories, write_repository_details,
    write_repository_issues, write_text,
};

const PUBLIC_API_BASE: &str = "https://api.github.com";

fn gateway_for(
    config: &QaGeneratorConfig,
    session: &Session,
    api_base: &str,
) -> Result<OctocrabHostingGateway, CliError> {
    let token = config.resolve_github_token(&session.settings)?;
    Ok(OctocrabHostingGateway::for_token(&token, api_base)?)
}

fn repository_gateway(
    config: &QaGeneratorConfig,
    session: &Session,
) -> Result<(RepositoryRef, OctocrabHostingGateway), CliError> {
    let repo = config.require_repository()?;
    let gateway = gateway_for(config, session, repo.api_base().as_str())?;
    Ok((repo, gateway))
}

/// Lists the authenticated user's repositories.
pub async fn list_repositories(
    config: &QaGeneratorConfig,
    session: &Session,
) -> Result<(), CliError> {
    let token = config.resolve_github_token(&session.settings)?;
    let (gateway, user) = OctocrabHostingGateway::connect(&token, PUBLIC_API_BASE).await?;
    let repositories = gateway.user_repositories().await?;
    to_stdout(|stdout| {
        write_text(stdout, &format!("Repositories for {}:", user.login))?;
        write_repositories(stdout, &repositories)
    })
}

/// Lists branches, newest first.
pub async fn list_branches(config: &QaGeneratorConfig, session: &Session) -> Result<(), CliError> {
    let (repo, gateway) = repository_gateway(config, session)?;
    let branches = BranchService::new(&gateway).list_branches(&repo).await?;
    to_stdout(|stdout| write_branches(stdout, &branches))
}

/// Creates the configured branch.
pub async fn create_branch(config: &QaGeneratorConfig, session: &Session) -> Result<(), CliError> {
    let (repo, gateway) = repository_gateway(config, session)?;
    let name = config.create_branch.as_deref().unwrap_or_default();
    let created = BranchService::new(&gateway)
        .create_branch(&repo, name, config.source_branch.as_deref())
        .await?;
    to_stdout(|stdout| {
        write_text(
            stdout,
            &format!("Created {} at {} in {}", created.name, created.sha, repo.full_name()),
        )
    })
}

/// Deletes the configured branch.
pub async fn delete_branch(config: &QaGeneratorConfig, session: &Session) -> Result<(), CliError> {
    let (repo, gateway) = repository_gateway(config, session)?;
    let name = config.delete_branch.as_deref().unwrap_or_default();
    BranchService::new(&gateway).delete_branch(&repo, name).await?;
    to_stdout(|stdout| write_text(stdout, &format!("Deleted {} from {}", name.trim(), repo.full_name())))
}

/// Prints an unused branch name derived from the configured text.
pub async fn suggest_branch(config: &QaGeneratorConfig, session: &Session) -> Result<(), CliError> {
    let (repo, gateway) = repository_gateway(config, session)?;
    let base = config.suggest_branch.as_deref().unwrap_or_default();
    let suggestion = BranchService::new(&gateway)
        .suggest_branch_name(&repo, base)
        .await?;
    to_stdout(|stdout| write_text(stdout, &suggestion))
}

/// Prints statistics, branch names and the latest commit of the repository.
pub async fn repository_details(
    config: &QaGeneratorConfig,
    session: &Session,
) -> Result<(), CliError> {
    let (repo, gateway) = repository_gateway(config, session)?;
    let details = RepositoryInsights::new(&gateway).details(&repo).await?;
    to_stdout(|stdout| write_repository_details(stdout, &details))
}

/// Lists open issues of the repository; `--max-results` caps the count.
pub async fn repository_issues(
    config: &QaGeneratorConfig,
    session: &Session,
) -> Result<(), CliError> {
    let (repo, gateway) = repository_gateway(config, session)?;
    let limit = config
        .max_results
        .and_then(|value| usize::try_from(value).ok())
        .unwrap_or_default();
    let issues = RepositoryInsights::new(&gateway)
        .open_issues(&repo, limit)
        .await?;
    to_stdout(|stdout| write_repository_issues(stdout, &issues))
}
