//! Repository references and token wrappers.

use url::Url;

use super::error::GitHubError;

const PUBLIC_API_BASE: &str = "https://api.github.com";

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, GitHubError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GitHubError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// A repository identified by owner and name, plus the API base serving it.
///
/// # Example
///
/// ```
/// use qa_generator::github::RepositoryRef;
///
/// let repo = RepositoryRef::parse("octo/app").expect("should parse");
/// assert_eq!(repo.full_name(), "octo/app");
/// assert_eq!(repo.api_base().as_str(), "https://api.github.com/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    api_base: Url,
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Parses `owner/repo` or a repository URL such as
    /// `https://github.example.com/owner/repo`.
    ///
    /// URLs on hosts other than `github.com` are served from `/api/v3` on the
    /// same host.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidRepository` when the input has no owner
    /// or repository segment.
    pub fn parse(input: &str) -> Result<Self, GitHubError> {
        let trimmed = input.trim();
        if trimmed.contains("://") {
            return Self::parse_url(trimmed);
        }

        let (owner, name) = split_owner_repo(trimmed)?;
        let api_base = Url::parse(PUBLIC_API_BASE).map_err(invalid_repository)?;
        Ok(Self {
            api_base,
            owner,
            name,
        })
    }

    fn parse_url(input: &str) -> Result<Self, GitHubError> {
        let parsed = Url::parse(input).map_err(invalid_repository)?;
        let path = parsed.path().trim_matches('/');
        let repository_path = path.strip_suffix(".git").unwrap_or(path);
        let (owner, name) = split_owner_repo(repository_path)?;
        let api_base = derive_api_base(&parsed)?;
        Ok(Self {
            api_base,
            owner,
            name,
        })
    }

    /// API base URL for this repository's host.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `owner/name`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Returns `/repos/{owner}/{name}{suffix}`.
    pub(crate) fn api_path(&self, suffix: &str) -> String {
        format!("/repos/{}/{}{suffix}", self.owner, self.name)
    }
}

fn split_owner_repo(value: &str) -> Result<(String, String), GitHubError> {
    let mut segments = value.split('/').map(str::trim);
    match (segments.next(), segments.next(), segments.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
            Ok((owner.to_owned(), name.to_owned()))
        }
        _ => Err(GitHubError::InvalidRepository {
            message: format!("expected owner/repo, got `{value}`"),
        }),
    }
}

fn invalid_repository(error: url::ParseError) -> GitHubError {
    GitHubError::InvalidRepository {
        message: error.to_string(),
    }
}

/// Derives the GitHub API base URL from a repository URL's host.
fn derive_api_base(parsed: &Url) -> Result<Url, GitHubError> {
    let host = parsed
        .host_str()
        .ok_or_else(|| GitHubError::InvalidRepository {
            message: "URL must include a host".to_owned(),
        })?;

    if host.eq_ignore_ascii_case("github.com") {
        return Url::parse(PUBLIC_API_BASE).map_err(invalid_repository);
    }

    let mut api_url =
        Url::parse(&format!("{}://{host}", parsed.scheme())).map_err(invalid_repository)?;
    api_url
        .set_port(parsed.port())
        .map_err(|()| GitHubError::InvalidRepository {
            message: "invalid port".to_owned(),
        })?;
    api_url.set_path("api/v3");
    Ok(api_url)
}
