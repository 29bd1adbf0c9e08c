use std::env;
use std::fmt;
use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::source::{SourceEnumerator, SourceReader};
use crate::table::RawTable;

const API_BASE: &str = "https://api.github.com";
const RAW_BASE: &str = "https://raw.githubusercontent.com";
const API_BASE_ENV: &str = "NEARPOST_GITHUB_API";
const TOKEN_ENV: &str = "NEARPOST_GITHUB_TOKEN";
const SCHEME_PREFIX: &str = "github:";
const WEB_PREFIXES: [&str; 2] = ["https://github.com/", "http://github.com/"];

/// A directory inside a GitHub repository, optionally pinned to a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubReference {
    pub owner: String,
    pub repo: String,
    /// Directory path inside the repository, without leading or trailing `/`.
    pub path: String,
    /// Branch, tag, or commit. `None` resolves the repository's default branch.
    pub branch: Option<String>,
}

impl GitHubReference {
    /// Whether `reference` names a remote repository rather than a local path.
    pub fn is_remote(reference: &str) -> bool {
        reference.starts_with(SCHEME_PREFIX)
            || WEB_PREFIXES
                .iter()
                .any(|prefix| reference.starts_with(prefix))
    }

    /// Parse `github:owner/repo[/path][@branch]` or a
    /// `https://github.com/owner/repo[/tree/branch[/path]]` URL.
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidOriginReference {
            origin: reference.to_string(),
            reason: reason.to_string(),
        };

        if let Some(rest) = reference.strip_prefix(SCHEME_PREFIX) {
            let (location, branch) = match rest.rsplit_once('@') {
                Some((_, "")) => return Err(invalid("branch after '@' is empty")),
                Some((location, branch)) => (location, Some(branch.to_string())),
                None => (rest, None),
            };
            let mut segments = location.split('/').filter(|s| !s.is_empty());
            let owner = segments.next().ok_or_else(|| invalid("missing owner"))?;
            let repo = segments.next().ok_or_else(|| invalid("missing repo"))?;
            let path = segments.collect::<Vec<_>>().join("/");
            return Self::validated(reference, owner, repo, path, branch);
        }

        let rest = WEB_PREFIXES
            .iter()
            .find_map(|prefix| reference.strip_prefix(prefix))
            .ok_or_else(|| invalid("expected github:owner/repo or a github.com URL"))?;
        let mut segments = rest
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty());
        let owner = segments.next().ok_or_else(|| invalid("missing owner"))?;
        let repo = segments.next().ok_or_else(|| invalid("missing repo"))?;
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        let (branch, path) = match segments.next() {
            None => (None, String::new()),
            Some("tree") => {
                let branch = segments
                    .next()
                    .ok_or_else(|| invalid("missing branch after /tree/"))?;
                let path = segments.collect::<Vec<_>>().join("/");
                (Some(branch.to_string()), path)
            }
            Some(other) => {
                return Err(invalid(&format!(
                    "unsupported URL segment '{other}'; expected /tree/<branch>/<path>"
                )));
            }
        };
        Self::validated(reference, owner, repo, path, branch)
    }

    fn validated(
        reference: &str,
        owner: &str,
        repo: &str,
        path: String,
        branch: Option<String>,
    ) -> Result<Self> {
        for (label, value) in [("owner", owner), ("repository", repo)] {
            if !is_valid_name(value) {
                return Err(Error::InvalidOriginReference {
                    origin: reference.to_string(),
                    reason: format!("invalid {label} '{value}'"),
                });
            }
        }
        if path.split('/').any(|segment| segment == "..") {
            return Err(Error::InvalidOriginReference {
                origin: reference.to_string(),
                reason: "path must not contain '..'".to_string(),
            });
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            path,
            branch,
        })
    }

    fn join_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.path, name)
        }
    }
}

impl fmt::Display for GitHubReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", SCHEME_PREFIX, self.owner, self.repo)?;
        if !self.path.is_empty() {
            write!(f, "/{}", self.path)?;
        }
        if let Some(branch) = &self.branch {
            write!(f, "@{}", branch)?;
        }
        Ok(())
    }
}

fn is_valid_name(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Directory listing and file download through the GitHub contents API.
///
/// The listing and the resolved branch are fetched once per origin and reused
/// for every subsequent read.
#[derive(Debug)]
pub struct GitHubOrigin {
    reference: GitHubReference,
    client: Client,
    api_base: String,
    raw_base: String,
    branch: OnceCell<String>,
    listing: OnceCell<Vec<ContentEntry>>,
}

impl GitHubOrigin {
    pub fn new(reference: GitHubReference) -> Result<Self> {
        let api_base = env::var(API_BASE_ENV)
            .ok()
            .map(|base| base.trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| API_BASE.to_string());
        Self::with_api_base(reference, api_base)
    }

    /// Create an origin that talks to a specific API base URL.
    pub fn with_api_base(reference: GitHubReference, api_base: impl Into<String>) -> Result<Self> {
        Ok(Self {
            reference,
            client: build_client()?,
            api_base: api_base.into(),
            raw_base: RAW_BASE.to_string(),
            branch: OnceCell::new(),
            listing: OnceCell::new(),
        })
    }

    /// Download files the listing gives no URL for from `raw_base`.
    pub fn with_raw_base(mut self, raw_base: impl Into<String>) -> Self {
        self.raw_base = raw_base.into();
        self
    }

    pub fn reference(&self) -> &GitHubReference {
        &self.reference
    }

    /// Branch used for listing and downloads, resolving the repository's
    /// default branch when none was given.
    pub fn branch(&self) -> Result<&str> {
        self.branch
            .get_or_try_init(|| match &self.reference.branch {
                Some(branch) => Ok(branch.clone()),
                None => self.fetch_default_branch(),
            })
            .map(String::as_str)
    }

    fn fetch_default_branch(&self) -> Result<String> {
        let url = format!(
            "{}/repos/{}/{}",
            self.api_base, self.reference.owner, self.reference.repo
        );
        let response = self
            .authorized(self.client.get(&url))
            .send()
            .map_err(|err| self.unreachable(err))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(self.unreachable("repository not found"));
        }
        let response = response
            .error_for_status()
            .map_err(|err| self.unreachable(err))?;
        let repo: RepositoryResponse = response.json().map_err(|err| self.unreachable(err))?;

        info!(
            repo = %self.reference.repo,
            branch = %repo.default_branch,
            "resolved default branch"
        );
        Ok(repo.default_branch)
    }

    fn entries(&self) -> Result<&Vec<ContentEntry>> {
        self.listing.get_or_try_init(|| self.fetch_listing())
    }

    fn fetch_listing(&self) -> Result<Vec<ContentEntry>> {
        let branch = self.branch()?.to_string();
        let mut url = format!(
            "{}/repos/{}/{}/contents",
            self.api_base, self.reference.owner, self.reference.repo
        );
        if !self.reference.path.is_empty() {
            url.push('/');
            url.push_str(&self.reference.path);
        }
        debug!(%url, %branch, "listing repository directory");

        let response = self
            .authorized(self.client.get(&url).query(&[("ref", branch.as_str())]))
            .send()
            .map_err(|err| self.unreachable(err))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(self.unreachable(format!(
                "path '{}' not found on {}",
                self.reference.path, branch
            )));
        }
        let body = response
            .error_for_status()
            .map_err(|err| self.unreachable(err))?
            .text()
            .map_err(|err| self.unreachable(err))?;

        parse_listing(&body).map_err(|reason| Error::InvalidOriginReference {
            origin: self.reference.to_string(),
            reason,
        })
    }

    fn raw_url(&self, name: &str) -> Result<String> {
        Ok(format!(
            "{}/{}/{}/{}/{}",
            self.raw_base,
            self.reference.owner,
            self.reference.repo,
            self.branch()?,
            self.reference.join_path(name)
        ))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, "application/vnd.github+json");
        match env::var(TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => {
                request.header(AUTHORIZATION, format!("Bearer {}", token.trim()))
            }
            _ => request,
        }
    }

    fn unreachable(&self, cause: impl fmt::Display) -> Error {
        Error::OriginUnreachable {
            origin: self.reference.to_string(),
            message: cause.to_string(),
        }
    }
}

impl SourceEnumerator for GitHubOrigin {
    fn list_sources(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.entries()?.iter().map(|e| e.name.clone()).collect();
        names.sort();
        Ok(names)
    }
}

impl SourceReader for GitHubOrigin {
    fn read_source(&self, name: &str) -> Result<RawTable> {
        let unreadable = |cause: &dyn fmt::Display| Error::SourceUnreadable {
            source_name: name.to_string(),
            cause: cause.to_string(),
        };

        let listed_url = self
            .entries()
            .map_err(|err| unreadable(&err))?
            .iter()
            .find(|entry| entry.name == name)
            .and_then(|entry| entry.download_url.clone());
        let url = match listed_url {
            Some(url) => url,
            None => self.raw_url(name).map_err(|err| unreadable(&err))?,
        };

        debug!(source = %name, %url, "downloading source");
        let response = self
            .client
            .get(&url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| unreadable(&err))?;
        let body = response.bytes().map_err(|err| unreadable(&err))?;

        RawTable::from_csv_reader(&body[..]).map_err(|err| unreadable(&err))
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    default_branch: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    download_url: Option<String>,
}

/// Decode a contents API directory listing, keeping CSV files only.
///
/// The API answers with an object instead of an array when the path names a
/// file, which is reported as a reason string.
fn parse_listing(body: &str) -> std::result::Result<Vec<ContentEntry>, String> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|err| format!("malformed listing: {err}"))?;
    if !value.is_array() {
        return Err("path does not name a directory".to_string());
    }
    let entries: Vec<ContentEntry> =
        serde_json::from_value(value).map_err(|err| format!("malformed listing: {err}"))?;

    Ok(entries
        .into_iter()
        .filter(|entry| entry.kind == "file")
        .filter(|entry| entry.name.to_ascii_lowercase().ends_with(".csv"))
        .collect())
}

fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(user_agent())
        .build()
        .map_err(Error::Http)
}

fn user_agent() -> String {
    format!("nearpost-lib/{}", env!("CARGO_PKG_VERSION"))
}
