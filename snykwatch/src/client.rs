use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::model::{Issue, Project, Target};
use crate::resolve::ResolutionMap;

pub const SNYK_API_BASE: &str = "https://api.snyk.io/rest";
pub const API_VERSION: &str = "2024-09-04";
pub const BASE_URL_ENV: &str = "SNYKWATCH_API_BASE_URL";

const JSON_API: &str = "application/vnd.api+json";

/// Read access to the three Snyk resources the cross-reference needs.
#[async_trait]
pub trait SnykApi: Send + Sync {
    /// Resolve configured display names to the targets that exist remotely.
    async fn fetch_targets(&self, org: &str, names: &[String]) -> Result<ResolutionMap, ApiError>;
    async fn fetch_project(&self, org: &str, project_id: &str) -> Result<Project, ApiError>;
    /// All high and critical issues in the organization.
    async fn fetch_issues(&self, org: &str) -> Result<Vec<Issue>, ApiError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    #[default]
    Token,
    Bearer,
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::Token => write!(f, "token"),
            AuthScheme::Bearer => write!(f, "Bearer"),
        }
    }
}

#[derive(Clone)]
pub struct SnykClient {
    client: reqwest::Client,
    token: String,
    scheme: AuthScheme,
    base_url: String,
}

impl SnykClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_timeout(token, None)
    }

    pub fn with_timeout(token: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder().user_agent("snykwatch");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| SNYK_API_BASE.to_string());

        Self {
            client: builder.build().expect("failed to build HTTP client"),
            token: token.into(),
            scheme: AuthScheme::default(),
            base_url: String::new(),
        }
        .with_base_url(base_url)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_auth_scheme(mut self, scheme: AuthScheme) -> Self {
        self.scheme = scheme;
        self
    }

    #[instrument(skip(self))]
    async fn api_get(&self, resource: &str, url: &str) -> Result<Value, ApiError> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("{} {}", self.scheme, self.token))
            .header(ACCEPT, JSON_API)
            .header(CONTENT_TYPE, JSON_API)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                resource: resource.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(%status, "response received");
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) if body.trim().is_empty() => "<empty body>".to_string(),
                Ok(body) => body,
                Err(e) => format!("<unreadable body: {e}>"),
            };
            return Err(ApiError::Status {
                resource: resource.to_string(),
                status,
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                resource: resource.to_string(),
                source,
            })?;

        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            resource: resource.to_string(),
            source,
        })
    }
}

#[async_trait]
impl SnykApi for SnykClient {
    #[instrument(skip(self, names), fields(configured = names.len()))]
    async fn fetch_targets(&self, org: &str, names: &[String]) -> Result<ResolutionMap, ApiError> {
        let url = format!("{}/orgs/{org}/targets?version={API_VERSION}", self.base_url);
        let json = self.api_get("targets", &url).await?;
        let targets = parse_targets(json).map_err(|source| ApiError::Decode {
            resource: "targets".to_string(),
            source,
        })?;

        debug!(remote = targets.len(), "targets listed");
        Ok(ResolutionMap::resolve(targets, names))
    }

    #[instrument(skip(self))]
    async fn fetch_project(&self, org: &str, project_id: &str) -> Result<Project, ApiError> {
        let resource = format!("project {project_id}");
        let url = format!(
            "{}/orgs/{org}/projects/{project_id}?version={API_VERSION}",
            self.base_url
        );
        let json = self.api_get(&resource, &url).await?;
        parse_project(json).map_err(|source| ApiError::Decode { resource, source })
    }

    #[instrument(skip(self))]
    async fn fetch_issues(&self, org: &str) -> Result<Vec<Issue>, ApiError> {
        let url = format!(
            "{}/orgs/{org}/issues?version={API_VERSION}&effective_severity_level=critical%2Chigh",
            self.base_url
        );
        let json = self.api_get("issues", &url).await?;
        parse_issues(json).map_err(|source| ApiError::Decode {
            resource: "issues".to_string(),
            source,
        })
    }
}

#[derive(Deserialize)]
struct Document<T> {
    data: T,
}

#[derive(Deserialize)]
struct Relationship {
    data: ResourceRef,
}

#[derive(Deserialize)]
struct ResourceRef {
    id: String,
}

#[derive(Deserialize)]
struct TargetResource {
    id: String,
    attributes: TargetAttributes,
}

#[derive(Deserialize)]
struct TargetAttributes {
    display_name: String,
}

#[derive(Deserialize)]
struct ProjectResource {
    id: String,
    attributes: ProjectAttributes,
    relationships: ProjectRelationships,
}

#[derive(Deserialize)]
struct ProjectAttributes {
    name: String,
}

#[derive(Deserialize)]
struct ProjectRelationships {
    target: Relationship,
}

#[derive(Deserialize)]
struct IssueResource {
    id: String,
    attributes: IssueAttributes,
    relationships: IssueRelationships,
}

#[derive(Deserialize)]
struct IssueAttributes {
    title: String,
}

#[derive(Deserialize)]
struct IssueRelationships {
    scan_item: Relationship,
}

fn parse_targets(json: Value) -> Result<Vec<Target>, serde_json::Error> {
    let doc: Document<Vec<TargetResource>> = serde_json::from_value(json)?;
    Ok(doc
        .data
        .into_iter()
        .map(|t| Target {
            id: t.id,
            display_name: t.attributes.display_name,
        })
        .collect())
}

fn parse_project(json: Value) -> Result<Project, serde_json::Error> {
    let doc: Document<ProjectResource> = serde_json::from_value(json)?;
    Ok(Project {
        id: doc.data.id,
        name: doc.data.attributes.name,
        target_id: doc.data.relationships.target.data.id,
    })
}

/// Entries of any other `type` are skipped before their shape is checked.
fn parse_issues(json: Value) -> Result<Vec<Issue>, serde_json::Error> {
    let doc: Document<Vec<Value>> = serde_json::from_value(json)?;
    doc.data
        .into_iter()
        .filter(|entry| entry.get("type").and_then(Value::as_str) == Some("issue"))
        .map(|entry| {
            let issue: IssueResource = serde_json::from_value(entry)?;
            Ok(Issue {
                id: issue.id,
                title: issue.attributes.title,
                scan_item_id: issue.relationships.scan_item.data.id,
            })
        })
        .collect()
}
