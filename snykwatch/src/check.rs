use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument};

use crate::client::SnykApi;
use crate::error::ApiError;
use crate::model::Issue;
use crate::report::{NO_MATCHING_TARGETS, Summary};

#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub max_concurrency: usize,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
        }
    }
}

/// Result of a completed check. Failures are reported separately as
/// [`ApiError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// None of the configured names matched a remote target.
    NoMatchingTargets,
    Checked(Summary),
}

impl CheckOutcome {
    pub fn message(&self) -> String {
        match self {
            CheckOutcome::NoMatchingTargets => NO_MATCHING_TARGETS.to_string(),
            CheckOutcome::Checked(summary) => summary.message(),
        }
    }

    pub fn has_issues(&self) -> bool {
        match self {
            CheckOutcome::NoMatchingTargets => false,
            CheckOutcome::Checked(summary) => !summary.found().is_empty(),
        }
    }
}

pub struct Checker {
    api: Arc<dyn SnykApi>,
    options: CheckOptions,
}

impl Checker {
    pub fn new(api: Arc<dyn SnykApi>, options: CheckOptions) -> Self {
        Self { api, options }
    }

    /// Report which configured targets have open high or critical issues.
    ///
    /// Returns [`CheckOutcome::NoMatchingTargets`] without fetching issues
    /// when no configured name resolves.
    #[instrument(skip(self, names), fields(configured = names.len()))]
    pub async fn check(&self, org: &str, names: &[String]) -> Result<CheckOutcome, ApiError> {
        let resolved = self.api.fetch_targets(org, names).await?;
        if resolved.is_empty() {
            info!("no configured targets matched a remote target");
            return Ok(CheckOutcome::NoMatchingTargets);
        }
        for (id, name) in resolved.iter() {
            debug!(target_id = id, display_name = name, "target resolved");
        }

        let issues = self.api.fetch_issues(org).await?;
        let project_targets = self.project_targets(org, &issues).await?;

        let mut summary = Summary::new(resolved.names());
        for issue in &issues {
            let Some(target_id) = project_targets.get(&issue.scan_item_id) else {
                continue;
            };
            if let Some(name) = resolved.get(target_id) {
                summary.record(name, &issue.title);
            }
        }

        info!(
            resolved = resolved.len(),
            issues = issues.len(),
            projects = project_targets.len(),
            with_issues = summary.found().len(),
            "check complete"
        );
        Ok(CheckOutcome::Checked(summary))
    }

    /// Project id to owning target id, fetching each distinct project once.
    async fn project_targets(
        &self,
        org: &str,
        issues: &[Issue],
    ) -> Result<HashMap<String, String>, ApiError> {
        let mut seen = HashSet::new();
        let project_ids: Vec<&str> = issues
            .iter()
            .map(|i| i.scan_item_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect();

        debug!(
            issues = issues.len(),
            projects = project_ids.len(),
            "fetching projects"
        );

        let permits = self.options.max_concurrency.clamp(1, Semaphore::MAX_PERMITS);
        let sem = Semaphore::new(permits);
        let results = join_all(project_ids.iter().map(|id| {
            let sem = &sem;
            async move {
                let _permit = sem.acquire().await.expect("semaphore closed");
                self.api.fetch_project(org, id).await
            }
        }))
        .await;

        let mut targets = HashMap::with_capacity(results.len());
        for (id, result) in project_ids.into_iter().zip(results) {
            let project = result?;
            targets.insert(id.to_string(), project.target_id);
        }
        Ok(targets)
    }
}

/// Run a check and collapse the outcome into a single message.
///
/// Failures yield the error's display text in place of the summary.
pub async fn check_high_critical_issues(
    api: Arc<dyn SnykApi>,
    org: &str,
    names: &[String],
) -> String {
    match Checker::new(api, CheckOptions::default())
        .check(org, names)
        .await
    {
        Ok(outcome) => outcome.message(),
        Err(e) => e.to_string(),
    }
}
