//! Release persistence.
//!
//! The store is a collaborator boundary: it validates and persists a plan,
//! returning either the created release or the aggregated validation
//! messages. [`InMemoryReleaseStore`] is the reference implementation used
//! by the test suites.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ReleaseError, ReleaseResult};
use crate::types::{Release, ReleaseDoc, ReleasePlan};

#[async_trait]
pub trait ReleaseStore: Send + Sync {
    /// Validate and persist a plan. Validation failures surface as
    /// [`ReleaseError::CreationFailed`] with every message aggregated.
    async fn create(&self, plan: &ReleasePlan) -> ReleaseResult<Release>;
}

#[derive(Debug, Default)]
struct StoreState {
    releases: Vec<Release>,
    next_id: i64,
    reject_with: Option<Vec<String>>,
}

/// In-memory [`ReleaseStore`].
#[derive(Debug, Default)]
pub struct InMemoryReleaseStore {
    state: Mutex<StoreState>,
}

impl InMemoryReleaseStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Force the next create to fail with these validation messages.
    pub fn reject_with(&self, messages: Vec<String>) {
        self.locked().reject_with = Some(messages);
    }

    /// Releases persisted so far.
    pub fn releases(&self) -> Vec<Release> {
        self.locked().releases.clone()
    }
}

fn validate(plan: &ReleasePlan) -> Vec<String> {
    let mut messages = Vec::new();
    if plan.docker_repo_digest.is_empty() {
        messages.push("Docker repo digest can't be blank".to_string());
    }
    if plan.groups.is_empty() {
        messages.push("Deploy groups can't be blank".to_string());
    }
    if plan.roles.is_empty() {
        messages.push("Roles can't be blank".to_string());
    }
    for role in &plan.roles {
        if role.replicas == 0 {
            messages.push(format!("Role {} replicas must be greater than 0", role.name));
        }
    }
    messages
}

#[async_trait]
impl ReleaseStore for InMemoryReleaseStore {
    async fn create(&self, plan: &ReleasePlan) -> ReleaseResult<Release> {
        let mut state = self.locked();

        if let Some(messages) = state.reject_with.take() {
            return Err(ReleaseError::CreationFailed { messages });
        }
        let messages = validate(plan);
        if !messages.is_empty() {
            return Err(ReleaseError::CreationFailed { messages });
        }

        let id = state.next_id;
        state.next_id += 1;
        let docs = plan
            .groups
            .iter()
            .flat_map(|group| {
                plan.roles.iter().map(move |role| ReleaseDoc {
                    release_id: id,
                    group: group.clone(),
                    role: role.clone(),
                })
            })
            .collect();
        let release = Release {
            id,
            build_id: plan.build_id,
            docker_repo_digest: plan.docker_repo_digest.clone(),
            user_id: plan.user_id,
            project_id: plan.project_id,
            docs,
        };
        debug!(release = id, docs = release.docs.len(), "release persisted");
        state.releases.push(release.clone());
        Ok(release)
    }
}
