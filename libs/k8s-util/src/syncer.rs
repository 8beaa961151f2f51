use crate::error::{Error, Result};

use std::fmt::Debug;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::{Api, PostParams};
use kube::Resource;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

const CONFLICT_RETRY_MIN_DELAY: Duration = Duration::from_millis(100);
const CONFLICT_RETRY_MAX_DELAY: Duration = Duration::from_secs(2);
const CONFLICT_RETRY_MAX_TIMES: usize = 5;

/// Decision taken by a mutate function over the desired state of an object.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// The object holds its desired state and must be persisted.
    Apply,
    /// Leave the object as it is in the cluster. If it does not exist, it is not created.
    Skip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Updated,
    Unchanged,
    Skipped,
}

impl SyncOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::Created => "created",
            SyncOutcome::Updated => "updated",
            SyncOutcome::Unchanged => "unchanged",
            SyncOutcome::Skipped => "skipped",
        }
    }

    /// True when the sync issued a write to the API server.
    pub fn is_write(&self) -> bool {
        matches!(self, SyncOutcome::Created | SyncOutcome::Updated)
    }
}

/// Get-or-create/update engine for a single named object.
///
/// The live object (or an empty one carrying only name and namespace when it does not exist yet)
/// is handed to a mutate function. The result is created, replaced, or left alone depending on
/// whether the object exists, changed, or the mutate function asked to skip it. Write conflicts
/// are retried from a fresh read.
pub struct ObjectSyncer<K>
where
    K: Resource,
{
    kind: &'static str,
    api: Api<K>,
    namespace: String,
    name: String,
    owner: Option<OwnerReference>,
    field_manager: Option<String>,
}

impl<K> ObjectSyncer<K>
where
    K: Resource<DynamicType = ()> + Clone + Default + PartialEq + Serialize + DeserializeOwned + Debug,
{
    pub fn new(kind: &'static str, api: Api<K>, namespace: &str, name: &str) -> Self {
        Self {
            kind,
            api,
            namespace: namespace.to_string(),
            name: name.to_string(),
            owner: None,
            field_manager: None,
        }
    }

    /// Controller owner reference set on the object on every sync.
    pub fn with_owner(mut self, owner: OwnerReference) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_field_manager(mut self, field_manager: &str) -> Self {
        self.field_manager = Some(field_manager.to_string());
        self
    }

    pub async fn sync<F>(&self, mutate: F) -> Result<SyncOutcome>
    where
        F: Fn(&mut K) -> Mutation,
    {
        let mutate = &mutate;
        (|| self.sync_once(mutate))
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(CONFLICT_RETRY_MIN_DELAY)
                    .with_max_delay(CONFLICT_RETRY_MAX_DELAY)
                    .with_max_times(CONFLICT_RETRY_MAX_TIMES),
            )
            .when(Error::is_conflict)
            .notify(|e, duration| {
                debug!(
                    msg = format!("conflict syncing {}, retrying in {duration:?}", self.kind),
                    namespace = %self.namespace,
                    name = %self.name,
                    %e
                );
            })
            .await
    }

    async fn sync_once<F>(&self, mutate: &F) -> Result<SyncOutcome>
    where
        F: Fn(&mut K) -> Mutation,
    {
        let existing = self.api.get_opt(&self.name).await.map_err(|e| {
            Error::KubeError(
                format!("failed to get {} {}/{}", self.kind, self.namespace, self.name),
                Box::new(e),
            )
        })?;

        let mut obj = existing.clone().unwrap_or_else(|| self.empty_object());
        self.set_owner(&mut obj);

        if mutate(&mut obj) == Mutation::Skip {
            trace!(
                msg = format!("skip syncing {}", self.kind),
                namespace = %self.namespace,
                name = %self.name
            );
            return Ok(SyncOutcome::Skipped);
        }

        let pp = PostParams {
            field_manager: self.field_manager.clone(),
            ..PostParams::default()
        };
        match existing {
            None => {
                self.api.create(&pp, &obj).await.map_err(|e| {
                    Error::KubeError(
                        format!("failed to create {} {}/{}", self.kind, self.namespace, self.name),
                        Box::new(e),
                    )
                })?;
                debug!(msg = format!("created {}", self.kind), namespace = %self.namespace, name = %self.name);
                Ok(SyncOutcome::Created)
            }
            Some(live) if live == obj => Ok(SyncOutcome::Unchanged),
            Some(_) => {
                self.api.replace(&self.name, &pp, &obj).await.map_err(|e| {
                    Error::KubeError(
                        format!("failed to update {} {}/{}", self.kind, self.namespace, self.name),
                        Box::new(e),
                    )
                })?;
                debug!(msg = format!("updated {}", self.kind), namespace = %self.namespace, name = %self.name);
                Ok(SyncOutcome::Updated)
            }
        }
    }

    fn empty_object(&self) -> K {
        let mut obj = K::default();
        obj.meta_mut().name = Some(self.name.clone());
        obj.meta_mut().namespace = Some(self.namespace.clone());
        obj
    }

    fn set_owner(&self, obj: &mut K) {
        if let Some(owner) = &self.owner {
            let owner_references = obj.meta_mut().owner_references.get_or_insert_with(Vec::new);
            match owner_references.iter_mut().find(|o| o.uid == owner.uid) {
                Some(existing) => *existing = owner.clone(),
                None => owner_references.push(owner.clone()),
            }
        }
    }
}
