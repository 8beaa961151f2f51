pub mod ingress;

use crate::controller::Context;
use crate::crd::Wordpress;
use crate::reconcile::ingress::IngressExt;

use wpop_k8s_util::error::{Error, Result};
use wpop_k8s_util::syncer::{ObjectSyncer, SyncOutcome};
use wpop_operator::controller::{
    COMPONENT_LABEL, DEFAULT_RECONCILE_INTERVAL, INSTANCE_LABEL, MANAGED_BY, MANAGED_BY_LABEL,
    NAME_LABEL, PART_OF_LABEL,
};
use wpop_operator::telemetry;

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{Api, Resource};
use kube::runtime::controller::Action;
use kube::runtime::events::{Event, EventType};
use kube::ResourceExt;
use tracing::{Span, debug, field, info, instrument, warn};

pub const WORDPRESS_OPERATOR_NAME: &str = "wordpresses.wordpress.presslabs.org";
const WEB_COMPONENT: &str = "web";
const APP_NAME: &str = "wordpress";

/// Labels set by the operator on every object it manages.
pub static LABELS: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    BTreeMap::from([(MANAGED_BY_LABEL.to_string(), MANAGED_BY.to_string())])
});

impl Wordpress {
    #[inline]
    pub fn get_namespace(&self) -> String {
        // safe unwrap: Wordpress is namespaced scoped
        self.namespace().unwrap()
    }

    /// Labels identifying the web component of this site.
    pub fn web_labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (NAME_LABEL.to_string(), APP_NAME.to_string()),
            (PART_OF_LABEL.to_string(), APP_NAME.to_string()),
            (INSTANCE_LABEL.to_string(), self.name_any()),
            (COMPONENT_LABEL.to_string(), WEB_COMPONENT.to_string()),
        ])
    }

    #[inline]
    pub fn ingress_name(&self) -> String {
        self.name_any()
    }

    #[inline]
    pub fn service_name(&self) -> String {
        self.name_any()
    }

    /// First declared domain, or the in-cluster name of the site when none is declared.
    pub fn main_domain(&self) -> String {
        self.spec.domains.first().cloned().unwrap_or_else(|| {
            format!(
                "{name}.{namespace}.svc",
                name = self.name_any(),
                namespace = self.namespace().unwrap_or_default()
            )
        })
    }
}

#[instrument(skip(ctx, wordpress), fields(trace_id))]
pub async fn reconcile_wordpress(wordpress: Arc<Wordpress>, ctx: Arc<Context>) -> Result<Action> {
    let trace_id = telemetry::get_trace_id();
    Span::current().record("trace_id", field::display(&trace_id));
    let _timer = ctx
        .operator_ctx
        .metrics
        .reconcile_count_and_measure();
    info!(msg = "reconciling Wordpress");

    let outcome = wordpress.sync_ingress(&ctx).await;
    match &outcome {
        Ok(o) => {
            ctx.operator_ctx
                .metrics
                .object_sync_inc("Ingress", o.as_str());
            debug!(msg = format!("ingress sync {}", o.as_str()), ingress = %wordpress.ingress_name());
            if o.is_write() {
                wordpress
                    .publish_event(
                        &ctx,
                        EventType::Normal,
                        "IngressSyncSuccessful",
                        format!("Ingress {} {}", wordpress.ingress_name(), o.as_str()),
                    )
                    .await;
            }
        }
        Err(e) => {
            ctx.operator_ctx.metrics.object_sync_inc("Ingress", "failed");
            wordpress
                .publish_event(&ctx, EventType::Warning, "IngressSyncFailed", e.to_string())
                .await;
        }
    }
    outcome?;
    Ok(Action::requeue(DEFAULT_RECONCILE_INTERVAL))
}

impl Wordpress {
    async fn sync_ingress(&self, ctx: &Context) -> Result<SyncOutcome> {
        let namespace = self.get_namespace();
        let owner = self.controller_owner_ref(&()).ok_or_else(|| {
            Error::MissingData(format!(
                "failed to build owner reference for {namespace}/{}",
                self.name_any()
            ))
        })?;
        let api = Api::<Ingress>::namespaced(ctx.operator_ctx.client.clone(), &namespace);
        ObjectSyncer::new("Ingress", api, &namespace, &self.ingress_name())
            .with_owner(owner)
            .with_field_manager(WORDPRESS_OPERATOR_NAME)
            .sync(|ingress| self.mutate_ingress(ingress, &ctx.options))
            .await
    }

    async fn publish_event(&self, ctx: &Context, type_: EventType, reason: &str, note: String) {
        let _ignore_error = ctx
            .operator_ctx
            .recorder
            .publish(
                &Event {
                    type_,
                    reason: reason.to_string(),
                    note: Some(note),
                    action: "SyncIngress".to_string(),
                    secondary: None,
                },
                &self.object_ref(&()),
            )
            .await
            .map_err(|e| {
                warn!(msg = format!("failed to publish {reason} event"), %e);
            });
    }
}
