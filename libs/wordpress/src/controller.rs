use crate::crd::Wordpress;
use crate::options::IngressOptions;
use crate::reconcile::reconcile_wordpress;

use wpop_operator::backoff_reconciler;
use wpop_operator::controller::{
    ControllerId, MANAGED_BY, MANAGED_BY_LABEL, State, check_api_queryable,
    context::{BackoffContext, Context as OperatorContext},
    error_policy,
};
use wpop_operator::metrics::ControllerMetrics;

use std::sync::Arc;

use futures::StreamExt;
use k8s_openapi::api::networking::v1::Ingress;
use kube::client::Client;
use kube::runtime::controller::{self, Controller};
use kube::runtime::reflector::ObjectRef;
use kube::runtime::watcher;
use tokio::time::Duration;
use tracing::info;

pub const CONTROLLER_ID: ControllerId = "wordpress";

#[derive(Clone)]
pub struct Context {
    pub operator_ctx: OperatorContext<Wordpress>,
    /// Ingress settings shared by every reconciliation
    pub options: Arc<IngressOptions>,
}

impl Context {
    pub fn new(operator_ctx: OperatorContext<Wordpress>, options: IngressOptions) -> Self {
        Context {
            operator_ctx,
            options: Arc::new(options),
        }
    }
}

impl BackoffContext<Wordpress> for Context {
    fn metrics(&self) -> &Arc<ControllerMetrics> {
        self.operator_ctx.metrics()
    }
    async fn get_backoff(&self, obj_ref: ObjectRef<Wordpress>) -> Duration {
        self.operator_ctx.get_backoff(obj_ref).await
    }

    async fn reset_backoff(&self, obj_ref: ObjectRef<Wordpress>) {
        self.operator_ctx.reset_backoff(obj_ref).await
    }
}

/// Initialize Wordpress controller
pub async fn run(state: State, client: Client, options: IngressOptions) {
    let wordpress = check_api_queryable::<Wordpress>(client.clone()).await;
    let ingress = check_api_queryable::<Ingress>(client.clone()).await;

    let ctx = Arc::new(Context::new(
        state.to_context(client, CONTROLLER_ID),
        options,
    ));

    info!(msg = format!("starting {CONTROLLER_ID} controller"));
    let managed_by_selector = format!("{MANAGED_BY_LABEL}={MANAGED_BY}");
    let wordpress_controller = Controller::new(wordpress, watcher::Config::default().any_semantic())
        .owns(
            ingress,
            watcher::Config::default()
                .labels(&managed_by_selector)
                .any_semantic(),
        )
        // debounce to filter out reconcile calls that happen quick succession (only taking the latest)
        .with_config(controller::Config::default().debounce(Duration::from_millis(500)))
        .shutdown_on_signal()
        .run(
            backoff_reconciler!(reconcile_wordpress),
            error_policy,
            ctx.clone(),
        )
        .filter_map(|x| async move { std::result::Result::ok(x) })
        .for_each(|_| futures::future::ready(()));

    ctx.operator_ctx.metrics.ready_set(1);
    wordpress_controller.await;
    ctx.operator_ctx.metrics.ready_set(0);
}
