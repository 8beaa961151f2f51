use crate::controller::ControllerId;

use std::collections::HashMap;
use std::sync::Arc;

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use tokio::time::Instant;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ControllerLabels {
    pub controller: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct SyncLabels {
    pub controller: String,
    pub kind: String,
    pub outcome: String,
}

pub struct Metrics {
    pub registry: Arc<Registry>,
    pub controllers: HashMap<ControllerId, Arc<ControllerMetrics>>,
}

impl Metrics {
    pub fn new(mut registry: Registry, controller_names: &[ControllerId]) -> Self {
        let families = MetricFamilies::register(&mut registry);
        let controllers = controller_names
            .iter()
            .map(|&id| (id, Arc::new(ControllerMetrics::new(id, &families))))
            .collect::<HashMap<ControllerId, Arc<ControllerMetrics>>>();

        Self {
            registry: Arc::new(registry),
            controllers,
        }
    }
}

/// Metric families are shared by every controller, which only add its own label values.
#[derive(Clone)]
struct MetricFamilies {
    reconcile_operations: Family<ControllerLabels, Counter>,
    reconcile_failures: Family<ControllerLabels, Counter>,
    reconcile_duration: Family<ControllerLabels, Histogram>,
    object_syncs: Family<SyncLabels, Counter>,
    ready: Family<ControllerLabels, Gauge>,
}

impl MetricFamilies {
    fn register(registry: &mut Registry) -> Self {
        let families = Self {
            reconcile_operations: Family::default(),
            reconcile_failures: Family::default(),
            reconcile_duration: Family::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.01, 2.0, 10))
            }),
            object_syncs: Family::default(),
            ready: Family::default(),
        };

        registry.register(
            "reconcile_operations",
            "Total number of reconcile operations",
            families.reconcile_operations.clone(),
        );
        registry.register(
            "reconcile_failures",
            "Number of errors that occurred during reconcile operations",
            families.reconcile_failures.clone(),
        );
        registry.register(
            "reconcile_duration_seconds",
            "Histogram of reconcile operations",
            families.reconcile_duration.clone(),
        );
        registry.register(
            "object_syncs",
            "Number of child object syncs by kind and outcome",
            families.object_syncs.clone(),
        );
        registry.register(
            "ready",
            "1 when the controller is ready to reconcile resources, 0 otherwise",
            families.ready.clone(),
        );
        families
    }
}

pub struct ControllerMetrics {
    controller: String,
    families: MetricFamilies,
}

impl ControllerMetrics {
    fn new(controller: &str, families: &MetricFamilies) -> Self {
        Self {
            controller: controller.to_string(),
            families: families.clone(),
        }
    }

    #[inline]
    fn labels(&self) -> ControllerLabels {
        ControllerLabels {
            controller: self.controller.clone(),
        }
    }

    pub fn reconcile_failure_inc(&self) {
        self.families
            .reconcile_failures
            .get_or_create(&self.labels())
            .inc();
    }

    pub fn reconcile_count_and_measure(&self) -> ReconcileMeasurer {
        self.families
            .reconcile_operations
            .get_or_create(&self.labels())
            .inc();
        ReconcileMeasurer {
            start: Instant::now(),
            labels: self.labels(),
            metric: self.families.reconcile_duration.clone(),
        }
    }

    pub fn object_sync_inc(&self, kind: &str, outcome: &str) {
        self.families
            .object_syncs
            .get_or_create(&SyncLabels {
                controller: self.controller.clone(),
                kind: kind.to_string(),
                outcome: outcome.to_string(),
            })
            .inc();
    }

    pub fn ready_set(&self, status: i64) {
        self.families.ready.get_or_create(&self.labels()).set(status);
    }
}

/// Smart function duration measurer
///
/// Relies on Drop to calculate duration and register the observation in the histogram
pub struct ReconcileMeasurer {
    start: Instant,
    labels: ControllerLabels,
    metric: Family<ControllerLabels, Histogram>,
}

impl Drop for ReconcileMeasurer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.metric.get_or_create(&self.labels).observe(duration);
    }
}
