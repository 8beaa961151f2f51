use crate::crd::Wordpress;
use crate::options::IngressOptions;
use crate::reconcile::LABELS;

use wpop_k8s_util::labels::merge_optional_layers;
use wpop_k8s_util::syncer::Mutation;
use wpop_k8s_util::types::{is_created, non_empty};

use std::collections::BTreeMap;

use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, IngressTLS, ServiceBackendPort,
};
use kube::ResourceExt;
use tracing::info;

pub const INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";
pub const HTTP_PORT_NAME: &str = "http";
const ROOT_PATH: &str = "/";
const PATH_TYPE_PREFIX: &str = "Prefix";

/// One rule per domain, in order, routing `/` to the named port of the service.
pub fn compose_rules(domains: &[String], service_name: &str, port_name: &str) -> Vec<IngressRule> {
    domains
        .iter()
        .map(|host| IngressRule {
            host: Some(host.clone()),
            http: Some(HTTPIngressRuleValue {
                paths: vec![HTTPIngressPath {
                    backend: IngressBackend {
                        service: Some(IngressServiceBackend {
                            name: service_name.to_string(),
                            port: Some(ServiceBackendPort {
                                name: Some(port_name.to_string()),
                                ..ServiceBackendPort::default()
                            }),
                        }),
                        ..IngressBackend::default()
                    },
                    path: Some(ROOT_PATH.to_string()),
                    path_type: PATH_TYPE_PREFIX.to_string(),
                }],
            }),
        })
        .collect()
}

pub trait IngressExt {
    fn compose_ingress_rules(&self) -> Vec<IngressRule>;
    fn mutate_ingress(&self, ingress: &mut Ingress, options: &IngressOptions) -> Mutation;
}

impl IngressExt for Wordpress {
    /// Rules for every declared domain, or a single rule for the main domain when none is.
    fn compose_ingress_rules(&self) -> Vec<IngressRule> {
        let service_name = self.service_name();
        if self.spec.domains.is_empty() {
            compose_rules(&[self.main_domain()], &service_name, HTTP_PORT_NAME)
        } else {
            compose_rules(&self.spec.domains, &service_name, HTTP_PORT_NAME)
        }
    }

    /// Bring `ingress` to its desired state in place.
    ///
    /// Returns [`Mutation::Skip`] for an Ingress that was never created while the site declares
    /// no domain. Metadata may already be touched at that point, but the object must not be
    /// persisted.
    fn mutate_ingress(&self, ingress: &mut Ingress, options: &IngressOptions) -> Mutation {
        let web_labels = self.web_labels();
        ingress.metadata.labels = Some(merge_optional_layers([
            ingress.metadata.labels.as_ref(),
            Some(&web_labels),
            Some(&*LABELS),
        ]));

        let ingress_class = options.ingress_class();
        if ingress_class.is_some() || !self.spec.ingress_annotations.is_empty() {
            let annotations = ingress
                .metadata
                .annotations
                .get_or_insert_with(BTreeMap::new);
            if let Some(class) = ingress_class {
                annotations.insert(INGRESS_CLASS_ANNOTATION.to_string(), class.to_string());
            }
            annotations.extend(self.spec.ingress_annotations.clone());
        }

        if self.spec.domains.is_empty() && !is_created(&ingress.metadata) {
            info!(
                msg = "no domains declared, skipping ingress creation",
                wordpress = %self.name_any(),
                ingress = %self.ingress_name()
            );
            return Mutation::Skip;
        }

        let spec = ingress.spec.get_or_insert_with(IngressSpec::default);
        spec.rules = Some(self.compose_ingress_rules());
        spec.tls = non_empty(self.spec.tls_secret_ref.as_deref()).map(|secret_name| {
            vec![IngressTLS {
                secret_name: Some(secret_name.to_string()),
                hosts: (!self.spec.domains.is_empty()).then(|| self.spec.domains.clone()),
            }]
        });

        Mutation::Apply
    }
}
