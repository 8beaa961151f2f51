use std::collections::BTreeMap;

use kube::CustomResource;
#[cfg(feature = "schemars")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Specification of the desired Wordpress site. Only the fields involved in exposing the site
/// through an Ingress are handled by this operator.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[kube(
    group = "wordpress.presslabs.org",
    version = "v1alpha1",
    kind = "Wordpress",
    plural = "wordpresses",
    singular = "wordpress",
    shortname = "wp",
    namespaced,
    doc = r#"The Wordpress custom resource definition (CRD) defines a Wordpress site running in
    a Kubernetes cluster. The operator exposes the site through an Ingress routing every domain
    to the site's Service."#,
    printcolumn = r#"{"name":"Domains","type":"string","jsonPath":".spec.domains"}"#,
    printcolumn = r#"{"name":"TLS","type":"string","jsonPath":".spec.tlsSecretRef"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#,
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct WordpressSpec {
    /// Domains the site answers to. The first one is the main domain. When empty, the Ingress is
    /// not created, although an existing one keeps routing the in-cluster main domain.
    #[serde(default)]
    pub domains: Vec<String>,
    /// Name of a `kubernetes.io/tls` Secret in the same namespace holding the certificate for
    /// every domain. When unset or empty, the Ingress serves plain HTTP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_secret_ref: Option<String>,
    /// Extra annotations for the Ingress. They take precedence over the ones set by the operator.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ingress_annotations: BTreeMap<String, String>,
}
