use wpop_k8s_util::types::non_empty;

/// Process-wide settings for the Ingresses managed by the operator. Loaded once at start-up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngressOptions {
    ingress_class: Option<String>,
}

impl IngressOptions {
    pub fn new(ingress_class: Option<&str>) -> Self {
        Self {
            ingress_class: non_empty(ingress_class).map(str::to_string),
        }
    }

    /// Value for the `kubernetes.io/ingress.class` annotation, if any.
    #[inline]
    pub fn ingress_class(&self) -> Option<&str> {
        self.ingress_class.as_deref()
    }
}
