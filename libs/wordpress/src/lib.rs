pub mod controller;
#[rustfmt::skip]
pub mod crd;
pub mod options;
pub mod reconcile;

pub use options::IngressOptions;

#[cfg(test)]
mod test {
    use crate::controller::{CONTROLLER_ID, Context};
    use crate::crd::{Wordpress, WordpressSpec};
    use crate::options::IngressOptions;
    use crate::reconcile::WORDPRESS_OPERATOR_NAME;

    use wpop_operator::controller::State;

    use std::sync::Arc;

    use http::{Request, Response};
    use k8s_openapi::api::networking::v1::Ingress;
    use kube::{Client, Resource, ResourceExt, client::Body};
    use prometheus_client::registry::Registry;
    use serde_json::json;

    const INGRESS_PATH: &str = "/apis/networking.k8s.io/v1/namespaces/default/ingresses";

    impl Wordpress {
        /// A test wordpress serving the given domains
        pub fn test(domains: &[&str]) -> Self {
            let mut wp = Wordpress::new(
                "test",
                WordpressSpec {
                    domains: domains.iter().map(|d| d.to_string()).collect(),
                    ..WordpressSpec::default()
                },
            );
            wp.meta_mut().namespace = Some("default".into());
            wp.meta_mut().uid = Some("2f1c6b1e-0d6a-4b52-9c1a-5f7f1d9d2a10".into());
            wp
        }

        /// Modify wordpress to terminate TLS with the given secret
        pub fn with_tls_secret(mut self, secret: &str) -> Self {
            self.spec.tls_secret_ref = Some(secret.to_string());
            self
        }
    }

    // We wrap tower_test::mock::Handle
    type ApiServerHandle = tower_test::mock::Handle<Request<Body>, Response<Body>>;
    pub struct ApiServerVerifier(ApiServerHandle);

    /// Scenarios we test for in ApiServerVerifier
    pub enum Scenario {
        /// missing ingress is created from the wordpress domains
        IngressCreate(Wordpress),
        /// missing ingress is looked up but never written
        IngressNotFoundSkip(Wordpress),
        /// ingress access is denied
        IngressForbidden(Wordpress),
    }

    pub async fn timeout_after_1s(handle: tokio::task::JoinHandle<()>) {
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("timeout on mock apiserver")
            .expect("scenario succeeded")
    }

    fn status_response(code: u16, reason: &str) -> Response<Body> {
        let status = json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": format!("ingresses.networking.k8s.io \"test\": {reason}"),
            "reason": reason,
            "code": code,
        });
        Response::builder()
            .status(code)
            .body(Body::from(serde_json::to_vec(&status).unwrap()))
            .unwrap()
    }

    impl ApiServerVerifier {
        /// Tests only get to run specific scenarios that has matching handlers
        ///
        /// NB: If the controller is making more calls than we are handling in the scenario,
        /// you then typically see a `KubeError(Service(Closed(())))` from the reconciler.
        /// Event publishing errors are ignored, so events are not handled here.
        ///
        /// You should await the `JoinHandle` (with a timeout) from this function to ensure that the
        /// scenario runs to completion (i.e. all expected calls were responded to),
        /// using the timeout to catch missing api calls to Kubernetes.
        pub fn run(self, scenario: Scenario) -> tokio::task::JoinHandle<()> {
            tokio::spawn(async move {
                // moving self => one scenario per test
                match scenario {
                    Scenario::IngressCreate(wp) => {
                        self.handle_ingress_get(status_response(404, "NotFound"))
                            .await
                            .unwrap()
                            .handle_ingress_create(wp)
                            .await
                    }
                    Scenario::IngressNotFoundSkip(_) => {
                        self.handle_ingress_get(status_response(404, "NotFound"))
                            .await
                    }
                    Scenario::IngressForbidden(_) => {
                        self.handle_ingress_get(status_response(403, "Forbidden"))
                            .await
                    }
                }
                .expect("scenario completed without errors");
            })
        }

        async fn handle_ingress_get(
            mut self,
            response: Response<Body>,
        ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
            let (request, send) = self.0.next_request().await.expect("service not called");
            assert_eq!(request.method(), http::Method::GET);
            assert_eq!(request.uri().path(), format!("{INGRESS_PATH}/test"));
            send.send_response(response);
            Ok(self)
        }

        async fn handle_ingress_create(
            mut self,
            wp: Wordpress,
        ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
            let (request, send) = self.0.next_request().await.expect("service not called");
            assert_eq!(request.method(), http::Method::POST);
            assert_eq!(request.uri().path(), INGRESS_PATH);
            assert!(
                request
                    .uri()
                    .query()
                    .unwrap_or_default()
                    .contains(&format!("fieldManager={WORDPRESS_OPERATOR_NAME}"))
            );

            let req_body = request.into_body().collect_bytes().await.unwrap();
            let ingress: Ingress = serde_json::from_slice(&req_body)?;
            assert_eq!(ingress.name_any(), wp.name_any());
            assert_eq!(
                ingress.owner_references(),
                &[wp.controller_owner_ref(&()).unwrap()]
            );
            assert_eq!(
                ingress.labels().get("app.kubernetes.io/managed-by").unwrap(),
                "wordpress-operator"
            );
            let rules = ingress.spec.clone().unwrap().rules.unwrap();
            let hosts = rules
                .iter()
                .map(|r| r.host.clone().unwrap())
                .collect::<Vec<_>>();
            assert_eq!(hosts, wp.spec.domains);

            let response = serde_json::to_vec(&ingress)?;
            send.send_response(Response::builder().body(Body::from(response)).unwrap());
            Ok(self)
        }
    }

    pub fn get_test_context(options: IngressOptions) -> (Arc<Context>, ApiServerVerifier, State) {
        let (mock_service, handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();
        let mock_client = Client::new(mock_service, "default");
        let state = State::new(Registry::with_prefix("wpop"), &[CONTROLLER_ID]);
        let ctx = Context::new(state.to_context(mock_client, CONTROLLER_ID), options);
        (Arc::new(ctx), ApiServerVerifier(handle), state)
    }
}
