use wpop_wordpress::crd::Wordpress;

use kube::CustomResourceExt;

fn main() {
    // safe unwrap: we know CRD is serializable
    print!("---\n{}\n", serde_yaml::to_string(&Wordpress::crd()).unwrap());
}
