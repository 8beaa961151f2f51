use std::any::type_name;

use kube::api::ObjectMeta;

#[inline]
pub fn short_type_name<K>() -> Option<&'static str> {
    let type_name = type_name::<K>();
    type_name.split("::").last()
}

/// An object without creation timestamp has never been persisted by the API server.
#[inline]
pub fn is_created(metadata: &ObjectMeta) -> bool {
    metadata.creation_timestamp.is_some()
}

/// Treat `None` and empty strings the same way: both mean the value is not set.
#[inline]
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
