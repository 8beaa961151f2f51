use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}: {1:?}")]
    // Boxing this error because the size can be large
    KubeError(String, #[source] Box<kube::Error>),

    #[error("{0}")]
    MissingData(String),
}

impl Error {
    /// The API server rejected a write because the object changed since it was read.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::KubeError(_, e) => matches!(e.as_ref(), kube::Error::Api(ae) if ae.code == 409),
            _ => false,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
