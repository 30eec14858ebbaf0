//! Asset download.

/// Error returned by an [`AssetFetcher`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct FetchError(pub String);

/// Source of asset bytes
pub trait AssetFetcher {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError>;
}

#[cfg(feature = "http-assets")]
pub use http::HttpFetcher;

#[cfg(feature = "http-assets")]
mod http {
    use super::{AssetFetcher, FetchError};
    use std::io::Read;
    use std::time::Duration;

    /// Fetches assets over HTTP(S)
    pub struct HttpFetcher {
        agent: ureq::Agent,
    }

    impl HttpFetcher {
        /// Requests that take longer than `timeout` fail
        pub fn new(timeout: Duration) -> Self {
            let agent = ureq::AgentBuilder::new().timeout(timeout).build();
            Self { agent }
        }
    }

    impl AssetFetcher for HttpFetcher {
        fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
            let response = match self.agent.get(uri).call() {
                Ok(response) => response,
                Err(ureq::Error::Status(code, _)) => {
                    return Err(FetchError(format!("server returned {}", code)));
                }
                Err(e) => return Err(FetchError(e.to_string())),
            };

            let mut bytes = Vec::new();
            response
                .into_reader()
                .read_to_end(&mut bytes)
                .map_err(|e| FetchError(e.to_string()))?;
            Ok(bytes)
        }
    }
}
