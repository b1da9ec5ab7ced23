//! Fetching, verifying and caching of the certificate transparency log list
//!
//! The list of trusted logs is distributed as `log_list.json` with a detached RSA
//! signature. This crate turns those bytes into [`LogServer`](ctward_core::LogServer)
//! entries: [`service`] and the raw sources fetch the bytes, [`verifier`] pins the
//! distributors key, [`parser`] applies the state rules, and [`cache`] layers memory,
//! disk, bundled resources and the network so a short outage never disables
//! verification.

mod base64;
pub mod cache;
pub mod datasource;
pub mod disk;
mod parser;
mod resources;
mod result;
pub mod service;
mod transformer;
mod v3;
mod verifier;
mod zip_source;

pub use datasource::{DataSource, InMemoryCache, ReuseInflight};
pub use disk::{DiskCache, FileSystemCache};
pub use resources::ResourcesSource;
pub use result::{
    LogListInvalid, LogListResult, LogListValid, RawLogListFailure, RawLogListResult,
};
pub use transformer::RawLogListTransformer;
pub use verifier::{LogListVerifier, LogServerSignatureFailure, LogServerSignatureResult};
pub use zip_source::LogListZipSource;

use cache::LogListCacheManager;
use service::HttpLogListService;

/// Wire up the default production data source
///
/// Network fetches go through the in-flight deduplication wrapper, so any number of
/// concurrent verifications result in a single download.
pub fn default_data_source(
    disk: Option<FileSystemCache>,
    resources: Option<ResourcesSource>,
) -> Result<ReuseInflight<LogListCacheManager<HttpLogListService, FileSystemCache>>, service::LogListServiceError>
{
    let manager = LogListCacheManager::new(
        HttpLogListService::new()?,
        disk,
        resources,
        LogListVerifier::default(),
    );
    Ok(ReuseInflight::new(manager))
}
