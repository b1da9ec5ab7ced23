//! Certificate transparency verification for TLS certificate chains
//!
//! A [`CtVerifier`] decides whether a certificate chain carries enough valid signed
//! certificate timestamps (SCTs) from trusted, distinct log operators. The heavy
//! lifting is split over the workspace: `ctward-core` checks a single SCT against a
//! log server, `ctward-loglist` fetches and caches the list of trusted logs, and this
//! crate ties them together with host scoping, chain cleaning and the CT policy.
//!
//! ```no_run
//! use ctward::{CtVerifier, DefaultPolicy, RootedChainCleaner};
//! use ctward_core::Certificate;
//! use ctward_loglist::default_data_source;
//!
//! # async fn verify(roots: Vec<Certificate>, chain: Vec<Certificate>) {
//! let verifier = CtVerifier::new(
//!     default_data_source(None, None).unwrap(),
//!     RootedChainCleaner::new(roots),
//!     DefaultPolicy,
//! )
//! .exclude_host("*.internal.example.com");
//!
//! let result = verifier.verify("example.com", &chain).await;
//! println!("{result}");
//! # }
//! ```

pub mod chain_cleaner;
pub mod host;
pub mod policy;
pub mod results;

pub use chain_cleaner::{CertificateChainCleaner, RootedChainCleaner};
pub use host::Host;
pub use policy::{CtPolicy, DefaultPolicy};
pub use results::{Failure, Success, VerificationResult};

use base64::{Engine, prelude::BASE64_STANDARD};
use ctward_core::{
    Certificate, CertificateChain, InvalidSctResult, LogSignatureVerifier, SctVerificationResult,
};
use ctward_loglist::{DataSource, LogListResult};
use std::collections::BTreeMap;

/// Verifies certificate transparency for TLS certificate chains
///
/// Hosts can be scoped with include and exclude patterns: exclusion wins unless an
/// include pattern matches the host explicitly, and with no includes configured every
/// host is covered.
pub struct CtVerifier<D, C, P> {
    include_hosts: Vec<Host>,
    exclude_hosts: Vec<Host>,
    log_list: D,
    cleaner: C,
    policy: P,
}

impl<D, C, P> CtVerifier<D, C, P>
where
    D: DataSource<Value = LogListResult>,
    C: CertificateChainCleaner,
    P: CtPolicy,
{
    pub fn new(log_list: D, cleaner: C, policy: P) -> Self {
        Self {
            include_hosts: vec![],
            exclude_hosts: vec![],
            log_list,
            cleaner,
            policy,
        }
    }

    pub fn include_host(mut self, pattern: impl AsRef<str>) -> Self {
        self.include_hosts.push(Host::new(pattern));
        self
    }

    pub fn exclude_host(mut self, pattern: impl AsRef<str>) -> Self {
        self.exclude_hosts.push(Host::new(pattern));
        self
    }

    fn enabled(&self, host: &str) -> bool {
        if self.include_hosts.iter().any(|include| include.matches(host)) {
            return true;
        }
        if self.exclude_hosts.iter().any(|exclude| exclude.matches(host)) {
            return false;
        }
        self.include_hosts.is_empty()
    }

    /// Verify the chain presented for `host`, leaf first
    pub async fn verify(&self, host: &str, chain: &[Certificate]) -> VerificationResult {
        if !self.enabled(host) {
            return VerificationResult::Success(Success::DisabledForHost {
                host: host.to_owned(),
            });
        }

        if chain.is_empty() {
            return VerificationResult::Failure(Failure::NoCertificates);
        }

        let cleaned = self.cleaner.clean(chain, host);
        if cleaned.is_empty() {
            return VerificationResult::Failure(Failure::NoCertificates);
        }

        let log_list = self.log_list.get().await;
        let servers = match &log_list {
            LogListResult::Valid(valid) => valid.servers(),
            LogListResult::DisableChecks { .. } => {
                return VerificationResult::Success(Success::DisabledStaleLogList);
            }
            LogListResult::Invalid(_) => {
                return VerificationResult::Failure(Failure::LogServersFailed(log_list));
            }
        };

        let verifiers: BTreeMap<String, LogSignatureVerifier> = servers
            .iter()
            .map(|server| {
                (
                    BASE64_STANDARD.encode(server.id()),
                    LogSignatureVerifier::new(server.clone()),
                )
            })
            .collect();

        let leaf = &cleaned[0];
        if !leaf.has_embedded_scts() {
            return VerificationResult::Failure(Failure::NoScts);
        }

        let scts = match leaf.extract_scts() {
            Ok(scts) => scts,
            Err(err) => {
                return VerificationResult::Failure(Failure::UnknownIoException(err.to_string()));
            }
        };

        let leaf = leaf.clone();
        let chain = match CertificateChain::new(cleaned) {
            Ok(chain) => chain,
            Err(err) => {
                return VerificationResult::Failure(Failure::UnknownIoException(err.to_string()));
            }
        };

        let mut results = BTreeMap::new();
        for sct in scts {
            let log_id = BASE64_STANDARD.encode(sct.log_id());
            let result = match verifiers.get(&log_id) {
                Some(verifier) => verifier.verify(&sct, &chain),
                None => {
                    SctVerificationResult::Invalid(InvalidSctResult::NoTrustedLogServerFound)
                }
            };
            results.insert(log_id, result);
        }

        self.policy.verification_result(&leaf, results)
    }
}
