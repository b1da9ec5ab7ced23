//! Core building blocks for certificate transparency verification
//!
//! This crate contains everything needed to decide whether a single SCT vouches for a
//! certificate: the RFC 6962 wire structures, reconstruction of the signed payload for
//! all three chain shapes, and the signature check against a trusted log server. The
//! log list itself is fetched and parsed by `ctward-loglist`, and the per-connection
//! policy decision lives in `ctward`.

pub mod asn1;
mod cert;
mod cert_chain;
mod log_server;
mod results;
pub mod signature;
pub(crate) mod utils;
pub mod v1;
mod verifier;
mod version;

pub use cert::{Certificate, CertificateError};
pub use cert_chain::CertificateChain;
pub use log_server::{LogKey, LogKeyError, LogServer, PreviousOperator};
pub use results::{InvalidSctResult, SctVerificationResult};
pub use verifier::LogSignatureVerifier;
pub use version::Version;
