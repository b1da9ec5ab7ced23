use ctward_core::Certificate;
use x509_verify::VerifyingKey;

/// Trusted chains must terminate within this many certificates
const MAX_CHAIN_LENGTH: usize = 9;

/// Reduces a presented certificate chain to a verified path of trust
///
/// TLS servers present chains in all sorts of shapes: out of order, with duplicates,
/// or with cross-signed extras. The cleaner returns the path from the leaf to a trust
/// anchor, or an empty vector when no such path exists.
pub trait CertificateChainCleaner {
    fn clean(&self, chain: &[Certificate], host: &str) -> Vec<Certificate>;
}

/// [`CertificateChainCleaner`] against a fixed set of trust anchors
#[derive(Debug, Clone)]
pub struct RootedChainCleaner {
    roots: Vec<Certificate>,
}

impl RootedChainCleaner {
    pub fn new(roots: Vec<Certificate>) -> Self {
        Self { roots }
    }
}

impl CertificateChainCleaner for RootedChainCleaner {
    fn clean(&self, chain: &[Certificate], host: &str) -> Vec<Certificate> {
        let Some(leaf) = chain.first() else {
            return vec![];
        };

        let mut cleaned = vec![leaf.clone()];
        for _ in 0..MAX_CHAIN_LENGTH {
            let current = cleaned[cleaned.len() - 1].clone();

            if let Some(root) = self.roots.iter().find(|root| signed_by(&current, root)) {
                // a self-signed anchor already at the end of the path is not repeated
                if *root != current {
                    cleaned.push(root.clone());
                }
                return cleaned;
            }

            // follow the presented chain towards an anchor
            let issuer = chain
                .iter()
                .find(|candidate| **candidate != current && signed_by(&current, candidate));
            let Some(issuer) = issuer else {
                tracing::debug!(host, "presented chain does not reach a trust anchor");
                return vec![];
            };
            cleaned.push(issuer.clone());
        }

        tracing::debug!(host, "presented chain exceeds the maximum trusted length");
        vec![]
    }
}

fn signed_by(certificate: &Certificate, issuer: &Certificate) -> bool {
    VerifyingKey::try_from(issuer.x509())
        .is_ok_and(|key| key.verify(certificate.x509()).is_ok())
}
