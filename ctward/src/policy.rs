//! The Chrome certificate transparency policy
//!
//! How many SCTs a certificate needs depends on when it was logged and how long it
//! lives. Certificates logged before the 2022 policy update are graded on a month
//! ladder, everything after on a single 180 day threshold. Either way the SCTs must
//! come from at least two distinct log operators.

use crate::results::{Failure, Success, VerificationResult};
use ctward_core::{Certificate, SctVerificationResult};
use itertools::Itertools;
use std::collections::BTreeMap;

/// 2022-04-15, when the updated policy took effect
const POLICY_UPDATE_TIMESTAMP_MS: u64 = 1_649_980_800_000;

/// The historic policy counted certificate lifetime in fixed 30 day months
const MONTH_MS: i64 = 2_592_000_000;

const DAY_MS: i64 = 86_400_000;

/// Decides whether a set of per-SCT results satisfies a CT policy
pub trait CtPolicy {
    fn verification_result(
        &self,
        leaf: &Certificate,
        scts: BTreeMap<String, SctVerificationResult>,
    ) -> VerificationResult;
}

/// The Chrome CT policy, both editions
///
/// The edition is picked by the earliest valid SCT, the moment the certificate was
/// first logged. Before the 2022-04-15 update the required count follows the month
/// ladder; after it (or with no valid SCT at all) a certificate needs 2 SCTs, 3 when
/// valid for more than 180 whole days. Both editions additionally require SCTs from
/// at least 2 distinct log operators, where the operator of each SCT is the one that
/// ran the log at the SCT's timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl CtPolicy for DefaultPolicy {
    fn verification_result(
        &self,
        leaf: &Certificate,
        scts: BTreeMap<String, SctVerificationResult>,
    ) -> VerificationResult {
        let logged_at = scts
            .values()
            .filter_map(|result| match result {
                SctVerificationResult::Valid { sct, .. } => Some(sct.timestamp()),
                SctVerificationResult::Invalid(_) => None,
            })
            .min();
        let logged_before_update =
            logged_at.is_some_and(|timestamp| timestamp < POLICY_UPDATE_TIMESTAMP_MS);

        let lifetime = (leaf.not_after() - leaf.not_before()).num_milliseconds();
        let minimum = if logged_before_update {
            legacy_minimum_scts(lifetime)
        } else if lifetime / DAY_MS > 180 {
            3
        } else {
            2
        };

        let trusted = scts.values().filter(|sct| sct.is_valid()).count();
        if trusted < minimum {
            return VerificationResult::Failure(Failure::TooFewSctsTrusted {
                scts,
                min_sct_count: minimum,
            });
        }

        let operators = scts
            .values()
            .filter_map(|sct| match sct {
                SctVerificationResult::Valid { operator, .. } => Some(operator.as_str()),
                SctVerificationResult::Invalid(_) => None,
            })
            .unique()
            .count();

        if operators < 2 {
            return VerificationResult::Failure(Failure::TooFewDistinctOperators {
                scts,
                required: 2,
            });
        }

        VerificationResult::Success(Success::Trusted { scts })
    }
}

/// The pre-2022 month ladder
///
/// The original policy measured lifetime in 30 day months and bumped the requirement
/// when a threshold was crossed, counting a started month at the 27 and 39 boundaries.
fn legacy_minimum_scts(lifetime: i64) -> usize {
    let months = lifetime / MONTH_MS;
    let partial = lifetime % MONTH_MS != 0;

    if months > 39 || (months == 39 && partial) {
        5
    } else if months > 27 || (months == 27 && partial) {
        4
    } else if months >= 15 {
        3
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctward_core::{
        InvalidSctResult, Version,
        signature::{DigitallySigned, HashAlgorithm, SignatureAlgorithm},
        v1::SignedCertificateTimestamp,
    };

    const CERT_100_DAYS: &str = include_str!("../../testdata/cert-100days.pem");
    const CERT_180_DAYS: &str = include_str!("../../testdata/cert-180days.pem");
    const CERT_200_DAYS: &str = include_str!("../../testdata/cert-200days.pem");
    const CERT_15_MONTHS: &str = include_str!("../../testdata/cert-15months.pem");
    const CERT_27_MONTHS: &str = include_str!("../../testdata/cert-27months.pem");
    const CERT_39_MONTHS: &str = include_str!("../../testdata/cert-39months.pem");
    const CHAIN_3SCTS: &str = include_str!("../../testdata/chain-3scts.pem");

    /// 2020-09-13, under the original policy
    const LOGGED_EARLY: u64 = 1_600_000_000_000;
    /// 2023-11-14, under the updated policy
    const LOGGED_LATE: u64 = 1_700_000_000_000;

    fn valid_at(operator: &str, timestamp: u64) -> SctVerificationResult {
        let signature =
            DigitallySigned::new(HashAlgorithm::Sha256, SignatureAlgorithm::Ecdsa, vec![0; 8]);
        SctVerificationResult::Valid {
            sct: SignedCertificateTimestamp::new(
                Version::V1,
                [0; 32],
                timestamp,
                vec![],
                signature,
            ),
            operator: operator.to_owned(),
        }
    }

    fn valid(operator: &str) -> SctVerificationResult {
        valid_at(operator, LOGGED_LATE)
    }

    fn invalid() -> SctVerificationResult {
        SctVerificationResult::Invalid(InvalidSctResult::FailedVerification)
    }

    /// `count` valid SCTs, each from its own operator
    fn distinct(count: usize, timestamp: u64) -> Vec<SctVerificationResult> {
        (0..count)
            .map(|idx| valid_at(&format!("Operator {idx}"), timestamp))
            .collect()
    }

    fn results(scts: Vec<SctVerificationResult>) -> BTreeMap<String, SctVerificationResult> {
        scts.into_iter()
            .enumerate()
            .map(|(idx, sct)| (format!("log-{idx}"), sct))
            .collect()
    }

    fn verify(pem: &str, scts: Vec<SctVerificationResult>) -> VerificationResult {
        let leaf = Certificate::from_pem(pem).unwrap();
        DefaultPolicy.verification_result(&leaf, results(scts))
    }

    #[test]
    fn legacy_short_certificate_needs_two_scts() {
        // valid 100 days, logged 2020; the old policy applies and 2 SCTs suffice
        let result = verify(CERT_100_DAYS, distinct(2, LOGGED_EARLY));
        assert!(matches!(
            result,
            VerificationResult::Success(Success::Trusted { .. })
        ));

        assert!(matches!(
            verify(CERT_100_DAYS, distinct(1, LOGGED_EARLY)),
            VerificationResult::Failure(Failure::TooFewSctsTrusted {
                min_sct_count: 2,
                ..
            })
        ));
    }

    #[test]
    fn legacy_month_ladder() {
        for (pem, minimum) in [
            (CERT_15_MONTHS, 3),
            (CERT_27_MONTHS, 4),
            (CERT_39_MONTHS, 5),
        ] {
            // one short of the requirement fails with the expected minimum
            assert!(matches!(
                verify(pem, distinct(minimum - 1, LOGGED_EARLY)),
                VerificationResult::Failure(Failure::TooFewSctsTrusted { min_sct_count, .. })
                    if min_sct_count == minimum
            ));

            assert!(matches!(
                verify(pem, distinct(minimum, LOGGED_EARLY)),
                VerificationResult::Success(Success::Trusted { .. })
            ));
        }
    }

    #[test]
    fn the_policy_edition_follows_the_sct_timestamps() {
        // the 39 month certificate predates the update, but its valid SCTs do not, so
        // the current policy grades it: over 180 days means 3 SCTs rather than 5
        let result = verify(CERT_39_MONTHS, distinct(3, LOGGED_LATE));
        assert!(matches!(
            result,
            VerificationResult::Success(Success::Trusted { .. })
        ));
    }

    #[test]
    fn without_valid_scts_the_current_policy_applies() {
        assert!(matches!(
            verify(CERT_39_MONTHS, vec![invalid()]),
            VerificationResult::Failure(Failure::TooFewSctsTrusted {
                min_sct_count: 3,
                ..
            })
        ));
    }

    #[test]
    fn legacy_policy_also_requires_distinct_operators() {
        let alpha = || valid_at("Alpha", LOGGED_EARLY);
        let result = verify(CERT_15_MONTHS, vec![alpha(), alpha(), alpha()]);

        assert!(matches!(
            result,
            VerificationResult::Failure(Failure::TooFewDistinctOperators { required: 2, .. })
        ));
    }

    #[test]
    fn long_lived_certificate_needs_three_scts() {
        // issued 2023, valid 200 days: over the 180 day threshold
        assert!(matches!(
            verify(CERT_200_DAYS, vec![valid("Alpha"), valid("Beta")]),
            VerificationResult::Failure(Failure::TooFewSctsTrusted {
                min_sct_count: 3,
                ..
            })
        ));

        assert!(matches!(
            verify(
                CERT_200_DAYS,
                vec![valid("Alpha"), valid("Beta"), valid("Gamma")]
            ),
            VerificationResult::Success(Success::Trusted { .. })
        ));
    }

    #[test]
    fn the_lifetime_threshold_counts_whole_days() {
        // valid for 180 days and 12 hours, which is not more than 180 whole days
        assert!(matches!(
            verify(CERT_180_DAYS, vec![valid("Alpha"), valid("Beta")]),
            VerificationResult::Success(Success::Trusted { .. })
        ));
    }

    #[test]
    fn short_lived_certificate_needs_two_scts() {
        // the 90 day fixture leaf is post-update
        let chain = Certificate::load_pem_chain(CHAIN_3SCTS).unwrap();
        let result = DefaultPolicy
            .verification_result(&chain[0], results(vec![valid("Alpha"), valid("Beta")]));

        assert!(matches!(
            result,
            VerificationResult::Success(Success::Trusted { .. })
        ));
    }

    #[test]
    fn a_single_operator_is_not_enough() {
        assert!(matches!(
            verify(
                CERT_200_DAYS,
                vec![valid("Alpha"), valid("Alpha"), valid("Alpha")]
            ),
            VerificationResult::Failure(Failure::TooFewDistinctOperators { required: 2, .. })
        ));
    }

    #[test]
    fn invalid_scts_do_not_count() {
        assert!(matches!(
            verify(
                CERT_200_DAYS,
                vec![valid("Alpha"), valid("Beta"), invalid(), invalid()]
            ),
            VerificationResult::Failure(Failure::TooFewSctsTrusted {
                min_sct_count: 3,
                ..
            })
        ));
    }
}
