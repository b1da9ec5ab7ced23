//! Layering of the log list sources
//!
//! A [`LogListCacheManager`] walks memory, disk and the bundled resources before it
//! touches the network, and keeps the freshest cached list around as a fallback for
//! when the network misbehaves.

use crate::{
    datasource::{DataSource, InMemoryCache},
    disk::DiskCache,
    resources::ResourcesSource,
    result::{LogListInvalid, LogListResult, LogListValid, RawLogListResult},
    service::LogListService,
    transformer::RawLogListTransformer,
    verifier::LogListVerifier,
    zip_source::LogListZipSource,
};
use chrono::{DateTime, Duration, Utc};
use ctward_core::LogServer;

/// A cached list younger than this skips the network entirely
const FRESH_DAYS: i64 = 1;
/// A list older than this is used, but flagged as stale
const STALE_AFTER_DAYS: i64 = 14;
/// A list older than this is no longer trusted at all
const EXPIRES_AFTER_DAYS: i64 = 70;

/// Multi-tier source for the verified log list
///
/// `get` walks memory, disk and the bundled resources in order and returns the first
/// list younger than a day, promoting it into the tiers above. Anything older is kept
/// as a fallback and the network is asked instead. A network list older than the
/// fallback is rejected in favor of the cached data, so a replayed stale publication
/// can never displace a list we have already seen. When the network fails the
/// fallback is used as long as it is younger than 70 days; beyond that verification
/// is disabled rather than enforced against expired data.
pub struct LogListCacheManager<S, D> {
    memory: InMemoryCache,
    disk: Option<D>,
    resources: Option<ResourcesSource>,
    network: LogListZipSource<S>,
    transformer: RawLogListTransformer,
    now: fn() -> DateTime<Utc>,
}

impl<S: LogListService, D: DiskCache> LogListCacheManager<S, D> {
    pub fn new(
        service: S,
        disk: Option<D>,
        resources: Option<ResourcesSource>,
        verifier: LogListVerifier,
    ) -> Self {
        Self {
            memory: InMemoryCache::new(),
            disk,
            resources,
            network: LogListZipSource::new(service),
            transformer: RawLogListTransformer::new(verifier),
            now: Utc::now,
        }
    }

    /// Replace the wall clock, for tests
    pub fn with_clock(mut self, now: fn() -> DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    fn interpret(&self, raw: &RawLogListResult) -> Option<(DateTime<Utc>, Vec<LogServer>)> {
        match self.transformer.transform(raw) {
            LogListResult::Valid(LogListValid::Success { timestamp, servers }) => {
                Some((timestamp, servers))
            }
            _ => None,
        }
    }

    /// Network failed or returned an expired list; degrade onto the fallback
    fn degrade(
        &self,
        now: DateTime<Utc>,
        fallback: Option<(DateTime<Utc>, Vec<LogServer>)>,
        network_result: LogListResult,
    ) -> LogListResult {
        match fallback {
            None => network_result,
            Some((timestamp, servers)) => {
                if now - timestamp <= Duration::days(EXPIRES_AFTER_DAYS) {
                    LogListResult::Valid(LogListValid::Success { timestamp, servers })
                } else {
                    tracing::warn!(
                        %timestamp,
                        "freshest cached log list has expired and the network is unavailable, \
                         disabling certificate transparency checks"
                    );
                    LogListResult::DisableChecks {
                        timestamp,
                        network_result: Box::new(network_result),
                    }
                }
            }
        }
    }
}

impl<S: LogListService, D: DiskCache> DataSource for LogListCacheManager<S, D> {
    type Value = LogListResult;

    async fn get(&self) -> LogListResult {
        let now = (self.now)();
        let fresh = |timestamp: DateTime<Utc>| now - timestamp <= Duration::days(FRESH_DAYS);

        // the freshest valid list seen in any cache tier
        let mut fallback: Option<(DateTime<Utc>, Vec<LogServer>)> = None;
        let mut remember = |timestamp, servers| {
            if fallback
                .as_ref()
                .is_none_or(|(existing, _)| timestamp > *existing)
            {
                fallback = Some((timestamp, servers));
            }
        };

        if let Some(raw) = self.memory.get()
            && let Some((timestamp, servers)) = self.interpret(&raw)
        {
            if fresh(timestamp) {
                return LogListResult::Valid(LogListValid::Success { timestamp, servers });
            }
            remember(timestamp, servers);
        }

        if let Some(disk) = &self.disk
            && let Some(raw) = disk.get().await
            && let Some((timestamp, servers)) = self.interpret(&raw)
        {
            if fresh(timestamp) {
                self.memory.set(raw);
                return LogListResult::Valid(LogListValid::Success { timestamp, servers });
            }
            remember(timestamp, servers);
        }

        if let Some(resources) = &self.resources {
            let raw = resources.get().await;
            if let Some((timestamp, servers)) = self.interpret(&raw) {
                if fresh(timestamp) {
                    if let Some(disk) = &self.disk {
                        disk.set(&raw).await;
                    }
                    self.memory.set(raw);
                    return LogListResult::Valid(LogListValid::Success { timestamp, servers });
                }
                remember(timestamp, servers);
            }
        }

        let raw = self.network.get().await;
        match self.transformer.transform(&raw) {
            LogListResult::Valid(valid) => {
                // a current publication can never be older than data we already hold
                if let Some((timestamp, servers)) = &fallback
                    && valid.timestamp() < *timestamp
                {
                    tracing::warn!(
                        network = %valid.timestamp(),
                        cached = %timestamp,
                        "network log list is older than cached data, keeping the cache"
                    );
                    return LogListResult::Valid(LogListValid::StaleNetworkUsingCachedData {
                        timestamp: *timestamp,
                        servers: servers.clone(),
                        network_result: Box::new(valid),
                    });
                }

                let timestamp = valid.timestamp();
                if now - timestamp > Duration::days(EXPIRES_AFTER_DAYS) {
                    return self.degrade(
                        now,
                        fallback,
                        LogListResult::Invalid(LogListInvalid::LogListStaleNetwork {
                            network_result: Box::new(valid),
                        }),
                    );
                }

                if let Some(disk) = &self.disk {
                    disk.set(&raw).await;
                }
                self.memory.set(raw);

                if now - timestamp > Duration::days(STALE_AFTER_DAYS) {
                    return LogListResult::Valid(LogListValid::StaleNetworkUsingNetworkData {
                        timestamp,
                        servers: valid.servers().to_vec(),
                    });
                }

                LogListResult::Valid(valid)
            }
            invalid => self.degrade(now, fallback, invalid),
        }
    }
}
