//! Persisting the raw log list between runs

use crate::result::{RawLogListFailure, RawLogListResult};
use std::{io::ErrorKind, path::PathBuf};

const LOG_LIST_FILE: &str = "log_list.json";
const SIGNATURE_FILE: &str = "log_list.sig";

/// Durable storage for the raw log list bytes
pub trait DiskCache {
    /// `None` when nothing has been stored yet
    fn get(&self) -> impl Future<Output = Option<RawLogListResult>>;

    fn set(&self, value: &RawLogListResult) -> impl Future<Output = ()>;
}

/// [`DiskCache`] keeping `log_list.json` and `log_list.sig` in a directory
///
/// Writes go through a temporary file and a rename, so a crash mid-write never leaves
/// a torn list behind. Storage failures are logged and swallowed: the disk tier is an
/// optimization, verification falls back to the other sources without it.
#[derive(Debug, Clone)]
pub struct FileSystemCache {
    dir: PathBuf,
}

impl FileSystemCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn persist(&self, log_list: &[u8], signature: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        write_atomic(self.dir.join(LOG_LIST_FILE), log_list).await?;
        write_atomic(self.dir.join(SIGNATURE_FILE), signature).await
    }
}

impl DiskCache for FileSystemCache {
    async fn get(&self) -> Option<RawLogListResult> {
        let log_list = read_file(self.dir.join(LOG_LIST_FILE)).await;
        let signature = read_file(self.dir.join(SIGNATURE_FILE)).await;

        match (log_list, signature) {
            (Ok(Some(log_list)), Ok(Some(signature))) => Some(RawLogListResult::Success {
                log_list,
                signature,
            }),
            (Ok(_), Ok(_)) => None,
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(dir = %self.dir.display(), "failed to read the cached log list: {err}");
                Some(RawLogListResult::Failure(
                    RawLogListFailure::DiskFailedLoading(err.to_string()),
                ))
            }
        }
    }

    async fn set(&self, value: &RawLogListResult) {
        // only authenticated raw bytes get persisted; failures are transient
        let RawLogListResult::Success {
            log_list,
            signature,
        } = value
        else {
            return;
        };

        if let Err(err) = self.persist(log_list, signature).await {
            tracing::warn!(dir = %self.dir.display(), "failed to persist the log list: {err}");
        }
    }
}

async fn read_file(path: PathBuf) -> std::io::Result<Option<Vec<u8>>> {
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

async fn write_atomic(path: PathBuf, data: &[u8]) -> std::io::Result<()> {
    let mut tmp = path.clone().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, data).await?;
    tokio::fs::rename(&tmp, &path).await
}
