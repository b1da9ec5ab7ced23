use crate::{
    datasource::DataSource,
    result::{RawLogListFailure, RawLogListResult},
    service::{LogListService, LogListServiceError, MAX_LOG_LIST_JSON_SIZE, MAX_LOG_LIST_SIG_SIZE},
};
use std::io::{Cursor, Read};
use zip::ZipArchive;

const LOG_LIST_FILE: &str = "log_list.json";
const SIGNATURE_FILE: &str = "log_list.sig";

/// Fetches `log_list.zip` and unpacks the list and its signature from it
///
/// The zip bundles both artifacts in a single download, so the list and the signature
/// that covers it can never come from different publications. Entries are matched by
/// file name at any depth inside the archive.
#[derive(Debug)]
pub struct LogListZipSource<S> {
    service: S,
}

impl<S: LogListService> LogListZipSource<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

impl<S: LogListService> DataSource for LogListZipSource<S> {
    type Value = RawLogListResult;

    async fn get(&self) -> RawLogListResult {
        let bytes = match self.service.get_log_list_zip().await {
            Ok(bytes) => bytes,
            Err(LogListServiceError::TooBig { .. }) => {
                return RawLogListResult::Failure(RawLogListFailure::ZipTooBig);
            }
            Err(err) => {
                return RawLogListResult::Failure(RawLogListFailure::ZipFailedLoading(
                    err.to_string(),
                ));
            }
        };

        unpack(&bytes)
    }
}

fn unpack(bytes: &[u8]) -> RawLogListResult {
    let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
        Ok(archive) => archive,
        Err(err) => {
            return RawLogListResult::Failure(RawLogListFailure::ZipFailedLoading(err.to_string()));
        }
    };

    let mut log_list = None;
    let mut signature = None;

    for index in 0..archive.len() {
        let file = match archive.by_index(index) {
            Ok(file) => file,
            Err(err) => {
                return RawLogListResult::Failure(RawLogListFailure::ZipFailedLoading(
                    err.to_string(),
                ));
            }
        };

        let name = file.name().rsplit('/').next().unwrap_or("").to_owned();
        let (slot, cap, too_big) = match name.as_str() {
            LOG_LIST_FILE => (
                &mut log_list,
                MAX_LOG_LIST_JSON_SIZE,
                RawLogListFailure::ZipJsonTooBig,
            ),
            SIGNATURE_FILE => (
                &mut signature,
                MAX_LOG_LIST_SIG_SIZE,
                RawLogListFailure::ZipSigTooBig,
            ),
            _ => continue,
        };

        match read_capped(file, cap) {
            Ok(Some(data)) => *slot = Some(data),
            Ok(None) => return RawLogListResult::Failure(too_big),
            Err(err) => {
                return RawLogListResult::Failure(RawLogListFailure::ZipFailedLoading(
                    err.to_string(),
                ));
            }
        }
    }

    match (log_list, signature) {
        (Some(log_list), Some(signature)) => RawLogListResult::Success {
            log_list,
            signature,
        },
        (None, _) => RawLogListResult::Failure(RawLogListFailure::ZipJsonMissing),
        (_, None) => RawLogListResult::Failure(RawLogListFailure::ZipSigMissing),
    }
}

/// `Ok(None)` when the entry inflates past `cap` bytes
fn read_capped(file: impl Read, cap: usize) -> std::io::Result<Option<Vec<u8>>> {
    let mut data = vec![];
    file.take(cap as u64 + 1).read_to_end(&mut data)?;
    if data.len() > cap {
        return Ok(None);
    }
    Ok(Some(data))
}
