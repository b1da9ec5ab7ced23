use crate::{datasource::DataSource, result::RawLogListResult};

/// A log list bundled with the application
///
/// Used as an offline fallback below the disk cache: a freshly installed application
/// that cannot reach the network still verifies against the list it shipped with, as
/// long as that list has not expired.
#[derive(Debug, Clone)]
pub struct ResourcesSource {
    log_list: Vec<u8>,
    signature: Vec<u8>,
}

impl ResourcesSource {
    pub fn new(log_list: impl Into<Vec<u8>>, signature: impl Into<Vec<u8>>) -> Self {
        Self {
            log_list: log_list.into(),
            signature: signature.into(),
        }
    }
}

impl DataSource for ResourcesSource {
    type Value = RawLogListResult;

    async fn get(&self) -> RawLogListResult {
        RawLogListResult::Success {
            log_list: self.log_list.clone(),
            signature: self.signature.clone(),
        }
    }
}
