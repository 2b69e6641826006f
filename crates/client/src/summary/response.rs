//! Summary API response types and conversion into records.

use serde::Deserialize;
use wikicache_core::SummaryRecord;

use super::SummaryError;

/// Raw `page/summary` payload, reduced to the fields we read.
///
/// Every field is optional here so that a payload missing one of them surfaces
/// as [`SummaryError::MissingField`] instead of a generic parse error.
#[derive(Debug, Deserialize)]
pub struct PageSummaryResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub extract: Option<String>,
    #[serde(default)]
    pub content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
pub struct ContentUrls {
    #[serde(default)]
    pub desktop: Option<PlatformUrls>,
}

#[derive(Debug, Deserialize)]
pub struct PlatformUrls {
    #[serde(default)]
    pub page: Option<String>,
}

impl PageSummaryResponse {
    /// Convert into a record, requiring all three fields.
    pub fn into_record(self) -> Result<SummaryRecord, SummaryError> {
        let summary = self.extract.ok_or(SummaryError::MissingField("extract"))?;
        let page = self
            .content_urls
            .and_then(|urls| urls.desktop)
            .and_then(|desktop| desktop.page)
            .ok_or(SummaryError::MissingField("content_urls.desktop.page"))?;
        let title = self.title.ok_or(SummaryError::MissingField("title"))?;

        Ok(SummaryRecord { page, title, summary })
    }
}
