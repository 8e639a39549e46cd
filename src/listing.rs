// Listing of processed documents plus the in-memory filters, ordering and
// statistics the `list` command applies to them. Everything below `list`
// is pure.

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{
    CardType, DocumentType, ListProcessResponse, ProcessDocumentItem, ProcessStatus,
    VehicleCategory,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct ListService {
    client: ApiClient,
}

impl ListService {
    pub fn new(client: ApiClient) -> Self {
        ListService { client }
    }

    /// Fetch every processed document visible to the token.
    pub fn list(&self, token: &str) -> Result<Vec<ProcessDocumentItem>> {
        let response: ListProcessResponse = self.client.get("/process", Some(token))?;
        debug!(count = response.process_documents.len(), "listed documents");
        Ok(response.process_documents)
    }
}

fn keep<F>(docs: &[ProcessDocumentItem], pred: F) -> Vec<ProcessDocumentItem>
where
    F: Fn(&ProcessDocumentItem) -> bool,
{
    docs.iter().filter(|&d| pred(d)).cloned().collect()
}

pub fn filter_by_status(
    docs: &[ProcessDocumentItem],
    status: ProcessStatus,
) -> Vec<ProcessDocumentItem> {
    keep(docs, |d| d.status == status)
}

pub fn filter_by_type(
    docs: &[ProcessDocumentItem],
    document_type: DocumentType,
) -> Vec<ProcessDocumentItem> {
    let wanted = CardType::from(document_type);
    keep(docs, |d| d.technical_card.card_type == wanted)
}

pub fn filter_by_category(
    docs: &[ProcessDocumentItem],
    category: VehicleCategory,
) -> Vec<ProcessDocumentItem> {
    keep(docs, |d| d.technical_card.category == category)
}

pub fn filter_by_itv(docs: &[ProcessDocumentItem], itv: &str) -> Vec<ProcessDocumentItem> {
    keep(docs, |d| d.license.itv == itv)
}

/// Parse an ISO-8601 timestamp. Strings without an offset are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Order by creation (or update) time. The sort is stable in both
/// directions; unparseable timestamps order before every valid one.
pub fn sort_by_date(
    docs: &[ProcessDocumentItem],
    use_created_at: bool,
    descending: bool,
) -> Vec<ProcessDocumentItem> {
    let mut keyed: Vec<_> = docs
        .iter()
        .map(|d| {
            let raw = if use_created_at {
                &d.created_at
            } else {
                &d.updated_at
            };
            (parse_timestamp(raw), d)
        })
        .collect();

    if descending {
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
    } else {
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
    }
    keyed.into_iter().map(|(_, d)| d.clone()).collect()
}

#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct DocumentStatistics {
    pub total: usize,
    pub by_status: BTreeMap<ProcessStatus, usize>,
    pub by_type: BTreeMap<CardType, usize>,
    pub by_itv: BTreeMap<String, usize>,
}

pub fn statistics(docs: &[ProcessDocumentItem]) -> DocumentStatistics {
    let mut stats = DocumentStatistics {
        total: docs.len(),
        ..Default::default()
    };
    for doc in docs {
        *stats.by_status.entry(doc.status).or_default() += 1;
        *stats
            .by_type
            .entry(doc.technical_card.card_type)
            .or_default() += 1;
        *stats.by_itv.entry(doc.license.itv.clone()).or_default() += 1;
    }
    stats
}

/// Optional filters of the `list` command, applied in the order status,
/// type, category, ITV.
#[derive(Clone, Debug, Default)]
pub struct ListFilter {
    pub status: Option<ProcessStatus>,
    pub document_type: Option<DocumentType>,
    pub category: Option<VehicleCategory>,
    pub itv: Option<String>,
}

impl ListFilter {
    pub fn apply(&self, docs: &[ProcessDocumentItem]) -> Vec<ProcessDocumentItem> {
        let mut out = docs.to_vec();
        if let Some(status) = self.status {
            out = filter_by_status(&out, status);
            debug!(%status, remaining = out.len(), "filtered by status");
        }
        if let Some(document_type) = self.document_type {
            out = filter_by_type(&out, document_type);
            debug!(%document_type, remaining = out.len(), "filtered by type");
        }
        if let Some(category) = self.category {
            out = filter_by_category(&out, category);
            debug!(%category, remaining = out.len(), "filtered by category");
        }
        if let Some(itv) = &self.itv {
            out = filter_by_itv(&out, itv);
            debug!(itv = %itv, remaining = out.len(), "filtered by itv");
        }
        out
    }
}
