//! Application controller
//!
//! [`App`] owns the store and a cached copy of its records. The cache is
//! never patched in place: every mutation goes to the store and is followed
//! by a full reload.

use crate::form::FormState;
use crate::retry::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::store::RecordStore;
use crate::{RecordsError, Result};
use chrono::NaiveDate;
use composer::{ExportedFile, Exporter, Record, VariantConfig};
use log::{debug, warn};

/// Entries per page unless configured otherwise
pub const DEFAULT_PER_PAGE: usize = 10;

/// One page of the (filtered) record list
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub records: Vec<&'a Record>,
    /// 1-based
    pub number: usize,
    pub page_count: usize,
    /// Records matching the current search
    pub total: usize,
}

/// Record list, search, paging and export over one store
pub struct App<S: RecordStore> {
    store: S,
    records: Vec<Record>,
    query: String,
    page: usize,
    per_page: usize,
    retry: RetryPolicy,
    sleeper: Box<dyn Sleeper>,
    exporter: Exporter,
}

impl<S: RecordStore> App<S> {
    /// Controller with the default retry policy and the PDF exporter
    pub fn new(store: S) -> Self {
        Self {
            store,
            records: Vec::new(),
            query: String::new(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            retry: RetryPolicy::default(),
            sleeper: Box::new(ThreadSleeper),
            exporter: Exporter::pdf(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy, sleeper: impl Sleeper + 'static) -> Self {
        self.retry = retry;
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn with_exporter(mut self, exporter: Exporter) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cached records, newest first
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: u64) -> Option<&Record> {
        self.records.iter().find(|r| r.id == Some(id))
    }

    /// Replace the cache with the store's contents
    ///
    /// Reads are retried per the retry policy; entries that are not records
    /// are skipped.
    pub fn load(&mut self) -> Result<()> {
        let store = &self.store;
        let values = self
            .retry
            .run(self.sleeper.as_mut(), || store.get_all())
            .map_err(|(attempts, source)| RecordsError::LoadFailed { attempts, source })?;

        let mut records: Vec<Record> = values
            .iter()
            .filter_map(|value| match Record::from_value(value) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("skipping stored entry: {}", err);
                    None
                }
            })
            .collect();
        records.sort_by(|a, b| b.id.cmp(&a.id));

        debug!("loaded {} records", records.len());
        self.records = records;
        self.page = self.page.clamp(1, self.page_count());
        Ok(())
    }

    /// Validate and persist a form, then reload
    ///
    /// Returns the record id. Nothing is written when validation fails.
    pub fn save(&mut self, form: &FormState) -> Result<u64> {
        let record = form.to_record()?;
        let value = record.to_value();
        let id = match record.id {
            Some(_) => self.store.put(value)?,
            None => self.store.add(value)?,
        };
        debug!("saved record {}", id);
        self.load()?;
        Ok(id)
    }

    /// Form prefilled with a cached record
    pub fn edit(&self, id: u64) -> Result<FormState> {
        self.get(id)
            .map(FormState::from_record)
            .ok_or(RecordsError::NotFound(id))
    }

    /// Delete by id, then reload
    pub fn delete(&mut self, id: u64) -> Result<()> {
        if self.get(id).is_none() {
            return Err(RecordsError::NotFound(id));
        }
        self.store.delete(id)?;
        debug!("deleted record {}", id);
        self.load()
    }

    /// Export a cached record as a downloadable document
    ///
    /// # Arguments
    /// * `id` - Record id
    /// * `variant` - Document layout
    /// * `today` - Date used when the record has none
    pub fn export(&self, id: u64, variant: &VariantConfig, today: NaiveDate) -> Result<ExportedFile> {
        let record = self.get(id).ok_or(RecordsError::NotFound(id))?;
        Ok(self.exporter.export(record, variant, today)?)
    }

    /// Filter the list; the page resets to the first
    pub fn search(&mut self, query: &str) {
        self.query = query.trim().to_lowercase();
        self.page = 1;
    }

    /// Records matching the current search, newest first
    pub fn filtered(&self) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|record| matches_query(record, &self.query))
            .collect()
    }

    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
        self.page = self.page.clamp(1, self.page_count());
    }

    /// Jump to a page, clamped to the available range
    pub fn goto_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count());
    }

    pub fn page_count(&self) -> usize {
        self.filtered().len().div_ceil(self.per_page).max(1)
    }

    pub fn current_page(&self) -> Page<'_> {
        let filtered = self.filtered();
        let total = filtered.len();
        let start = (self.page - 1) * self.per_page;
        Page {
            records: filtered
                .into_iter()
                .skip(start)
                .take(self.per_page)
                .collect(),
            number: self.page,
            page_count: total.div_ceil(self.per_page).max(1),
            total,
        }
    }
}

/// Case-insensitive match on the header fields and item texts
fn matches_query(record: &Record, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let hit = |text: &str| text.to_lowercase().contains(query);

    [
        &record.reference_number,
        &record.party1.name,
        &record.party2.name,
        &record.subject,
        &record.description,
        &record.supporting_reference,
    ]
    .into_iter()
    .any(|field| hit(field))
        || record
            .items
            .iter()
            .any(|item| hit(&item.description) || hit(&item.unit) || hit(&item.brand))
}
