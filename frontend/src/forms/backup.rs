use std::cell::RefCell;
use std::rc::Rc;

use chrono::{SecondsFormat, Utc};
use log::{debug, warn};
use serde_json::Value;
use thiserror::Error;
use web_sys::window;

use super::lead::LeadRecord;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("local storage is not available")]
    StorageUnavailable,
    #[error("stored lead collection is not valid JSON: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("could not encode lead: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("could not write lead collection: {0}")]
    Write(String),
}

/// Append-only collection of every lead submitted from this browser.
///
/// There is no cap, expiry or deduplication.
pub trait LeadBackup {
    fn load(&self) -> Result<Vec<Value>, PersistenceError>;
    fn append(&self, record: &LeadRecord) -> Result<(), PersistenceError>;
}

fn backup_entry(record: &LeadRecord) -> Result<Value, PersistenceError> {
    let mut entry = serde_json::to_value(record).map_err(PersistenceError::Encode)?;
    if let Value::Object(map) = &mut entry {
        map.insert("saved_locally".to_string(), Value::Bool(true));
        map.insert(
            "local_timestamp".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
    }
    Ok(entry)
}

/// The whole collection lives under one key and is rewritten on every
/// append. Two tabs appending at once: last writer wins.
pub struct LocalStorageBackup {
    key: String,
}

impl LocalStorageBackup {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn is_available() -> bool {
        matches!(window().map(|w| w.local_storage()), Some(Ok(Some(_))))
    }

    fn storage(&self) -> Result<web_sys::Storage, PersistenceError> {
        window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(PersistenceError::StorageUnavailable)
    }
}

impl LeadBackup for LocalStorageBackup {
    fn load(&self) -> Result<Vec<Value>, PersistenceError> {
        let storage = self.storage()?;
        match storage.get_item(&self.key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).map_err(PersistenceError::Corrupt),
            Ok(None) => Ok(Vec::new()),
            Err(_) => Err(PersistenceError::StorageUnavailable),
        }
    }

    fn append(&self, record: &LeadRecord) -> Result<(), PersistenceError> {
        let mut leads = self.load()?;
        leads.push(backup_entry(record)?);
        let raw = serde_json::to_string(&leads).map_err(PersistenceError::Encode)?;
        self.storage()?
            .set_item(&self.key, &raw)
            .map_err(|e| PersistenceError::Write(format!("{:?}", e)))?;
        debug!("Lead saved locally ({} stored)", leads.len());
        Ok(())
    }
}

/// Keeps leads for the lifetime of the page when local storage is missing
/// (private browsing, disabled storage).
#[derive(Default)]
pub struct MemoryBackup {
    leads: RefCell<Vec<Value>>,
    fail_writes: bool,
}

impl MemoryBackup {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, as a full quota would.
    #[cfg(test)]
    pub fn failing() -> Self {
        Self {
            leads: RefCell::default(),
            fail_writes: true,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.leads.borrow().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.leads.borrow().is_empty()
    }
}

impl LeadBackup for MemoryBackup {
    fn load(&self) -> Result<Vec<Value>, PersistenceError> {
        Ok(self.leads.borrow().clone())
    }

    fn append(&self, record: &LeadRecord) -> Result<(), PersistenceError> {
        if self.fail_writes {
            return Err(PersistenceError::Write("quota exceeded".to_string()));
        }
        let entry = backup_entry(record)?;
        self.leads.borrow_mut().push(entry);
        Ok(())
    }
}

pub fn browser_backup(key: &str) -> Rc<dyn LeadBackup> {
    if LocalStorageBackup::is_available() {
        Rc::new(LocalStorageBackup::new(key))
    } else {
        warn!("localStorage unavailable, keeping leads in memory");
        Rc::new(MemoryBackup::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::descriptor::FormDescriptor;
    use crate::forms::testing::FixedEnvironment;
    use crate::forms::values::{FieldValue, FormValues};

    fn record(email: &str) -> LeadRecord {
        let descriptor = FormDescriptor::lead_capture();
        let mut values = FormValues::for_form(&descriptor);
        values.set("email", FieldValue::Text(email.into()));
        LeadRecord::collect(descriptor.category, &values, &FixedEnvironment::default(), None)
    }

    #[test]
    fn appends_in_order_and_stamps_entries() {
        let backup = MemoryBackup::new();
        backup.append(&record("a@b.co")).unwrap();
        backup.append(&record("a@b.co")).unwrap();
        backup.append(&record("c@d.co")).unwrap();

        let leads = backup.load().unwrap();
        assert_eq!(leads.len(), 3, "duplicates are kept");
        assert_eq!(leads[2]["email"], "c@d.co");
        assert!(leads.iter().all(|l| l["saved_locally"] == true));
        assert!(leads[0]["local_timestamp"].is_string());
    }

    #[test]
    fn failing_store_reports_write_error() {
        let backup = MemoryBackup::failing();
        let err = backup.append(&record("a@b.co")).unwrap_err();
        assert!(matches!(err, PersistenceError::Write(_)));
        assert!(backup.is_empty());
    }
}
