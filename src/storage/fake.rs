// glacier-restore/src/storage/fake.rs
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use super::{
    CopyOutcome, ListPage, ObjectClass, ObjectRecord, ObjectStore, ProviderError, ProviderResult,
    RestoreOutcome, StorageClass, Tier,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List { prefix: String, continuation: Option<String> },
    Restore { bucket: String, key: String, days: u32, tier: Tier },
    Copy { key: String, class: StorageClass },
    Head { key: String },
}

#[derive(Debug, Default)]
struct State {
    objects: BTreeMap<String, ObjectClass>,
    restore_requested: HashSet<String>,
    restore_failures: HashMap<String, ProviderError>,
    pending_copies: HashMap<String, u32>,
    copy_failures: HashMap<String, ProviderError>,
    restore_headers: HashMap<String, String>,
    head_failures: HashMap<String, ProviderError>,
    list_failure: Option<ProviderError>,
    calls: Vec<Call>,
}

/// In-memory `ObjectStore` that pages its listing and records every call.
#[derive(Debug)]
pub struct FakeObjectStore {
    page_size: usize,
    state: Mutex<State>,
}

impl Default for FakeObjectStore {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl FakeObjectStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn with_object(self, key: &str, class: ObjectClass) -> Self {
        self.state().objects.insert(key.to_string(), class);
        self
    }

    /// The next `cycles` copies of `key` report `InvalidObjectState`.
    pub fn pending_for(self, key: &str, cycles: u32) -> Self {
        self.state().pending_copies.insert(key.to_string(), cycles);
        self
    }

    pub fn fail_restore(self, key: &str, error: ProviderError) -> Self {
        self.state().restore_failures.insert(key.to_string(), error);
        self
    }

    pub fn fail_copy(self, key: &str, error: ProviderError) -> Self {
        self.state().copy_failures.insert(key.to_string(), error);
        self
    }

    pub fn fail_head(self, key: &str, error: ProviderError) -> Self {
        self.state().head_failures.insert(key.to_string(), error);
        self
    }

    pub fn fail_list(self, error: ProviderError) -> Self {
        self.state().list_failure = Some(error);
        self
    }

    pub fn with_restore_header(self, key: &str, header: &str) -> Self {
        self.state()
            .restore_headers
            .insert(key.to_string(), header.to_string());
        self
    }

    pub fn set_class(&self, key: &str, class: ObjectClass) {
        self.state().objects.insert(key.to_string(), class);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn restore_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Restore { .. }))
            .collect()
    }

    pub fn copy_calls_for(&self, key: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Copy { key: k, .. } if k == key))
            .count()
    }

    pub fn list_calls_for(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::List { prefix: p, .. } if p == prefix))
            .count()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn list_page(
        &self,
        _bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> ProviderResult<ListPage> {
        let mut state = self.state();
        state.calls.push(Call::List {
            prefix: prefix.to_string(),
            continuation: continuation.clone(),
        });
        if let Some(err) = &state.list_failure {
            return Err(err.clone());
        }

        // The continuation token is the last key of the previous page.
        let mut records: Vec<ObjectRecord> = state
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| continuation.as_ref().is_none_or(|after| key.as_str() > after.as_str()))
            .take(self.page_size + 1)
            .map(|(key, class)| ObjectRecord {
                key: key.clone(),
                class: class.clone(),
            })
            .collect();

        let next_continuation = if records.len() > self.page_size {
            records.truncate(self.page_size);
            records.last().map(|r| r.key.clone())
        } else {
            None
        };
        Ok(ListPage {
            records,
            next_continuation,
        })
    }

    async fn request_restore(
        &self,
        bucket: &str,
        key: &str,
        days: u32,
        tier: Tier,
    ) -> ProviderResult<RestoreOutcome> {
        let mut state = self.state();
        state.calls.push(Call::Restore {
            bucket: bucket.to_string(),
            key: key.to_string(),
            days,
            tier,
        });
        if let Some(err) = state.restore_failures.get(key) {
            return Err(err.clone());
        }
        if state.restore_requested.insert(key.to_string()) {
            Ok(RestoreOutcome::Accepted)
        } else {
            Ok(RestoreOutcome::AlreadyInProgress)
        }
    }

    async fn copy_with_storage_class(
        &self,
        _bucket: &str,
        key: &str,
        class: StorageClass,
    ) -> ProviderResult<CopyOutcome> {
        let mut state = self.state();
        state.calls.push(Call::Copy {
            key: key.to_string(),
            class,
        });
        if let Some(err) = state.copy_failures.get(key) {
            return Err(err.clone());
        }
        if let Some(remaining) = state.pending_copies.get_mut(key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(CopyOutcome::NotYetRestored);
            }
        }
        state
            .objects
            .insert(key.to_string(), ObjectClass::from_provider(Some(class.as_str())));
        Ok(CopyOutcome::Transitioned)
    }

    async fn head_restore_status(&self, _bucket: &str, key: &str) -> ProviderResult<Option<String>> {
        let mut state = self.state();
        state.calls.push(Call::Head {
            key: key.to_string(),
        });
        if let Some(err) = state.head_failures.get(key) {
            return Err(err.clone());
        }
        Ok(state.restore_headers.get(key).cloned())
    }
}
