//! Test doubles and common utilities for reconciler contract tests
//!
//! The doubles count every call so tests can assert which steps of a run
//! were (or were not) reached.

#![allow(dead_code)]

use dnsync_core::error::{Error, Result};
use dnsync_core::traits::{DnsProvider, DnsRecord, IpSource, PublicIp, RecordUpdate};
use dnsync_core::DdnsConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Builds a fresh error for each failing call
pub type ErrorFactory = fn() -> Error;

/// An IpSource that returns a fixed body, or fails
pub struct StaticIpSource {
    body: Arc<Mutex<String>>,
    failure: Option<ErrorFactory>,
    call_count: Arc<AtomicUsize>,
}

impl StaticIpSource {
    /// Source answering with `body` (untrimmed, as an echo service would)
    pub fn new(body: &str) -> Self {
        Self {
            body: Arc::new(Mutex::new(body.to_string())),
            failure: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Source that fails every call
    pub fn failing(failure: ErrorFactory) -> Self {
        Self {
            body: Arc::new(Mutex::new(String::new())),
            failure: Some(failure),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a source that shares state and counters with `other`
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            body: Arc::clone(&other.body),
            failure: other.failure,
            call_count: Arc::clone(&other.call_count),
        }
    }

    /// Change what the echo service answers with
    pub fn set_body(&self, body: &str) {
        *self.body.lock().unwrap() = body.to_string();
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<PublicIp> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        Ok(PublicIp::new(self.body.lock().unwrap().as_str()))
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

/// A DnsProvider holding one record in memory
///
/// Successful updates are applied to the stored record, so a second run
/// sees the result of the first.
pub struct MockDnsProvider {
    record: Arc<Mutex<DnsRecord>>,
    get_failures: Arc<Mutex<Vec<Error>>>,
    update_failure: Option<ErrorFactory>,
    get_call_count: Arc<AtomicUsize>,
    update_call_count: Arc<AtomicUsize>,
    updates: Arc<Mutex<Vec<RecordUpdate>>>,
}

impl MockDnsProvider {
    pub fn new(record: DnsRecord) -> Self {
        Self {
            record: Arc::new(Mutex::new(record)),
            get_failures: Arc::new(Mutex::new(Vec::new())),
            update_failure: None,
            get_call_count: Arc::new(AtomicUsize::new(0)),
            update_call_count: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail the next get_record() calls, one queued error per call
    pub fn with_get_failures(self, failures: Vec<Error>) -> Self {
        *self.get_failures.lock().unwrap() = failures;
        self
    }

    /// Fail every update_record() call
    pub fn with_update_failure(mut self, failure: ErrorFactory) -> Self {
        self.update_failure = Some(failure);
        self
    }

    /// Create a provider that shares state and counters with `other`
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            record: Arc::clone(&other.record),
            get_failures: Arc::clone(&other.get_failures),
            update_failure: other.update_failure,
            get_call_count: Arc::clone(&other.get_call_count),
            update_call_count: Arc::clone(&other.update_call_count),
            updates: Arc::clone(&other.updates),
        }
    }

    /// Get the number of times get_record() was called
    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times update_record() was called
    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    /// Payloads received by update_record(), in order
    pub fn updates(&self) -> Vec<RecordUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Current stored record
    pub fn record(&self) -> DnsRecord {
        self.record.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn get_record(&self) -> Result<DnsRecord> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        let next_failure = {
            let mut failures = self.get_failures.lock().unwrap();
            if failures.is_empty() {
                None
            } else {
                Some(failures.remove(0))
            }
        };
        if let Some(failure) = next_failure {
            return Err(failure);
        }
        Ok(self.record())
    }

    async fn update_record(&self, update: &RecordUpdate) -> Result<DnsRecord> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().unwrap().push(update.clone());
        if let Some(failure) = self.update_failure {
            return Err(failure());
        }

        let mut record = self.record.lock().unwrap();
        record.record_type = update.record_type.clone();
        record.name = update.name.clone();
        record.content = update.content.clone();
        record.ttl = update.ttl;
        record.proxied = update.proxied;
        Ok(record.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A typical A record for tests
pub fn a_record(content: &str) -> DnsRecord {
    DnsRecord {
        id: "372e67954025e0ba6aaa6d586b9e0b59".to_string(),
        record_type: "A".to_string(),
        name: "home.example.com".to_string(),
        content: content.to_string(),
        ttl: 1,
        proxied: false,
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config() -> DdnsConfig {
    DdnsConfig::new("test-token", "test-zone", "test-record")
}
