//! Shared test helpers for license tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tuneup_license::{CheckOutcome, LicenseValidator, Notice, Prompter};
use tuneup_types::{ActivationKey, Fingerprint, Verdict};

/// Validator that answers from a script and records what it was asked.
#[derive(Clone, Default)]
pub struct ScriptedValidator {
    answers: Arc<Mutex<VecDeque<CheckOutcome>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedValidator {
    pub fn new(answers: impl IntoIterator<Item = CheckOutcome>) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.into_iter().collect())),
            calls: Arc::default(),
        }
    }

    /// Keys checked so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LicenseValidator for ScriptedValidator {
    async fn check(&self, key: &ActivationKey, _fingerprint: &Fingerprint) -> CheckOutcome {
        self.calls.lock().unwrap().push(key.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(CheckOutcome::Unreachable("script exhausted".into()))
    }
}

/// Validator that accepts exactly one key.
pub struct OneKeyValidator(pub &'static str);

#[async_trait]
impl LicenseValidator for OneKeyValidator {
    async fn check(&self, key: &ActivationKey, _fingerprint: &Fingerprint) -> CheckOutcome {
        if key.as_str() == self.0 {
            CheckOutcome::Valid(Verdict::Validated)
        } else {
            CheckOutcome::Invalid(Verdict::KeyNotFound)
        }
    }
}

/// Prompter that replays typed answers and records notices.
#[derive(Clone, Default)]
pub struct ScriptedPrompter {
    keys: Arc<Mutex<VecDeque<String>>>,
    emails: Arc<Mutex<VecDeque<String>>>,
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl ScriptedPrompter {
    pub fn with_keys(keys: &[&str]) -> Self {
        Self {
            keys: Arc::new(Mutex::new(keys.iter().map(|s| s.to_string()).collect())),
            ..Default::default()
        }
    }

    pub fn with_emails(emails: &[&str]) -> Self {
        Self {
            emails: Arc::new(Mutex::new(emails.iter().map(|s| s.to_string()).collect())),
            ..Default::default()
        }
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn keys_left(&self) -> usize {
        self.keys.lock().unwrap().len()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask_key(&mut self) -> Option<String> {
        self.keys.lock().unwrap().pop_front()
    }

    async fn ask_email(&mut self) -> Option<String> {
        self.emails.lock().unwrap().pop_front()
    }

    async fn notify(&mut self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub fn test_fingerprint() -> Fingerprint {
    Fingerprint::parse("test-machine").unwrap()
}
