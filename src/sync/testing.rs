//! In-memory remote used by engine tests.
//!
//! Imports upsert by key, so repeating a batch leaves the same state,
//! matching the at-least-once contract real services must honor. Every call
//! is recorded, including failed ones.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::model::Redirect;
use crate::remote::RemoteClient;
use crate::sync::file::RecordInput;
use crate::sync::interrupt::CancelToken;

/// A scripted misbehavior for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Fail with a retryable error without applying anything.
    Transient,
    /// Fail with a payload rejection without applying anything.
    Rejection,
    /// Apply the batch, fire the interrupt, and never answer.
    InterruptAfterApply,
}

#[derive(Default)]
struct State {
    redirects: BTreeMap<String, Redirect>,
    imports: Vec<Vec<String>>,
    deletes: Vec<Vec<String>>,
    import_faults: HashMap<usize, Fault>,
    delete_faults: HashMap<usize, Fault>,
    interrupt: Option<CancelToken>,
}

#[derive(Default)]
pub struct MemoryRemote {
    state: Mutex<State>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remote that already holds redirects for `keys`.
    pub fn with_keys(keys: &[&str]) -> Self {
        let remote = Self::new();
        {
            let mut state = remote.state.lock().unwrap();
            for key in keys {
                state.redirects.insert((*key).to_string(), Redirect::key_only(*key));
            }
        }
        remote
    }

    /// Misbehave on the `call`-th import (zero-based, failed calls count).
    pub fn fault_import(self, call: usize, fault: Fault) -> Self {
        self.state.lock().unwrap().import_faults.insert(call, fault);
        self
    }

    /// Misbehave on the `call`-th delete.
    pub fn fault_delete(self, call: usize, fault: Fault) -> Self {
        self.state.lock().unwrap().delete_faults.insert(call, fault);
        self
    }

    /// Token fired by [`Fault::InterruptAfterApply`].
    pub fn interrupt_with(&self, token: CancelToken) {
        self.state.lock().unwrap().interrupt = Some(token);
    }

    pub fn keys(&self) -> Vec<String> {
        self.state.lock().unwrap().redirects.keys().cloned().collect()
    }

    pub fn snapshot(&self) -> BTreeMap<String, Redirect> {
        self.state.lock().unwrap().redirects.clone()
    }

    pub fn import_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().imports.clone()
    }

    pub fn delete_calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().deletes.clone()
    }

    /// How many import calls carried `key`.
    pub fn times_imported(&self, key: &str) -> usize {
        self.import_calls()
            .iter()
            .filter(|call| call.iter().any(|k| k == key))
            .count()
    }
}

fn fail(fault: Fault) -> Error {
    match fault {
        Fault::Transient => Error::RemoteTransient("simulated outage".into()),
        Fault::Rejection => Error::RemoteRejection {
            status: 422,
            message: "simulated rejection".into(),
        },
        Fault::InterruptAfterApply => unreachable!("interrupt faults do not fail"),
    }
}

impl RemoteClient for MemoryRemote {
    async fn import(&self, records: &[Redirect]) -> Result<()> {
        let interrupt = {
            let mut state = self.state.lock().unwrap();
            let call = state.imports.len();
            state
                .imports
                .push(records.iter().map(|r| r.from.clone()).collect());

            let fault = state.import_faults.get(&call).copied();
            if let Some(f @ (Fault::Transient | Fault::Rejection)) = fault {
                return Err(fail(f));
            }
            for record in records {
                state.redirects.insert(record.from.clone(), record.clone());
            }
            if fault == Some(Fault::InterruptAfterApply) {
                state.interrupt.clone()
            } else {
                None
            }
        };

        if let Some(token) = interrupt {
            token.cancel();
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn delete(&self, keys: &[&str]) -> Result<()> {
        let interrupt = {
            let mut state = self.state.lock().unwrap();
            let call = state.deletes.len();
            state.deletes.push(keys.iter().map(|k| (*k).to_string()).collect());

            let fault = state.delete_faults.get(&call).copied();
            if let Some(f @ (Fault::Transient | Fault::Rejection)) = fault {
                return Err(fail(f));
            }
            for key in keys {
                state.redirects.remove(*key);
            }
            if fault == Some(Fault::InterruptAfterApply) {
                state.interrupt.clone()
            } else {
                None
            }
        };

        if let Some(token) = interrupt {
            token.cancel();
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.keys())
    }
}

/// Build an in-memory input whose raw bytes are the JSON of `records`.
pub fn input_of(records: Vec<Redirect>) -> RecordInput {
    RecordInput {
        path: "memory.json".into(),
        raw: serde_json::to_vec(&records).unwrap(),
        records,
    }
}

/// `n` valid import records `/r0 .. /r{n-1}`.
pub fn redirects(n: usize) -> Vec<Redirect> {
    (0..n)
        .map(|i| Redirect {
            from: format!("/r{i}"),
            to: Some(format!("/new/{i}")),
            kind: Some("301".into()),
            end_date: None,
        })
        .collect()
}
