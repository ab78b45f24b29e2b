// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconcile outcome policy.
//!
//! Every exit of a reconciliation pass goes through [`ReconcileResultHandler`],
//! which turns it into a scheduling decision for the runtime controller:
//!
//! | Outcome | Action | Error returned |
//! |---|---|---|
//! | `stop` | await change | no |
//! | `requeue_delay` | requeue after the fixed delay | no |
//! | `requeue_delay_with_error` | requeue after the fixed delay, error logged | no |
//! | `requeue_now_with_error` | decided by the controller's error policy | yes |

use crate::gslb_errors::GslbError;
use crate::metrics;
use kube::runtime::controller::Action;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Error handed to the runtime controller's error policy.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ReconcileError(#[from] pub GslbError);

/// Builds the result of one pass and records its outcome.
pub struct ReconcileResultHandler {
    resource_type: &'static str,
    delayed: Duration,
    started: Instant,
}

impl ReconcileResultHandler {
    /// Start timing a pass that requeues after `delayed` on success.
    #[must_use]
    pub fn new(resource_type: &'static str, delayed: Duration) -> Self {
        Self {
            resource_type,
            delayed,
            started: Instant::now(),
        }
    }

    fn record(&self, outcome: &str) {
        metrics::record_reconciliation(self.resource_type, outcome, self.started.elapsed());
    }

    /// Stop; nothing more to do until the resource changes.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn stop(&self) -> Result<Action, ReconcileError> {
        info!(resource_type = self.resource_type, "reconciler exit");
        self.record("stop");
        Ok(Action::await_change())
    }

    /// Run again after the fixed delay.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn requeue_delay(&self) -> Result<Action, ReconcileError> {
        self.record("requeue_delay");
        Ok(Action::requeue(self.delayed))
    }

    /// Log `err` and run again after the fixed delay.
    ///
    /// # Errors
    ///
    /// Never fails; the error is absorbed.
    pub fn requeue_delay_with_error(&self, err: GslbError) -> Result<Action, ReconcileError> {
        error!(resource_type = self.resource_type, reason = err.status_reason(), error = %err, "reconciler error");
        metrics::record_error(self.resource_type, err.status_reason());
        self.record("requeue_delay_with_error");
        Ok(Action::requeue(self.delayed))
    }

    /// Hand `err` to the controller; its error policy decides when to retry.
    ///
    /// # Errors
    ///
    /// Always returns `err`.
    pub fn requeue_now_with_error(&self, err: GslbError) -> Result<Action, ReconcileError> {
        metrics::record_error(self.resource_type, err.status_reason());
        self.record("requeue_now_with_error");
        Err(err.into())
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod result_tests;
