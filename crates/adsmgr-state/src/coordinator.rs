//! Apply, dispatch, and roll back around every change sent to the platform.
//!
//! 1. The overlay is written to the [`OptimisticStore`] before the request
//!    leaves, so reads never show the pre-edit value.
//! 2. The change is dispatched once.
//! 3. On success the overlay stays until it expires and the caller waits the
//!    settle delay before re-reading the view.
//! 4. On failure the overlay is cleared and the error is returned.

use std::collections::HashSet;
use std::time::Duration;

use adsmgr_core::{AppConfig, EntityType, MutationField};
use adsmgr_webhook::{FieldUpdate, WebhookError};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::dispatch::MutationDispatcher;
use crate::store::OptimisticStore;

const DEFAULT_SETTLE_DELAY_MS: u64 = 2_000;
const DEFAULT_BUDGET_CONFIRM_MULTIPLIER: f64 = 4.0;

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("invalid mutation: {0}")]
    Validation(String),

    #[error(
        "budget change from {current} to {requested} is at least {multiplier}x the current budget and needs confirmation"
    )]
    ConfirmationRequired {
        current: f64,
        requested: f64,
        multiplier: f64,
    },

    #[error("dispatch failed for {key}: {source}")]
    Dispatch {
        key: String,
        #[source]
        source: WebhookError,
    },
}

/// The object a change applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationTarget {
    pub entity_type: EntityType,
    /// Platform id sent to the webhook.
    pub real_id: String,
    /// Overlay key when it differs from `real_id` (aggregated rows use their
    /// first ad id).
    pub key: Option<String>,
    /// Daily budget currently in effect. Required for budget changes; `0`
    /// means the object has no daily budget of its own.
    pub current_budget: Option<f64>,
}

impl MutationTarget {
    #[must_use]
    pub fn new(entity_type: EntityType, real_id: impl Into<String>) -> Self {
        Self {
            entity_type,
            real_id: real_id.into(),
            key: None,
            current_budget: None,
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_current_budget(mut self, budget: f64) -> Self {
        self.current_budget = Some(budget);
        self
    }

    #[must_use]
    pub fn overlay_key(&self) -> &str {
        self.key
            .as_deref()
            .filter(|k| !k.is_empty())
            .unwrap_or(&self.real_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkFailure {
    pub real_id: String,
    pub key: String,
    pub error: String,
}

/// Per-item result of a bulk change. Failed items have already been rolled
/// back; succeeded items keep their overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

impl BulkOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatorSettings {
    pub settle_delay: Duration,
    pub budget_confirm_multiplier: f64,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            budget_confirm_multiplier: DEFAULT_BUDGET_CONFIRM_MULTIPLIER,
        }
    }
}

impl CoordinatorSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            budget_confirm_multiplier: config.budget_confirm_multiplier,
        }
    }
}

pub struct MutationCoordinator<D> {
    store: OptimisticStore,
    dispatcher: D,
    settings: CoordinatorSettings,
}

impl<D: MutationDispatcher> MutationCoordinator<D> {
    #[must_use]
    pub fn new(store: OptimisticStore, dispatcher: D, settings: CoordinatorSettings) -> Self {
        Self {
            store,
            dispatcher,
            settings,
        }
    }

    #[must_use]
    pub fn store(&self) -> &OptimisticStore {
        &self.store
    }

    #[must_use]
    pub fn settings(&self) -> CoordinatorSettings {
        self.settings
    }

    /// Changes the status or objective of one object.
    ///
    /// # Errors
    ///
    /// [`MutationError::Validation`] before anything is written (including
    /// any budget change, which must go through [`Self::update_budget`]), or
    /// [`MutationError::Dispatch`] after the overlay was rolled back.
    pub async fn update_field(
        &self,
        target: &MutationTarget,
        field: MutationField,
        value: Value,
        actor: &str,
    ) -> Result<(), MutationError> {
        let value = validate_value(field, value)?;
        validate_target(target)?;
        self.apply_and_dispatch(target, field, value, actor).await?;
        self.settle().await;
        Ok(())
    }

    /// Changes a daily budget, asking for confirmation on large increases.
    ///
    /// The gate compares against `target.current_budget`, which must be set.
    ///
    /// # Errors
    ///
    /// [`MutationError::Validation`] for a non-finite or non-positive budget
    /// or a missing current budget, [`MutationError::ConfirmationRequired`]
    /// when `requested >= multiplier * current` and `confirmed` is false
    /// (nothing is written or sent), otherwise [`MutationError::Dispatch`]
    /// after the overlay was rolled back.
    pub async fn update_budget(
        &self,
        target: &MutationTarget,
        requested: f64,
        confirmed: bool,
        actor: &str,
    ) -> Result<(), MutationError> {
        validate_budget(requested)?;
        validate_target(target)?;
        self.check_budget_gate(target, requested, confirmed)?;

        self.apply_and_dispatch(target, MutationField::Budget, Value::from(requested), actor)
            .await?;
        self.settle().await;
        Ok(())
    }

    /// Applies the same status or objective change to every target and
    /// dispatches them concurrently.
    ///
    /// Each failed item is rolled back on its own. The settle delay is
    /// awaited once if at least one item succeeded.
    ///
    /// # Errors
    ///
    /// [`MutationError::Validation`] if the value is invalid, the field is
    /// `budget`, there are no targets, or two targets share an overlay key;
    /// dispatch failures are reported in the outcome instead.
    pub async fn bulk_update(
        &self,
        targets: &[MutationTarget],
        field: MutationField,
        value: Value,
        actor: &str,
    ) -> Result<BulkOutcome, MutationError> {
        let value = validate_value(field, value)?;
        validate_bulk_targets(targets)?;
        Ok(self.dispatch_all(targets, field, &value, actor).await)
    }

    /// Sets the same daily budget on every target.
    ///
    /// Every target is checked against the confirmation gate before anything
    /// is written; one held target holds the whole batch.
    ///
    /// # Errors
    ///
    /// As [`Self::bulk_update`] for validation, plus
    /// [`MutationError::ConfirmationRequired`] for the first target whose
    /// increase needs confirmation.
    pub async fn bulk_update_budget(
        &self,
        targets: &[MutationTarget],
        requested: f64,
        confirmed: bool,
        actor: &str,
    ) -> Result<BulkOutcome, MutationError> {
        validate_budget(requested)?;
        validate_bulk_targets(targets)?;
        for target in targets {
            self.check_budget_gate(target, requested, confirmed)?;
        }

        let value = Value::from(requested);
        Ok(self
            .dispatch_all(targets, MutationField::Budget, &value, actor)
            .await)
    }

    fn check_budget_gate(
        &self,
        target: &MutationTarget,
        requested: f64,
        confirmed: bool,
    ) -> Result<(), MutationError> {
        let current = target.current_budget.ok_or_else(|| {
            MutationError::Validation(format!(
                "current budget of {} is required for a budget change",
                target.real_id
            ))
        })?;
        if !current.is_finite() || current < 0.0 {
            return Err(MutationError::Validation(format!(
                "current budget must be zero or a positive number, got {current}"
            )));
        }

        let multiplier = self.settings.budget_confirm_multiplier;
        if current > 0.0 && requested >= multiplier * current && !confirmed {
            tracing::info!(
                key = %target.overlay_key(),
                current,
                requested,
                "budget change held for confirmation"
            );
            return Err(MutationError::ConfirmationRequired {
                current,
                requested,
                multiplier,
            });
        }
        Ok(())
    }

    async fn dispatch_all(
        &self,
        targets: &[MutationTarget],
        field: MutationField,
        value: &Value,
        actor: &str,
    ) -> BulkOutcome {
        let results = join_all(
            targets
                .iter()
                .map(|target| self.apply_and_dispatch(target, field, value.clone(), actor)),
        )
        .await;

        let mut outcome = BulkOutcome::default();
        for (target, result) in targets.iter().zip(results) {
            match result {
                Ok(()) => outcome.succeeded.push(target.real_id.clone()),
                Err(e) => outcome.failed.push(BulkFailure {
                    real_id: target.real_id.clone(),
                    key: target.overlay_key().to_owned(),
                    error: e.to_string(),
                }),
            }
        }

        tracing::info!(
            field = %field,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "bulk update finished"
        );

        if !outcome.succeeded.is_empty() {
            self.settle().await;
        }
        outcome
    }

    async fn apply_and_dispatch(
        &self,
        target: &MutationTarget,
        field: MutationField,
        value: Value,
        actor: &str,
    ) -> Result<(), MutationError> {
        let key = target.overlay_key();

        let mut overlay = Map::new();
        overlay.insert(field.as_str().to_owned(), value.clone());
        self.store.update_optimistic(key, overlay, target.entity_type);

        let update = FieldUpdate {
            user: actor.to_owned(),
            entity_type: target.entity_type,
            object: target.real_id.clone(),
            field,
            value,
        };

        match self.dispatcher.dispatch(&update).await {
            Ok(()) => {
                tracing::info!(
                    key,
                    entity_type = %target.entity_type,
                    field = %field,
                    actor,
                    "mutation dispatched"
                );
                Ok(())
            }
            Err(source) => {
                self.store.clear_optimistic(key);
                tracing::warn!(
                    key,
                    entity_type = %target.entity_type,
                    field = %field,
                    error = %source,
                    "mutation failed, overlay rolled back"
                );
                Err(MutationError::Dispatch {
                    key: key.to_owned(),
                    source,
                })
            }
        }
    }

    async fn settle(&self) {
        if !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }
    }
}

fn validate_target(target: &MutationTarget) -> Result<(), MutationError> {
    if target.real_id.trim().is_empty() {
        return Err(MutationError::Validation(
            "target id must be non-empty".to_string(),
        ));
    }
    Ok(())
}

/// Targets of one batch must be non-empty and map to distinct overlay keys.
fn validate_bulk_targets(targets: &[MutationTarget]) -> Result<(), MutationError> {
    if targets.is_empty() {
        return Err(MutationError::Validation(
            "bulk update needs at least one target".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for target in targets {
        validate_target(target)?;
        if !seen.insert(target.overlay_key()) {
            return Err(MutationError::Validation(format!(
                "overlay key {} appears more than once",
                target.overlay_key()
            )));
        }
    }
    Ok(())
}

fn validate_budget(budget: f64) -> Result<(), MutationError> {
    if !budget.is_finite() || budget <= 0.0 {
        return Err(MutationError::Validation(format!(
            "budget must be a positive number, got {budget}"
        )));
    }
    Ok(())
}

/// Normalizes `value` for `field`, rejecting values the webhook cannot apply.
fn validate_value(field: MutationField, value: Value) -> Result<Value, MutationError> {
    match field {
        MutationField::Status => {
            let status = value.as_str().map(str::to_ascii_uppercase);
            match status.as_deref() {
                Some(s @ ("ACTIVE" | "PAUSED")) => Ok(Value::from(s)),
                _ => Err(MutationError::Validation(format!(
                    "status must be ACTIVE or PAUSED, got {value}"
                ))),
            }
        }
        MutationField::Budget => Err(MutationError::Validation(
            "budget changes need the current budget and go through the budget update".to_string(),
        )),
        MutationField::Objective => match value.as_str().map(str::trim) {
            Some(objective) if !objective.is_empty() => Ok(Value::from(objective)),
            _ => Err(MutationError::Validation(
                "objective must be a non-empty string".to_string(),
            )),
        },
    }
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
