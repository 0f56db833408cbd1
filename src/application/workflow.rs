use crate::domain::money::Amount;
use crate::domain::ports::TransactionStoreBox;
use crate::domain::receipt::ProvisionalReceipt;
use crate::domain::transaction::{CategoryTag, PaymentDraft, PaymentMode, Transaction};
use crate::error::{FeeError, Result};
use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Mutex;
use uuid::Uuid;

/// Operator input for one collection action. Everything the draft needs is
/// passed in explicitly; the workflow holds no ambient UI state.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub student: u32,
    pub admission_no: String,
    pub tag: CategoryTag,
    pub amount: Decimal,
    pub mode: PaymentMode,
}

/// Externally visible position of the workflow.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum WorkflowPhase {
    Idle,
    Previewing,
    Submitting,
    Confirmed,
}

enum State {
    Idle,
    Previewing(PaymentDraft),
    Submitting(PaymentDraft),
    Confirmed(Transaction),
}

/// Preview → confirm state machine for recording one payment.
///
/// One instance per in-progress collection. The state sits behind a
/// `std::sync::Mutex` that is never held across an await; `Submitting`
/// doubles as the in-flight guard, so a second `confirm` while the store
/// call is pending is rejected with `Conflict` instead of being queued.
///
/// The workflow never auto-retries a failed confirm. A failure does not
/// prove the write did not happen, so the draft (idempotency key included)
/// is kept intact for an explicit operator retry.
pub struct PaymentWorkflow {
    store: TransactionStoreBox,
    state: Mutex<State>,
}

impl PaymentWorkflow {
    pub fn new(store: TransactionStoreBox) -> Self {
        Self {
            store,
            state: Mutex::new(State::Idle),
        }
    }

    /// Builds a draft for the requested payment and moves to `Previewing`.
    /// Nothing is persisted; the draft carries a provisional receipt
    /// identifier for display and a fresh idempotency key.
    pub fn preview(&self, request: PaymentRequest) -> Result<PaymentDraft> {
        self.preview_at(request, Utc::now().naive_utc())
    }

    /// `preview` with an explicit draft timestamp.
    pub fn preview_at(
        &self,
        request: PaymentRequest,
        drafted_at: NaiveDateTime,
    ) -> Result<PaymentDraft> {
        if request.admission_no.trim().is_empty() {
            return Err(FeeError::Validation(
                "no student selected for collection".to_string(),
            ));
        }
        let amount = Amount::new(request.amount)?;

        let mut state = self.lock_state();
        if !matches!(*state, State::Idle) {
            return Err(FeeError::Conflict(
                "a collection is already in progress".to_string(),
            ));
        }

        let draft = PaymentDraft {
            student: request.student,
            admission_no: request.admission_no.clone(),
            tag: request.tag,
            amount,
            mode: request.mode,
            drafted_at,
            provisional: ProvisionalReceipt::new(drafted_at, &request.admission_no),
            idempotency_key: Uuid::new_v4(),
        };
        *state = State::Previewing(draft.clone());
        Ok(draft)
    }

    /// Persists the previewed draft. Calls `TransactionStore::add` exactly
    /// once; on success the store's transaction (with the authoritative
    /// receipt) replaces the draft and the provisional identifier is gone.
    /// On failure the workflow returns to `Previewing` with the draft
    /// intact so the operator can retry or cancel.
    pub async fn confirm(&self) -> Result<Transaction> {
        let draft = {
            let mut state = self.lock_state();
            match &*state {
                State::Previewing(draft) => {
                    let draft = draft.clone();
                    *state = State::Submitting(draft.clone());
                    draft
                }
                State::Submitting(_) => {
                    return Err(FeeError::Conflict(
                        "a confirm is already in flight".to_string(),
                    ));
                }
                State::Idle => {
                    return Err(FeeError::Conflict(
                        "nothing previewed to confirm".to_string(),
                    ));
                }
                State::Confirmed(_) => {
                    return Err(FeeError::Conflict(
                        "payment already confirmed; reset before the next collection".to_string(),
                    ));
                }
            }
        };

        match self.store.add(draft.clone()).await {
            Ok(tx) => {
                *self.lock_state() = State::Confirmed(tx.clone());
                Ok(tx)
            }
            Err(err) => {
                *self.lock_state() = State::Previewing(draft);
                Err(err)
            }
        }
    }

    /// Discards the previewed draft. No persistence side effect.
    pub fn cancel(&self) -> Result<()> {
        let mut state = self.lock_state();
        match *state {
            State::Previewing(_) => {
                *state = State::Idle;
                Ok(())
            }
            _ => Err(FeeError::Conflict(
                "nothing previewed to cancel".to_string(),
            )),
        }
    }

    /// Clears the confirmed result, ready for the next student.
    pub fn reset(&self) -> Result<()> {
        let mut state = self.lock_state();
        match *state {
            State::Confirmed(_) => {
                *state = State::Idle;
                Ok(())
            }
            _ => Err(FeeError::Conflict(
                "no confirmed payment to reset".to_string(),
            )),
        }
    }

    pub fn phase(&self) -> WorkflowPhase {
        match *self.lock_state() {
            State::Idle => WorkflowPhase::Idle,
            State::Previewing(_) => WorkflowPhase::Previewing,
            State::Submitting(_) => WorkflowPhase::Submitting,
            State::Confirmed(_) => WorkflowPhase::Confirmed,
        }
    }

    /// The draft currently held, if the workflow is in `Previewing` or
    /// `Submitting`.
    pub fn draft(&self) -> Option<PaymentDraft> {
        match &*self.lock_state() {
            State::Previewing(draft) | State::Submitting(draft) => Some(draft.clone()),
            _ => None,
        }
    }

    /// The persisted transaction, once confirmed.
    pub fn confirmed(&self) -> Option<Transaction> {
        match &*self.lock_state() {
            State::Confirmed(tx) => Some(tx.clone()),
            _ => None,
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock means a panic mid-transition; the workflow state
        // is unrecoverable at that point.
        self.state.lock().expect("workflow state lock poisoned")
    }
}
