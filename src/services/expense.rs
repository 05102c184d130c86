//! Expense service
//!
//! Create, update and delete expenses. Every mutation is one
//! read-modify-write cycle against the store, guarded by the revision
//! compare-and-swap, and is recorded in the audit log when one is attached.

use chrono::{SubsecRound, Utc};

use crate::audit::{AuditEntry, AuditLogger};
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{DraftEvent, Expense, ExpenseDraft, ExpenseId, ExpenseInput, Period};
use crate::reports;
use crate::storage::{ExpenseStore, KeyValueStore};

/// Service for expense management
pub struct ExpenseService<'a, S> {
    store: &'a ExpenseStore<S>,
    audit: Option<&'a AuditLogger>,
}

impl<'a, S: KeyValueStore> ExpenseService<'a, S> {
    pub fn new(store: &'a ExpenseStore<S>) -> Self {
        Self { store, audit: None }
    }

    /// Record every mutation in `logger`
    pub fn with_audit(mut self, logger: &'a AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    /// Append a new expense with a fresh id
    pub fn create(&self, input: ExpenseInput) -> ExpenseResult<Expense> {
        let (mut expenses, revision) = self.store.load_versioned()?;

        let now = Utc::now().trunc_subsecs(3);
        let id = ExpenseId::unique_from(now, expenses.iter().map(|e| &e.id));
        let expense = Expense::from_input(id, input, Some(now));

        expenses.push(expense.clone());
        self.store.save_if_unchanged(&expenses, revision)?;

        log::info!("created expense {}", expense.id);
        self.record(AuditEntry::create(
            expense.id.as_str(),
            Some(expense.label()),
            &expense,
        ));

        Ok(expense)
    }

    /// Replace the expense with `id`, keeping its creation time
    pub fn update(&self, id: &ExpenseId, input: ExpenseInput) -> ExpenseResult<Expense> {
        self.replace_with(id, |_| Ok(input))
    }

    /// Apply form events to the stored expense with `id` and save the result
    ///
    /// The draft is built from the same load that the save is checked
    /// against, so a change made in between surfaces as a conflict.
    pub fn edit<I>(&self, id: &ExpenseId, events: I) -> ExpenseResult<Expense>
    where
        I: IntoIterator<Item = DraftEvent>,
    {
        self.replace_with(id, |current| {
            ExpenseDraft::for_edit(current).apply_all(events).validate()
        })
    }

    fn replace_with<F>(&self, id: &ExpenseId, build: F) -> ExpenseResult<Expense>
    where
        F: FnOnce(&Expense) -> ExpenseResult<ExpenseInput>,
    {
        let (mut expenses, revision) = self.store.load_versioned()?;

        let slot = expenses
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| ExpenseError::expense_not_found(id.as_str()))?;

        let input = build(&*slot)?;
        let before = slot.clone();
        *slot = Expense::from_input(id.clone(), input, before.created_at);
        let after = slot.clone();

        self.store.save_if_unchanged(&expenses, revision)?;

        log::info!("updated expense {}", id);
        self.record(AuditEntry::update(
            id.as_str(),
            Some(after.label()),
            &before,
            &after,
        ));

        Ok(after)
    }

    /// Remove the expense with `id` and return it
    pub fn delete(&self, id: &ExpenseId) -> ExpenseResult<Expense> {
        let (mut expenses, revision) = self.store.load_versioned()?;

        let index = expenses
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| ExpenseError::expense_not_found(id.as_str()))?;
        let removed = expenses.remove(index);

        self.store.save_if_unchanged(&expenses, revision)?;

        log::info!("deleted expense {}", id);
        self.record(AuditEntry::delete(
            id.as_str(),
            Some(removed.label()),
            &removed,
        ));

        Ok(removed)
    }

    /// Validate a form draft and create or update from it
    ///
    /// Nothing is read or written when the draft is incomplete.
    pub fn submit(&self, draft: &ExpenseDraft) -> ExpenseResult<Expense> {
        let input = draft.validate()?;
        match draft.editing() {
            Some(id) => self.update(id, input),
            None => self.create(input),
        }
    }

    pub fn get(&self, id: &ExpenseId) -> ExpenseResult<Option<Expense>> {
        Ok(self.store.load_all()?.into_iter().find(|e| &e.id == id))
    }

    /// Like [`get`](Self::get) but an unknown id is an error
    pub fn require(&self, id: &ExpenseId) -> ExpenseResult<Expense> {
        self.get(id)?
            .ok_or_else(|| ExpenseError::expense_not_found(id.as_str()))
    }

    /// All expenses, most recent first
    pub fn list(&self) -> ExpenseResult<Vec<Expense>> {
        let mut expenses = self.store.load_all()?;
        reports::sort_by_date_desc(&mut expenses);
        Ok(expenses)
    }

    /// Expenses in `period`, most recent first
    pub fn list_in(&self, period: Period) -> ExpenseResult<Vec<Expense>> {
        let mut expenses = reports::filter_by_period(&self.store.load_all()?, period);
        reports::sort_by_date_desc(&mut expenses);
        Ok(expenses)
    }

    fn record(&self, entry: AuditEntry) {
        if let Some(logger) = self.audit {
            // The data is already saved; a failed audit write must not undo it.
            if let Err(e) = logger.log(&entry) {
                log::warn!("failed to write audit entry: {}", e);
            }
        }
    }
}
