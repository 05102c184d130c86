//! Add/edit form state
//!
//! `ExpenseDraft` is an immutable value: every edit is a `DraftEvent` applied
//! with [`ExpenseDraft::apply`], which returns the next draft. Nothing here
//! touches storage; [`ExpenseDraft::validate`] turns a complete draft into an
//! [`ExpenseInput`] for the service layer.

use chrono::{DateTime, SubsecRound, Utc};

use super::category::{Category, PaymentMode};
use super::expense::{Expense, ExpenseInput};
use super::ids::ExpenseId;
use super::money::{Money, MoneyParseError};
use crate::error::{ExpenseError, ExpenseResult};

/// A change made to the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEvent {
    AmountChanged(String),
    CategorySelected(Category),
    DescriptionChanged(String),
    /// Dates after "now" are clamped to now
    DateChanged(DateTime<Utc>),
    PaymentModeSelected(PaymentMode),
    RecurringToggled,
    RecurringSet(bool),
}

/// Form state for adding or editing an expense
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseDraft {
    amount: String,
    category: Option<Category>,
    description: String,
    date: DateTime<Utc>,
    payment_mode: PaymentMode,
    is_recurring: bool,
    editing: Option<ExpenseId>,
}

impl Default for ExpenseDraft {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl ExpenseDraft {
    /// A blank draft dated `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            amount: String::new(),
            category: None,
            description: String::new(),
            date: now.trunc_subsecs(3),
            payment_mode: PaymentMode::default(),
            is_recurring: false,
            editing: None,
        }
    }

    /// A draft pre-filled from an existing record
    pub fn for_edit(expense: &Expense) -> Self {
        Self {
            amount: expense.amount.to_exact_string(),
            category: Some(expense.category),
            description: expense.description.clone(),
            date: expense.date,
            payment_mode: expense.payment_mode,
            is_recurring: expense.is_recurring,
            editing: Some(expense.id.clone()),
        }
    }

    /// Apply one event, producing the next draft
    pub fn apply(self, event: DraftEvent) -> Self {
        match event {
            DraftEvent::AmountChanged(amount) => Self { amount, ..self },
            DraftEvent::CategorySelected(category) => Self {
                category: Some(category),
                ..self
            },
            DraftEvent::DescriptionChanged(description) => Self {
                description,
                ..self
            },
            DraftEvent::DateChanged(date) => Self {
                date: date.min(Utc::now()).trunc_subsecs(3),
                ..self
            },
            DraftEvent::PaymentModeSelected(payment_mode) => Self {
                payment_mode,
                ..self
            },
            DraftEvent::RecurringToggled => Self {
                is_recurring: !self.is_recurring,
                ..self
            },
            DraftEvent::RecurringSet(is_recurring) => Self {
                is_recurring,
                ..self
            },
        }
    }

    /// Apply a sequence of events in order
    pub fn apply_all<I: IntoIterator<Item = DraftEvent>>(self, events: I) -> Self {
        events.into_iter().fold(self, Self::apply)
    }

    /// A blank draft, as shown after a successful save
    pub fn reset(&self) -> Self {
        Self::default()
    }

    pub fn amount_text(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn payment_mode(&self) -> PaymentMode {
        self.payment_mode
    }

    pub fn is_recurring(&self) -> bool {
        self.is_recurring
    }

    /// Id of the record being edited, if any
    pub fn editing(&self) -> Option<&ExpenseId> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Names of required fields that are still empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.amount.trim().is_empty() {
            missing.push("amount");
        }
        if self.category.is_none() {
            missing.push("category");
        }
        missing
    }

    /// Check required fields and parse the amount
    pub fn validate(&self) -> ExpenseResult<ExpenseInput> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ExpenseError::Validation(format!(
                "Missing required field(s): {}",
                missing.join(", ")
            )));
        }

        let amount = Money::parse(&self.amount).map_err(|e| match e {
            MoneyParseError::Empty => ExpenseError::Validation("Amount is required".into()),
            other => ExpenseError::Validation(other.to_string()),
        })?;

        let category = self
            .category
            .ok_or_else(|| ExpenseError::Validation("Category is required".into()))?;

        Ok(ExpenseInput {
            amount,
            category,
            description: self.description.clone(),
            date: self.date,
            payment_mode: self.payment_mode,
            is_recurring: self.is_recurring,
        })
    }
}
