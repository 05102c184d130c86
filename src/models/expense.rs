//! Expense record model
//!
//! The on-disk spelling of every field (camelCase keys, ISO-8601 dates with
//! milliseconds, decimal amounts) matches the collections written by earlier
//! versions of the app, so existing data loads unchanged.

use chrono::{DateTime, Local, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::category::{Category, PaymentMode};
use super::ids::ExpenseId;
use super::money::Money;

/// A single tracked spending event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,

    pub amount: Money,

    pub category: Category,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,

    /// When the money was spent
    #[serde(with = "iso_datetime")]
    pub date: DateTime<Utc>,

    #[serde(default)]
    pub payment_mode: PaymentMode,

    #[serde(default)]
    pub is_recurring: bool,

    /// Set once at creation and carried across edits. Older collections may
    /// lack it.
    #[serde(
        default,
        with = "iso_datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Expense {
    /// Build a record from validated input
    ///
    /// Timestamps are cut to whole milliseconds, the precision they are
    /// stored with, so the returned record equals the one read back.
    pub fn from_input(
        id: ExpenseId,
        input: ExpenseInput,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            amount: input.amount,
            category: input.category,
            description: input.description,
            date: input.date.trunc_subsecs(3),
            payment_mode: input.payment_mode,
            is_recurring: input.is_recurring,
            created_at: created_at.map(|at| at.trunc_subsecs(3)),
        }
    }

    /// The expense date on the local calendar
    pub fn local_date(&self) -> NaiveDate {
        self.date.with_timezone(&Local).date_naive()
    }

    /// Short human label, used in audit entries
    pub fn label(&self) -> String {
        if self.description.is_empty() {
            format!("{} {}", self.category, self.amount)
        } else {
            format!("{} {} ({})", self.category, self.amount, self.description)
        }
    }
}

/// Validated field values for creating or replacing an expense
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseInput {
    pub amount: Money,
    pub category: Category,
    pub description: String,
    pub date: DateTime<Utc>,
    pub payment_mode: PaymentMode,
    pub is_recurring: bool,
}

impl ExpenseInput {
    /// Input with the two required fields; the rest take their defaults
    pub fn new(amount: Money, category: Category) -> Self {
        Self {
            amount,
            category,
            description: String::new(),
            date: Utc::now().trunc_subsecs(3),
            payment_mode: PaymentMode::default(),
            is_recurring: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn payment_mode(mut self, mode: PaymentMode) -> Self {
        self.payment_mode = mode;
        self
    }

    pub fn recurring(mut self, is_recurring: bool) -> Self {
        self.is_recurring = is_recurring;
        self
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// ISO-8601 timestamps with millisecond precision ("2024-01-05T10:00:00.000Z")
///
/// Reading also accepts any RFC 3339 offset and bare `YYYY-MM-DD` dates, which
/// are taken as midnight UTC.
pub mod iso_datetime {
    use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {}", raw)))
    }

    /// Parse an RFC 3339 timestamp or a bare date
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => super::serialize(dt, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid date: {}", raw))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Expense {
        let date = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let input = ExpenseInput::new(Money::from_units(150), Category::Food)
            .description("Lunch")
            .date(date)
            .payment_mode(PaymentMode::Upi);
        Expense::from_input(ExpenseId::from("1710072000000"), input, Some(date))
    }

    #[test]
    fn test_serialized_layout() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["id"], "1710072000000");
        assert_eq!(json["amount"], 150);
        assert_eq!(json["category"], "Food");
        assert_eq!(json["description"], "Lunch");
        assert_eq!(json["date"], "2024-03-10T12:00:00.000Z");
        assert_eq!(json["paymentMode"], "upi");
        assert_eq!(json["isRecurring"], false);
        assert_eq!(json["createdAt"], "2024-03-10T12:00:00.000Z");
    }

    #[test]
    fn test_reads_minimal_legacy_record() {
        let json = r#"{"id":"1","amount":100,"category":"Food","date":"2024-01-05"}"#;
        let expense: Expense = serde_json::from_str(json).unwrap();

        assert_eq!(expense.amount, Money::from_units(100));
        assert_eq!(expense.description, "");
        assert_eq!(expense.payment_mode, PaymentMode::Cash);
        assert!(!expense.is_recurring);
        assert!(expense.created_at.is_none());
        assert_eq!(
            expense.date,
            Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_reads_null_description() {
        let json = r#"{"id":"1","amount":5.5,"category":"Other","description":null,
                       "date":"2024-01-05T08:30:00.000Z"}"#;
        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.description, "");
        assert_eq!(expense.amount, Money::from_cents(550));
    }

    #[test]
    fn test_rejects_unknown_category() {
        let json = r#"{"id":"1","amount":1,"category":"Rent","date":"2024-01-05"}"#;
        assert!(serde_json::from_str::<Expense>(json).is_err());
    }

    #[test]
    fn test_timestamps_keep_stored_precision() {
        let precise = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 29).unwrap()
            + chrono::Duration::nanoseconds(684_312_827);
        let input = ExpenseInput::new(Money::from_units(1), Category::Food).date(precise);
        let expense = Expense::from_input(ExpenseId::from("1"), input, Some(precise));

        let json = serde_json::to_string(&expense).unwrap();
        let reloaded: Expense = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, expense);
        assert_eq!(expense.date.timestamp_subsec_nanos(), 684_000_000);

        let fresh = ExpenseInput::new(Money::from_units(1), Category::Food);
        assert_eq!(fresh.date.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_label() {
        assert_eq!(sample().label(), "Food 150.00 (Lunch)");
    }
}
