use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::auth::SessionUser;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: i64,
    pub user_id: String,
    pub description: String,
    pub amount: String, // decimal text, e.g. "450" or "12.50"
    pub category: String,
    pub ptype: String, // "income" or "expense"
    pub created_at: Option<String>,
}

/// Transaction type classifier stored in `expense.ptype`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /expenses`. Missing fields deserialize as empty and are
/// reported by validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddExpenseRequest {
    pub description: String,
    pub amount: String,
    pub category: String,
    pub ptype: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl StatusResponse {
    pub fn success(message: &str, id: Option<i64>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpenseTotals {
    /// Sum of every parsable amount regardless of type
    pub total: Decimal,
    pub income_total: Decimal,
    pub expense_total: Decimal,
    /// Rows whose amount could not be parsed
    pub skipped: usize,
}

#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub user: SessionUser,
    pub picture_url: String,
    pub expenses: Vec<Expense>,
    pub totals: ExpenseTotals,
}
