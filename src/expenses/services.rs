use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::models::{AddExpenseRequest, Expense, ExpenseTotals, TransactionType};
use super::validators::parse_amount;
use crate::auth::models::User;
use crate::common::{safe_email_log, ApiError, Validator};

pub struct ExpenseService {
    db: SqlitePool,
}

impl ExpenseService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    // ============================================================================
    // Users
    // ============================================================================

    /// Look up the user by identity key, inserting it on first sight.
    ///
    /// Existing rows are never updated, so a later login with a changed name
    /// or picture keeps the stored values.
    pub async fn register_or_get_user(
        &self,
        google_id: &str,
        name: &str,
        email: &str,
        picture: &str,
    ) -> Result<String, ApiError> {
        if google_id.trim().is_empty() {
            return Err(ApiError::BadRequest("Identity key is required".to_string()));
        }

        let existing = sqlx::query_as::<_, User>(
            "SELECT google_id, name, email, picture, created_at FROM users WHERE google_id = ?",
        )
        .bind(google_id)
        .fetch_optional(&self.db)
        .await?;

        if let Some(user) = existing {
            return Ok(user.google_id);
        }

        if email.trim().is_empty() {
            return Err(ApiError::BadRequest("Email is required".to_string()));
        }

        // A concurrent first request may insert between the lookup and here.
        let inserted = sqlx::query(
            r#"
            INSERT INTO users (google_id, name, email, picture)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(google_id) DO NOTHING
            "#,
        )
        .bind(google_id)
        .bind(name)
        .bind(email)
        .bind(picture)
        .execute(&self.db)
        .await
        .map_err(|e| match e {
            // Only the email column can still collide once google_id is covered.
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                warn!(
                    google_id = %google_id,
                    email = %safe_email_log(email),
                    "Email already registered to another account"
                );
                ApiError::Conflict(
                    "This email address is already registered to another account".to_string(),
                )
            }
            other => ApiError::DatabaseError(other),
        })?
        .rows_affected();

        if inserted > 0 {
            info!(
                google_id = %google_id,
                email = %safe_email_log(email),
                "Registered new user"
            );
        }

        Ok(google_id.to_string())
    }

    // ============================================================================
    // Expense CRUD Operations
    // ============================================================================

    /// Validate and insert an expense, returning its id
    pub async fn add_expense(
        &self,
        user_id: &str,
        request: &AddExpenseRequest,
    ) -> Result<i64, ApiError> {
        let validation_result = request.validate(request);
        if !validation_result.is_valid {
            return Err(ApiError::from(validation_result));
        }
        let amount = parse_amount(&request.amount)
            .map_err(|message| ApiError::ValidationError(format!("amount: {}", message)))?;

        let id = sqlx::query(
            r#"
            INSERT INTO expense (user_id, description, amount, category, ptype)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(request.description.trim())
        .bind(amount.to_string())
        .bind(request.category.trim())
        .bind(request.ptype.trim())
        .execute(&self.db)
        .await?
        .last_insert_rowid();

        info!(user_id = %user_id, expense_id = id, "Added expense");
        Ok(id)
    }

    /// All expenses of a user in creation order
    pub async fn list_expenses(&self, user_id: &str) -> Result<Vec<Expense>, ApiError> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, user_id, description, amount, category, ptype, created_at
            FROM expense
            WHERE user_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(expenses)
    }

    /// Delete an expense owned by `user_id`.
    ///
    /// Returns the number of rows removed; an unknown or foreign id removes
    /// nothing and is not an error.
    pub async fn delete_expense(&self, user_id: &str, expense_id: i64) -> Result<u64, ApiError> {
        let removed = sqlx::query("DELETE FROM expense WHERE id = ? AND user_id = ?")
            .bind(expense_id)
            .bind(user_id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if removed == 0 {
            debug!(user_id = %user_id, expense_id, "Delete matched no owned expense");
        } else {
            info!(user_id = %user_id, expense_id, "Deleted expense");
        }

        Ok(removed)
    }
}

/// Sum the amounts of `expenses`, skipping rows whose amount is not a number
/// or would overflow the running totals
pub fn compute_totals(expenses: &[Expense]) -> ExpenseTotals {
    let mut totals = ExpenseTotals::default();

    for expense in expenses {
        let amount = match Decimal::from_str(expense.amount.trim()) {
            Ok(amount) => amount,
            Err(e) => {
                warn!(
                    expense_id = expense.id,
                    amount = %expense.amount,
                    error = %e,
                    "Skipping expense with invalid amount"
                );
                totals.skipped += 1;
                continue;
            }
        };

        match accumulate(&totals, amount, expense.ptype.parse().ok()) {
            Some(next) => totals = next,
            None => {
                warn!(
                    expense_id = expense.id,
                    amount = %expense.amount,
                    "Skipping expense whose amount overflows the totals"
                );
                totals.skipped += 1;
            }
        }
    }

    totals
}

fn accumulate(
    totals: &ExpenseTotals,
    amount: Decimal,
    ptype: Option<TransactionType>,
) -> Option<ExpenseTotals> {
    let mut next = totals.clone();
    next.total = next.total.checked_add(amount)?;
    match ptype {
        Some(TransactionType::Income) => {
            next.income_total = next.income_total.checked_add(amount)?
        }
        Some(TransactionType::Expense) => {
            next.expense_total = next.expense_total.checked_add(amount)?
        }
        None => {}
    }
    Some(next)
}
