//! Change the due date or notes of a loan

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::find_visible_for_update;
use crate::audit::{AuditContext, AuditRecorder};
use crate::features::loans::LoanError;
use crate::models::loan::{loan_returning, Loan};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLoanCommand {
    #[serde(skip)]
    pub id: Uuid,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl crate::cqrs::middleware::Command for UpdateLoanCommand {}

impl UpdateLoanCommand {
    pub fn validate(&self) -> Result<(), LoanError> {
        if self.due_date.is_none() && self.notes.is_none() {
            return Err(LoanError::NoFieldsToUpdate);
        }
        Ok(())
    }

    /// The due date may not fall before the day the book was borrowed
    fn check_due_date(&self, loan: &Loan) -> Result<(), LoanError> {
        match self.due_date {
            Some(due) if due < loan.borrowed_at.date_naive() => Err(LoanError::InvalidField(
                "Due date cannot be before the loan date".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[tracing::instrument(skip(pool, recorder, ctx, command), fields(loan_id = %command.id))]
pub async fn handle(
    pool: &PgPool,
    recorder: &AuditRecorder,
    ctx: &AuditContext,
    borrower: Option<Uuid>,
    command: UpdateLoanCommand,
) -> Result<Loan, LoanError> {
    command.validate()?;

    let mut tx = pool.begin().await?;

    let before = find_visible_for_update(&mut *tx, command.id, borrower)
        .await?
        .ok_or(LoanError::NotFound(command.id))?;
    command.check_due_date(&before)?;

    let after = sqlx::query_as::<_, Loan>(&loan_returning(
        r#"
        UPDATE loans SET
            due_date = COALESCE($2, due_date),
            notes = COALESCE($3, notes)
        WHERE id = $1
        RETURNING *
        "#,
    ))
    .bind(command.id)
    .bind(command.due_date)
    .bind(&command.notes)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    recorder.updated(ctx, &before, &after).await;
    Ok(after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_validation() {
        assert!(matches!(
            UpdateLoanCommand::default().validate(),
            Err(LoanError::NoFieldsToUpdate)
        ));

        let loan = Loan {
            id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            book_title: "Pedro Páramo".to_string(),
            user_id: Uuid::new_v4(),
            username: "reader".to_string(),
            borrowed_at: Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 24).unwrap(),
            returned_at: None,
            status: "active".to_string(),
            notes: None,
        };

        let earlier = UpdateLoanCommand {
            due_date: NaiveDate::from_ymd_opt(2026, 3, 9),
            ..Default::default()
        };
        assert!(matches!(earlier.check_due_date(&loan), Err(LoanError::InvalidField(_))));

        let same_day = UpdateLoanCommand {
            due_date: NaiveDate::from_ymd_opt(2026, 3, 10),
            ..Default::default()
        };
        assert!(same_day.check_due_date(&loan).is_ok());
    }
}
