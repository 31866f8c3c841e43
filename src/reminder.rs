//! The daily reminder dispatcher.
//!
//! Once a day at a configured local wall-clock time, the dispatcher scans
//! every open, notification-enabled debt and emails the installment that
//! falls due today according to the debt's payment schedule. One failed
//! send does not stop the scan; the remaining debts still get their
//! reminders.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::{Date, OffsetDateTime, Time, UtcOffset};

use crate::{
    Error,
    debt::{
        DebtStatus,
        core::{Debt, get_all_debts, payment_plan},
    },
    mailer::{EmailMessage, Mailer},
    timezone::get_local_offset,
};

/// Run the reminder dispatcher until the process exits.
///
/// Sleeps until the next occurrence of `send_time` in `local_timezone`,
/// runs one scan, and repeats. An unknown timezone falls back to UTC.
pub async fn run_reminder_dispatcher<M>(
    db_connection: Arc<Mutex<Connection>>,
    mailer: M,
    local_timezone: String,
    send_time: Time,
) where
    M: Mailer,
{
    loop {
        let offset = get_local_offset(&local_timezone).unwrap_or(UtcOffset::UTC);
        let now = OffsetDateTime::now_utc().to_offset(offset);
        tokio::time::sleep(next_run_delay(now, send_time)).await;

        let offset = get_local_offset(&local_timezone).unwrap_or(UtcOffset::UTC);
        let today = OffsetDateTime::now_utc().to_offset(offset).date();

        match scan_and_send(&db_connection, &mailer, today).await {
            Ok(sent) => tracing::info!("reminder scan finished, sent {sent} reminder(s)"),
            Err(error) => tracing::error!("reminder scan failed: {error}"),
        }
    }
}

/// Email a reminder for every debt with an installment due on `today`.
///
/// Returns the number of reminders sent. A send failure is logged and the
/// scan continues with the next debt.
///
/// # Errors
/// This function will return an error if the due debts cannot be read
/// from the store.
pub async fn scan_and_send<M>(
    db_connection: &Arc<Mutex<Connection>>,
    mailer: &M,
    today: Date,
) -> Result<u32, Error>
where
    M: Mailer,
{
    let due = {
        let connection = db_connection.lock().map_err(|_| Error::DatabaseLockError)?;
        due_reminders(today, &connection)?
    };

    let mut sent = 0;
    for (debt, amount_due) in due {
        let message = reminder_message(&debt, amount_due);

        match mailer.send(&message).await {
            Ok(()) => sent += 1,
            Err(error) => {
                tracing::error!("could not send a reminder for debt {}: {error}", debt.id);
            }
        }
    }

    Ok(sent)
}

/// The open, notification-enabled debts with an installment scheduled for
/// `today`, paired with the amount due.
///
/// Debts without a contact address are skipped, as are debts whose
/// schedule cannot be generated.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn due_reminders(today: Date, connection: &Connection) -> Result<Vec<(Debt, f64)>, Error> {
    let mut due = Vec::new();

    for debt in get_all_debts(connection)? {
        if !debt.is_notified || debt.status == DebtStatus::Closed || debt.email.is_none() {
            continue;
        }

        let plan = match payment_plan(&debt) {
            Ok(plan) => plan,
            Err(error) => {
                tracing::warn!("skipping the schedule for debt {}: {error}", debt.id);
                continue;
            }
        };

        if let Some(amount_due) = installment_due(&debt, &plan, today) {
            due.push((debt, amount_due));
        }
    }

    Ok(due)
}

/// The amount due for `debt` on `today`, or [None] when no installment is
/// scheduled for that day.
///
/// The outstanding amount is divided evenly over the remaining scheduled
/// dates; on the final date the whole outstanding amount is due.
fn installment_due(debt: &Debt, plan: &[Date], today: Date) -> Option<f64> {
    if !plan.contains(&today) {
        return None;
    }

    let remaining = plan.iter().filter(|date| **date >= today).count();

    if remaining <= 1 {
        Some(debt.return_amount)
    } else {
        Some(debt.return_amount / remaining as f64)
    }
}

/// Format the reminder email for an installment of `amount_due` on `debt`.
pub fn reminder_message(debt: &Debt, amount_due: f64) -> EmailMessage {
    EmailMessage {
        to: debt.email.clone().unwrap_or_default(),
        subject: format!("Payment Reminder: {}", debt.category),
        body: format!(
            "A payment of {amount_due:.2} for the debt in the category '{}' is due today. \
             {} still remains to be paid in total.\n\nYour note: {}\n",
            debt.category, debt.return_amount, debt.reminder
        ),
    }
}

/// The time from `now` until the next occurrence of `at` on the same
/// clock.
///
/// If `at` has already passed today, the delay runs to tomorrow's
/// occurrence.
pub(crate) fn next_run_delay(now: OffsetDateTime, at: Time) -> std::time::Duration {
    let mut next = now.replace_time(at);

    if next <= now {
        next += time::Duration::days(1);
    }

    std::time::Duration::try_from(next - now).unwrap_or(std::time::Duration::from_secs(60))
}
