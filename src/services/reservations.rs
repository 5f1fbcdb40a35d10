//! reservations.rs
//!
//! Создание брони вместе со всеми билетами в одной транзакции.
//!
//! Порядок работы:
//! 1.  Пустой список билетов отклоняется до обращения к базе.
//! 2.  В транзакции вставляется строка брони, затем билеты по порядку:
//!     для каждого находим зал спектакля, проверяем границы ряда и места,
//!     пишем строку билета.
//! 3.  Первая же ошибка откатывает всё: ни брони, ни билетов не остаётся.
//!
//! Двойную продажу места останавливает уникальный индекс
//! `(performance_id, row, seat)`. Из двух конкурентных транзакций побеждает
//! та, что закоммитилась первой; вставка второй падает с unique violation.
//! Если две брони берут одни и те же места в разном порядке, Postgres
//! обрывает одну из них как deadlock (40P01): это тоже проигрыш гонки за место.

use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Hall, Reservation, ReservationWithTickets, Ticket};
use crate::services::validation::{validate_ticket, SeatOutOfRange};

/// Один запрошенный билет из тела POST /reservations/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TicketRequest {
    pub row: i32,
    pub seat: i32,
    pub performance: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReservation {
    #[serde(default)]
    pub tickets: Vec<TicketRequest>,
}

/// Почему конкретный билет не прошёл
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketRejection {
    OutOfRange(SeatOutOfRange),
    SeatTaken { performance: i64, row: i32, seat: i32 },
    UnknownPerformance(i64),
}

impl fmt::Display for TicketRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketRejection::OutOfRange(err) => write!(f, "{err}"),
            TicketRejection::SeatTaken { performance, row, seat } => write!(
                f,
                "seat (row: {row}, seat: {seat}) is already taken for performance {performance}"
            ),
            TicketRejection::UnknownPerformance(id) => write!(f, "performance {id} does not exist"),
        }
    }
}

impl From<SeatOutOfRange> for TicketRejection {
    fn from(err: SeatOutOfRange) -> Self {
        TicketRejection::OutOfRange(err)
    }
}

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("reservation must contain at least one ticket")]
    EmptyReservation,

    /// Транзакция откачена из-за билета с индексом `index`
    #[error("ticket #{index}: {reason}")]
    TicketRejected { index: usize, reason: TicketRejection },

    #[error("could not create reservation")]
    Storage(#[from] sqlx::Error),
}

impl ReservationError {
    fn rejected(index: usize, reason: impl Into<TicketRejection>) -> Self {
        ReservationError::TicketRejected { index, reason: reason.into() }
    }
}

/// Creates a reservation for `user_id` with every requested ticket, or
/// nothing at all.
pub async fn create_reservation(
    pool: &PgPool,
    user_id: i64,
    tickets: &[TicketRequest],
) -> Result<ReservationWithTickets, ReservationError> {
    if tickets.is_empty() {
        return Err(ReservationError::EmptyReservation);
    }

    let mut tx = pool.begin().await?;

    let result = insert_reservation(&mut *tx, user_id, tickets).await;

    match result {
        Ok(created) => {
            tx.commit().await?;
            info!(
                reservation_id = created.reservation.id,
                user_id,
                tickets = created.tickets.len(),
                "reservation created"
            );
            Ok(created)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("reservation rollback failed: {:?}", rollback_err);
            }
            info!(user_id, "reservation rejected: {}", e);
            Err(e)
        }
    }
}

async fn insert_reservation(
    conn: &mut PgConnection,
    user_id: i64,
    tickets: &[TicketRequest],
) -> Result<ReservationWithTickets, ReservationError> {
    let reservation = sqlx::query_as::<_, Reservation>(
        "INSERT INTO reservations (user_id) VALUES ($1)
         RETURNING id, user_id, created_at",
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    // залы кешируем на время запроса: билеты обычно на один спектакль
    let mut halls: HashMap<i64, Hall> = HashMap::new();
    let mut created = Vec::with_capacity(tickets.len());

    for (index, request) in tickets.iter().enumerate() {
        if !halls.contains_key(&request.performance) {
            let hall = hall_for_performance(conn, request.performance)
                .await?
                .ok_or_else(|| {
                    ReservationError::rejected(
                        index,
                        TicketRejection::UnknownPerformance(request.performance),
                    )
                })?;
            halls.insert(request.performance, hall);
        }
        let hall = &halls[&request.performance];

        validate_ticket(request.row, request.seat, hall)
            .map_err(|e| ReservationError::rejected(index, e))?;

        let ticket = insert_ticket(conn, reservation.id, request)
            .await
            .map_err(|e| classify_insert_error(index, request, e))?;
        created.push(ticket);
    }

    Ok(ReservationWithTickets { reservation, tickets: created })
}

async fn hall_for_performance(
    conn: &mut PgConnection,
    performance_id: i64,
) -> Result<Option<Hall>, sqlx::Error> {
    sqlx::query_as::<_, Hall>(
        "SELECT h.id, h.name, h.rows, h.seats_in_row
         FROM performances p
         JOIN halls h ON h.id = p.hall_id
         WHERE p.id = $1",
    )
    .bind(performance_id)
    .fetch_optional(&mut *conn)
    .await
}

async fn insert_ticket(
    conn: &mut PgConnection,
    reservation_id: i64,
    request: &TicketRequest,
) -> Result<Ticket, sqlx::Error> {
    sqlx::query_as::<_, Ticket>(
        "INSERT INTO tickets (row, seat, performance_id, reservation_id)
         VALUES ($1, $2, $3, $4)
         RETURNING id, row, seat, performance_id, reservation_id",
    )
    .bind(request.row)
    .bind(request.seat)
    .bind(request.performance)
    .bind(reservation_id)
    .fetch_one(&mut *conn)
    .await
}

/// SQLSTATE, с которыми Postgres обрывает транзакцию, ждавшую чужую строку
/// индекса: deadlock_detected и serialization_failure.
const LOCK_CONFLICT_CODES: [&str; 2] = ["40P01", "40001"];

fn is_lock_conflict(code: Option<&str>) -> bool {
    code.is_some_and(|code| LOCK_CONFLICT_CODES.contains(&code))
}

fn classify_insert_error(index: usize, request: &TicketRequest, err: sqlx::Error) -> ReservationError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() || is_lock_conflict(db_err.code().as_deref()) {
            return ReservationError::rejected(
                index,
                TicketRejection::SeatTaken {
                    performance: request.performance,
                    row: request.row,
                    seat: request.seat,
                },
            );
        }
        // спектакль удалили между SELECT и INSERT
        if db_err.is_foreign_key_violation() {
            return ReservationError::rejected(
                index,
                TicketRejection::UnknownPerformance(request.performance),
            );
        }
    }
    ReservationError::Storage(err)
}
