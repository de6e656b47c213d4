//! Rules deciding when a booking may be created, decided, seen and listed.
//!
//! Everything here is free of I/O so the service layer can apply the rules
//! against rows it already loaded.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, Condition};
use uuid::Uuid;

use crate::{
    entity::bookings::Column as BookingCol,
    error::{AppError, AppResult},
    models::{BookingShort, BookingState, BookingStatus},
};

/// `end` must be strictly after `start`, and the window must not already have begun.
pub fn check_window(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<()> {
    if end <= start {
        return Err(AppError::bad_request("End date must be after start date"));
    }
    if start < now {
        return Err(AppError::bad_request("Start date must not be in the past"));
    }
    Ok(())
}

/// The owner cannot book their own item, and only available items can be booked.
pub fn check_bookable(booker_id: Uuid, owner_id: Uuid, available: bool) -> AppResult<()> {
    if booker_id == owner_id {
        return Err(AppError::forbidden("Item owner cannot book their own item"));
    }
    if !available {
        return Err(AppError::bad_request("Item is not available"));
    }
    Ok(())
}

/// Status a WAITING booking moves to once its owner decides.
pub fn decide(
    caller_id: Uuid,
    owner_id: Uuid,
    current: BookingStatus,
    approved: bool,
) -> AppResult<BookingStatus> {
    if caller_id != owner_id {
        return Err(AppError::forbidden(
            "Only the item owner can approve or reject a booking",
        ));
    }
    let target = if approved {
        BookingStatus::Approved
    } else {
        BookingStatus::Rejected
    };
    if current == target {
        return Err(AppError::bad_request(format!(
            "Booking is already {current}"
        )));
    }
    if current != BookingStatus::Waiting {
        return Err(AppError::bad_request(format!(
            "Booking in status {current} can no longer be changed"
        )));
    }
    Ok(target)
}

/// Only the booker and the item owner may look at a booking.
pub fn check_visible(caller_id: Uuid, booker_id: Uuid, owner_id: Uuid) -> AppResult<()> {
    if caller_id == booker_id || caller_id == owner_id {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "Only the booker or the item owner can view this booking",
        ))
    }
}

/// Missing state means ALL; anything unrecognised is rejected.
pub fn parse_state(raw: Option<&str>) -> AppResult<BookingState> {
    match raw {
        None => Ok(BookingState::All),
        Some(s) => s.parse().map_err(AppError::BadRequest),
    }
}

/// Filter selecting bookings in `state` as of `now`.
pub fn state_condition(state: BookingState, now: DateTime<Utc>) -> Condition {
    let now = now.fixed_offset();
    match state {
        BookingState::All => Condition::all(),
        BookingState::Current => Condition::all()
            .add(BookingCol::StartDate.lte(now))
            .add(BookingCol::EndDate.gte(now)),
        BookingState::Past => Condition::all().add(BookingCol::EndDate.lt(now)),
        BookingState::Future => Condition::all().add(BookingCol::StartDate.gt(now)),
        BookingState::Waiting => {
            Condition::all().add(BookingCol::Status.eq(BookingStatus::Waiting.as_str()))
        }
        BookingState::Rejected => {
            Condition::all().add(BookingCol::Status.eq(BookingStatus::Rejected.as_str()))
        }
    }
}

/// Last and next bookings of one item, ignoring rejected and canceled ones.
///
/// Last is the started booking that ends latest; next is the earliest one yet to start.
pub fn last_and_next(
    bookings: &[(BookingShort, BookingStatus)],
    now: DateTime<Utc>,
) -> (Option<BookingShort>, Option<BookingShort>) {
    let live = || {
        bookings
            .iter()
            .filter(|(_, status)| status.holds_item())
            .map(|(b, _)| b)
    };
    let last = live().filter(|b| b.start < now).max_by_key(|b| b.end).cloned();
    let next = live().filter(|b| b.start > now).min_by_key(|b| b.start).cloned();
    (last, next)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    use super::*;
    use crate::entity::Bookings;

    fn short(start: DateTime<Utc>, end: DateTime<Utc>) -> BookingShort {
        BookingShort {
            id: Uuid::new_v4(),
            booker_id: Uuid::new_v4(),
            start,
            end,
        }
    }

    #[test]
    fn window_must_be_forward_and_not_started() {
        let now = Utc::now();
        let start = now + Duration::hours(1);
        assert!(check_window(start, start + Duration::hours(1), now).is_ok());
        assert!(check_window(start, start, now).is_err());
        assert!(check_window(start, start - Duration::minutes(1), now).is_err());
        assert!(check_window(now - Duration::hours(1), now + Duration::hours(1), now).is_err());
    }

    #[test]
    fn owner_cannot_book_own_item() {
        let owner = Uuid::new_v4();
        assert!(matches!(
            check_bookable(owner, owner, true),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn unavailable_item_cannot_be_booked() {
        assert!(matches!(
            check_bookable(Uuid::new_v4(), Uuid::new_v4(), false),
            Err(AppError::BadRequest(_))
        ));
        assert!(check_bookable(Uuid::new_v4(), Uuid::new_v4(), true).is_ok());
    }

    #[test]
    fn owner_moves_waiting_booking_forward() {
        let owner = Uuid::new_v4();
        assert_eq!(
            decide(owner, owner, BookingStatus::Waiting, true).unwrap(),
            BookingStatus::Approved
        );
        assert_eq!(
            decide(owner, owner, BookingStatus::Waiting, false).unwrap(),
            BookingStatus::Rejected
        );
    }

    #[test]
    fn non_owner_cannot_decide() {
        let result = decide(Uuid::new_v4(), Uuid::new_v4(), BookingStatus::Waiting, true);
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn decisions_are_final() {
        let owner = Uuid::new_v4();
        assert!(matches!(
            decide(owner, owner, BookingStatus::Approved, true),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            decide(owner, owner, BookingStatus::Approved, false),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            decide(owner, owner, BookingStatus::Rejected, true),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn booker_and_owner_can_see_booking() {
        let booker = Uuid::new_v4();
        let owner = Uuid::new_v4();
        assert!(check_visible(booker, booker, owner).is_ok());
        assert!(check_visible(owner, booker, owner).is_ok());
        assert!(check_visible(Uuid::new_v4(), booker, owner).is_err());
    }

    #[test]
    fn state_parsing() {
        assert_eq!(parse_state(None).unwrap(), BookingState::All);
        assert_eq!(parse_state(Some("PAST")).unwrap(), BookingState::Past);
        let err = parse_state(Some("SOON")).unwrap_err();
        assert_eq!(err.to_string(), "Bad Request: Unknown state: SOON");
        assert!(parse_state(Some("past")).is_err());
    }

    /// The WHERE clause the state filter produces, empty when there is none.
    fn filter_sql(state: BookingState) -> String {
        let sql = Bookings::find()
            .filter(state_condition(state, Utc::now()))
            .build(DbBackend::Postgres)
            .to_string();
        sql.split_once(" WHERE ")
            .map(|(_, clause)| clause.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn all_state_adds_no_filter() {
        assert_eq!(filter_sql(BookingState::All), "");
    }

    #[test]
    fn current_state_brackets_now() {
        let sql = filter_sql(BookingState::Current);
        assert!(sql.contains(r#""bookings"."start_date" <= '"#), "{sql}");
        assert!(sql.contains(r#""bookings"."end_date" >= '"#), "{sql}");
        assert!(!sql.contains("status"), "{sql}");
    }

    #[test]
    fn past_and_future_look_at_one_end_each() {
        let past = filter_sql(BookingState::Past);
        assert!(past.contains(r#""bookings"."end_date" < '"#), "{past}");
        assert!(!past.contains("start_date"), "{past}");

        let future = filter_sql(BookingState::Future);
        assert!(future.contains(r#""bookings"."start_date" > '"#), "{future}");
        assert!(!future.contains("end_date"), "{future}");
    }

    #[test]
    fn status_states_filter_on_status_only() {
        let waiting = filter_sql(BookingState::Waiting);
        assert!(waiting.contains(r#""bookings"."status" = 'WAITING'"#), "{waiting}");
        assert!(!waiting.contains("start_date"), "{waiting}");

        let rejected = filter_sql(BookingState::Rejected);
        assert!(rejected.contains(r#""bookings"."status" = 'REJECTED'"#), "{rejected}");
    }

    #[test]
    fn last_and_next_skip_rejected_bookings() {
        let now = Utc::now();
        let hour = Duration::hours(1);
        let old = short(now - hour * 10, now - hour * 9);
        let recent = short(now - hour * 3, now - hour * 2);
        let rejected_recent = short(now - hour * 2, now - hour);
        let soon = short(now + hour, now + hour * 2);
        let later = short(now + hour * 5, now + hour * 6);
        let rejected_sooner = short(now + Duration::minutes(10), now + Duration::minutes(20));

        let bookings = vec![
            (later.clone(), BookingStatus::Approved),
            (old.clone(), BookingStatus::Approved),
            (rejected_recent, BookingStatus::Rejected),
            (soon.clone(), BookingStatus::Waiting),
            (recent.clone(), BookingStatus::Approved),
            (rejected_sooner, BookingStatus::Rejected),
        ];

        let (last, next) = last_and_next(&bookings, now);
        assert_eq!(last, Some(recent));
        assert_eq!(next, Some(soon));
    }

    #[test]
    fn ongoing_booking_counts_as_last() {
        let now = Utc::now();
        let hour = Duration::hours(1);
        let ongoing = short(now - hour, now + hour);
        let (last, next) = last_and_next(&[(ongoing.clone(), BookingStatus::Approved)], now);
        assert_eq!(last, Some(ongoing));
        assert_eq!(next, None);
    }

    #[test]
    fn no_bookings_means_no_last_or_next() {
        assert_eq!(last_and_next(&[], Utc::now()), (None, None));
    }
}
