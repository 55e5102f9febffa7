use crate::models::{Availability, StatusRecord};

/// Edge-triggered notification decision.
///
/// Fires only when the product becomes available: the new status is
/// `InStock` and the previous one (if any) was not. Staying in stock,
/// or moving to any other status, never notifies.
pub fn should_notify(previous: Option<&StatusRecord>, current: Availability) -> bool {
    current == Availability::InStock
        && previous.is_none_or(|record| record.status != Availability::InStock)
}
