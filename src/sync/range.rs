/// Day range resolution: which calendar dates still need fetching.

use crate::model::ObservationDate;

/// Every date from the day after `last_stored_date` through `upper_bound`,
/// ascending. Empty when there is nothing to do.
pub fn resolve(last_stored_date: ObservationDate, upper_bound: ObservationDate) -> Vec<ObservationDate> {
    match last_stored_date.succ_opt() {
        Some(start) if start <= upper_bound => start
            .iter_days()
            .take_while(|date| *date <= upper_bound)
            .collect(),
        _ => Vec::new(),
    }
}
