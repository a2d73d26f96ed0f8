use chrono::NaiveDate;

/// Nights occupied by a stay: every day from `check_in` up to, but not
/// including, `check_out`. Empty when `check_in >= check_out`.
pub fn stay_nights(check_in: NaiveDate, check_out: NaiveDate) -> Vec<NaiveDate> {
    check_in
        .iter_days()
        .take_while(|day| *day < check_out)
        .collect()
}
