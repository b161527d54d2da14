use chrono::{Datelike, Days, Months, NaiveDate, Utc};

/// Today's date in UTC
#[inline]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Calculate calendar age on a given day
///
/// Year difference, minus one when `on` falls before the birthday in that
/// year. Returns `None` for a date of birth in the future.
///
/// # Arguments
/// * `date_of_birth` - Birth date
/// * `on` - The day the age is evaluated at
pub fn age_on(date_of_birth: NaiveDate, on: NaiveDate) -> Option<u32> {
    let mut years = on.year() - date_of_birth.year();
    if (on.month(), on.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }

    u32::try_from(years).ok()
}

/// Inclusive range of birth dates whose holders fall inside an age range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthDateBounds {
    /// Oldest allowed birth date (derived from the maximum age)
    pub earliest: Option<NaiveDate>,
    /// Youngest allowed birth date (derived from the minimum age)
    pub latest: Option<NaiveDate>,
}

impl BirthDateBounds {
    #[inline]
    pub fn contains(&self, date_of_birth: NaiveDate) -> bool {
        self.earliest.map_or(true, |e| date_of_birth >= e)
            && self.latest.map_or(true, |l| date_of_birth <= l)
    }
}

/// Oldest age a bound is taken at; larger values behave the same
pub const MAX_SEARCH_AGE: u32 = 150;

/// Convert age bounds into birth-date bounds relative to `today`
///
/// Someone is at least `min_age` when born on or before `today - min_age years`,
/// and at most `max_age` when born after `today - (max_age + 1) years`.
/// Month arithmetic clamps Feb 29 to Feb 28 in non-leap years. Ages above
/// `MAX_SEARCH_AGE` are clamped so the bounds stay within storable dates.
pub fn birth_date_bounds(
    min_age: Option<u32>,
    max_age: Option<u32>,
    today: NaiveDate,
) -> BirthDateBounds {
    let min_age = min_age.map(|age| age.min(MAX_SEARCH_AGE));
    let max_age = max_age.map(|age| age.min(MAX_SEARCH_AGE));

    let latest = min_age.map(|age| years_before(today, age));

    let earliest = max_age.map(|age| {
        years_before(today, age.saturating_add(1))
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX)
    });

    BirthDateBounds { earliest, latest }
}

fn years_before(date: NaiveDate, years: u32) -> NaiveDate {
    years
        .checked_mul(12)
        .and_then(|months| date.checked_sub_months(Months::new(months)))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_before_and_on_birthday() {
        let dob = date(2000, 6, 15);
        assert_eq!(age_on(dob, date(2024, 6, 14)), Some(23));
        assert_eq!(age_on(dob, date(2024, 6, 15)), Some(24));
        assert_eq!(age_on(dob, date(2024, 12, 31)), Some(24));
    }

    #[test]
    fn test_age_future_birth_date_is_unknown() {
        assert_eq!(age_on(date(2030, 1, 1), date(2024, 1, 1)), None);
        assert_eq!(age_on(date(2024, 1, 2), date(2024, 1, 1)), None);
    }

    #[test]
    fn test_leap_day_birthday() {
        let dob = date(2004, 2, 29);
        assert_eq!(age_on(dob, date(2023, 2, 28)), Some(18));
        assert_eq!(age_on(dob, date(2023, 3, 1)), Some(19));
    }

    #[test]
    fn test_bounds_are_inclusive_at_birthday_edges() {
        let today = date(2024, 6, 15);
        let bounds = birth_date_bounds(Some(18), Some(30), today);

        assert_eq!(bounds.latest, Some(date(2006, 6, 15)));
        assert_eq!(bounds.earliest, Some(date(1993, 6, 16)));

        // Turns 18 today
        assert!(bounds.contains(date(2006, 6, 15)));
        // Turns 18 tomorrow
        assert!(!bounds.contains(date(2006, 6, 16)));
        // Turns 31 tomorrow
        assert!(bounds.contains(date(1993, 6, 16)));
        // Turned 31 today
        assert!(!bounds.contains(date(1993, 6, 15)));
    }

    #[test]
    fn test_bounds_agree_with_age_on() {
        let today = date(2024, 2, 29);
        let bounds = birth_date_bounds(Some(25), Some(40), today);

        let mut dob = date(1980, 1, 1);
        while dob <= date(2002, 1, 1) {
            let age = age_on(dob, today).unwrap();
            assert_eq!(
                bounds.contains(dob),
                (25..=40).contains(&age),
                "disagreement for {}",
                dob
            );
            dob = dob.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_extreme_ages_are_clamped() {
        let today = date(2024, 6, 15);
        let bounds = birth_date_bounds(Some(u32::MAX), Some(u32::MAX), today);

        assert_eq!(bounds.latest, Some(date(1874, 6, 15)));
        assert_eq!(bounds.earliest, Some(date(1873, 6, 16)));
        assert!(bounds.earliest.unwrap() > date(1800, 1, 1));
    }

    #[test]
    fn test_open_bounds() {
        let bounds = birth_date_bounds(None, None, date(2024, 1, 1));
        assert!(bounds.contains(date(1900, 1, 1)));
        assert!(bounds.contains(date(2024, 1, 1)));
    }
}
