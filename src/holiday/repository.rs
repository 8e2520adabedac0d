//! In-memory holiday storage.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Datelike, NaiveDate};
use dashmap::{mapref::entry::Entry, DashMap};
use thiserror::Error;

use super::model::Holiday;

type UniqueKey = (NaiveDate, String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("holiday already exists: {date} {name}")]
    Duplicate { date: NaiveDate, name: String },

    #[error("holiday not found: {0}")]
    NotFound(u64),
}

/// Concurrent holiday store keyed by id. Ids start at 1.
///
/// `(holiday_date, name)` is unique. The index is claimed through the entry
/// API before a row is written, so concurrent writers cannot both win.
/// Lock order is always index, then rows.
#[derive(Debug, Default)]
pub struct HolidayRepository {
    rows: DashMap<u64, Holiday>,
    unique: DashMap<UniqueKey, u64>,
    sequence: AtomicU64,
}

impl HolidayRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, holiday_date: NaiveDate, name: String) -> Result<Holiday, RepositoryError> {
        match self.unique.entry((holiday_date, name.clone())) {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate {
                date: holiday_date,
                name,
            }),
            Entry::Vacant(slot) => {
                let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
                let holiday = Holiday {
                    id,
                    holiday_date,
                    name,
                };
                self.rows.insert(id, holiday.clone());
                slot.insert(id);
                Ok(holiday)
            }
        }
    }

    pub fn find_by_id(&self, id: u64) -> Option<Holiday> {
        self.rows.get(&id).map(|row| row.value().clone())
    }

    pub fn find_where(&self, predicate: impl Fn(&Holiday) -> bool) -> Vec<Holiday> {
        let mut found: Vec<Holiday> = self
            .rows
            .iter()
            .filter(|row| predicate(row.value()))
            .map(|row| row.value().clone())
            .collect();
        found.sort_by(|a, b| a.holiday_date.cmp(&b.holiday_date).then(a.id.cmp(&b.id)));
        found
    }

    pub fn find_by_year(&self, year: i32) -> Vec<Holiday> {
        self.find_where(|h| h.holiday_date.year() == year)
    }

    pub fn find_by_year_and_month(&self, year: i32, month: u32) -> Vec<Holiday> {
        self.find_where(|h| h.holiday_date.year() == year && h.holiday_date.month() == month)
    }

    pub fn find_by_date(&self, date: NaiveDate) -> Vec<Holiday> {
        self.find_where(|h| h.holiday_date == date)
    }

    pub fn exists_by_date_and_name(&self, date: NaiveDate, name: &str) -> bool {
        self.unique.contains_key(&(date, name.to_owned()))
    }

    /// Overwrite an existing row, moving its unique key.
    pub fn update(
        &self,
        id: u64,
        holiday_date: NaiveDate,
        name: String,
    ) -> Result<Holiday, RepositoryError> {
        let previous = match self.unique.entry((holiday_date, name.clone())) {
            Entry::Occupied(owner) if *owner.get() != id => {
                return Err(RepositoryError::Duplicate {
                    date: holiday_date,
                    name,
                });
            }
            // Same key as the row already holds: nothing moves.
            Entry::Occupied(_) => {
                return self
                    .find_by_id(id)
                    .ok_or(RepositoryError::NotFound(id));
            }
            Entry::Vacant(slot) => {
                let mut row = self.rows.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
                let previous = (row.holiday_date, std::mem::replace(&mut row.name, name));
                row.holiday_date = holiday_date;
                let updated = row.clone();
                drop(row);
                slot.insert(id);
                (previous, updated)
            }
        };

        let (old_key, updated) = previous;
        self.unique.remove_if(&old_key, |_, owner| *owner == id);
        Ok(updated)
    }

    pub fn delete(&self, id: u64) -> bool {
        match self.rows.remove(&id) {
            Some((_, row)) => {
                self.unique
                    .remove_if(&(row.holiday_date, row.name), |_, owner| *owner == id);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_insert_and_query() {
        let repo = HolidayRepository::new();
        let a = repo.insert(date(2025, 12, 25), "Christmas".into()).unwrap();
        let b = repo.insert(date(2025, 1, 1), "New Year".into()).unwrap();
        repo.insert(date(2026, 1, 1), "New Year".into()).unwrap();

        assert_eq!((a.id, b.id), (1, 2));
        let ids: Vec<_> = repo.find_by_year(2025).iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(repo.find_by_year_and_month(2025, 12).len(), 1);
        assert_eq!(repo.find_by_date(date(2026, 1, 1)).len(), 1);
        assert!(repo.exists_by_date_and_name(date(2025, 1, 1), "New Year"));
        assert!(!repo.exists_by_date_and_name(date(2025, 1, 1), "Christmas"));
    }

    #[test]
    fn test_update_and_delete() {
        let repo = HolidayRepository::new();
        let h = repo.insert(date(2025, 5, 5), "Children".into()).unwrap();

        let updated = repo.update(h.id, date(2025, 5, 6), "Substitute".into()).unwrap();
        assert_eq!(updated.name, "Substitute");
        assert_eq!(
            repo.update(99, date(2025, 5, 7), "x".into()),
            Err(RepositoryError::NotFound(99))
        );

        // The old key is released, the new one is held.
        assert!(!repo.exists_by_date_and_name(date(2025, 5, 5), "Children"));
        assert!(repo.exists_by_date_and_name(date(2025, 5, 6), "Substitute"));
        assert!(repo.insert(date(2025, 5, 5), "Children".into()).is_ok());

        assert!(repo.delete(h.id));
        assert!(!repo.delete(h.id));
        assert!(!repo.exists_by_date_and_name(date(2025, 5, 6), "Substitute"));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_unique_date_and_name() {
        let repo = HolidayRepository::new();
        let a = repo.insert(date(2025, 1, 1), "New Year".into()).unwrap();
        let b = repo.insert(date(2025, 1, 2), "Extra".into()).unwrap();

        assert!(matches!(
            repo.insert(date(2025, 1, 1), "New Year".into()),
            Err(RepositoryError::Duplicate { .. })
        ));
        assert!(matches!(
            repo.update(b.id, date(2025, 1, 1), "New Year".into()),
            Err(RepositoryError::Duplicate { .. })
        ));
        assert_eq!(repo.find_by_id(b.id).unwrap().name, "Extra");

        // Re-saving a row with its own key is not a collision.
        assert_eq!(repo.update(a.id, date(2025, 1, 1), "New Year".into()).unwrap(), a);
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn test_concurrent_inserts_admit_one() {
        let repo = std::sync::Arc::new(HolidayRepository::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                std::thread::spawn(move || repo.insert(date(2025, 3, 1), "Same".into()).is_ok())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(repo.len(), 1);
    }
}
