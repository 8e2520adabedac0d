//! Holiday business operations. Every call runs through the operation
//! registry under the name `HolidayService.<op>`.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{AppError, ErrorCode, Result};
use crate::trace::OperationRegistry;

use super::model::{CreateHolidayRequest, Holiday, UpdateHolidayRequest};
use super::repository::{HolidayRepository, RepositoryError};

/// Operation names declared by this service.
pub const SERVICE_OPERATIONS: [&str; 8] = [
    "HolidayService.find_by_year",
    "HolidayService.find_by_year_and_month",
    "HolidayService.find_by_date",
    "HolidayService.find_by_id",
    "HolidayService.create",
    "HolidayService.create_all",
    "HolidayService.update",
    "HolidayService.delete",
];

pub struct HolidayService {
    repository: HolidayRepository,
    registry: Arc<OperationRegistry>,
}

impl HolidayService {
    pub fn new(repository: HolidayRepository, registry: Arc<OperationRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    fn traced<T>(&self, operation: &str, call: impl FnOnce() -> Result<T>) -> Result<T> {
        self.registry.invoke_sync(operation, None, call)
    }

    pub fn find_by_year(&self, year: i32) -> Result<Vec<Holiday>> {
        self.traced("HolidayService.find_by_year", || {
            Ok(self.repository.find_by_year(year))
        })
    }

    pub fn find_by_year_and_month(&self, year: i32, month: u32) -> Result<Vec<Holiday>> {
        self.traced("HolidayService.find_by_year_and_month", || {
            if !(1..=12).contains(&month) {
                return Err(AppError::InvalidArgument(format!("month out of range: {month}")));
            }
            Ok(self.repository.find_by_year_and_month(year, month))
        })
    }

    pub fn find_by_date(&self, year: i32, month: u32, day: u32) -> Result<Vec<Holiday>> {
        self.traced("HolidayService.find_by_date", || {
            let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                AppError::InvalidArgument(format!("invalid date: {year}-{month}-{day}"))
            })?;
            Ok(self.repository.find_by_date(date))
        })
    }

    pub fn find_by_id(&self, id: u64) -> Result<Holiday> {
        self.traced("HolidayService.find_by_id", || {
            self.repository.find_by_id(id).ok_or_else(|| not_found(id))
        })
    }

    pub fn create(&self, request: CreateHolidayRequest) -> Result<Holiday> {
        self.traced("HolidayService.create", || {
            self.repository
                .insert(request.holiday_date, request.name)
                .map_err(from_repository)
        })
    }

    /// Insert every request or none: on the first collision the rows
    /// already written by this call are removed again.
    pub fn create_all(&self, requests: Vec<CreateHolidayRequest>) -> Result<Vec<Holiday>> {
        self.traced("HolidayService.create_all", || {
            let mut created = Vec::with_capacity(requests.len());
            for request in requests {
                match self.repository.insert(request.holiday_date, request.name) {
                    Ok(holiday) => created.push(holiday),
                    Err(e) => {
                        for holiday in &created {
                            self.repository.delete(holiday.id);
                        }
                        return Err(from_repository(e));
                    }
                }
            }
            Ok(created)
        })
    }

    pub fn update(&self, id: u64, request: UpdateHolidayRequest) -> Result<Holiday> {
        self.traced("HolidayService.update", || {
            self.repository
                .update(id, request.holiday_date, request.name)
                .map_err(from_repository)
        })
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        self.traced("HolidayService.delete", || {
            if self.repository.delete(id) {
                Ok(())
            } else {
                Err(not_found(id))
            }
        })
    }
}

fn from_repository(error: RepositoryError) -> AppError {
    match error {
        RepositoryError::Duplicate { date, name } => AppError::known(
            ErrorCode::HolidayAlreadyExists,
            format!("Holiday already exists: {date} {name}"),
        ),
        RepositoryError::NotFound(id) => not_found(id),
    }
}

fn not_found(id: u64) -> AppError {
    AppError::known(ErrorCode::HolidayNotFound, format!("Holiday not found: {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::test_support::capture;
    use crate::trace::TracePolicy;

    fn service() -> HolidayService {
        let registry = SERVICE_OPERATIONS
            .iter()
            .fold(OperationRegistry::builder(TracePolicy::standard()), |b, op| b.operation(*op))
            .build();
        HolidayService::new(HolidayRepository::new(), Arc::new(registry))
    }

    fn create(date: (i32, u32, u32), name: &str) -> CreateHolidayRequest {
        CreateHolidayRequest {
            holiday_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            name: name.into(),
        }
    }

    #[test]
    fn test_create_and_find() {
        let svc = service();
        let h = svc.create(create((2025, 10, 3), "Foundation Day")).unwrap();

        assert_eq!(svc.find_by_id(h.id).unwrap(), h);
        assert_eq!(svc.find_by_year(2025).unwrap().len(), 1);
        assert_eq!(svc.find_by_year_and_month(2025, 10).unwrap().len(), 1);
        assert_eq!(svc.find_by_date(2025, 10, 3).unwrap().len(), 1);
        assert!(svc.find_by_date(2025, 10, 4).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_is_known_error() {
        let svc = service();
        svc.create(create((2025, 10, 9), "Hangul Day")).unwrap();
        let err = svc.create(create((2025, 10, 9), "Hangul Day")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::HolidayAlreadyExists);
        assert!(matches!(err, AppError::Known { .. }));
    }

    #[test]
    fn test_bulk_collision_writes_nothing() {
        let svc = service();
        svc.create(create((2025, 1, 1), "New Year")).unwrap();

        let err = svc
            .create_all(vec![
                create((2025, 2, 1), "Lunar New Year"),
                create((2025, 1, 1), "New Year"),
            ])
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::HolidayAlreadyExists);
        assert_eq!(svc.find_by_year(2025).unwrap().len(), 1);

        let err = svc
            .create_all(vec![
                create((2025, 3, 1), "Same"),
                create((2025, 3, 1), "Same"),
            ])
            .unwrap_err();
        assert!(matches!(err, AppError::Known { .. }));
        assert_eq!(svc.find_by_year(2025).unwrap().len(), 1);
    }

    #[test]
    fn test_update_onto_existing_key_conflicts() {
        let svc = service();
        svc.create(create((2025, 1, 1), "New Year")).unwrap();
        let other = svc.create(create((2025, 1, 2), "Extra")).unwrap();

        let err = svc
            .update(
                other.id,
                UpdateHolidayRequest {
                    holiday_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                    name: "New Year".into(),
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::HolidayAlreadyExists);
        assert_eq!(svc.find_by_id(other.id).unwrap(), other);
    }

    #[test]
    fn test_invalid_inputs() {
        let svc = service();
        assert!(matches!(svc.find_by_date(2025, 2, 30), Err(AppError::InvalidArgument(_))));
        assert!(matches!(svc.find_by_year_and_month(2025, 13), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_update_delete_missing() {
        let svc = service();
        let update = UpdateHolidayRequest {
            holiday_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            name: "x".into(),
        };
        assert_eq!(svc.update(1, update).unwrap_err().code(), ErrorCode::HolidayNotFound);
        assert_eq!(svc.delete(1).unwrap_err().code(), ErrorCode::HolidayNotFound);
    }

    #[test]
    fn test_not_found_traced_at_debug() {
        let svc = service();
        let (result, lines) = capture(|| svc.find_by_id(404));

        assert!(result.is_err());
        let trace_lines: Vec<_> = lines.iter().filter(|l| l.contains("# |")).collect();
        assert_eq!(trace_lines.len(), 2);
        assert!(trace_lines[0].contains("|--> HolidayService.find_by_id"));
        assert!(trace_lines[1].contains("DEBUG"));
        assert!(trace_lines[1].contains("|<X- HolidayService.find_by_id"));
    }
}
