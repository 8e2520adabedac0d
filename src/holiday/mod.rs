//! Holiday CRUD demo service.
//!
//! # Data Flow
//! ```text
//! handlers.rs (HolidayController.*)
//!     → service.rs (HolidayService.*, business rules)
//!     → repository.rs (DashMap store)
//! ```
//!
//! Both layers run through the operation registry, so one request yields a
//! two-level call tree in the trace log.

pub mod handlers;
pub mod model;
pub mod repository;
pub mod service;

pub use model::{CreateHolidayRequest, Holiday, UpdateHolidayRequest};
pub use repository::{HolidayRepository, RepositoryError};
pub use service::HolidayService;
