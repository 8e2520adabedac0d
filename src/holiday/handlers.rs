//! Holiday HTTP handlers. Each handler runs as `HolidayController.<op>`
//! through the operation registry.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::error::Result;
use crate::http::response::ApiResource;
use crate::http::server::AppState;
use crate::security::client_ip::ClientIp;

use super::model::{
    BulkCreateHolidayRequest, CreateHolidayRequest, Holiday, HolidaysResponse, UpdateHolidayRequest,
};

/// Operation names declared by the controller.
pub const CONTROLLER_OPERATIONS: [&str; 8] = [
    "HolidayController.get_by_year",
    "HolidayController.get_by_year_and_month",
    "HolidayController.get_by_date",
    "HolidayController.get_by_id",
    "HolidayController.create",
    "HolidayController.create_bulk",
    "HolidayController.update",
    "HolidayController.delete",
];

fn listing(holidays: Vec<Holiday>) -> ApiResource<HolidaysResponse> {
    let size = holidays.len();
    ApiResource::success(HolidaysResponse { holidays }).with_size(size)
}

pub async fn get_by_year(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    path: std::result::Result<Path<i32>, PathRejection>,
) -> Result<ApiResource<HolidaysResponse>> {
    let Path(year) = path?;
    state
        .registry
        .invoke("HolidayController.get_by_year", Some(&ip), async {
            state.holidays.find_by_year(year).map(listing)
        })
        .await
}

pub async fn get_by_year_and_month(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    path: std::result::Result<Path<(i32, u32)>, PathRejection>,
) -> Result<ApiResource<HolidaysResponse>> {
    let Path((year, month)) = path?;
    state
        .registry
        .invoke("HolidayController.get_by_year_and_month", Some(&ip), async {
            state.holidays.find_by_year_and_month(year, month).map(listing)
        })
        .await
}

pub async fn get_by_date(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    path: std::result::Result<Path<(i32, u32, u32)>, PathRejection>,
) -> Result<ApiResource<HolidaysResponse>> {
    let Path((year, month, day)) = path?;
    state
        .registry
        .invoke("HolidayController.get_by_date", Some(&ip), async {
            state.holidays.find_by_date(year, month, day).map(listing)
        })
        .await
}

pub async fn get_by_id(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    path: std::result::Result<Path<u64>, PathRejection>,
) -> Result<ApiResource<Holiday>> {
    let Path(id) = path?;
    state
        .registry
        .invoke("HolidayController.get_by_id", Some(&ip), async {
            state.holidays.find_by_id(id).map(ApiResource::success)
        })
        .await
}

pub async fn create(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    payload: std::result::Result<Json<CreateHolidayRequest>, JsonRejection>,
) -> Result<ApiResource<Holiday>> {
    let Json(request) = payload?;
    state
        .registry
        .invoke("HolidayController.create", Some(&ip), async {
            state.holidays.create(request).map(ApiResource::success)
        })
        .await
}

pub async fn create_bulk(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    payload: std::result::Result<Json<BulkCreateHolidayRequest>, JsonRejection>,
) -> Result<ApiResource<Vec<Holiday>>> {
    let Json(request) = payload?;
    state
        .registry
        .invoke("HolidayController.create_bulk", Some(&ip), async {
            let created = state.holidays.create_all(request.holidays)?;
            let size = created.len();
            Ok(ApiResource::success(created).with_size(size))
        })
        .await
}

pub async fn update(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    path: std::result::Result<Path<u64>, PathRejection>,
    payload: std::result::Result<Json<UpdateHolidayRequest>, JsonRejection>,
) -> Result<ApiResource<Holiday>> {
    let Path(id) = path?;
    let Json(request) = payload?;
    state
        .registry
        .invoke("HolidayController.update", Some(&ip), async {
            state.holidays.update(id, request).map(ApiResource::success)
        })
        .await
}

pub async fn delete(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    path: std::result::Result<Path<u64>, PathRejection>,
) -> Result<ApiResource<()>> {
    let Path(id) = path?;
    state
        .registry
        .invoke("HolidayController.delete", Some(&ip), async {
            state.holidays.delete(id).map(ApiResource::success)
        })
        .await
}
