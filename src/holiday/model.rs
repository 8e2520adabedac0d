//! Holiday domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: u64,
    pub holiday_date: NaiveDate,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHolidayRequest {
    pub holiday_date: NaiveDate,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHolidayRequest {
    pub holiday_date: NaiveDate,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BulkCreateHolidayRequest {
    pub holidays: Vec<CreateHolidayRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HolidaysResponse {
    pub holidays: Vec<Holiday>,
}
