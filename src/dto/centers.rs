use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{CenterStatus, Location, PrintCenter, WorkingHour},
    store::CenterChanges,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePrintCenterRequest {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub location: Location,
    pub working_hours: Vec<WorkingHour>,
}

impl CreatePrintCenterRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_name(&self.name)?;
        if !self.email.contains('@') {
            return Err(AppError::InvalidArgument("invalid email".into()));
        }
        if self.phone_number.trim().is_empty() {
            return Err(AppError::InvalidArgument("phone number is required".into()));
        }
        validate_location(&self.location)?;
        validate_working_hours(&self.working_hours)
    }
}

/// Fields an owner may change after registration. Absent fields are kept.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePrintCenterRequest {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<Location>,
    pub working_hours: Option<Vec<WorkingHour>>,
}

impl UpdatePrintCenterRequest {
    /// Validates the present fields and trims them into store changes.
    pub fn into_changes(self) -> AppResult<CenterChanges> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(phone) = &self.phone_number {
            if phone.trim().is_empty() {
                return Err(AppError::InvalidArgument("phone number cannot be empty".into()));
            }
        }
        if let Some(location) = &self.location {
            validate_location(location)?;
        }
        if let Some(hours) = &self.working_hours {
            validate_working_hours(hours)?;
        }

        Ok(CenterChanges {
            name: self.name.map(|n| n.trim().to_string()),
            phone_number: self.phone_number.map(|p| p.trim().to_string()),
            location: self.location,
            working_hours: self.working_hours,
        })
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().chars().count() < 3 {
        return Err(AppError::InvalidArgument("name must be at least 3 characters".into()));
    }
    Ok(())
}

fn validate_location(location: &Location) -> AppResult<()> {
    if location.street.trim().is_empty() || location.city.trim().is_empty() {
        return Err(AppError::InvalidArgument("location needs a street and a city".into()));
    }
    if let Some(point) = location.geo_point {
        if !(-90.0..=90.0).contains(&point.lat) || !(-180.0..=180.0).contains(&point.lng) {
            return Err(AppError::InvalidArgument("geo point out of range".into()));
        }
    }
    Ok(())
}

fn validate_working_hours(hours: &[WorkingHour]) -> AppResult<()> {
    if hours.is_empty() {
        return Err(AppError::InvalidArgument("at least one working hour is required".into()));
    }
    for hour in hours {
        hour.day.parse::<Weekday>().map_err(|_| {
            AppError::InvalidArgument(format!("unknown weekday {:?}", hour.day))
        })?;
        let start = parse_clock(&hour.start)?;
        let end = parse_clock(&hour.end)?;
        if start >= end {
            return Err(AppError::InvalidArgument(format!(
                "{}: opening {} must be before closing {}",
                hour.day, hour.start, hour.end
            )));
        }
    }
    Ok(())
}

fn parse_clock(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::InvalidArgument(format!("time {value:?} is not HH:MM")))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePrintCenterStatusRequest {
    pub status: CenterStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CenterListQuery {
    pub status: Option<CenterStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CenterList {
    pub items: Vec<PrintCenter>,
}
