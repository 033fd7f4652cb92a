//! Investment plan administration.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::flash::{set_toast, take_toast, Toast};
use crate::state::AppState;
use crate::store::models::PlanFields;

#[derive(Debug, Deserialize)]
pub struct PlanForm {
    pub name: String,
    pub percentage: String,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
    pub duration_days: Option<String>,
    pub duration_hours: Option<String>,
    pub badge: Option<String>,
    pub key: Option<String>,
    pub sort_order: Option<String>,
    pub is_active: Option<String>,
}

impl PlanForm {
    fn into_fields(self) -> Result<PlanFields, ApiError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::bad_request("Plan name is required"));
        }
        let percentage: Decimal = self
            .percentage
            .trim()
            .parse()
            .map_err(|_| ApiError::bad_request("Percentage must be a number"))?;
        if percentage <= Decimal::ZERO {
            return Err(ApiError::bad_request("Percentage must be positive"));
        }
        Ok(PlanFields {
            name,
            percentage,
            min_amount: parse_opt(self.min_amount, "Minimum amount")?,
            max_amount: parse_opt(self.max_amount, "Maximum amount")?,
            duration_days: parse_opt(self.duration_days, "Duration days")?,
            duration_hours: parse_opt(self.duration_hours, "Duration hours")?,
            badge: non_empty(self.badge),
            key: non_empty(self.key),
            sort_order: parse_opt(self.sort_order, "Sort order")?,
            is_active: checkbox(self.is_active),
        })
    }
}

/// GET /admin/plans
pub async fn list(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let plans = state.stores.plans.list().await?;
    let (jar, toast) = take_toast(jar);
    Ok((
        jar,
        Json(json!({ "success": true, "data": plans, "toast": toast })),
    ))
}

/// POST /admin/plans
pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<PlanForm>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = form.into_fields()?;
    let plan = state.stores.plans.create(fields).await?;
    let jar = set_toast(jar, &Toast::success(format!("Plan \"{}\" created", plan.name)));
    Ok((jar, Redirect::to("/admin/plans")))
}

/// POST /admin/plans/:id
pub async fn update(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
    Form(form): Form<PlanForm>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = form.into_fields()?;
    let toast = match state.stores.plans.update(id, fields).await? {
        Some(plan) => Toast::success(format!("Plan \"{}\" updated", plan.name)),
        None => Toast::error(format!("Plan #{id} not found")),
    };
    Ok((set_toast(jar, &toast), Redirect::to("/admin/plans")))
}

/// POST /admin/plans/:id/delete
pub async fn delete(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let toast = if state.stores.plans.delete(id).await? {
        Toast::success(format!("Plan #{id} deleted"))
    } else {
        Toast::error(format!("Plan #{id} not found"))
    };
    Ok((set_toast(jar, &toast), Redirect::to("/admin/plans")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn checkbox(value: Option<String>) -> bool {
    matches!(value.as_deref(), Some("on") | Some("true") | Some("1"))
}

fn parse_opt<T: std::str::FromStr>(
    value: Option<String>,
    label: &str,
) -> Result<Option<T>, ApiError> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("{label} must be a number"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_form() -> PlanForm {
        PlanForm {
            name: "Starter".into(),
            percentage: "2.5".into(),
            min_amount: Some("100".into()),
            max_amount: Some("".into()),
            duration_days: Some("30".into()),
            duration_hours: None,
            badge: None,
            key: Some("starter".into()),
            sort_order: Some("1".into()),
            is_active: Some("on".into()),
        }
    }

    #[test]
    fn form_parses_numbers_and_blanks() {
        let fields = base_form().into_fields().unwrap();
        assert_eq!(fields.percentage, "2.5".parse::<Decimal>().unwrap());
        assert_eq!(fields.min_amount, Some("100".parse().unwrap()));
        assert_eq!(fields.max_amount, None);
        assert_eq!(fields.duration_days, Some(30));
        assert!(fields.is_active);
    }

    #[test]
    fn zero_percentage_is_rejected() {
        let mut form = base_form();
        form.percentage = "0".into();
        assert!(form.into_fields().is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut form = base_form();
        form.name = "  ".into();
        assert!(form.into_fields().is_err());
    }
}
