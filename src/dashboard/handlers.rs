//! Dashboard HTTP handlers.
//!
//! This module contains:
//! - Route handlers for the monthly report and its chart options
//! - State types used by the handlers

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
};
use rusqlite::Connection;
use time::Weekday;

use crate::{
    AppState, Error,
    dashboard::{
        charts::{DashboardChart, dashboard_charts},
        month::{MonthQuery, MonthSelector},
        report::{MonthlyReport, fetch_monthly_report},
    },
    timezone::get_local_date,
    user::{UserId, get_user_by_id},
};

/// The calendar on the dashboard always starts on Sunday.
const FIRST_DAY_OF_WEEK: Weekday = Weekday::Sunday;

/// The state needed for displaying the dashboard.
///
/// Contains the database connection and timezone information required
/// by dashboard handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Tokyo".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Get the monthly report of a user for the month given by the `y` and `m` query parameters.
///
/// Missing or invalid query parameters default to the current month in the local timezone.
pub async fn get_dashboard(
    State(state): State<DashboardState>,
    Path(user_id): Path<UserId>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlyReport>, Error> {
    load_report(&state, user_id, &query).map(Json)
}

/// Get the ECharts options for the charts of a user's monthly report.
///
/// Accepts the same query parameters as [get_dashboard].
pub async fn get_dashboard_charts(
    State(state): State<DashboardState>,
    Path(user_id): Path<UserId>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<[DashboardChart; 2]>, Error> {
    let report = load_report(&state, user_id, &query)?;

    Ok(Json(dashboard_charts(&report)))
}

fn load_report(
    state: &DashboardState,
    user_id: UserId,
    query: &MonthQuery,
) -> Result<MonthlyReport, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let selector = MonthSelector::from_query(query, today);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_user_by_id(user_id, &connection)?;

    fetch_monthly_report(user_id, selector, FIRST_DAY_OF_WEEK, &*connection)
        .inspect_err(|error| tracing::error!("could not build report for {selector:?}: {error}"))
}
