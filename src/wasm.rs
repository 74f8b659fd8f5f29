//! Browser entry point.
//!
//! Accepts and returns plain JS objects converted with
//! `serde-wasm-bindgen`.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::balance::{BalanceConfig, BalanceResult};
use crate::models::{DisciplineInfo, Member};
use crate::scoring::BalanceReport;
use crate::sorter::TeamSorter;

/// Input object for [`sort_teams`].
#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub members: Vec<Member>,
    pub disciplines: Vec<DisciplineInfo>,
    pub team_count: usize,
    #[serde(default)]
    pub config: BalanceConfig,
}

/// Output object of [`sort_teams`].
#[derive(Debug, Serialize)]
pub struct SortResponse {
    pub result: BalanceResult,
    pub report: BalanceReport,
}

/// Sorts members into teams.
///
/// Errors, including constraint conflicts, are returned as a string.
#[wasm_bindgen]
pub fn sort_teams(input: JsValue) -> Result<JsValue, JsValue> {
    let request: SortRequest = serde_wasm_bindgen::from_value(input)?;
    let result = TeamSorter::sort(
        &request.members,
        &request.disciplines,
        request.team_count,
        &request.config,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let report = BalanceReport::from_teams(&result.teams, &request.disciplines);
    Ok(serde_wasm_bindgen::to_value(&SortResponse { result, report })?)
}
