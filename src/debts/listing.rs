use serde::Serialize;
use tracing::debug;

use super::combinator::{Combinator, DebtMap, EnrichedAccountRow};
use super::compiler::{self, ListingProfile, DEBT_TABLE};
use super::criteria::{FilterCriteria, FilterMode};
use super::error::DebtError;
use super::pager::{self, PageWindow};
use crate::models::Debt;
use crate::store::{Record, RecordStore};

/// One page of a debt listing as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtPage {
    pub data: Vec<EnrichedAccountRow>,
    pub total: i64,
    pub page: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
}

impl DebtPage {
    pub fn empty(window: PageWindow) -> Self {
        Self { data: vec![], total: 0, page: window.page, page_size: window.size }
    }
}

/// Runs a listing: qualifying debts, then (for `all`) the exact total, then the account
/// page, then correlation and enrichment. Each step is its own store round-trip.
pub async fn list(store: &dyn RecordStore, profile: &ListingProfile, criteria: &FilterCriteria) -> Result<DebtPage, DebtError> {
    let window = criteria.window;
    let plan = compiler::compile(profile, criteria);

    let debts = DebtMap::from_debts(parse_debts(store.select(plan.debts()).await?)?);
    debug!(listing = profile.name, qualifying_debts = debts.len(), mode = ?criteria.mode, "debt query done");

    if criteria.mode == FilterMode::All && debts.is_empty() {
        return Ok(DebtPage::empty(window));
    }

    let exact_count = match criteria.mode {
        FilterMode::All => Some(store.count(&plan.accounts_count(&debts)).await?),
        FilterMode::Any => None,
    };

    let accounts = store.select(&plan.accounts_page(&debts)).await?;
    let data = Combinator::new(criteria.mode, criteria.house_filter(), &debts).combine(accounts, &window);
    let total = pager::resolve_total(criteria.mode, exact_count, data.len());

    Ok(DebtPage { data, total, page: window.page, page_size: window.size })
}

fn parse_debts(rows: Vec<Record>) -> Result<Vec<Debt>, DebtError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(serde_json::Value::Object(row))
                .map_err(|e| DebtError::MalformedRow { table: DEBT_TABLE, reason: e.to_string() })
        })
        .collect()
}
