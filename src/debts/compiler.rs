use serde_json::Value;

use super::combinator::DebtMap;
use super::criteria::{FilterCriteria, FilterMode};
use crate::models::debt::DEBT_COLUMNS;
use crate::models::Stage;
use crate::store::{Query, SortDirection};

pub const ACCOUNTS_TABLE: &str = "accounts";
pub const DEBT_TABLE: &str = "debt";

/// What a listing endpoint filters on. The candidates and new listings share one code
/// path and differ only in these settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingProfile {
    pub name: &'static str,
    pub stage: Stage,
    /// Whether `minDebt` / `minTerm` are honored.
    pub amount_term_filters: bool,
    /// Whether `filterMode` is read; otherwise the listing is always `all`.
    pub honors_filter_mode: bool,
}

impl ListingProfile {
    pub const CANDIDATES: ListingProfile = ListingProfile {
        name: "candidates",
        stage: Stage::Candidates,
        amount_term_filters: true,
        honors_filter_mode: true,
    };

    pub const NEW: ListingProfile = ListingProfile {
        name: "new",
        stage: Stage::New,
        amount_term_filters: false,
        honors_filter_mode: false,
    };
}

/// Store queries for one listing request. The debt query runs first; the account
/// queries are derived from its result.
#[derive(Debug, Clone)]
pub struct QueryPlan<'a> {
    criteria: &'a FilterCriteria,
    debts: Query,
}

pub fn compile<'a>(profile: &ListingProfile, criteria: &'a FilterCriteria) -> QueryPlan<'a> {
    let mut debts = Query::table(DEBT_TABLE)
        .columns(DEBT_COLUMNS)
        .eq("stage", profile.stage.as_str());
    if let Some(min_debt) = &criteria.min_debt {
        debts = debts.gte("amount", Value::Number(min_debt.clone()));
    }
    if let Some(min_term) = criteria.min_term {
        debts = debts.gte("debt_term_months", min_term);
    }
    QueryPlan { criteria, debts }
}

impl QueryPlan<'_> {
    pub fn debts(&self) -> &Query {
        &self.debts
    }

    /// The requested page of accounts, ordered by id so the same request always sees
    /// the same window. In `all` mode only accounts owning a qualifying debt are read.
    pub fn accounts_page(&self, debts: &DebtMap) -> Query {
        let window = self.criteria.window;
        let mut query = self.accounts_base();
        if self.criteria.mode == FilterMode::All {
            query = query.is_in("id", debts.account_ids().to_vec());
        }
        query.order_by("id", SortDirection::Asc).range(window.from(), window.to())
    }

    /// Size of the whole `all`-mode result: house filter plus qualifying debt ids.
    pub fn accounts_count(&self, debts: &DebtMap) -> Query {
        self.accounts_base().is_in("id", debts.account_ids().to_vec())
    }

    fn accounts_base(&self) -> Query {
        let query = Query::table(ACCOUNTS_TABLE);
        match self.criteria.house_filter() {
            Some(house_ids) => query.is_in("house_id", house_ids.to_vec()),
            None => query,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Debt;
    use crate::store::{Condition, FilterOp, Range};
    use serde_json::json;

    fn criteria(profile: &ListingProfile, body: Value) -> FilterCriteria {
        FilterCriteria::parse(&body, profile).unwrap()
    }

    fn debt_map(ids: &[i64]) -> DebtMap {
        DebtMap::from_debts(ids.iter().map(|id| Debt {
            account_id: json!(id),
            amount: None,
            penalty: None,
            debt_term_months: None,
            stage: Some("candidates".to_string()),
        }))
    }

    fn cond(column: &str, op: FilterOp, value: Value) -> Condition {
        Condition { column: column.to_string(), op, value }
    }

    #[test]
    fn debt_query_carries_stage_and_thresholds() {
        let c = criteria(&ListingProfile::CANDIDATES, json!({ "minDebt": 1000, "minTerm": 6 }));
        let plan = compile(&ListingProfile::CANDIDATES, &c);
        assert_eq!(plan.debts().table, "debt");
        assert_eq!(
            plan.debts().conditions,
            vec![
                cond("stage", FilterOp::Eq, json!("candidates")),
                cond("amount", FilterOp::Gte, json!(1000)),
                cond("debt_term_months", FilterOp::Gte, json!(6)),
            ]
        );
    }

    #[test]
    fn new_listing_filters_on_stage_only() {
        let c = criteria(&ListingProfile::NEW, json!({ "minDebt": 1000 }));
        let plan = compile(&ListingProfile::NEW, &c);
        assert_eq!(plan.debts().conditions, vec![cond("stage", FilterOp::Eq, json!("new"))]);
    }

    #[test]
    fn all_mode_restricts_accounts_to_debt_owners() {
        let c = criteria(&ListingProfile::CANDIDATES, json!({ "houseIds": [1], "page": 1, "pageSize": 10 }));
        let plan = compile(&ListingProfile::CANDIDATES, &c);
        let page = plan.accounts_page(&debt_map(&[5, 6]));
        assert_eq!(
            page.conditions,
            vec![cond("house_id", FilterOp::In, json!([1])), cond("id", FilterOp::In, json!([5, 6]))]
        );
        assert_eq!(page.range, Some(Range::new(10, 19)));

        let count = plan.accounts_count(&debt_map(&[5, 6]));
        assert_eq!(count.conditions, page.conditions);
        assert_eq!(count.range, None);
    }

    #[test]
    fn any_mode_reads_accounts_by_house_only() {
        let c = criteria(&ListingProfile::CANDIDATES, json!({ "filterMode": "any" }));
        let plan = compile(&ListingProfile::CANDIDATES, &c);
        let page = plan.accounts_page(&debt_map(&[5]));
        assert!(page.conditions.is_empty());
        assert_eq!(page.range, Some(Range::new(0, 19)));
    }
}
