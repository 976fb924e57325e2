//! In-memory correlation of `accounts` and `debt`.
//!
//! The store cannot express "house matches OR a qualifying debt exists" across the two
//! tables in one round-trip, so both sides are fetched separately and joined here. Cost is
//! linear in the number of qualifying debts plus the size of the account page, and the two
//! reads are not isolated from concurrent writes.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::{Number, Value};

use super::criteria::FilterMode;
use super::pager::PageWindow;
use crate::models::Debt;
use crate::store::record::record_key;
use crate::store::Record;

/// Columns the enrichment step writes onto an account row.
const ENRICHED_COLUMNS: [&str; 5] = ["debt", "penalty", "debt_term_months", "debt_stage", "rowIndex"];

/// Qualifying debts keyed by account id. When an account has several rows, the last one
/// read wins.
#[derive(Debug, Clone, Default)]
pub struct DebtMap {
    by_account: HashMap<String, Debt>,
    account_ids: Vec<Value>,
}

impl DebtMap {
    pub fn from_debts(debts: impl IntoIterator<Item = Debt>) -> Self {
        let mut map = Self::default();
        let mut seen = HashSet::new();
        for debt in debts {
            let Some(key) = record_key(&debt.account_id) else { continue };
            if seen.insert(key.clone()) {
                map.account_ids.push(debt.account_id.clone());
            }
            map.by_account.insert(key, debt);
        }
        map
    }

    pub fn is_empty(&self) -> bool {
        self.account_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.account_ids.len()
    }

    /// Distinct owning account ids in the order the debts were read.
    pub fn account_ids(&self) -> &[Value] {
        &self.account_ids
    }

    pub fn get(&self, account_id: &Value) -> Option<&Debt> {
        record_key(account_id).and_then(|key| self.by_account.get(&key))
    }
}

/// An account row with its correlated debt fields and absolute position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedAccountRow {
    #[serde(flatten)]
    pub account: Record,
    pub debt: Number,
    pub penalty: Number,
    pub debt_term_months: Option<i64>,
    pub debt_stage: Option<String>,
    #[serde(rename = "rowIndex")]
    pub row_index: i64,
}

pub struct Combinator<'a> {
    mode: FilterMode,
    house_ids: Option<&'a [Value]>,
    debts: &'a DebtMap,
}

impl<'a> Combinator<'a> {
    pub fn new(mode: FilterMode, house_ids: Option<&'a [Value]>, debts: &'a DebtMap) -> Self {
        Self { mode, house_ids, debts }
    }

    /// Applies the mode's retention rule to a fetched account page, then enriches the
    /// survivors in page order.
    pub fn combine(&self, accounts: Vec<Record>, window: &PageWindow) -> Vec<EnrichedAccountRow> {
        accounts
            .into_iter()
            .filter(|account| self.retains(account))
            .enumerate()
            .map(|(i, account)| self.enrich(account, window.row_index(i)))
            .collect()
    }

    /// `all` pages were already narrowed by the store. In `any` mode a row stays when it
    /// sits in a listed house (or no houses were listed) or owns a qualifying debt.
    pub fn retains(&self, account: &Record) -> bool {
        match self.mode {
            FilterMode::All => true,
            FilterMode::Any => self.in_house(account) || self.has_debt(account),
        }
    }

    pub fn enrich(&self, mut account: Record, row_index: i64) -> EnrichedAccountRow {
        let debt = account.get("id").and_then(|id| self.debts.get(id)).cloned();
        for column in ENRICHED_COLUMNS {
            account.remove(column);
        }

        match debt {
            Some(debt) => EnrichedAccountRow {
                account,
                debt: debt.amount.unwrap_or_else(|| Number::from(0)),
                penalty: debt.penalty.unwrap_or_else(|| Number::from(0)),
                debt_term_months: debt.debt_term_months,
                debt_stage: debt.stage,
                row_index,
            },
            None => EnrichedAccountRow {
                account,
                debt: Number::from(0),
                penalty: Number::from(0),
                debt_term_months: None,
                debt_stage: None,
                row_index,
            },
        }
    }

    fn in_house(&self, account: &Record) -> bool {
        let Some(house_ids) = self.house_ids else { return true };
        let Some(house) = account.get("house_id").and_then(record_key) else { return false };
        house_ids.iter().filter_map(record_key).any(|id| id == house)
    }

    fn has_debt(&self, account: &Record) -> bool {
        account.get("id").and_then(|id| self.debts.get(id)).is_some()
    }
}
