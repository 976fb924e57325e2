use serde::Serialize;
use serde_json::{Map, Number, Value};

use super::compiler::ListingProfile;
use super::error::DebtError;
use super::pager::PageWindow;
use crate::store::record::record_key;

/// How house membership and debt qualification combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Intersection: the account must have a qualifying debt and sit in a listed house.
    All,
    /// Union: either condition keeps the account.
    Any,
}

impl FilterMode {
    /// An absent field means `all`; anything present must be exactly `"all"` or `"any"`.
    pub fn parse(raw: Option<&Value>) -> Result<Self, DebtError> {
        match raw {
            None => Ok(FilterMode::All),
            Some(Value::String(s)) if s == "all" => Ok(FilterMode::All),
            Some(Value::String(s)) if s == "any" => Ok(FilterMode::Any),
            Some(_) => Err(DebtError::InvalidFilterMode),
        }
    }
}

/// Request-scoped listing filters after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Empty means no house restriction.
    pub house_ids: Vec<Value>,
    pub min_debt: Option<Number>,
    pub min_term: Option<i64>,
    pub mode: FilterMode,
    pub window: PageWindow,
}

impl FilterCriteria {
    /// Reads a listing request body (`houseIds`, `minDebt`, `minTerm`, `filterMode`, `page`,
    /// `pageSize`). Fields the profile does not use are ignored entirely.
    ///
    /// `minDebt` applies only as a JSON number above zero and `minTerm` only as a positive
    /// integer; zero, negative or non-numeric values leave the filter unset.
    pub fn parse(body: &Value, profile: &ListingProfile) -> Result<Self, DebtError> {
        let empty = Map::new();
        let fields = body.as_object().unwrap_or(&empty);

        let mode = if profile.honors_filter_mode {
            FilterMode::parse(fields.get("filterMode"))?
        } else {
            FilterMode::All
        };

        let (min_debt, min_term) = if profile.amount_term_filters {
            (positive_number(fields.get("minDebt")), positive_integer(fields.get("minTerm")))
        } else {
            (None, None)
        };

        Ok(Self {
            house_ids: house_ids(fields.get("houseIds")),
            min_debt,
            min_term,
            mode,
            window: PageWindow::from_request(fields.get("page"), fields.get("pageSize")),
        })
    }

    pub fn house_filter(&self) -> Option<&[Value]> {
        if self.house_ids.is_empty() { None } else { Some(&self.house_ids) }
    }
}

fn house_ids(raw: Option<&Value>) -> Vec<Value> {
    match raw {
        Some(Value::Array(ids)) => ids.iter().filter(|id| record_key(id).is_some()).cloned().collect(),
        _ => vec![],
    }
}

fn positive_number(raw: Option<&Value>) -> Option<Number> {
    match raw {
        Some(Value::Number(n)) if n.as_f64().is_some_and(|f| f > 0.0) => Some(n.clone()),
        _ => None,
    }
}

fn positive_integer(raw: Option<&Value>) -> Option<i64> {
    let Some(Value::Number(n)) = raw else { return None };
    if let Some(i) = n.as_i64() {
        return (i > 0).then_some(i);
    }
    n.as_f64()
        .filter(|f| *f > 0.0 && f.fract() == 0.0 && *f <= i64::MAX as f64)
        .map(|f| f as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidates(body: Value) -> Result<FilterCriteria, DebtError> {
        FilterCriteria::parse(&body, &ListingProfile::CANDIDATES)
    }

    #[test]
    fn defaults_for_an_empty_body() {
        let criteria = candidates(json!({})).unwrap();
        assert_eq!(criteria.mode, FilterMode::All);
        assert!(criteria.house_filter().is_none());
        assert_eq!(criteria.min_debt, None);
        assert_eq!(criteria.min_term, None);
        assert_eq!(criteria.window, PageWindow::new(0, 20));
    }

    #[test]
    fn invalid_filter_modes_are_client_errors() {
        for raw in [json!("some"), json!(null), json!(1), json!("ALL")] {
            let err = candidates(json!({ "filterMode": raw })).unwrap_err();
            assert!(matches!(err, DebtError::InvalidFilterMode), "accepted {}", raw);
            assert!(err.is_client_error());
        }
        assert_eq!(candidates(json!({ "filterMode": "any" })).unwrap().mode, FilterMode::Any);
    }

    #[test]
    fn zero_or_invalid_thresholds_are_unset() {
        let criteria = candidates(json!({ "minDebt": 0, "minTerm": 0 })).unwrap();
        assert_eq!((criteria.min_debt, criteria.min_term), (None, None));

        let criteria = candidates(json!({ "minDebt": "500", "minTerm": "6" })).unwrap();
        assert_eq!((criteria.min_debt, criteria.min_term), (None, None));

        let criteria = candidates(json!({ "minDebt": -1, "minTerm": 2.5 })).unwrap();
        assert_eq!((criteria.min_debt, criteria.min_term), (None, None));
    }

    #[test]
    fn positive_thresholds_apply() {
        let criteria = candidates(json!({ "minDebt": 99.5, "minTerm": 6.0 })).unwrap();
        assert_eq!(criteria.min_debt.and_then(|n| n.as_f64()), Some(99.5));
        assert_eq!(criteria.min_term, Some(6));
    }

    #[test]
    fn house_ids_keep_scalars_only() {
        let criteria = candidates(json!({ "houseIds": [1, "2", null, {}] })).unwrap();
        assert_eq!(criteria.house_ids, vec![json!(1), json!("2")]);
        assert!(candidates(json!({ "houseIds": 7 })).unwrap().house_filter().is_none());
    }

    #[test]
    fn new_profile_ignores_mode_and_thresholds() {
        let body = json!({ "filterMode": "bogus", "minDebt": 10, "minTerm": 3, "houseIds": [4] });
        let criteria = FilterCriteria::parse(&body, &ListingProfile::NEW).unwrap();
        assert_eq!(criteria.mode, FilterMode::All);
        assert_eq!((criteria.min_debt, criteria.min_term), (None, None));
        assert_eq!(criteria.house_ids, vec![json!(4)]);
    }

    #[test]
    fn non_object_body_reads_as_defaults() {
        let criteria = FilterCriteria::parse(&json!([1, 2]), &ListingProfile::CANDIDATES).unwrap();
        assert_eq!(criteria.window.size, 20);
    }
}
