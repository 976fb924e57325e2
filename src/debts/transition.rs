use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::compiler::DEBT_TABLE;
use super::error::DebtError;
use crate::models::Stage;
use crate::store::{RecordStore, Update};

/// Result of a guarded bulk stage move.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionOutcome {
    pub success: bool,
    pub to_stage: Stage,
    pub moved_count: usize,
    /// Input length minus moved rows. Unknown ids, duplicates and rows in the wrong
    /// stage all count here alike.
    pub unchanged_count: usize,
    pub moved_ids: Vec<Value>,
}

/// Moves every `debt` row owned by `account_ids` that currently sits in `to.source()`
/// into `to`, stamping `updated_at`. Rows in any other stage are left alone.
///
/// `account_ids` is the raw request field and must be a non-empty JSON array.
pub async fn transition(store: &dyn RecordStore, account_ids: Option<&Value>, to: Stage) -> Result<TransitionOutcome, DebtError> {
    let ids = match account_ids {
        Some(Value::Array(ids)) if !ids.is_empty() => ids.clone(),
        _ => return Err(DebtError::EmptyAccountIds),
    };
    let requested = ids.len();

    let update = Update::table(DEBT_TABLE)
        .set("stage", to.as_str())
        .set("updated_at", chrono::Utc::now().to_rfc3339())
        .is_in("account_id", ids)
        .eq("stage", to.source().as_str())
        .returning(["account_id"]);

    let moved_ids: Vec<Value> = store
        .update(&update)
        .await?
        .into_iter()
        .map(|mut row| row.remove("account_id").unwrap_or(Value::Null))
        .collect();

    let moved_count = moved_ids.len();
    let unchanged_count = requested.saturating_sub(moved_count);
    info!(to_stage = %to, requested, moved = moved_count, unchanged = unchanged_count, "Debt stage transition");

    Ok(TransitionOutcome {
        success: true,
        to_stage: to,
        moved_count,
        unchanged_count,
        moved_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn store() -> MemoryStore {
        MemoryStore::from_json(json!({
            "debt": [
                { "account_id": 1, "stage": "candidates", "amount": 100 },
                { "account_id": 2, "stage": "new", "amount": 200 },
                { "account_id": 3, "stage": "closed", "amount": 300 }
            ]
        }))
        .unwrap()
    }

    async fn stage_of(store: &MemoryStore, account_id: i64) -> Value {
        store
            .rows("debt")
            .await
            .unwrap()
            .into_iter()
            .find(|r| r["account_id"] == json!(account_id))
            .map(|r| r["stage"].clone())
            .unwrap()
    }

    #[tokio::test]
    async fn moves_only_rows_in_the_source_stage() {
        let store = store();
        let outcome = transition(&store, Some(&json!([1, 2, 3])), Stage::New).await.unwrap();
        assert_eq!(outcome.moved_count, 1);
        assert_eq!(outcome.moved_ids, vec![json!(1)]);
        assert_eq!(outcome.unchanged_count, 2);
        assert_eq!(stage_of(&store, 1).await, json!("new"));
        assert_eq!(stage_of(&store, 3).await, json!("closed"));
    }

    #[tokio::test]
    async fn stamps_updated_at_on_moved_rows() {
        let store = store();
        transition(&store, Some(&json!([2])), Stage::Candidates).await.unwrap();
        let rows = store.rows("debt").await.unwrap();
        let moved = rows.iter().find(|r| r["account_id"] == json!(2)).unwrap();
        let stamp = moved["updated_at"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
        assert!(rows.iter().find(|r| r["account_id"] == json!(1)).unwrap().get("updated_at").is_none());
    }

    #[tokio::test]
    async fn second_call_moves_nothing() {
        let store = store();
        let first = transition(&store, Some(&json!([1])), Stage::New).await.unwrap();
        let second = transition(&store, Some(&json!([1])), Stage::New).await.unwrap();
        assert_eq!(first.moved_count, 1);
        assert_eq!(second.moved_count, 0);
        assert_eq!(second.unchanged_count, 1);
        assert!(second.moved_ids.is_empty());
    }

    #[tokio::test]
    async fn string_ids_match_numeric_rows() {
        let store = store();
        let outcome = transition(&store, Some(&json!(["1", "1"])), Stage::New).await.unwrap();
        assert_eq!(outcome.moved_count, 1);
        assert_eq!(outcome.unchanged_count, 1);
    }

    #[tokio::test]
    async fn rejects_missing_or_empty_ids() {
        let store = store();
        for raw in [None, Some(json!([])), Some(json!("1")), Some(json!({ "id": 1 }))] {
            let err = transition(&store, raw.as_ref(), Stage::New).await.unwrap_err();
            assert!(matches!(err, DebtError::EmptyAccountIds));
        }
    }

    #[test]
    fn outcome_serializes_with_snake_case_stage() {
        let outcome = TransitionOutcome {
            success: true,
            to_stage: Stage::Candidates,
            moved_count: 0,
            unchanged_count: 2,
            moved_ids: vec![],
        };
        assert_eq!(
            serde_json::to_value(outcome).unwrap(),
            json!({ "success": true, "to_stage": "candidates", "moved_count": 0, "unchanged_count": 2, "moved_ids": [] })
        );
    }
}
