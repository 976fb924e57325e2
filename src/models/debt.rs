use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Lifecycle stage of a debt record. Only these two are listed or moved; rows in any
/// other stage are carried as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Candidates,
    New,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Candidates => "candidates",
            Stage::New => "new",
        }
    }

    /// The stage a record has to be in before it may move to `self`.
    pub fn source(&self) -> Stage {
        match self {
            Stage::Candidates => Stage::New,
            Stage::New => Stage::Candidates,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The debt columns the listings read. `account_id` stays an opaque JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub account_id: Value,
    #[serde(default)]
    pub amount: Option<Number>,
    #[serde(default)]
    pub penalty: Option<Number>,
    #[serde(default)]
    pub debt_term_months: Option<i64>,
    #[serde(default)]
    pub stage: Option<String>,
}

/// Columns selected for [`Debt`].
pub const DEBT_COLUMNS: [&str; 5] = ["account_id", "amount", "penalty", "debt_term_months", "stage"];
