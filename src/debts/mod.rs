//! Debt listings and stage transitions.
//!
//! A listing request is parsed into [`FilterCriteria`], compiled into store queries by
//! [`compiler`], correlated with accounts by [`combinator`] and windowed by [`pager`].

pub mod combinator;
pub mod compiler;
pub mod criteria;
pub mod error;
pub mod listing;
pub mod pager;
pub mod transition;

pub use combinator::{Combinator, DebtMap, EnrichedAccountRow};
pub use compiler::{ListingProfile, QueryPlan, ACCOUNTS_TABLE, DEBT_TABLE};
pub use criteria::{FilterCriteria, FilterMode};
pub use error::DebtError;
pub use listing::{list, DebtPage};
pub use pager::PageWindow;
pub use transition::{transition, TransitionOutcome};
