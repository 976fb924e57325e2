pub mod batch;
pub mod listing;

// Re-export handler functions for use in routing
pub use batch::to_candidates as batch_to_candidates;
pub use batch::to_new as batch_to_new;
pub use listing::candidates;
pub use listing::new;
