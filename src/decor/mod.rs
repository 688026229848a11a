//! Custom decoration management
//!
//! This module provides:
//! - **operation**: the pending-operation state machine
//! - **record**: one decoration and its naming rules
//! - **collection**: the live list the GUI edits
//! - **reconcile**: applying pending edits to the decor folder on save

pub mod collection;
pub mod operation;
pub mod reconcile;
pub mod record;

// Re-export commonly used types
pub use collection::DecorCollection;
pub use operation::{DecorationOperation, OperationSet};
pub use reconcile::{ReconcileReport, reconcile};
pub use record::{DecorationRecord, sanitize_name};
