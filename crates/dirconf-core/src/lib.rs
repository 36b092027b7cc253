//! Configuration reconciliation engine for directory server configuration
//! APIs.
//!
//! Given what the caller wants (desired) and what the server holds
//! (observed), the engine plans the minimal ordered list of patch
//! operations, checks polymorphic resources against their variant tables,
//! and maps the server's tagged-union responses back into one local record.
//!
//! # Architecture
//!
//! ```text
//!   desired ──┐                       ┌──────────────────────┐
//!             ├──► DiscriminatorPolicy ─► Vec<ValidationError>│ (stop)
//!   observed ─┤        (prepare)      └──────────────────────┘
//!             │
//!             ▼
//!     ┌────────────────┐   Replace    ┌──────────────┐
//!     │ OperationSeq.  ├─────────────►│  Vec<Operation>  ──► transport
//!     │ detect_scalar  │   Add/Delete │              │
//!     │ detect_collection             └──────────────┘
//!     └────────────────┘
//!
//!   transport ──► ResponsePayload ──► ResponseMapper ──► MappedRecord
//!                  (one slot per         (expected record    (+ warnings)
//!                   variant)              fills the gaps)
//! ```
//!
//! Every function is pure: records are values, nothing is cached between
//! calls, and the only side effect is `tracing` output.

pub mod detect;
pub mod error;
pub mod format;
pub mod mapper;
pub mod operation;
pub mod policy;
pub mod record;
pub mod schema;
pub mod secrets;
pub mod sequencer;
pub mod value;

// Re-export main types
pub use detect::{CollectionDelta, detect_collection, detect_scalar};
pub use error::{EngineError, ErrorCategory, RecordSide, Result};
pub use format::{Format, parse_duration_millis};
pub use mapper::{
    MappedRecord, MappingWarning, ResponseBody, ResponseMapper, ResponsePayload, ResponseSlot,
    SelectedVariant, map_response,
};
pub use operation::{Operation, OperationKind};
pub use policy::{DiscriminatorPolicy, ValidationError, VariantPolicy};
pub use record::ConfigurationRecord;
pub use schema::{Access, FieldSpec};
pub use secrets::{is_obscured_attribute, mark_obscured_fields};
pub use sequencer::build_operations;
pub use value::{AttributeKind, AttributeValue};
