//! # Tenancy Engine
//!
//! Authorization and membership-lifecycle engine for multi-tenant
//! organizations, built on the domain models in `tenancy-org`.
//!
//! ## Overview
//!
//! The tenancy-engine crate handles:
//! - **Gate**: Pure authorization predicates every mutating operation runs first
//! - **Membership**: Privilege assignment/removal and organization bootstrap
//! - **Invitations**: Issuance, duplicate detection, bulk invites, notifications
//! - **Requests**: Pending membership-request listing and atomic approval
//! - **Teams**: Team CRUD and roster management
//! - **Store contracts**: Capability-scoped traits plus a unit-of-work abstraction
//!
//! ## Architecture
//!
//! ```text
//! RequestPrincipal ──→ gate ──→ workflow ──→ UnitOfWork ──→ store
//!                                   │
//!                                   ├─→ InvitationNotifier (best-effort)
//!                                   └─→ TelemetrySink (never blocks)
//! ```
//!
//! Every mutating entry point resolves identity and scope from the
//! explicit principal, runs the gate, and only then touches state. Multi-
//! row sequences run inside a unit of work and commit all-or-nothing;
//! validation and authorization failures never open one.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tenancy_engine::memory::MemoryStore;
//! use tenancy_engine::{
//!     InvitationWorkflow, MembershipPolicyEngine, MembershipRequestWorkflow,
//!     RecordingNotifier, TracingSink,
//! };
//!
//! let store = Arc::new(MemoryStore::new());
//! let telemetry = Arc::new(TracingSink);
//! let notifier = Arc::new(RecordingNotifier::new());
//!
//! let membership = MembershipPolicyEngine::new(store.clone(), telemetry.clone());
//! let requests = Arc::new(MembershipRequestWorkflow::new(store.clone(), telemetry.clone()));
//! let invitations = InvitationWorkflow::new(store, requests, notifier, telemetry);
//! ```
//!
//! ## Concurrency
//!
//! The engine holds no in-process locks: the store's transaction mechanism
//! is the only concurrency-correctness tool. Pre-check-then-insert inside
//! a transaction is optimistic and is expected to be backed by row-level
//! uniqueness constraints in the persistence layer; a constraint violation
//! surfaces as the matching domain conflict.

pub mod error;
pub mod gate;
pub mod invitation;
pub mod membership;
pub mod memory;
pub mod notify;
pub mod requests;
pub mod store;
pub mod teams;

// Re-export main types for convenience
pub use error::{EngineError, EngineResult};
pub use invitation::{BulkInviteFailure, BulkInviteOutcome, InvitationWorkflow, InviteItem};
pub use membership::MembershipPolicyEngine;
pub use notify::{
    FailingNotifier, InvitationNotifier, NotifyError, RecordingNotifier, RecordingSink,
    TelemetrySink, TracingSink,
};
pub use requests::{MembershipRequestWorkflow, PendingRequestApprover};
pub use store::{StoreError, StoreResult, TenancyStore, UnitOfWork};
pub use teams::TeamRosterEngine;
