//! # Trustgraph Testkit
//!
//! Testing utilities for trustgraph.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Deterministic keys and a grant graph builder pinned to a
//!   fixed time
//! - **Generators**: Proptest strategies for keys, namespaces and masks
//!
//! ## Test Fixtures
//!
//! ```rust
//! use trustgraph_core::PermissionMask;
//! use trustgraph_testkit::{GraphFixture, TestKey, HOUR, T0};
//!
//! let dev = TestKey::from_seed(1);
//! let fixture = GraphFixture::new(T0).anchor(&dev, "teamA/app", PermissionMask::READ, HOUR);
//! let graph = fixture.graph();
//! assert_eq!(graph.len(), 1);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use trustgraph_testkit::generators::{namespace, permission_mask};
//!
//! proptest! {
//!     #[test]
//!     fn mask_is_never_empty(mask in permission_mask()) {
//!         prop_assert!(!mask.is_empty());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{test_keys, GraphFixture, TestKey, HOUR, MINUTE, T0};
pub use trustgraph_core::ManualClock;
