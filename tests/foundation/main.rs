//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Key, EntityId, EntityType, and Error.

mod keys;
