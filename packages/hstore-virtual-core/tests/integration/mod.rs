//! Integration test suite.
//!
//! 1. Composition and binding
//! 2. Attribute access through records
//! 3. Field list splicing laws
//! 4. Concurrent access

pub mod access_tests;
pub mod compose_bind_tests;
pub mod concurrency_tests;
pub mod helpers;
pub mod splice_tests;
