//! Common test utilities and helpers
