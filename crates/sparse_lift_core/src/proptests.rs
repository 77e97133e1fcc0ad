//! Property-based tests for sparse vectors, elimination and the codec.
