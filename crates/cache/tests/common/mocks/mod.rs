//! Mock implementations of cache collaborators.
