//! Workspace root package. It only carries development tooling such as the
//! pre-commit hook configuration; the code lives in `crates/`.
