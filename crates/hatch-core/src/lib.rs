//! Core library for hatch, a Go project scaffolder.
//!
//! A template is acquired from a remote repository or a local directory and
//! then rewritten into a new project: placeholder paths are renamed, the
//! module path is replaced in `go.mod` and in every import, and `__Name__`
//! placeholders are filled in. [`pipeline::materialize`] runs the whole flow.
//!
//! Version-control access goes through the [`backend::GitBackend`] trait; the
//! production implementation lives in [`hatch_git`](https://docs.rs/hatch-git).

pub mod backend;
pub mod config;
pub mod content;
pub mod error;
pub mod fetch;
pub mod golang;
pub mod identifier;
pub mod manifest;
pub mod patterns;
pub mod pipeline;
pub mod project;
pub mod rename;
pub mod source;
pub mod vars;
pub mod walk;

#[cfg(test)]
pub(crate) mod testing;
