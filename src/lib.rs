//! # CARTOGRAPH
//!
//! Component dependency graphs for modern web app repositories.
//!
//! CARTOGRAPH ingests a remote repository, identifies the files that make up
//! the structural skeleton of a React/Next.js-style application (pages,
//! layouts, components, hooks, contexts, utilities), and assembles the
//! discovered entities into a directed dependency graph.
//!
//! ## Pipeline
//!
//! fetch tree -> per-file static analysis -> relationship resolution ->
//! cache -> streamed events
//!
//! Analysis results are cached per (repository, branch) fingerprint so
//! repeated requests skip both network and parsing work.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod core;
pub mod fetch;
