//! Consistency properties of the replicas and the guarded operations,
//! including the gaps that are kept on purpose: duplicate delivery is not
//! deduplicated, and stock checks are not atomic with the save.

#[path = "../support/mod.rs"]
mod support;

mod concurrency;
mod properties;
mod scenarios;
