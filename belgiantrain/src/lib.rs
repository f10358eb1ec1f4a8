//! SNCB/NMBS train monitoring.
//!
//! Polls the iRail API for a set of station pairs and departure boards,
//! keeps a sensor per monitored value ("ride takes 32 minutes", "Track 4 -
//! Ostend"), and serves sensor state and one-shot lookups over HTTP.

pub mod app;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod irail;
pub mod sensor;
pub mod services;
pub mod stations;
pub mod web;
