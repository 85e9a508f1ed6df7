//! Read-only viewer for the content of a Domo instance: dashboards and their
//! cards, datasets, and dataflows.
//!
//! The library exposes the fetch pipeline (client → normalize → model →
//! project), the session controller that drives it, and the web and
//! terminal surfaces built on top.

pub mod activity;
pub mod cli;
pub mod client;
pub mod config;
pub mod model;
pub mod normalize;
pub mod notice;
pub mod project;
pub mod session;
pub mod web;
