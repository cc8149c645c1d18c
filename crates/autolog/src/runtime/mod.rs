//! Runtime module — process startup: logging, config, session.

pub mod boot;
