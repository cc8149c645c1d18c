// Module structure for the autolog execution log parser.

// Core pipeline
pub mod parser;
pub mod redact;
pub mod filter;
pub mod store;
pub mod ingest;

// Session and surrounding concerns
pub mod state;
pub mod conf;
pub mod docs;
pub mod runtime;
pub mod cli;
pub mod output;
