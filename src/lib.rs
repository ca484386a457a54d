pub mod environment;
pub mod ingest;
pub mod lexicon;
pub mod logging;
pub mod model;
pub mod questions;
pub mod scoring;
pub mod startup;
pub mod web;

pub const TARGET_SCORING: &str = "scoring";
pub const TARGET_INGEST: &str = "ingest";
pub const TARGET_LEXICON: &str = "lexicon";
pub const TARGET_MODEL: &str = "qa_model";
pub const TARGET_WEB_REQUEST: &str = "web_request";
