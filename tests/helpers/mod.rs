#![allow(dead_code)]

pub mod context_builder;
pub mod mock_sources;
