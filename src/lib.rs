pub mod app;
pub mod cache;
pub mod config;
pub mod corpus;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod output;
pub mod permute;
pub mod smiles;
pub mod split;
