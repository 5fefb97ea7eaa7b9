mod client;

pub use client::{GraphClient, GraphClientBuilder};

/// Public endpoint of the directory API.
pub const GRAPH_ENDPOINT: &str = "https://graph.microsoft.com";

/// Token scope covering the directory API.
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
