pub mod client;

pub use client::NotionClient;
