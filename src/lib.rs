//! Used-book marketplace: catalog browsing with shareable filters, a
//! persistent wishlist, a stubbed user session and mock trade and donation
//! forms.

pub mod api;
pub mod catalog;
pub mod charity;
pub mod config;
pub mod database;
pub mod filter;
pub mod forms;
pub mod market;
pub mod models;
pub mod query;
pub mod session;
pub mod traits;
pub mod view;
pub mod wishlist;

pub use market::BookMarket;
