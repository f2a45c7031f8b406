//! Application services: loading, listing state, post pages, the contact
//! form and reports.

pub mod check;
pub mod chrome;
pub mod contact;
pub mod content;
pub mod controller;
pub mod error;
pub mod listing;
pub mod navigation;
pub mod portfolio;
pub mod post_page;
pub mod stream;
