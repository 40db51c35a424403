//! Subreddit RSS library.
//!
//! Serves a subreddit listing as an RSS feed whose items carry the content the
//! posts link to: images, videos, galleries, embeds and link previews.

pub mod config;
pub mod constants;
pub mod enrich;
pub mod feed;
pub mod reddit;
pub mod web;
