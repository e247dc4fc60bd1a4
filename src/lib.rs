//! Chat Relay - streaming front end for chat-completion engines
//!
//! Accepts a chat turn over HTTP, drives one completion engine call, and
//! streams each partial result back as a newline-separated JSON frame.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
