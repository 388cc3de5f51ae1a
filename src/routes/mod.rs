//! Route modules for Folio Server

pub mod chat;
pub mod files;
pub mod health;
pub mod index;
pub mod viewer;
