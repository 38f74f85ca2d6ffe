//! Route modules for Context Weaver Server

pub mod annotations;
pub mod connections;
pub mod documents;
pub mod health;
