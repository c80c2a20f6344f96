//! Core types for S7-GRAPH sequence models.
//!
//! This crate provides the types shared by the parser and the diagram
//! pipeline:
//!
//! - **Identifiers**: interned step and transition names ([`identifier::Id`])
//! - **Model**: sequences, steps and transitions ([`model`] module)

pub mod identifier;
pub mod model;
