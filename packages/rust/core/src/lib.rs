//! Core pipeline orchestration for readmepage.
//!
//! This crate ties together fetching, markdown transformation, the table of
//! contents, and page assembly into the end-to-end `run_build` workflow.

pub mod assembler;
pub mod pipeline;
pub mod toc;
