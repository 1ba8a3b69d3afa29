//! Pipeline stages for turning one product photo into a catalog record.
//!
//! Each submodule implements exactly one step so it can be tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ encode ──▶ llm ──▶ postprocess ──▶ parse ──▶ augment ──▶ classify
//! (sanitise)  (base64)   (VLM)   (cleanup)      (fields)  (web search) (keywords)
//! ```
//!
//! 1. [`upload`]:  sanitise the client filename and optionally stage bytes
//! 2. [`encode`]:  decode the upload and base64-wrap it for the model;
//!    also the storage/export encoding of the original bytes
//! 3. [`llm`]:     the single vision model call, behind [`llm::ProductModel`]
//! 4. [`postprocess`]: deterministic cleanup of reply formatting quirks
//! 5. [`parse`]:   extract the product name and specifications block
//! 6. [`augment`]: search the web when the specifications look thin
//! 7. [`classify`]: keyword-based category assignment
//!
//! The orchestration lives in [`crate::catalog`].

pub mod augment;
pub mod classify;
pub mod encode;
pub mod llm;
pub mod parse;
pub mod postprocess;
pub mod upload;
