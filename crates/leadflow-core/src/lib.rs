//! Leadflow Core - Lead routing and delivery pipeline
//!
//! This crate implements the capture-to-redirect pipeline: attribution
//! extraction, lead deduplication, webhook fan-out with transport
//! fallback, quota-governed SMTP credential rotation, weighted offer
//! selection, and audited redirect resolution.

pub mod attribution;
pub mod capture;
pub mod content;
pub mod dispatch;
pub mod offers;
pub mod redirect;
pub mod rotation;

pub use attribution::extract_attribution;
pub use capture::{CaptureRequest, LeadIntake};
pub use content::{ContentGenerator, HttpContentGenerator};
pub use dispatch::{DispatchMeta, FanoutDispatcher};
pub use offers::OfferEngine;
pub use redirect::RedirectOrchestrator;
pub use rotation::SmtpRotationPool;
