//! Typed schemas for platform entities and mutation payloads.
//!
//! Wire names are camelCase; enums travel as upper-case strings.

mod drafts;
mod entities;

pub use drafts::{
  ConsultationRequest, FarmVisitRequest, FeedbackDraft, ProfileUpdate, RegisterRequest,
  ReportDraft, ValidationError,
};
pub use entities::{
  ConsultantProfile, Consultation, ConsultationReport, ConsultationStatus, FarmVisit,
  FarmerProfile, Feedback, Role, UserAccount, VisitStatus,
};
