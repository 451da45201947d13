//! Catalogue of platform API operations.

use reqwest::Method;
use sha2::{Digest, Sha256};

use crate::domain::Role;

const API_PREFIX: &str = "/api/v1";

/// State transitions a consultation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsultationAction {
  Accept,
  Reject,
  Complete,
  Cancel,
}

impl ConsultationAction {
  fn segment(self) -> &'static str {
    match self {
      ConsultationAction::Accept => "accept",
      ConsultationAction::Reject => "reject",
      ConsultationAction::Complete => "complete",
      ConsultationAction::Cancel => "cancel",
    }
  }

  /// Past-tense label for notifications.
  pub fn done_label(self) -> &'static str {
    match self {
      ConsultationAction::Accept => "accepted",
      ConsultationAction::Reject => "rejected",
      ConsultationAction::Complete => "completed",
      ConsultationAction::Cancel => "cancelled",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitAction {
  Complete,
  Cancel,
}

impl VisitAction {
  fn segment(self) -> &'static str {
    match self {
      VisitAction::Complete => "complete",
      VisitAction::Cancel => "cancel",
    }
  }
}

/// One logical API operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
  Login,
  Register,

  FarmerProfile { id: i64 },
  UpdateFarmerProfile { id: i64 },
  Consultants,
  ConsultantProfile { id: i64 },
  UpdateConsultantProfile { id: i64 },

  /// Consultations visible to a user, scoped by role
  Consultations { role: Role, user_id: i64 },
  CreateConsultation,
  UpdateConsultation { id: i64, action: ConsultationAction },

  Reports { role: Role, user_id: i64 },
  CreateReport,

  FarmVisits { role: Role, user_id: i64 },
  CreateFarmVisit,
  UpdateFarmVisit { id: i64, action: VisitAction },

  Feedback { role: Role, user_id: i64 },
  CreateFeedback,

  AdminUsers,
  SetUserStatus { id: i64 },
  PendingConsultants,
  ReviewConsultant { id: i64, approve: bool },
}

impl Endpoint {
  pub fn method(&self) -> Method {
    match self {
      Self::Login
      | Self::Register
      | Self::CreateConsultation
      | Self::CreateReport
      | Self::CreateFarmVisit
      | Self::CreateFeedback => Method::POST,
      Self::UpdateFarmerProfile { .. }
      | Self::UpdateConsultantProfile { .. }
      | Self::UpdateConsultation { .. }
      | Self::UpdateFarmVisit { .. }
      | Self::SetUserStatus { .. }
      | Self::ReviewConsultant { .. } => Method::PUT,
      _ => Method::GET,
    }
  }

  /// Path below the server root, including the `/api/v1` prefix.
  pub fn path(&self) -> String {
    let rest = match self {
      Self::Login => "auth/login".to_string(),
      Self::Register => "auth/register".to_string(),
      Self::FarmerProfile { id } | Self::UpdateFarmerProfile { id } => format!("farmers/{}", id),
      Self::Consultants => "consultants".to_string(),
      Self::ConsultantProfile { id } | Self::UpdateConsultantProfile { id } => {
        format!("consultants/{}", id)
      }
      Self::Consultations { role, user_id } => scoped("consultations", *role, *user_id),
      Self::CreateConsultation => "consultations".to_string(),
      Self::UpdateConsultation { id, action } => {
        format!("consultations/{}/{}", id, action.segment())
      }
      Self::Reports { role, user_id } => scoped("consultation-reports", *role, *user_id),
      Self::CreateReport => "consultation-reports".to_string(),
      Self::FarmVisits { role, user_id } => scoped("farm-visits", *role, *user_id),
      Self::CreateFarmVisit => "farm-visits".to_string(),
      Self::UpdateFarmVisit { id, action } => format!("farm-visits/{}/{}", id, action.segment()),
      Self::Feedback { role, user_id } => scoped("feedback", *role, *user_id),
      Self::CreateFeedback => "feedback".to_string(),
      Self::AdminUsers => "admin/users".to_string(),
      Self::SetUserStatus { id } => format!("admin/users/{}/status", id),
      Self::PendingConsultants => "admin/consultants/pending".to_string(),
      Self::ReviewConsultant { id, approve } => format!(
        "admin/consultants/{}/{}",
        id,
        if *approve { "approve" } else { "reject" }
      ),
    };
    format!("{}/{}", API_PREFIX, rest)
  }

  /// Authentication endpoints go out without a bearer token.
  pub fn is_public(&self) -> bool {
    matches!(self, Self::Login | Self::Register)
  }

  /// Stable key for de-duplicating concurrent requests.
  pub fn cache_hash(&self) -> String {
    let input = format!("{} {}", self.method(), self.path());

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }

  /// Short human-readable name for logs.
  pub fn description(&self) -> String {
    match self {
      Self::Login => "login".to_string(),
      Self::Register => "registration".to_string(),
      Self::FarmerProfile { id } => format!("farmer profile {}", id),
      Self::UpdateFarmerProfile { id } => format!("farmer profile {} update", id),
      Self::Consultants => "consultant directory".to_string(),
      Self::ConsultantProfile { id } => format!("consultant profile {}", id),
      Self::UpdateConsultantProfile { id } => format!("consultant profile {} update", id),
      Self::Consultations { role, user_id } => {
        format!("consultations for {} {}", role.path_segment(), user_id)
      }
      Self::CreateConsultation => "new consultation".to_string(),
      Self::UpdateConsultation { id, action } => {
        format!("consultation {} {}", id, action.segment())
      }
      Self::Reports { role, user_id } => format!("reports for {} {}", role.path_segment(), user_id),
      Self::CreateReport => "new report".to_string(),
      Self::FarmVisits { role, user_id } => {
        format!("farm visits for {} {}", role.path_segment(), user_id)
      }
      Self::CreateFarmVisit => "new farm visit".to_string(),
      Self::UpdateFarmVisit { id, action } => format!("farm visit {} {}", id, action.segment()),
      Self::Feedback { role, user_id } => {
        format!("feedback for {} {}", role.path_segment(), user_id)
      }
      Self::CreateFeedback => "new feedback".to_string(),
      Self::AdminUsers => "user accounts".to_string(),
      Self::SetUserStatus { id } => format!("user {} status", id),
      Self::PendingConsultants => "pending consultants".to_string(),
      Self::ReviewConsultant { id, approve } => format!(
        "consultant {} {}",
        id,
        if *approve { "approval" } else { "rejection" }
      ),
    }
  }
}

/// Role-scoped collection path; admins see the whole collection.
fn scoped(resource: &str, role: Role, user_id: i64) -> String {
  match role {
    Role::Admin => format!("admin/{}", resource),
    _ => format!("{}/{}/{}", resource, role.path_segment(), user_id),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_role_scoped_paths() {
    let farmer = Endpoint::Consultations {
      role: Role::Farmer,
      user_id: 42,
    };
    assert_eq!(farmer.path(), "/api/v1/consultations/farmer/42");
    assert_eq!(farmer.method(), Method::GET);

    let consultant = Endpoint::FarmVisits {
      role: Role::Consultant,
      user_id: 7,
    };
    assert_eq!(consultant.path(), "/api/v1/farm-visits/consultant/7");

    let admin = Endpoint::Reports {
      role: Role::Admin,
      user_id: 1,
    };
    assert_eq!(admin.path(), "/api/v1/admin/consultation-reports");
  }

  #[test]
  fn test_mutation_paths() {
    let accept = Endpoint::UpdateConsultation {
      id: 3,
      action: ConsultationAction::Accept,
    };
    assert_eq!(accept.path(), "/api/v1/consultations/3/accept");
    assert_eq!(accept.method(), Method::PUT);

    let approve = Endpoint::ReviewConsultant {
      id: 5,
      approve: true,
    };
    assert_eq!(approve.path(), "/api/v1/admin/consultants/5/approve");
    assert_eq!(Endpoint::CreateFeedback.method(), Method::POST);
  }

  #[test]
  fn test_only_auth_endpoints_are_public() {
    assert!(Endpoint::Login.is_public());
    assert!(Endpoint::Register.is_public());
    assert!(!Endpoint::Consultants.is_public());
    assert!(!Endpoint::FarmerProfile { id: 1 }.is_public());
  }

  #[test]
  fn test_cache_hash_is_stable_and_distinct() {
    let a = Endpoint::Feedback {
      role: Role::Farmer,
      user_id: 1,
    };
    let b = Endpoint::Feedback {
      role: Role::Farmer,
      user_id: 2,
    };
    assert_eq!(a.cache_hash(), a.clone().cache_hash());
    assert_ne!(a.cache_hash(), b.cache_hash());
    assert_eq!(a.cache_hash().len(), 64);
    // Same path, different method
    assert_ne!(
      Endpoint::FarmerProfile { id: 1 }.cache_hash(),
      Endpoint::UpdateFarmerProfile { id: 1 }.cache_hash()
    );
  }
}
