use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role, decides which dashboard and which list endpoints apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
  #[serde(alias = "farmer", alias = "ROLE_FARMER")]
  Farmer,
  #[serde(alias = "consultant", alias = "ROLE_CONSULTANT")]
  Consultant,
  #[serde(alias = "admin", alias = "ROLE_ADMIN")]
  Admin,
}

impl Role {
  /// Path segment used by role-scoped list endpoints (`/consultations/farmer/{id}`).
  pub fn path_segment(self) -> &'static str {
    match self {
      Role::Farmer => "farmer",
      Role::Consultant => "consultant",
      Role::Admin => "admin",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().trim_start_matches("role_") {
      "farmer" => Some(Role::Farmer),
      "consultant" => Some(Role::Consultant),
      "admin" => Some(Role::Admin),
      _ => None,
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      Role::Farmer => "Farmer",
      Role::Consultant => "Consultant",
      Role::Admin => "Admin",
    };
    f.write_str(label)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerProfile {
  pub id: i64,
  #[serde(default)]
  pub full_name: String,
  #[serde(default)]
  pub email: String,
  pub phone: Option<String>,
  pub farm_name: Option<String>,
  pub location: Option<String>,
  pub farm_size_acres: Option<f64>,
  #[serde(default)]
  pub primary_crops: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantProfile {
  pub id: i64,
  #[serde(default)]
  pub full_name: String,
  #[serde(default)]
  pub email: String,
  pub phone: Option<String>,
  #[serde(default)]
  pub expertise: Vec<String>,
  pub years_experience: Option<u32>,
  pub hourly_rate: Option<f64>,
  #[serde(default)]
  pub approved: bool,
  pub rating: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConsultationStatus {
  #[serde(alias = "pending")]
  Pending,
  #[serde(alias = "accepted")]
  Accepted,
  #[serde(alias = "rejected")]
  Rejected,
  #[serde(alias = "completed")]
  Completed,
  #[serde(alias = "cancelled", alias = "CANCELED")]
  Cancelled,
}

impl ConsultationStatus {
  pub fn label(self) -> &'static str {
    match self {
      ConsultationStatus::Pending => "Pending",
      ConsultationStatus::Accepted => "Accepted",
      ConsultationStatus::Rejected => "Rejected",
      ConsultationStatus::Completed => "Completed",
      ConsultationStatus::Cancelled => "Cancelled",
    }
  }

  /// Whether the consultation can still change state.
  pub fn is_open(self) -> bool {
    matches!(
      self,
      ConsultationStatus::Pending | ConsultationStatus::Accepted
    )
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
  pub id: i64,
  pub farmer_id: i64,
  pub farmer_name: Option<String>,
  pub consultant_id: i64,
  pub consultant_name: Option<String>,
  #[serde(default)]
  pub topic: String,
  pub description: Option<String>,
  pub status: ConsultationStatus,
  pub requested_at: Option<NaiveDateTime>,
  pub scheduled_for: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationReport {
  pub id: i64,
  pub consultation_id: i64,
  pub consultant_id: i64,
  pub farmer_id: i64,
  #[serde(default)]
  pub findings: String,
  #[serde(default)]
  pub recommendations: String,
  pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VisitStatus {
  #[serde(alias = "scheduled")]
  Scheduled,
  #[serde(alias = "completed")]
  Completed,
  #[serde(alias = "cancelled", alias = "CANCELED")]
  Cancelled,
}

impl VisitStatus {
  pub fn label(self) -> &'static str {
    match self {
      VisitStatus::Scheduled => "Scheduled",
      VisitStatus::Completed => "Completed",
      VisitStatus::Cancelled => "Cancelled",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmVisit {
  pub id: i64,
  pub consultation_id: i64,
  pub farmer_id: i64,
  pub consultant_id: i64,
  pub scheduled_date: NaiveDate,
  pub status: VisitStatus,
  pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
  pub id: i64,
  pub consultation_id: i64,
  pub farmer_id: i64,
  pub consultant_id: i64,
  pub rating: u8,
  pub comment: Option<String>,
  pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
  pub id: i64,
  pub email: String,
  #[serde(default)]
  pub full_name: String,
  pub role: Role,
  #[serde(default = "default_active")]
  pub active: bool,
}

fn default_active() -> bool {
  true
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_role_parse() {
    assert_eq!(Role::parse("FARMER"), Some(Role::Farmer));
    assert_eq!(Role::parse("ROLE_CONSULTANT"), Some(Role::Consultant));
    assert_eq!(Role::parse(" admin "), Some(Role::Admin));
    assert_eq!(Role::parse("guest"), None);
  }

  #[test]
  fn test_consultation_from_wire() {
    let value = json!({
      "id": 4,
      "farmerId": 1,
      "consultantId": 2,
      "consultantName": "Dr. Okafor",
      "topic": "Maize leaf blight",
      "status": "PENDING",
      "requestedAt": "2024-03-02T09:15:00"
    });

    let consultation: Consultation = serde_json::from_value(value).unwrap();
    assert_eq!(consultation.status, ConsultationStatus::Pending);
    assert_eq!(consultation.consultant_name.as_deref(), Some("Dr. Okafor"));
    assert!(consultation.requested_at.is_some());
    assert!(consultation.status.is_open());
  }

  #[test]
  fn test_farm_visit_lowercase_status() {
    let value = json!({
      "id": 9,
      "consultationId": 4,
      "farmerId": 1,
      "consultantId": 2,
      "scheduledDate": "2024-04-10",
      "status": "scheduled"
    });

    let visit: FarmVisit = serde_json::from_value(value).unwrap();
    assert_eq!(visit.status, VisitStatus::Scheduled);
    assert_eq!(visit.scheduled_date.to_string(), "2024-04-10");
  }

  #[test]
  fn test_user_account_defaults_active() {
    let value = json!({ "id": 3, "email": "a@b.c", "role": "ADMIN" });
    let user: UserAccount = serde_json::from_value(value).unwrap();
    assert!(user.active);
    assert_eq!(user.role, Role::Admin);
  }
}
