use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use super::entities::Role;

/// Client-side form validation failure. Surfaced inline by views and never
/// sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{0} is required")]
  Required(&'static str),
  #[error("Enter a valid email address")]
  InvalidEmail,
  #[error("Password must be at least {0} characters")]
  PasswordTooShort(usize),
  #[error("Rating must be between 1 and 5")]
  RatingOutOfRange,
  #[error("Admin accounts cannot be self-registered")]
  RoleNotAllowed,
  #[error("Visit date cannot be in the past")]
  DateInPast,
}

const MIN_PASSWORD_LEN: usize = 6;

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    Err(ValidationError::Required(field))
  } else {
    Ok(())
  }
}

fn valid_email(email: &str) -> Result<(), ValidationError> {
  required(email, "Email")?;
  let (local, domain) = email
    .trim()
    .split_once('@')
    .ok_or(ValidationError::InvalidEmail)?;
  if local.is_empty() || !domain.contains('.') || domain.starts_with('.') {
    return Err(ValidationError::InvalidEmail);
  }
  Ok(())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
  pub full_name: String,
  pub email: String,
  pub password: String,
  pub phone: Option<String>,
  pub role: Role,
}

impl RegisterRequest {
  pub fn validate(&self) -> Result<(), ValidationError> {
    required(&self.full_name, "Full name")?;
    valid_email(&self.email)?;
    if self.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    if self.role == Role::Admin {
      return Err(ValidationError::RoleNotAllowed);
    }
    Ok(())
  }
}

/// Partial profile update; absent fields are left unchanged server-side.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub full_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub farm_name: Option<String>,
}

impl ProfileUpdate {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if let Some(name) = &self.full_name {
      required(name, "Full name")?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRequest {
  pub consultant_id: i64,
  pub topic: String,
  pub description: Option<String>,
}

impl ConsultationRequest {
  pub fn validate(&self) -> Result<(), ValidationError> {
    required(&self.topic, "Topic")
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
  pub consultation_id: i64,
  pub findings: String,
  pub recommendations: String,
}

impl ReportDraft {
  pub fn validate(&self) -> Result<(), ValidationError> {
    required(&self.findings, "Findings")?;
    required(&self.recommendations, "Recommendations")
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmVisitRequest {
  pub consultation_id: i64,
  pub scheduled_date: NaiveDate,
  pub notes: Option<String>,
}

impl FarmVisitRequest {
  /// Visits cannot be scheduled in the past.
  pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
    if self.scheduled_date < today {
      return Err(ValidationError::DateInPast);
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDraft {
  pub consultation_id: i64,
  pub rating: u8,
  pub comment: Option<String>,
}

impl FeedbackDraft {
  pub fn validate(&self) -> Result<(), ValidationError> {
    if !(1..=5).contains(&self.rating) {
      return Err(ValidationError::RatingOutOfRange);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn register(email: &str, password: &str, role: Role) -> RegisterRequest {
    RegisterRequest {
      full_name: "Amina Yusuf".to_string(),
      email: email.to_string(),
      password: password.to_string(),
      phone: None,
      role,
    }
  }

  #[test]
  fn test_register_validation() {
    assert!(register("amina@farm.ng", "secret1", Role::Farmer)
      .validate()
      .is_ok());
    assert_eq!(
      register("amina.farm.ng", "secret1", Role::Farmer).validate(),
      Err(ValidationError::InvalidEmail)
    );
    assert_eq!(
      register("amina@farm.ng", "abc", Role::Farmer).validate(),
      Err(ValidationError::PasswordTooShort(6))
    );
    assert_eq!(
      register("amina@farm.ng", "secret1", Role::Admin).validate(),
      Err(ValidationError::RoleNotAllowed)
    );
  }

  #[test]
  fn test_feedback_rating_bounds() {
    let mut draft = FeedbackDraft {
      consultation_id: 1,
      rating: 0,
      comment: None,
    };
    assert_eq!(draft.validate(), Err(ValidationError::RatingOutOfRange));
    draft.rating = 5;
    assert!(draft.validate().is_ok());
    draft.rating = 6;
    assert!(draft.validate().is_err());
  }

  #[test]
  fn test_consultation_request_requires_topic() {
    let req = ConsultationRequest {
      consultant_id: 2,
      topic: "   ".to_string(),
      description: None,
    };
    assert_eq!(req.validate(), Err(ValidationError::Required("Topic")));
  }

  #[test]
  fn test_farm_visit_in_past_rejected() {
    let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    let req = FarmVisitRequest {
      consultation_id: 1,
      scheduled_date: NaiveDate::from_ymd_opt(2024, 5, 9).unwrap(),
      notes: None,
    };
    assert_eq!(req.validate(today), Err(ValidationError::DateInPast));
  }

  #[test]
  fn test_profile_update_skips_absent_fields() {
    let update = ProfileUpdate {
      phone: Some("+254700000000".to_string()),
      ..Default::default()
    };
    let value = serde_json::to_value(&update).unwrap();
    assert_eq!(value, serde_json::json!({ "phone": "+254700000000" }));
  }
}
