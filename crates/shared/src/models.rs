use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Domain records
// ============================================================================

/// How an interview is conducted. Wire values are kebab-case ("in-person").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterviewType {
    Phone,
    Video,
    InPerson,
    Panel,
}

/// Where an interview sits in its lifecycle. Wire values are snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    WaitingForFeedback,
    Canceled,
}

/// One person on the interviewing side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interviewer {
    pub name: String,
    #[serde(default)]
    pub title: String,
}

/// One tracked interview, as the backend stores it.
///
/// `id` is absent until the record is first saved; its presence decides
/// update-vs-create on save. `passed` is tri-state: the field being absent on
/// the wire means "result not known yet", which is observable state of its
/// own, distinct from either boolean. The reflection fields are only
/// meaningful once the status is completed or waiting_for_feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub company: String,
    pub role: String,
    /// ISO 8601 timestamp. Kept as the wire string; see [`Interview::parsed_date`].
    pub date: String,
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InterviewStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    /// Self-assessment between 1 and 10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interviewers: Vec<Interviewer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confident_answers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenging_questions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strengths: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comfort_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Whether the record shows up in the community feed.
    #[serde(default)]
    pub is_public: bool,
}

impl Interview {
    /// A fresh unsaved record with the standard defaults for everything
    /// the caller doesn't name.
    pub fn new(
        company: impl Into<String>,
        role: impl Into<String>,
        date: impl Into<String>,
        interview_type: InterviewType,
    ) -> Self {
        Self {
            id: None,
            company: company.into(),
            role: role.into(),
            date: date.into(),
            interview_type,
            status: Some(InterviewStatus::Scheduled),
            passed: None,
            performance_rating: Some(5),
            interviewers: Vec::new(),
            questions: Vec::new(),
            confident_answers: None,
            challenging_questions: None,
            strengths: None,
            improvements: None,
            connection: None,
            comfort_level: None,
            notes: None,
            is_public: true,
        }
    }

    /// Parses the stored timestamp. Accepts full RFC 3339 as well as the
    /// zone-less `YYYY-MM-DDTHH:MM[:SS]` form older records carry.
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.date) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.date, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(&self.date, "%Y-%m-%dT%H:%M"))
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// The signed-in identity as the verification endpoint reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub picture: String,
}

// ============================================================================
// Request / response bodies
// ============================================================================

/// Response of `GET /getInterviews`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewsResponse {
    #[serde(default)]
    pub interviews: Vec<Interview>,
}

/// Response of `GET /auth/user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub user: User,
}

/// Body of `POST /auth/google`: the Google-issued ID token to exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub token: String,
}

/// Response of `POST /auth/google`: the app bearer token and the identity
/// it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: User,
}

// ============================================================================
// Labels and parsing
// ============================================================================

/// Error for enum values given on the command line.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized value: {0}")]
pub struct ParseValueError(pub String);

impl InterviewType {
    pub const ALL: [InterviewType; 4] = [
        InterviewType::Phone,
        InterviewType::Video,
        InterviewType::InPerson,
        InterviewType::Panel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InterviewType::Phone => "Phone",
            InterviewType::Video => "Video",
            InterviewType::InPerson => "In-person",
            InterviewType::Panel => "Panel",
        }
    }
}

impl InterviewStatus {
    pub const ALL: [InterviewStatus; 4] = [
        InterviewStatus::Scheduled,
        InterviewStatus::Completed,
        InterviewStatus::WaitingForFeedback,
        InterviewStatus::Canceled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "Scheduled",
            InterviewStatus::Completed => "Completed",
            InterviewStatus::WaitingForFeedback => "Waiting for feedback",
            InterviewStatus::Canceled => "Canceled",
        }
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for InterviewType {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "phone" => Ok(InterviewType::Phone),
            "video" => Ok(InterviewType::Video),
            "in-person" => Ok(InterviewType::InPerson),
            "panel" => Ok(InterviewType::Panel),
            other => Err(ParseValueError(other.to_string())),
        }
    }
}

impl FromStr for InterviewStatus {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(InterviewStatus::Scheduled),
            "completed" => Ok(InterviewStatus::Completed),
            "waiting_for_feedback" => Ok(InterviewStatus::WaitingForFeedback),
            "canceled" => Ok(InterviewStatus::Canceled),
            other => Err(ParseValueError(other.to_string())),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
