use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------      UserRole       ---------------------------------------------------------
/// Which side of an order a user is on. Listing queries are scoped by role so a user who both
/// buys and sells sees two distinct order books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Buyer,
    Seller,
}

#[derive(Debug, Clone, Error)]
#[error("Invalid user role: {0}")]
pub struct UserRoleConversionError(String);

impl FromStr for UserRole {
    type Err = UserRoleConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            s => Err(UserRoleConversionError(s.to_string())),
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Buyer => write!(f, "buyer"),
            UserRole::Seller => write!(f, "seller"),
        }
    }
}

//--------------------------------------    StatusStamps     ---------------------------------------------------------
/// Timestamps that accompany a status change. Only the fields relevant to the transition are set;
/// the store leaves absent fields untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusStamps {
    pub delivered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub approve_by: Option<DateTime<Utc>>,
}

impl StatusStamps {
    /// Stamps for marking an order delivered: record the delivery time and start the buyer's
    /// approval window.
    pub fn delivered(at: DateTime<Utc>, approve_by: DateTime<Utc>) -> Self {
        Self { delivered_at: Some(at), completed_at: None, approve_by: Some(approve_by) }
    }

    /// Stamps for completing an order.
    pub fn completed(at: DateTime<Utc>) -> Self {
        Self { delivered_at: None, completed_at: Some(at), approve_by: None }
    }

    pub fn is_empty(&self) -> bool {
        self.delivered_at.is_none() && self.completed_at.is_none() && self.approve_by.is_none()
    }
}

//--------------------------------------     SweepResult     ---------------------------------------------------------
/// Outcome of one auto-approval sweep pass. Orders that lost a race with a human action, or whose
/// side effects failed, are excluded from `processed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepResult {
    pub processed: Vec<i64>,
}

impl SweepResult {
    pub fn count(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

//--------------------------------------  DeliveryArtifact   ---------------------------------------------------------
/// Category of artifact the delivery trigger attached to an order during one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryArtifact {
    DigitalFiles,
    CourseInfo,
}

impl Display for DeliveryArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryArtifact::DigitalFiles => write!(f, "digital-files"),
            DeliveryArtifact::CourseInfo => write!(f, "course-info"),
        }
    }
}

//--------------------------------------   DeliveryOutcome   ---------------------------------------------------------
/// Result of one delivery-trigger invocation. `delivered` reports whether the product is subject
/// to automatic delivery at all; `artifacts` lists what this particular call attached. A repeat
/// call on an already-fulfilled order returns `delivered: true` with an empty artifact list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub delivered: bool,
    pub artifacts: Vec<DeliveryArtifact>,
}

impl DeliveryOutcome {
    /// The product has nothing to auto-deliver. A no-op, not an error, so callers can invoke the
    /// trigger speculatively after every status change.
    pub fn not_delivered() -> Self {
        Self { delivered: false, artifacts: Vec::new() }
    }
}
