use crate::detail::ServiceDetail;
use crate::error::{OnboardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    WhatsApp,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::WhatsApp => "whatsapp",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = OnboardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "email" => Ok(Channel::Email),
            "sms" => Ok(Channel::Sms),
            "whatsapp" | "whats_app" => Ok(Channel::WhatsApp),
            _ => Err(OnboardError::InvalidChannel(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body for SMS and WhatsApp delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsRequest {
    pub to: String,
    pub message: String,
}

impl SmsRequest {
    pub fn new(to: impl Into<String>, message: impl Into<String>) -> Result<Self> {
        let req = Self {
            to: to.into(),
            message: message.into(),
        };
        if req.to.trim().is_empty() || req.message.trim().is_empty() {
            return Err(OnboardError::InvalidPayload(
                "recipient phone number and message are required".to_string(),
            ));
        }
        Ok(req)
    }
}

/// Body for emailing the proposal PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub to: String,
}

impl EmailRequest {
    pub fn new(to: impl Into<String>) -> Result<Self> {
        let req = Self { to: to.into() };
        if req.to.trim().is_empty() {
            return Err(OnboardError::InvalidPayload(
                "recipient email is required".to_string(),
            ));
        }
        Ok(req)
    }
}

/// What a delivery collaborator reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DeliveryOutcome {
    pub fn delivered() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// A ready-to-send delivery, tagged by channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum DeliveryRequest {
    Email(EmailRequest),
    Sms(SmsRequest),
    WhatsApp(SmsRequest),
}

impl DeliveryRequest {
    pub fn channel(&self) -> Channel {
        match self {
            DeliveryRequest::Email(_) => Channel::Email,
            DeliveryRequest::Sms(_) => Channel::Sms,
            DeliveryRequest::WhatsApp(_) => Channel::WhatsApp,
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            DeliveryRequest::Email(r) => &r.to,
            DeliveryRequest::Sms(r) | DeliveryRequest::WhatsApp(r) => &r.to,
        }
    }
}

// ---------------------------------------------------------------------------
// Backend sync payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesUpdate {
    /// Comma-joined service labels.
    pub services: String,
}

impl ServicesUpdate {
    pub fn from_labels(labels: &[String]) -> Self {
        Self {
            services: labels.join(","),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        split_services(&self.services)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDetailsUpdate {
    pub service_details: Vec<ServiceDetail>,
}

/// Split a stored comma-joined services column, dropping blanks.
pub fn split_services(column: &str) -> Vec<String> {
    column
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Message body sent alongside the proposal over SMS or WhatsApp.
pub fn proposal_message(name: Option<&str>, details: &[ServiceDetail]) -> String {
    let greeting = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => format!("Hi {n},"),
        None => "Hi,".to_string(),
    };
    let mut lines = vec![
        greeting,
        "your proposal is ready. Selected services:".to_string(),
    ];
    for d in details {
        lines.push(format!("- {}", d.labels().join(" / ")));
    }
    lines.join("\n")
}
