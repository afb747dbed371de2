//! Closed enums defined by the MailChimp Marketing API.

use serde::{Deserialize, Serialize};

/// Subscription status of a list member.
///
/// Maps to MailChimp's member `status` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberStatus {
    Subscribed,
    Unsubscribed,
    Cleaned,
    Pending,
    Transactional,
}

impl SubscriberStatus {
    /// All accepted wire values, in MailChimp's documented order.
    pub const ALL: [&'static str; 5] = [
        "subscribed",
        "unsubscribed",
        "cleaned",
        "pending",
        "transactional",
    ];
}

impl std::fmt::Display for SubscriberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Subscribed => "subscribed",
            Self::Unsubscribed => "unsubscribed",
            Self::Cleaned => "cleaned",
            Self::Pending => "pending",
            Self::Transactional => "transactional",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for SubscriberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscribed" => Ok(Self::Subscribed),
            "unsubscribed" => Ok(Self::Unsubscribed),
            "cleaned" => Ok(Self::Cleaned),
            "pending" => Ok(Self::Pending),
            "transactional" => Ok(Self::Transactional),
            _ => Err(format!("invalid subscriber status: {s}")),
        }
    }
}

/// List visibility.
///
/// MailChimp uses the abbreviated forms `pub` and `prv` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    #[serde(rename = "pub")]
    Public,
    #[serde(rename = "prv")]
    Private,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => write!(f, "pub"),
            Self::Private => write!(f, "prv"),
        }
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pub" => Ok(Self::Public),
            "prv" => Ok(Self::Private),
            _ => Err(format!("invalid visibility: {s}")),
        }
    }
}

/// Preferred email format for a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailType {
    Html,
    Text,
}

impl std::fmt::Display for EmailType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for EmailType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(Self::Html),
            "text" => Ok(Self::Text),
            _ => Err(format!("invalid email type: {s}")),
        }
    }
}
