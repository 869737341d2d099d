// crates/bridge-core/src/core/client_info.rs
// ============================================================================
// Module: Bridge Client Info
// Description: Client application metadata carried in the User-Agent header.
// Purpose: Describe the calling app so the service can gate schedules by version.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every request carries a [`ClientInfo`] rendered as a user agent:
//! `AppName/AppVersion (DeviceName; OsName/OsVersion) SdkName/SdkVersion`.
//! Any part may be absent. Parsing is lenient: unreadable pieces are dropped
//! rather than rejected, so an unparseable header yields an empty value.
//!
//! The delimiters `(`, `)`, `;`, and `/` cannot appear inside a part. The
//! builders and the renderer replace them with `[`, `]`, `,`, and `-`, so a
//! built value renders to a header that parses back to the same value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Client Info
// ============================================================================

/// Application, device, and SDK description of a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Application name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    /// Application version used for criteria matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<u32>,
    /// Device description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    /// Operating system name, the key for per-OS version bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
    /// Operating system version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    /// SDK name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_name: Option<String>,
    /// SDK version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_version: Option<u32>,
}

impl ClientInfo {
    /// Sets the application name and version.
    #[must_use]
    pub fn with_app(mut self, name: impl Into<String>, version: u32) -> Self {
        self.app_name = Some(header_safe(&name.into()));
        self.app_version = Some(version);
        self
    }

    /// Sets the operating system name and version.
    #[must_use]
    pub fn with_os(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.os_name = Some(header_safe(&name.into()));
        self.os_version = Some(header_safe(&version.into()));
        self
    }

    /// Sets the device name.
    #[must_use]
    pub fn with_device(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(header_safe(&name.into()));
        self
    }

    /// Sets the SDK name and version.
    #[must_use]
    pub fn with_sdk(mut self, name: impl Into<String>, version: u32) -> Self {
        self.sdk_name = Some(header_safe(&name.into()));
        self.sdk_version = Some(version);
        self
    }

    /// Renders the user agent string for this client.
    #[must_use]
    pub fn user_agent(&self) -> String {
        let mut out = String::new();
        if let Some(app) = &self.app_name {
            out.push_str(&header_safe(app));
            if let Some(version) = self.app_version {
                let _ = write!(out, "/{version}");
            }
        }
        let has_detail =
            self.device_name.is_some() || self.os_name.is_some() || self.sdk_name.is_some();
        if !has_detail {
            return out;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push('(');
        out.push_str(&header_safe(self.device_name.as_deref().unwrap_or_default()));
        out.push_str("; ");
        if let Some(os) = &self.os_name {
            out.push_str(&header_safe(os));
            if let Some(version) = &self.os_version {
                let _ = write!(out, "/{}", header_safe(version));
            }
        }
        out.push(')');
        if let Some(sdk) = &self.sdk_name {
            out.push(' ');
            out.push_str(&header_safe(sdk));
            if let Some(version) = self.sdk_version {
                let _ = write!(out, "/{version}");
            }
        }
        out
    }

    /// Parses a user agent produced by [`ClientInfo::user_agent`] or a
    /// compatible client.
    #[must_use]
    pub fn from_user_agent(raw: &str) -> Self {
        let raw = raw.trim();
        let mut info = Self::default();
        let (app_part, rest) = match raw.split_once('(') {
            Some((app, rest)) => (app.trim(), Some(rest)),
            None => (raw, None),
        };
        let (app_name, app_version) = split_versioned(app_part);
        info.app_name = app_name;
        info.app_version = app_version.and_then(|value| value.parse().ok());

        let Some(rest) = rest else {
            return info;
        };
        let Some((detail, sdk_part)) = rest.split_once(')') else {
            return info;
        };
        let (device, os) = detail.split_once(';').unwrap_or((detail, ""));
        info.device_name = non_empty(device);
        let (os_name, os_version) = split_versioned(os.trim());
        info.os_name = os_name;
        info.os_version = os_version;
        let (sdk_name, sdk_version) = split_versioned(sdk_part.trim());
        info.sdk_name = sdk_name;
        info.sdk_version = sdk_version.and_then(|value| value.parse().ok());
        info
    }
}

/// Replaces user agent delimiters inside one part.
fn header_safe(raw: &str) -> String {
    raw.chars()
        .map(|ch| match ch {
            '(' => '[',
            ')' => ']',
            ';' => ',',
            '/' => '-',
            other => other,
        })
        .collect()
}

/// Splits `name/version` on the last slash.
fn split_versioned(raw: &str) -> (Option<String>, Option<String>) {
    match raw.rsplit_once('/') {
        Some((name, version)) => (non_empty(name), non_empty(version)),
        None => (non_empty(raw), None),
    }
}

/// Returns the trimmed value when it is not empty.
fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}
