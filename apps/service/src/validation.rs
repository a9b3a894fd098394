//! Input checks for administrative create and update requests

use thiserror::Error;
use url::Url;

use crate::database::models::{MAX_CHECK_INTERVAL, MIN_CHECK_INTERVAL, NewTarget, TargetPatch};
use crate::error::MonitorError;

pub const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("API name is required")]
    NameRequired,
    #[error("API name too long (max {max} characters)", max = MAX_NAME_LEN)]
    NameTooLong,
    #[error("API URL is required")]
    UrlRequired,
    #[error("URL must include scheme (http:// or https://)")]
    MissingScheme,
    #[error("Please provide a valid URL: {0}")]
    MalformedUrl(url::ParseError),
    #[error("Invalid scheme '{0}'. Must be http or https")]
    UnsupportedScheme(String),
    #[error("URL must have a valid host")]
    MissingHost,
    #[error("Check interval must be at least {min} seconds", min = MIN_CHECK_INTERVAL)]
    IntervalTooShort(u32),
    #[error("Check interval cannot exceed {max} seconds (1 hour)", max = MAX_CHECK_INTERVAL)]
    IntervalTooLong(u32),
}

impl From<ValidationError> for MonitorError {
    fn from(error: ValidationError) -> Self {
        MonitorError::Validation(error.to_string())
    }
}

pub fn check_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        Err(ValidationError::NameRequired)
    } else if name.chars().count() > MAX_NAME_LEN {
        Err(ValidationError::NameTooLong)
    } else {
        Ok(())
    }
}

/// Accept only absolute http(s) URLs with a host
pub fn check_endpoint(raw: &str) -> Result<Url, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::UrlRequired);
    }

    let url = Url::parse(raw).map_err(|e| match e {
        url::ParseError::RelativeUrlWithoutBase => ValidationError::MissingScheme,
        other => ValidationError::MalformedUrl(other),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::MissingHost);
    }

    Ok(url)
}

pub fn check_interval(seconds: u32) -> Result<(), ValidationError> {
    if seconds < MIN_CHECK_INTERVAL {
        Err(ValidationError::IntervalTooShort(seconds))
    } else if seconds > MAX_CHECK_INTERVAL {
        Err(ValidationError::IntervalTooLong(seconds))
    } else {
        Ok(())
    }
}

impl NewTarget {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name(&self.name)?;
        check_endpoint(&self.url)?;
        self.check_interval.map_or(Ok(()), check_interval)
    }
}

impl TargetPatch {
    /// Only the fields being changed are checked
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(url) = &self.url {
            check_endpoint(url)?;
        }
        self.check_interval.map_or(Ok(()), check_interval)
    }
}
