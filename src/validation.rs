use crate::errors::{DomainError, DomainResult, ValidationError};
use regex::Regex;
use std::sync::OnceLock;

/// A trait that entities should implement for validation.
pub trait Validate {
    /// Validates the entity and returns an error if validation fails.
    fn validate(&self) -> DomainResult<()>;
}

// Common regex patterns
fn phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHONE_REGEX.get_or_init(|| Regex::new(r"^\+?[0-9]{8,15}$").unwrap())
}

fn national_id_regex() -> &'static Regex {
    static NATIONAL_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    NATIONAL_ID_REGEX.get_or_init(|| Regex::new(r"^[0-9]{9}$").unwrap())
}

/// Struct for configuring validations in a fluent style
#[derive(Default)]
pub struct ValidationBuilder<T> {
    field_name: String,
    value: Option<T>,
    errors: Vec<ValidationError>,
}

/// Generic validation implementations
impl<T> ValidationBuilder<T> {
    pub fn new(field_name: &str, value: Option<T>) -> Self {
        Self {
            field_name: field_name.to_string(),
            value,
            errors: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self
    where T: Default + PartialEq {
        if self.value.is_none() || self.value == Some(T::default()) {
            self.errors.push(ValidationError::required(&self.field_name));
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> DomainResult<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            // Report the first failure only
            Some(err) => Err(DomainError::Validation(err)),
        }
    }
}

/// String-specific validations
impl ValidationBuilder<String> {
    pub fn min_length(mut self, min: usize) -> Self {
        if let Some(value) = &self.value {
            if value.chars().count() < min {
                self.errors.push(ValidationError::min_length(&self.field_name, min));
            }
        }
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        if let Some(value) = &self.value {
            if value.chars().count() > max {
                self.errors.push(ValidationError::max_length(&self.field_name, max));
            }
        }
        self
    }

    pub fn not_blank(mut self) -> Self {
        if let Some(value) = &self.value {
            if value.trim().is_empty() {
                self.errors.push(ValidationError::required(&self.field_name));
            }
        }
        self
    }

    pub fn matches_pattern(mut self, pattern: &Regex, message: &str) -> Self {
        if let Some(value) = &self.value {
            if !pattern.is_match(value) {
                self.errors.push(ValidationError::format(&self.field_name, message));
            }
        }
        self
    }

    pub fn phone(self) -> Self {
        self.matches_pattern(phone_regex(), "must be a valid phone number")
    }

    pub fn national_id(self) -> Self {
        self.matches_pattern(national_id_regex(), "must be exactly nine digits")
    }
}

/// Numeric validations
impl<T> ValidationBuilder<T>
where T: PartialOrd + Clone + std::fmt::Display
{
    pub fn min(mut self, min: T) -> Self {
        if let Some(value) = &self.value {
            if value < &min {
                self.errors.push(ValidationError::range(
                    &self.field_name,
                    min.to_string(),
                    "maximum".to_string()
                ));
            }
        }
        self
    }
}

/// Validators shared by the beneficiary and distribution domains
pub mod common {
    use super::*;

    pub fn validate_person_name(name: &str) -> DomainResult<()> {
        ValidationBuilder::new("name", Some(name.trim().to_string()))
            .required()
            .min_length(2)
            .max_length(100)
            .validate()
    }

    pub fn validate_national_id(national_id: &str) -> DomainResult<()> {
        ValidationBuilder::new("national_id", Some(national_id.to_string()))
            .required()
            .national_id()
            .validate()
    }

    pub fn validate_phone(phone: &str) -> DomainResult<()> {
        ValidationBuilder::new("phone", Some(phone.to_string()))
            .required()
            .phone()
            .validate()
    }

    pub fn validate_location_part(value: &str, field_name: &str) -> DomainResult<()> {
        ValidationBuilder::new(field_name, Some(value.to_string()))
            .not_blank()
            .max_length(100)
            .validate()
    }
}
