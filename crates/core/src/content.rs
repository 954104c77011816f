//! Structured business content submitted through the authoring form.
//!
//! This is the schema-validated record of business facts a site is generated
//! from. It is mutated only by form submission (directly, before a document
//! exists) or by the surgical-update path; the generated document itself is
//! owned by the orchestrator.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;

/// Upper bound on the number of listed services.
pub const MAX_SERVICES: usize = 20;

/// Business facts captured from the authoring form.
///
/// Optional fields are omitted from generation prompts when absent; the
/// merge compiler treats a change between `None` and `Some` like any other
/// field change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BusinessContent {
    #[validate(length(min = 1, max = 120, message = "business name must be 1-120 characters"))]
    pub business_name: String,

    #[validate(length(max = 200, message = "tagline must be at most 200 characters"))]
    pub tagline: Option<String>,

    #[validate(length(min = 1, max = 2000, message = "description must be 1-2000 characters"))]
    pub description: String,

    #[validate(length(max = 80, message = "industry must be at most 80 characters"))]
    pub industry: Option<String>,

    /// Services or offerings, displayed as a list section on the site.
    #[serde(default)]
    #[validate(custom(function = validate_services))]
    pub services: Vec<String>,

    /// Brand colors as `#rrggbb` hex strings.
    #[validate(custom(function = validate_hex_color))]
    pub primary_color: Option<String>,
    #[validate(custom(function = validate_hex_color))]
    pub secondary_color: Option<String>,

    #[validate(length(max = 40, message = "phone must be at most 40 characters"))]
    pub phone: Option<String>,

    #[validate(email(message = "contact email is not a valid address"))]
    pub email: Option<String>,

    #[validate(length(max = 300, message = "address must be at most 300 characters"))]
    pub address: Option<String>,
}

impl BusinessContent {
    /// Validate all fields, flattening `validator` errors into one
    /// human-readable [`CoreError::Validation`] message.
    pub fn validate_all(&self) -> Result<(), CoreError> {
        Validate::validate(self).map_err(|errors| {
            let mut parts: Vec<String> = errors
                .field_errors()
                .iter()
                .flat_map(|(field, errs)| {
                    errs.iter().map(move |e| match &e.message {
                        Some(msg) => msg.to_string(),
                        None => format!("{field} is invalid"),
                    })
                })
                .collect();
            parts.sort();
            CoreError::Validation(parts.join("; "))
        })
    }
}

fn validation_error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_services(services: &[String]) -> Result<(), ValidationError> {
    if services.len() > MAX_SERVICES {
        return Err(validation_error(
            "too_many_services",
            format!("at most {MAX_SERVICES} services are allowed"),
        ));
    }
    for service in services {
        let trimmed = service.trim();
        if trimmed.is_empty() || trimmed.len() > 120 {
            return Err(validation_error(
                "bad_service",
                "each service must be 1-120 characters".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(validation_error(
            "bad_color",
            "colors must be #rrggbb hex strings".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_content() -> BusinessContent {
        BusinessContent {
            business_name: "Bluebird Bakery".to_string(),
            tagline: Some("Fresh every morning".to_string()),
            description: "A neighbourhood bakery specialising in sourdough.".to_string(),
            industry: Some("Food & Beverage".to_string()),
            services: vec!["Sourdough loaves".to_string(), "Wedding cakes".to_string()],
            primary_color: Some("#1a6b54".to_string()),
            secondary_color: None,
            phone: Some("+1 555 0100".to_string()),
            email: Some("hello@bluebird.example".to_string()),
            address: Some("12 Elm Street".to_string()),
        }
    }

    #[test]
    fn valid_content_passes() {
        assert!(valid_content().validate_all().is_ok());
    }

    #[test]
    fn empty_business_name_fails() {
        let mut content = valid_content();
        content.business_name = String::new();
        let err = content.validate_all().unwrap_err();
        assert!(err.to_string().contains("business name"));
    }

    #[test]
    fn bad_color_fails() {
        let mut content = valid_content();
        content.primary_color = Some("teal".to_string());
        assert!(content.validate_all().is_err());

        content.primary_color = Some("#12345g".to_string());
        assert!(content.validate_all().is_err());

        content.primary_color = Some("#A1B2C3".to_string());
        assert!(content.validate_all().is_ok());
    }

    #[test]
    fn bad_email_fails() {
        let mut content = valid_content();
        content.email = Some("not-an-email".to_string());
        assert!(content.validate_all().is_err());
    }

    #[test]
    fn too_many_services_fails() {
        let mut content = valid_content();
        content.services = (0..=MAX_SERVICES).map(|i| format!("Service {i}")).collect();
        assert!(content.validate_all().is_err());
    }

    #[test]
    fn blank_service_fails() {
        let mut content = valid_content();
        content.services = vec!["  ".to_string()];
        assert!(content.validate_all().is_err());
    }

    #[test]
    fn unknown_fields_rejected_on_deserialize() {
        let json = r#"{"business_name":"A","description":"B","favourite_colour":"mauve"}"#;
        assert!(serde_json::from_str::<BusinessContent>(json).is_err());
    }
}
