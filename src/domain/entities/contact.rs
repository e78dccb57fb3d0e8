use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::FieldErrors;

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s\-\+\(\)]*$").expect("phone pattern is a valid regex"));

/// Trimmed form values, checked against the contact schema.
#[derive(Debug, Clone, Default, Validate)]
pub struct ContactForm {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(email, length(max = 255))]
    pub email: String,

    #[validate(regex(path = *PHONE_PATTERN), length(max = 20))]
    pub phone: String,

    #[validate(length(min = 10, max = 2000))]
    pub message: String,
}

/// A submission that passed validation. `email` is lowercased and `phone`
/// is empty when the submitter left it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

struct FieldSpec {
    key: &'static str,
    label: &'static str,
    required: bool,
}

const FIELDS: [FieldSpec; 4] = [
    FieldSpec { key: "name", label: "Name", required: true },
    FieldSpec { key: "email", label: "Email", required: true },
    FieldSpec { key: "phone", label: "Phone", required: false },
    FieldSpec { key: "message", label: "Message", required: true },
];

enum RawField {
    Missing,
    NotString,
    Text(String),
}

impl RawField {
    /// JSON `null` reads as `Missing`, so an optional field may be sent as
    /// `null` and a required one reports "is required" rather than a type error.
    fn read(object: &Map<String, Value>, key: &str) -> Self {
        match object.get(key) {
            None | Some(Value::Null) => RawField::Missing,
            Some(Value::String(s)) => RawField::Text(s.trim().to_string()),
            Some(_) => RawField::NotString,
        }
    }

    fn text(&self) -> String {
        match self {
            RawField::Text(s) => s.clone(),
            _ => String::new(),
        }
    }
}

impl ContactForm {
    /// Builds the trimmed form from an untrusted JSON body, validates every
    /// field, and reports all failures in field order.
    pub fn parse(body: &[u8]) -> Result<ContactSubmission, FieldErrors> {
        let object = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(object)) => object,
            _ => {
                let mut errors = FieldErrors::default();
                errors.push("Request body must be a JSON object");
                return Err(errors);
            }
        };

        let raw: Vec<RawField> = FIELDS
            .iter()
            .map(|spec| RawField::read(&object, spec.key))
            .collect();

        let form = ContactForm {
            name: raw[0].text(),
            email: raw[1].text(),
            phone: raw[2].text(),
            message: raw[3].text(),
        };

        let validation = form.validate().err();
        let mut errors = FieldErrors::default();

        for (spec, field) in FIELDS.iter().zip(&raw) {
            match field {
                RawField::Missing if spec.required => {
                    errors.push(format!("{} is required", spec.label));
                }
                RawField::Missing => {}
                RawField::NotString => {
                    errors.push(format!("{} must be a string", spec.label));
                }
                RawField::Text(value) => {
                    if let Some(validation) = &validation {
                        for message in field_messages(validation, spec, value) {
                            errors.push(message);
                        }
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(form.into_submission())
    }

    fn into_submission(self) -> ContactSubmission {
        ContactSubmission {
            name: self.name,
            email: self.email.to_lowercase(),
            phone: self.phone,
            message: self.message,
        }
    }
}

fn field_messages(errors: &ValidationErrors, spec: &FieldSpec, value: &str) -> Vec<String> {
    errors
        .field_errors()
        .get(spec.key)
        .map(|field_errors| {
            field_errors
                .iter()
                .map(|error| describe(spec.label, error, value))
                .collect()
        })
        .unwrap_or_default()
}

fn describe(label: &str, error: &ValidationError, value: &str) -> String {
    match &*error.code {
        "length" => {
            let count = value.chars().count() as u64;
            match (bound(error, "min"), bound(error, "max")) {
                (Some(min), _) if count < min => {
                    format!("{label} must be at least {min} characters")
                }
                (_, Some(max)) => format!("{label} must not exceed {max} characters"),
                _ => format!("{label} has an invalid length"),
            }
        }
        "email" => "Invalid email format".to_string(),
        "regex" => format!("Invalid {} format", label.to_lowercase()),
        _ => format!("{label} is invalid"),
    }
}

fn bound(error: &ValidationError, param: &str) -> Option<u64> {
    error.params.get(param).and_then(Value::as_u64)
}
