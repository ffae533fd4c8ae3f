//! Reader-submitted forms and their field validation.

use std::collections::BTreeMap;

use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors};

const REQUIRED: &str = "This field is required.";
const INVALID_EMAIL: &str = "Enter a valid email address.";

/// Field-level validation errors, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Reword validator failures as reader-facing messages.
    ///
    /// `values` holds the submitted value of each field; an empty value is
    /// reported as missing whatever rule it failed.
    fn from_validation(errors: &ValidationErrors, values: &[(&str, &str)]) -> Self {
        let mut form = FormErrors::default();
        for (field, failures) in errors.field_errors() {
            let field = field.to_string();
            let value = values
                .iter()
                .find(|(name, _)| *name == field)
                .map(|(_, value)| *value)
                .unwrap_or_default();

            for failure in failures.iter() {
                let message = if value.is_empty() {
                    REQUIRED.to_string()
                } else {
                    match failure.code.as_ref() {
                        "email" => INVALID_EMAIL.to_string(),
                        "length" => {
                            let max = failure
                                .params
                                .get("max")
                                .and_then(|max| max.as_u64())
                                .unwrap_or_default();
                            let len = value.chars().count();
                            format!("Ensure this value has at most {max} characters (it has {len}).")
                        }
                        _ => failure.to_string(),
                    }
                };
                if !form.get(&field).is_some_and(|seen| seen.contains(&message)) {
                    form.add(field.clone(), message);
                }
            }
        }
        form
    }
}

/// Require a dotted domain (`a@b` passes the RFC rule but is not deliverable).
fn dotted_domain(value: &str) -> Result<(), ValidationError> {
    match value.rsplit_once('@') {
        Some((_, domain)) if domain.contains('.') && !domain.ends_with('.') => Ok(()),
        _ => Err(ValidationError::new("email")),
    }
}

fn check<F: Validate>(form: &F, values: &[(&str, &str)]) -> Result<(), FormErrors> {
    Validate::validate(form).map_err(|errors| FormErrors::from_validation(&errors, values))
}

/// Comment submitted under a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(email, custom(function = "dotted_domain"))]
    pub email: String,
    #[validate(length(min = 1))]
    pub body: String,
}

impl CommentForm {
    /// Build a form from raw input, trimming surrounding whitespace.
    pub fn new(name: &str, email: &str, body: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            body: body.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), FormErrors> {
        check(
            self,
            &[
                ("name", &self.name),
                ("email", &self.email),
                ("body", &self.body),
            ],
        )
    }
}

/// "Recommend this post" form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct EmailPostForm {
    #[validate(length(min = 1, max = 25))]
    pub name: String,
    #[validate(email, custom(function = "dotted_domain"))]
    pub email: String,
    #[validate(email, custom(function = "dotted_domain"))]
    pub to: String,
    /// Optional free text appended to the message.
    pub comments: String,
}

impl EmailPostForm {
    pub fn new(name: &str, email: &str, to: &str, comments: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            to: to.trim().to_string(),
            comments: comments.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), FormErrors> {
        check(
            self,
            &[("name", &self.name), ("email", &self.email), ("to", &self.to)],
        )
    }
}
