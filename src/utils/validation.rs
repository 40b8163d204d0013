use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use utoipa::ToSchema;
use validator::Validate;

pub static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w']+$").expect("username pattern compiles"));

pub static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").expect("email pattern compiles")
});

/// Field name -> messages. Collected rather than short-circuited so the
/// front-end can show every problem at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FormErrors {}

impl From<validator::ValidationErrors> for FormErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut form = FormErrors::new();
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        for (field, errs) in fields {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                form.add(&field, message);
            }
        }
        form
    }
}

/// Sign-up form. `password_confirm` is only sent by the plain register page;
/// the confirm-by-email variant omits it.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct RegistrationForm {
    #[validate(
        length(min = 1, message = "Username not provided"),
        regex(
            path = *USERNAME_RE,
            message = "Username may only contain letters, digits, underscores and apostrophes"
        )
    )]
    pub username: String,
    #[validate(
        length(min = 1, message = "Email not provided"),
        regex(path = *EMAIL_RE, message = "Invalid email address")
    )]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub password_confirm: Option<String>,
    #[serde(default, rename = "g-recaptcha-response")]
    pub recaptcha_response: Option<String>,
}

impl RegistrationForm {
    /// Surrounding whitespace never reaches storage or the uniqueness checks.
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }

    /// Checks that need no storage or network access.
    pub fn validate_fields(&self) -> FormErrors {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };

        if let Some(confirm) = &self.password_confirm
            && confirm != &self.password
        {
            errors.add("password_confirm", "Passwords do not match");
        }

        errors
    }
}

/// Login form; `email` accepts either the username or the email address.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn identifier(&self) -> &str {
        self.email.trim()
    }
}
