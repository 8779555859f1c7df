use bookstore_authz::NewUser;
use serde::Deserialize;
use serde_json::{json, Value};

/// Body of `POST /api/account/signup`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignUp {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUp {
    /// Collects every field problem; the password policy itself is checked
    /// by the identity provider.
    pub fn validate(&self) -> Result<(), Vec<Value>> {
        let mut problems = Vec::new();

        for (field, value) in [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("password", &self.password),
            ("confirmPassword", &self.confirm_password),
        ] {
            if value.trim().is_empty() {
                problems.push(json!({ "field": field, "error": "required" }));
            }
        }

        if !self.email.trim().is_empty() && !looks_like_email(&self.email) {
            problems.push(json!({ "field": "email", "error": "invalid email address" }));
        }

        if !self.confirm_password.is_empty() && self.password != self.confirm_password {
            problems.push(json!({
                "field": "confirmPassword",
                "error": "password and confirmation do not match"
            }));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

impl From<SignUp> for NewUser {
    fn from(form: SignUp) -> Self {
        Self {
            email: form.email,
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            password: form.password,
        }
    }
}

/// Body of `POST /api/account/login`
#[derive(Debug, Clone, Deserialize)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SignUp {
        serde_json::from_value(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "Secr3t!",
            "confirmPassword": "Secr3t!"
        }))
        .unwrap()
    }

    fn fields(problems: &[Value]) -> Vec<&str> {
        problems
            .iter()
            .filter_map(|p| p["field"].as_str())
            .collect()
    }

    #[test]
    fn complete_form_is_valid() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let empty: SignUp = serde_json::from_value(json!({})).unwrap();
        let problems = empty.validate().unwrap_err();
        assert_eq!(
            fields(&problems),
            vec!["firstName", "lastName", "email", "password", "confirmPassword"]
        );
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let mut form = form();
        form.confirm_password = "Other1!".to_string();
        assert_eq!(fields(&form.validate().unwrap_err()), vec!["confirmPassword"]);
    }

    #[test]
    fn malformed_email_is_rejected() {
        for email in ["ada", "ada@", "@example.com", "ada@example", "a b@example.com", "ada@x..com"] {
            let mut form = form();
            form.email = email.to_string();
            assert_eq!(
                fields(&form.validate().unwrap_err()),
                vec!["email"],
                "{email} should be rejected"
            );
        }
    }
}
