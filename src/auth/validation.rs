use lazy_static::lazy_static;
use regex::Regex;

use super::dto::{LoginRequest, RegisterRequest};
use crate::error::AuthError;

pub const USERNAME_LEN: (usize, usize) = (3, 50);
pub const PASSWORD_LEN: (usize, usize) = (6, 50);

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

fn required(field: &str, value: &str) -> Result<(), AuthError> {
    if value.is_empty() {
        return Err(AuthError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn length(field: &str, value: &str, (min, max): (usize, usize)) -> Result<(), AuthError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AuthError::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

/// Checks a registration request and returns it normalized
/// (trimmed username, trimmed lowercase email).
pub fn validate_register(mut req: RegisterRequest) -> Result<RegisterRequest, AuthError> {
    req.username = req.username.trim().to_owned();
    req.email = req.email.trim().to_lowercase();

    required("username", &req.username)?;
    required("email", &req.email)?;
    required("password", &req.password)?;

    length("username", &req.username, USERNAME_LEN)?;
    if !is_valid_email(&req.email) {
        return Err(AuthError::Validation("email is not a valid address".into()));
    }
    length("password", &req.password, PASSWORD_LEN)?;
    Ok(req)
}

pub fn validate_login(mut req: LoginRequest) -> Result<LoginRequest, AuthError> {
    req.username = req.username.trim().to_owned();
    required("username", &req.username)?;
    required("password", &req.password)?;
    Ok(req)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    fn assert_invalid(res: Result<RegisterRequest, AuthError>, needle: &str) {
        match res {
            Err(AuthError::Validation(msg)) => assert!(msg.contains(needle), "{msg}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_and_normalizes_valid_input() {
        let req = validate_register(register("  ann ", " Ann@X.com ", "secret1")).unwrap();
        assert_eq!(req.username, "ann");
        assert_eq!(req.email, "ann@x.com");
        assert_eq!(req.password, "secret1");
    }

    #[test]
    fn username_length_bounds() {
        assert_invalid(validate_register(register("ab", "a@x.com", "secret1")), "username");
        assert!(validate_register(register("abc", "a@x.com", "secret1")).is_ok());
        assert!(validate_register(register(&"u".repeat(50), "a@x.com", "secret1")).is_ok());
        assert_invalid(
            validate_register(register(&"u".repeat(51), "a@x.com", "secret1")),
            "username",
        );
    }

    #[test]
    fn password_length_bounds() {
        assert_invalid(validate_register(register("ann", "a@x.com", "12345")), "password");
        assert!(validate_register(register("ann", "a@x.com", "123456")).is_ok());
        assert_invalid(
            validate_register(register("ann", "a@x.com", &"p".repeat(51))),
            "password",
        );
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        assert!(validate_register(register("åäö", "a@x.com", "ééééééé")).is_ok());
    }

    #[test]
    fn missing_fields_are_reported() {
        assert_invalid(validate_register(register("", "a@x.com", "secret1")), "username is required");
        assert_invalid(validate_register(register("ann", "  ", "secret1")), "email is required");
        assert_invalid(validate_register(register("ann", "a@x.com", "")), "password is required");
    }

    #[test]
    fn email_format_is_checked() {
        assert!(is_valid_email("ann@x.com"));
        assert!(!is_valid_email("ann@x"));
        assert!(!is_valid_email("ann x@x.com"));
        assert_invalid(validate_register(register("ann", "nope", "secret1")), "email");
    }

    #[test]
    fn login_only_requires_fields() {
        let ok = validate_login(LoginRequest {
            username: "ann".into(),
            password: "x".into(),
        });
        assert!(ok.is_ok());
        let missing = validate_login(LoginRequest {
            username: " ".into(),
            password: "x".into(),
        });
        assert!(matches!(missing, Err(AuthError::Validation(_))));
    }
}
