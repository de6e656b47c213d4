use crate::error::{AppError, AppResult};

/// A required text field: present and not blank.
pub fn required_text(field: &str, value: Option<String>) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::bad_request(format!("{field} must not be blank"))),
    }
}

/// An optional text field: when present it must not be blank.
pub fn optional_text(field: &str, value: Option<String>) -> AppResult<Option<String>> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(AppError::bad_request(format!("{field} must not be blank")))
        }
        other => Ok(other),
    }
}

pub fn email(value: String) -> AppResult<String> {
    let trimmed = value.trim();
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !trimmed.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(AppError::bad_request(format!("{trimmed} is not a valid email")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_text_is_rejected() {
        assert!(required_text("name", None).is_err());
        assert!(required_text("name", Some("   ".into())).is_err());
        assert_eq!(required_text("name", Some("Drill".into())).unwrap(), "Drill");
    }

    #[test]
    fn optional_text_allows_absence_only() {
        assert_eq!(optional_text("name", None).unwrap(), None);
        assert!(optional_text("name", Some("".into())).is_err());
    }

    #[test]
    fn email_shape() {
        assert_eq!(email(" ann@example.com ".into()).unwrap(), "ann@example.com");
        assert!(email("ann.example.com".into()).is_err());
        assert!(email("@example.com".into()).is_err());
        assert!(email("ann@".into()).is_err());
        assert!(email("a b@example.com".into()).is_err());
        assert!(email("a@b@c".into()).is_err());
    }
}
