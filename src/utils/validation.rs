use crate::utils::error::{ReconcileError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ReconcileError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ReconcileError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ReconcileError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ReconcileError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("catalog", "artikelstamm.xml").is_ok());
        assert!(validate_path("catalog", "").is_err());
        assert!(validate_path("catalog", "bad\0path.xml").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("entry", "list.xlsx").is_ok());
        assert!(validate_non_empty_string("entry", "   ").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("percentage", 0u32, 0, 100).is_ok());
        assert!(validate_range("percentage", 100u32, 0, 100).is_ok());

        let err = validate_range("percentage", 150u32, 0, 100).unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::InvalidConfigValueError { ref field, .. } if field == "percentage"
        ));
    }
}
