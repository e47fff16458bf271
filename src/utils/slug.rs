use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap())
}

/// Lowercase kebab-case, no leading/trailing/double dashes.
pub fn validate_slug(slug: &str) -> AppResult<()> {
    if slug.is_empty() || !slug_re().is_match(slug) {
        return Err(AppError::ValidationError("Invalid slug".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        assert!(validate_slug("es-kopi-susu").is_ok());
        assert!(validate_slug("latte").is_ok());
        assert!(validate_slug("v60").is_ok());
    }

    #[test]
    fn test_invalid_slugs() {
        assert!(validate_slug("").is_err());
        assert!(validate_slug("Es Kopi").is_err());
        assert!(validate_slug("-latte").is_err());
        assert!(validate_slug("latte-").is_err());
        assert!(validate_slug("es--kopi").is_err());
    }
}
