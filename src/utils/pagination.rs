use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// limit/offset pagination as carried on the query string. Limits are
/// clamped per endpoint (shop listings and admin listings use different
/// ceilings).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PageParams {
    pub fn limit_or(&self, default: u32, max: u32) -> i64 {
        i64::from(self.limit.unwrap_or(default).clamp(1, max))
    }

    pub fn offset_or_zero(&self) -> i64 {
        i64::from(self.offset.unwrap_or(0))
    }
}

/// Echoed back in list responses so clients can page without recomputing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PageMeta {
    pub limit: i64,
    pub offset: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_clamped() {
        let params = PageParams {
            limit: Some(500),
            offset: Some(10),
        };
        assert_eq!(params.limit_or(25, 100), 100);
        assert_eq!(params.offset_or_zero(), 10);
    }

    #[test]
    fn test_defaults() {
        let params = PageParams {
            limit: None,
            offset: None,
        };
        assert_eq!(params.limit_or(24, 60), 24);
        assert_eq!(params.offset_or_zero(), 0);
    }

    #[test]
    fn test_zero_limit_raised_to_one() {
        let params = PageParams {
            limit: Some(0),
            offset: None,
        };
        assert_eq!(params.limit_or(24, 60), 1);
    }
}
