//! Distributor management payloads.

use std::net::IpAddr;

use serde::{Deserialize, Deserializer, Serialize};

use distrimart_core::DiscountPercent;
use distrimart_core::tenant::normalize_host;
use distrimart_storefront::models::{Distributor, DistributorDomain};

/// A distributor with its custom domains.
#[derive(Debug, Clone, Serialize)]
pub struct DistributorDetail {
    #[serde(flatten)]
    pub distributor: Distributor,
    pub domains: Vec<DistributorDomain>,
}

/// Input for creating a distributor.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDistributor {
    pub name: String,
    pub email_domain: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub brand_color: Option<String>,
    #[serde(default)]
    pub default_discount: Option<DiscountPercent>,
}

/// Partial update. For nullable fields, an explicit `null` clears the value
/// and an absent field leaves it unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistributorPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email_domain: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub logo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub brand_color: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub default_discount: Option<Option<DiscountPercent>>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Validation failures for distributor input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DistributorInputError {
    #[error("name is required")]
    EmptyName,
    #[error("invalid domain: {0:?}")]
    InvalidDomain(String),
    #[error("brand color must be #rgb or #rrggbb, got {0:?}")]
    InvalidColor(String),
}

/// Trimmed, non-empty display name.
pub fn clean_name(name: &str) -> Result<String, DistributorInputError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DistributorInputError::EmptyName);
    }
    Ok(name.to_owned())
}

/// Normalize a domain (lowercase, no port, no trailing dot). IP addresses and
/// bare hostnames without a dot are rejected.
pub fn clean_domain(raw: &str) -> Result<String, DistributorInputError> {
    normalize_host(raw)
        .filter(|host| host.contains('.') && host.parse::<IpAddr>().is_err())
        .ok_or_else(|| DistributorInputError::InvalidDomain(raw.to_owned()))
}

/// `#rgb` or `#rrggbb`, lowercased.
pub fn clean_color(raw: &str) -> Result<String, DistributorInputError> {
    let color = raw.trim().to_ascii_lowercase();
    let valid = color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if valid {
        Ok(color)
    } else {
        Err(DistributorInputError::InvalidColor(raw.to_owned()))
    }
}

/// Trim optional text, mapping blanks to `None`.
#[must_use]
pub fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_domain() {
        assert_eq!(clean_domain("Shop.Acme.COM:443").unwrap(), "shop.acme.com");
        assert_eq!(clean_domain("acme.com.").unwrap(), "acme.com");
        assert!(clean_domain("localhost").is_err());
        assert!(clean_domain("10.0.0.1").is_err());
        assert!(clean_domain("not a domain").is_err());
        assert!(clean_domain("").is_err());
    }

    #[test]
    fn test_clean_color() {
        assert_eq!(clean_color("#FF6600").unwrap(), "#ff6600");
        assert_eq!(clean_color(" #abc ").unwrap(), "#abc");
        assert!(clean_color("ff6600").is_err());
        assert!(clean_color("#ff66").is_err());
        assert!(clean_color("#gggggg").is_err());
    }

    #[test]
    fn test_clean_name_and_optional() {
        assert_eq!(clean_name("  Acme Supply ").unwrap(), "Acme Supply");
        assert_eq!(clean_name("   "), Err(DistributorInputError::EmptyName));
        assert_eq!(clean_optional(Some("  ")), None);
        assert_eq!(clean_optional(Some(" x ")), Some("x".to_owned()));
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let patch: DistributorPatch =
            serde_json::from_str(r#"{"logo_url": null, "default_discount": "15"}"#).unwrap();
        assert_eq!(patch.logo_url, Some(None));
        assert!(patch.brand_color.is_none());
        assert_eq!(
            patch.default_discount.flatten().map(DiscountPercent::value),
            Some(rust_decimal::Decimal::from(15))
        );
    }

    #[test]
    fn test_patch_rejects_out_of_range_discount() {
        assert!(serde_json::from_str::<DistributorPatch>(r#"{"default_discount": "120"}"#).is_err());
    }
}
