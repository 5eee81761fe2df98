//! Asset URL helpers
//!
//! The CMS serves image transformations through its asset endpoint; this is
//! purely a URL-construction convention (`/assets/{id}?width=...`), no
//! server-side logic lives here.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

// The unreserved marks stay literal, matching encodeURIComponent
const ASSET_ID_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// How the asset server should crop when both dimensions are given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFit {
    Cover,
    Contain,
    Inside,
    Outside,
}

impl AssetFit {
    fn as_str(self) -> &'static str {
        match self {
            AssetFit::Cover => "cover",
            AssetFit::Contain => "contain",
            AssetFit::Inside => "inside",
            AssetFit::Outside => "outside",
        }
    }
}

/// Transformation parameters appended to an asset URL
#[derive(Debug, Clone, Default)]
pub struct AssetOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fit: Option<AssetFit>,
    pub quality: Option<u32>,
    pub format: Option<&'static str>,
}

impl AssetOptions {
    /// Thumbnail preset for cards and lists
    pub fn thumbnail() -> Self {
        Self {
            width: Some(400),
            height: Some(300),
            fit: Some(AssetFit::Cover),
            quality: Some(80),
            format: Some("webp"),
        }
    }

    /// Preset for featured/hero images
    pub fn featured() -> Self {
        Self {
            width: Some(1200),
            height: Some(800),
            fit: Some(AssetFit::Cover),
            quality: Some(90),
            format: Some("webp"),
        }
    }

    /// Preset for profile/avatar images
    pub fn avatar() -> Self {
        Self {
            width: Some(80),
            height: Some(80),
            fit: Some(AssetFit::Cover),
            quality: Some(85),
            format: Some("webp"),
        }
    }
}

/// Build the URL for a CMS asset with optional transformations.
///
/// An empty/missing asset id falls back to the configured placeholder.
///
/// # Examples
/// ```ignore
/// asset_url(&config, Some("abc"), Some(&AssetOptions::thumbnail()))
/// // -> "http://localhost:8055/assets/abc?width=400&height=300&fit=cover&quality=80&format=webp"
/// ```
pub fn asset_url(config: &SiteConfig, asset_id: Option<&str>, options: Option<&AssetOptions>) -> String {
    let asset_id = match asset_id {
        Some(id) if !id.is_empty() => id,
        _ => return config.placeholder_image.clone(),
    };

    let encoded = utf8_percent_encode(asset_id, ASSET_ID_ENCODE).to_string();
    let mut url = format!("{}/assets/{}", config.api_url.trim_end_matches('/'), encoded);

    if let Some(options) = options {
        let mut params = Vec::new();
        if let Some(width) = options.width {
            params.push(format!("width={}", width));
        }
        if let Some(height) = options.height {
            params.push(format!("height={}", height));
        }
        if let Some(fit) = options.fit {
            params.push(format!("fit={}", fit.as_str()));
        }
        if let Some(quality) = options.quality {
            params.push(format!("quality={}", quality));
        }
        if let Some(format) = options.format {
            params.push(format!("format={}", format));
        }
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
    }

    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            api_url: "https://cms.example.com".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_asset_url_plain() {
        let config = test_config();
        assert_eq!(
            asset_url(&config, Some("abc-123"), None),
            "https://cms.example.com/assets/abc-123"
        );
    }

    #[test]
    fn test_asset_id_encoding_keeps_unreserved_marks() {
        let config = test_config();
        // Hyphenated uuid-style ids pass through unchanged
        assert_eq!(
            asset_url(&config, Some("01he8.x_y~z-9"), None),
            "https://cms.example.com/assets/01he8.x_y~z-9"
        );
        // Everything else is still escaped
        assert_eq!(
            asset_url(&config, Some("a/b c"), None),
            "https://cms.example.com/assets/a%2Fb%20c"
        );
    }

    #[test]
    fn test_asset_url_with_preset() {
        let config = test_config();
        let url = asset_url(&config, Some("abc"), Some(&AssetOptions::thumbnail()));
        assert_eq!(
            url,
            "https://cms.example.com/assets/abc?width=400&height=300&fit=cover&quality=80&format=webp"
        );
    }

    #[test]
    fn test_asset_url_placeholder() {
        let config = test_config();
        assert_eq!(asset_url(&config, None, None), "/placeholder-image.jpg");
        assert_eq!(asset_url(&config, Some(""), None), "/placeholder-image.jpg");
    }

    #[test]
    fn test_empty_options_add_no_query() {
        let config = test_config();
        assert_eq!(
            asset_url(&config, Some("abc"), Some(&AssetOptions::default())),
            "https://cms.example.com/assets/abc"
        );
    }
}
