//! Upload options bag and its merge rules.

use serde::{Deserialize, Serialize};

use super::ResourceKind;
use crate::constants::DEFAULT_MAX_DIMENSION;

/// A single resize / crop / quality directive.
///
/// A list of these is applied by the provider in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_format: Option<String>,
}

impl Transformation {
    /// `{width, crop: "limit"}`: shrink so the longest edge fits, never enlarge.
    pub fn limit(max_dimension: u32) -> Self {
        Self {
            width: Some(max_dimension),
            crop: Some("limit".to_string()),
            ..Default::default()
        }
    }

    /// `{width, height, crop: "fill", gravity: "face"}`: square crop centred on a face.
    pub fn face_fill(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            crop: Some("fill".to_string()),
            gravity: Some("face".to_string()),
            ..Default::default()
        }
    }

    pub fn quality(quality: impl Into<String>) -> Self {
        Self {
            quality: Some(quality.into()),
            ..Default::default()
        }
    }

    /// Provider URL-parameter form, e.g. `w_500,h_500,c_fill,g_face`.
    pub fn to_param(&self) -> String {
        let mut parts = Vec::new();
        if let Some(w) = self.width {
            parts.push(format!("w_{}", w));
        }
        if let Some(h) = self.height {
            parts.push(format!("h_{}", h));
        }
        if let Some(ref c) = self.crop {
            parts.push(format!("c_{}", c));
        }
        if let Some(ref g) = self.gravity {
            parts.push(format!("g_{}", g));
        }
        if let Some(ref q) = self.quality {
            parts.push(format!("q_{}", q));
        }
        if let Some(ref f) = self.fetch_format {
            parts.push(format!("f_{}", f));
        }
        parts.join(",")
    }

    /// Chain a list of transformations with `/`, the provider's chaining separator.
    pub fn chain_param(chain: &[Transformation]) -> String {
        chain
            .iter()
            .map(Transformation::to_param)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Options accepted alongside an upload.
///
/// Every field is optional; unset fields fall back to the gateway defaults
/// through [`UploadOptions::merged_over`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOptions {
    /// Destination grouping on the provider side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    /// Ordered resize / crop / quality directives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<Vec<Transformation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceKind>,
    /// Chunk size override for chunked transfers, in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_format: Option<String>,
}

impl UploadOptions {
    /// Defaults applied by the gateway to every upload: automatic quality and
    /// format, provider-detected resource type, longest edge limited to 1920px.
    pub fn gateway_defaults() -> Self {
        Self {
            folder: None,
            transformation: Some(vec![
                Transformation::limit(DEFAULT_MAX_DIMENSION),
                Transformation::quality("auto:good"),
            ]),
            resource_type: Some(ResourceKind::Auto),
            chunk_size: None,
            quality: Some("auto".to_string()),
            fetch_format: Some("auto".to_string()),
        }
    }

    /// Shallow merge of `self` over `defaults`.
    ///
    /// Precedence is per key: a value set on `self` always wins, otherwise the
    /// default is kept. Lists are not combined, so a caller transformation
    /// replaces the default chain entirely.
    pub fn merged_over(self, defaults: UploadOptions) -> UploadOptions {
        UploadOptions {
            folder: self.folder.or(defaults.folder),
            transformation: self.transformation.or(defaults.transformation),
            resource_type: self.resource_type.or(defaults.resource_type),
            chunk_size: self.chunk_size.or(defaults.chunk_size),
            quality: self.quality.or(defaults.quality),
            fetch_format: self.fetch_format.or(defaults.fetch_format),
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_transformation(mut self, chain: Vec<Transformation>) -> Self {
        self.transformation = Some(chain);
        self
    }

    pub fn with_resource_type(mut self, kind: ResourceKind) -> Self {
        self.resource_type = Some(kind);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_keys_take_precedence() {
        let caller = UploadOptions::default()
            .with_folder("profile_pictures")
            .with_transformation(vec![Transformation::face_fill(500, 500)]);

        let merged = caller.merged_over(UploadOptions::gateway_defaults());

        assert_eq!(merged.folder.as_deref(), Some("profile_pictures"));
        assert_eq!(
            merged.transformation,
            Some(vec![Transformation::face_fill(500, 500)])
        );
        // untouched keys keep their defaults
        assert_eq!(merged.quality.as_deref(), Some("auto"));
        assert_eq!(merged.fetch_format.as_deref(), Some("auto"));
        assert_eq!(merged.resource_type, Some(ResourceKind::Auto));
    }

    #[test]
    fn empty_caller_options_yield_defaults() {
        let merged = UploadOptions::default().merged_over(UploadOptions::gateway_defaults());
        assert_eq!(merged, UploadOptions::gateway_defaults());
    }

    #[test]
    fn transformation_params() {
        assert_eq!(
            Transformation::face_fill(500, 500).to_param(),
            "w_500,h_500,c_fill,g_face"
        );
        let chain = UploadOptions::gateway_defaults().transformation.unwrap();
        assert_eq!(Transformation::chain_param(&chain), "w_1920,c_limit/q_auto:good");
    }

    #[test]
    fn options_deserialize_from_bag() {
        let json = serde_json::json!({
            "folder": "avatars",
            "resource_type": "image",
            "chunk_size": 1048576,
            "transformation": [{ "width": 200, "crop": "scale" }]
        });
        let options: UploadOptions = serde_json::from_value(json).unwrap();
        assert_eq!(options.folder.as_deref(), Some("avatars"));
        assert_eq!(options.resource_type, Some(ResourceKind::Image));
        assert_eq!(options.chunk_size, Some(1_048_576));
        assert_eq!(options.transformation.unwrap()[0].width, Some(200));
    }
}
