use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Media provider backend types
///
/// Defined in core because it is selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderBackend {
    Cloudinary,
    Local,
}

impl FromStr for ProviderBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cloudinary" => Ok(ProviderBackend::Cloudinary),
            "local" => Ok(ProviderBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid media provider: {}", s)),
        }
    }
}

impl Display for ProviderBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ProviderBackend::Cloudinary => write!(f, "cloudinary"),
            ProviderBackend::Local => write!(f, "local"),
        }
    }
}
