//! Profile picture flow: validate a chosen image, show a local preview,
//! upload it through the media gateway and point the user's profile at the
//! hosted URL.

pub mod error;
pub mod file;
pub mod flow;
pub mod traits;

pub use error::AvatarError;
pub use file::{avatar_rules, avatar_upload_options, validate_avatar, AvatarFile};
pub use flow::{AvatarOutcome, AvatarState, AvatarUploadFlow};
pub use traits::{AvatarUploader, ProfileUpdater};
