//! Named configurations for the upload targets of the team pages.

use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::core::OptimizerConfig;
use crate::utils::{OptimizerError, OutputFormat};

/// Conventional per-target defaults.
///
/// | Preset | Bounds | Quality | Ceiling |
/// |---|---|---|---|
/// | `ProfilePicture` | 300×300 | 0.90 | 3 MB |
/// | `TeamLogo` | 400×400 | 0.95 | 2 MB |
/// | `TeamPhoto` | 1200×800 | 0.85 | 5 MB |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    ProfilePicture,
    TeamLogo,
    TeamPhoto,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Self::ProfilePicture, Self::TeamLogo, Self::TeamPhoto];

    pub fn config(self) -> OptimizerConfig {
        let (max_width, max_height, quality, max_size_mb) = match self {
            Self::ProfilePicture => (300, 300, 0.90, 3.0),
            Self::TeamLogo => (400, 400, 0.95, 2.0),
            Self::TeamPhoto => (1200, 800, 0.85, 5.0),
        };
        // Constants above are in range; validation cannot fail
        OptimizerConfig::new(max_width, max_height, quality, max_size_mb)
            .unwrap_or_default()
            .with_output_format(OutputFormat::Jpeg)
    }

    /// Form field this preset is conventionally wired to.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::ProfilePicture => "profile_picture",
            Self::TeamLogo => "logo_svg",
            Self::TeamPhoto => "team_photo_jpg",
        }
    }

    pub fn from_field_name(field: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.field_name() == field)
    }
}

impl FromStr for Preset {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "profile_picture" | "profile" => Ok(Self::ProfilePicture),
            "team_logo" | "logo" => Ok(Self::TeamLogo),
            "team_photo" | "photo" => Ok(Self::TeamPhoto),
            other => Err(OptimizerError::config(format!("Unknown preset: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_values() {
        let profile = Preset::ProfilePicture.config();
        assert_eq!((profile.max_width(), profile.max_height()), (300, 300));
        assert_eq!(profile.quality(), 0.90);
        assert_eq!(profile.max_size_mb(), 3.0);

        let logo = Preset::TeamLogo.config();
        assert_eq!((logo.max_width(), logo.max_height()), (400, 400));
        assert_eq!(logo.max_size_mb(), 2.0);

        let photo = Preset::TeamPhoto.config();
        assert_eq!((photo.max_width(), photo.max_height()), (1200, 800));
        assert_eq!(photo.quality(), 0.85);
    }

    #[test]
    fn logo_has_the_smallest_ceiling_and_photo_the_largest() {
        let ceilings: Vec<f64> = Preset::ALL.iter().map(|p| p.config().max_size_mb()).collect();
        let logo = Preset::TeamLogo.config().max_size_mb();
        let photo = Preset::TeamPhoto.config().max_size_mb();
        assert!(ceilings.iter().all(|&c| c >= logo && c <= photo));
    }

    #[test]
    fn parse_names() {
        assert_eq!("team-logo".parse::<Preset>().unwrap(), Preset::TeamLogo);
        assert_eq!("Profile_Picture".parse::<Preset>().unwrap(), Preset::ProfilePicture);
        assert!("banner".parse::<Preset>().is_err());
    }

    #[test]
    fn field_names_round_trip() {
        for preset in Preset::ALL {
            assert_eq!(Preset::from_field_name(preset.field_name()), Some(preset));
        }
        assert_eq!(Preset::from_field_name("avatar"), None);
    }
}
