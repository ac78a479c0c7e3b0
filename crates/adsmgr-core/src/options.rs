//! Publisher platforms and placements offered when creating adsets.
//!
//! Both the creation endpoint and the options listing read this single table.

use serde::Serialize;

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub id: &'static str,
    pub label: &'static str,
    pub placements: &'static [Placement],
}

const fn placement(id: &'static str, label: &'static str) -> Placement {
    Placement { id, label }
}

pub const PLATFORMS: &[Platform] = &[
    Platform {
        id: "facebook",
        label: "Facebook",
        placements: &[
            placement("feed", "Feed"),
            placement("right_hand_column", "Right column"),
            placement("marketplace", "Marketplace"),
            placement("video_feeds", "Video feeds"),
            placement("story", "Stories"),
            placement("search", "Search results"),
            placement("instream_video", "In-stream videos"),
            placement("facebook_reels", "Reels"),
        ],
    },
    Platform {
        id: "instagram",
        label: "Instagram",
        placements: &[
            placement("stream", "Feed"),
            placement("story", "Stories"),
            placement("explore", "Explore"),
            placement("explore_home", "Explore home"),
            placement("reels", "Reels"),
            placement("profile_feed", "Profile feed"),
            placement("ig_search", "Search results"),
        ],
    },
    Platform {
        id: "audience_network",
        label: "Audience Network",
        placements: &[
            placement("classic", "Native, banner and interstitial"),
            placement("rewarded_video", "Rewarded videos"),
        ],
    },
    Platform {
        id: "messenger",
        label: "Messenger",
        placements: &[
            placement("messenger_home", "Inbox"),
            placement("sponsored_messages", "Sponsored messages"),
            placement("story", "Stories"),
        ],
    },
];

#[must_use]
pub fn find_platform(id: &str) -> Option<&'static Platform> {
    PLATFORMS.iter().find(|p| p.id == id)
}

/// Check that every `platform` is known and every `(platform, placement)`
/// pair exists in [`PLATFORMS`].
///
/// Placements are written as `"<platform>:<placement>"`, e.g.
/// `"instagram:reels"`.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] naming the first unknown entry.
pub fn validate_placements(platforms: &[String], placements: &[String]) -> Result<(), ConfigError> {
    for platform in platforms {
        if find_platform(platform).is_none() {
            return Err(ConfigError::Validation(format!(
                "unknown publisher platform '{platform}'"
            )));
        }
    }

    for entry in placements {
        let Some((platform_id, placement_id)) = entry.split_once(':') else {
            return Err(ConfigError::Validation(format!(
                "placement '{entry}' must be written as <platform>:<placement>"
            )));
        };
        let known = find_platform(platform_id)
            .is_some_and(|p| p.placements.iter().any(|pl| pl.id == placement_id));
        if !known {
            return Err(ConfigError::Validation(format!(
                "unknown placement '{entry}'"
            )));
        }
        if !platforms.is_empty() && !platforms.iter().any(|p| p == platform_id) {
            return Err(ConfigError::Validation(format!(
                "placement '{entry}' belongs to a platform that is not selected"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn platform_ids_are_unique() {
        let mut ids: Vec<_> = PLATFORMS.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), PLATFORMS.len());
    }

    #[test]
    fn validate_accepts_known_pairs() {
        let platforms = owned(&["facebook", "instagram"]);
        let placements = owned(&["facebook:feed", "instagram:reels"]);
        assert!(validate_placements(&platforms, &placements).is_ok());
    }

    #[test]
    fn validate_rejects_unknown_platform() {
        let err = validate_placements(&owned(&["myspace"]), &[]).unwrap_err();
        assert!(err.to_string().contains("myspace"));
    }

    #[test]
    fn validate_rejects_malformed_and_unknown_placements() {
        let err = validate_placements(&[], &owned(&["feed"])).unwrap_err();
        assert!(err.to_string().contains("<platform>:<placement>"));

        let err = validate_placements(&[], &owned(&["instagram:marketplace"])).unwrap_err();
        assert!(err.to_string().contains("unknown placement"));
    }

    #[test]
    fn validate_rejects_placement_of_unselected_platform() {
        let err =
            validate_placements(&owned(&["facebook"]), &owned(&["instagram:story"])).unwrap_err();
        assert!(err.to_string().contains("not selected"));
    }
}
