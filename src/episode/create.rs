// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::str::FromStr;

use crate::http::FormPart;

/// Episode type as understood by Captivate and Apple Podcasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpisodeType {
    #[default]
    Full,
    Trailer,
    Bonus,
}

impl EpisodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Trailer => "trailer",
            Self::Bonus => "bonus",
        }
    }
}

impl fmt::Display for EpisodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EpisodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "trailer" => Ok(Self::Trailer),
            "bonus" => Ok(Self::Bonus),
            other => Err(format!(
                "unknown episode type '{other}' (expected full, trailer or bonus)"
            )),
        }
    }
}

/// Optional episode fields
///
/// A field is sent only when it is `Some`, whatever its value. `Some(0)` and
/// `Some(false)` are sent as `0` and `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeOptions {
    pub subtitle: Option<String>,
    pub author: Option<String>,
    pub explicit: Option<bool>,
    /// Publishing status, e.g. `Draft` or `Published`
    pub status: Option<String>,
    pub episode_season: Option<u32>,
    pub donation_link: Option<String>,
    pub donation_text: Option<String>,
    /// Public episode page, sent as `link`
    pub episode_url: Option<String>,
    pub episode_art: Option<String>,
    pub itunes_block: Option<bool>,
}

/// Parameters for creating an episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEpisode {
    pub show_id: String,
    pub title: String,
    /// Identifier returned by a prior media upload
    pub media_id: String,
    pub publish_date: String,
    pub episode_number: u32,
    pub episode_type: EpisodeType,
    pub show_notes: String,
    pub summary: String,
    pub options: EpisodeOptions,
}

impl NewEpisode {
    /// Form fields in the order they are sent
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("shows_id", self.show_id.clone()),
            ("title", self.title.clone()),
            ("itunes_title", self.title.clone()),
            ("media_id", self.media_id.clone()),
            ("date", self.publish_date.clone()),
            ("episode_number", self.episode_number.to_string()),
            ("episode_type", self.episode_type.to_string()),
            ("shownotes", self.show_notes.clone()),
            ("summary", self.summary.clone()),
        ];

        let opts = &self.options;
        let optional = [
            ("status", opts.status.clone()),
            ("itunes_subtitle", opts.subtitle.clone()),
            ("author", opts.author.clone()),
            ("episode_art", opts.episode_art.clone()),
            ("explicit", opts.explicit.map(|v| v.to_string())),
            ("episode_season", opts.episode_season.map(|v| v.to_string())),
            ("donation_link", opts.donation_link.clone()),
            ("donation_text", opts.donation_text.clone()),
            ("link", opts.episode_url.clone()),
            ("itunes_block", opts.itunes_block.map(|v| v.to_string())),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| (name, v))),
        );

        fields
    }

    pub(crate) fn form_parts(&self) -> Vec<FormPart> {
        self.form_fields()
            .into_iter()
            .map(|(name, value)| FormPart::text(name, value))
            .collect()
    }
}
