//! Read-only traversals and the pre-serialization normalization pass.
//!
//! Queries fail hard with a distinct error per missing structural link;
//! normalization and stripping are best-effort and never error.

use serde::{Deserialize, Serialize};

use crate::duration::Duration;
use crate::error::{Result, VastError};
use crate::models::*;

/// The document classes recognized by [`Vast::classify`]
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum VastType {
    /// A redirect to another VAST document
    Wrapper,
    /// An inline ad whose primary media file runs the VPAID framework
    Vpaid,
    /// Any other playable inline ad
    Standard,
}

impl Vast {
    /// Classify the document by its first ad.
    ///
    /// A wrapper with a non-empty pointer URI wins outright; otherwise the
    /// first ad must be inline with a linear creative carrying at least one
    /// media file, and each missing link is its own error.
    pub fn classify(&self) -> Result<VastType> {
        let ad = self.ads.first().ok_or(VastError::NoAds)?;
        if let AdVariant::Wrapper(wrapper) = &ad.body.variant {
            if !wrapper.vast_ad_tag_uri.trim().is_empty() {
                return Ok(VastType::Wrapper);
            }
        }
        if !matches!(ad.body.variant, AdVariant::InLine(_)) {
            return Err(VastError::NoInline);
        }
        if ad.body.creatives.is_empty() {
            return Err(VastError::NoCreatives);
        }
        let linear = ad
            .body
            .creatives
            .iter()
            .find_map(|creative| match &creative.kind {
                CreativeKind::Linear(linear) => Some(linear),
                _ => None,
            })
            .ok_or(VastError::NoLinear)?;
        let media = linear.media_files.first().ok_or(VastError::NoMediaFiles)?;
        match &media.api_framework {
            Some(framework) if framework.eq_ignore_ascii_case("VPAID") => Ok(VastType::Vpaid),
            _ => Ok(VastType::Standard),
        }
    }

    /// The first media file of the first playable linear creative, paired
    /// with that creative's duration. `None` when no inline ad carries one.
    pub fn primary_media(&self) -> Option<(&MediaFile, Duration)> {
        for ad in &self.ads {
            if !matches!(ad.body.variant, AdVariant::InLine(_)) {
                continue;
            }
            for creative in &ad.body.creatives {
                if let CreativeKind::Linear(linear) = &creative.kind {
                    if let Some(media) = linear.media_files.first() {
                        return Some((media, linear.duration.unwrap_or_default()));
                    }
                }
            }
        }
        None
    }

    /// The first non-empty click-through URI, in the same scan order as
    /// [`Vast::primary_media`]. Empty string when none exists.
    pub fn click_through(&self) -> &str {
        for ad in &self.ads {
            if !matches!(ad.body.variant, AdVariant::InLine(_)) {
                continue;
            }
            for creative in &ad.body.creatives {
                if let CreativeKind::Linear(linear) = &creative.kind {
                    if let Some(clicks) = &linear.video_clicks {
                        for click in &clicks.click_throughs {
                            if !click.uri.is_empty() {
                                return &click.uri;
                            }
                        }
                    }
                }
            }
        }
        ""
    }

    /// The duration of the first creative's linear under the first ad's
    /// inline variant, with a distinct error per missing link.
    pub fn duration(&self) -> Result<Duration> {
        let ad = self.ads.first().ok_or(VastError::NoAds)?;
        if !matches!(ad.body.variant, AdVariant::InLine(_)) {
            return Err(VastError::NoInline);
        }
        let creative = ad.body.creatives.first().ok_or(VastError::NoCreatives)?;
        let CreativeKind::Linear(linear) = &creative.kind else {
            return Err(VastError::NoLinear);
        };
        Ok(linear.duration.unwrap_or_default())
    }

    /// Clear every privacy-sensitive pixel from the document and its inline
    /// ads. Wrapper ads are left untouched so wrapper requests still reach
    /// the next server in the chain.
    pub fn strip_tracking_pixels(&mut self) {
        self.errors.clear();
        for ad in &mut self.ads {
            if !matches!(ad.body.variant, AdVariant::InLine(_)) {
                continue;
            }
            ad.body.impressions.clear();
            ad.body.errors.clear();
            for creative in &mut ad.body.creatives {
                match &mut creative.kind {
                    CreativeKind::Linear(linear) => linear.tracking_events.clear(),
                    CreativeKind::CompanionAds(companion_ads) => {
                        for companion in &mut companion_ads.companions {
                            companion.tracking_events.clear();
                        }
                    }
                    CreativeKind::NonLinearAds(non_linear_ads) => {
                        non_linear_ads.tracking_events.clear();
                        for non_linear in &mut non_linear_ads.non_linears {
                            non_linear.tracking_events.clear();
                        }
                    }
                }
            }
        }
    }

    /// Trim stray whitespace from free-text and URI fields, and backfill
    /// media file dimensions from the document-level default pair when
    /// either is zero. Call this before serialization; it is never implied
    /// by it.
    pub fn normalize(&mut self, default_size: Option<(u32, u32)>) {
        for error in &mut self.errors {
            trim_in_place(error);
        }
        for ad in &mut self.ads {
            let body = &mut ad.body;
            if let Some(ad_system) = &mut body.ad_system {
                trim_in_place(&mut ad_system.name);
            }
            match &mut body.variant {
                AdVariant::InLine(info) => trim_in_place(&mut info.ad_title),
                AdVariant::Wrapper(info) => trim_in_place(&mut info.vast_ad_tag_uri),
            }
            for impression in &mut body.impressions {
                trim_in_place(&mut impression.uri);
            }
            for error in &mut body.errors {
                trim_in_place(error);
            }
            for creative in &mut body.creatives {
                match &mut creative.kind {
                    CreativeKind::Linear(linear) => normalize_linear(linear, default_size),
                    CreativeKind::CompanionAds(companion_ads) => {
                        for companion in &mut companion_ads.companions {
                            normalize_trackings(&mut companion.tracking_events);
                            if let Some(click_through) = &mut companion.click_through {
                                trim_in_place(click_through);
                            }
                            for click in &mut companion.click_trackings {
                                trim_in_place(&mut click.uri);
                            }
                        }
                    }
                    CreativeKind::NonLinearAds(non_linear_ads) => {
                        normalize_trackings(&mut non_linear_ads.tracking_events);
                        for non_linear in &mut non_linear_ads.non_linears {
                            normalize_trackings(&mut non_linear.tracking_events);
                            if let Some(click_through) = &mut non_linear.click_through {
                                trim_in_place(click_through);
                            }
                            for click in &mut non_linear.click_trackings {
                                trim_in_place(click);
                            }
                        }
                    }
                }
            }
        }
    }
}

fn normalize_linear(linear: &mut Linear, default_size: Option<(u32, u32)>) {
    normalize_trackings(&mut linear.tracking_events);
    if let Some(clicks) = &mut linear.video_clicks {
        for click in clicks
            .click_throughs
            .iter_mut()
            .chain(clicks.click_trackings.iter_mut())
            .chain(clicks.custom_clicks.iter_mut())
        {
            trim_in_place(&mut click.uri);
        }
    }
    for media in &mut linear.media_files {
        trim_in_place(&mut media.uri);
        if let Some((width, height)) = default_size {
            if media.width == 0 || media.height == 0 {
                media.width = width;
                media.height = height;
            }
        }
    }
}

fn normalize_trackings(tracking_events: &mut [Tracking]) {
    for tracking in tracking_events {
        trim_in_place(&mut tracking.uri);
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_creative(media_files: Vec<MediaFile>) -> Creative {
        Creative::new(CreativeKind::Linear(Linear {
            duration: Some(Duration::from_secs(30)),
            media_files,
            ..Linear::default()
        }))
    }

    fn media_file(api_framework: Option<&str>) -> MediaFile {
        MediaFile {
            delivery: "progressive".to_string(),
            mime_type: "video/mp4".to_string(),
            width: 640,
            height: 360,
            api_framework: api_framework.map(str::to_string),
            uri: "http://cdn.example/ad.mp4".to_string(),
            ..MediaFile::default()
        }
    }

    fn inline_ad(creatives: Vec<Creative>) -> Ad {
        Ad {
            id: None,
            sequence: None,
            body: AdBody {
                ad_system: None,
                impressions: Vec::new(),
                errors: Vec::new(),
                creatives,
                extensions: None,
                verifications: Vec::new(),
                variant: AdVariant::InLine(InLineInfo::default()),
            },
        }
    }

    fn wrapper_ad(uri: &str) -> Ad {
        let mut ad = inline_ad(Vec::new());
        ad.body.variant = AdVariant::Wrapper(WrapperInfo {
            vast_ad_tag_uri: uri.to_string(),
            ..WrapperInfo::default()
        });
        ad
    }

    fn document(ads: Vec<Ad>) -> Vast {
        Vast {
            version: "3.0".to_string(),
            ads,
            errors: Vec::new(),
        }
    }

    #[test]
    fn classify_prefers_wrapper_with_pointer() {
        let vast = document(vec![wrapper_ad("http://next.example/vast")]);
        assert_eq!(vast.classify().unwrap(), VastType::Wrapper);
    }

    #[test]
    fn classify_wrapper_with_empty_pointer_is_no_inline() {
        let vast = document(vec![wrapper_ad("  ")]);
        assert!(matches!(vast.classify(), Err(VastError::NoInline)));
    }

    #[test]
    fn classify_distinguishes_each_missing_link() {
        assert!(matches!(
            document(Vec::new()).classify(),
            Err(VastError::NoAds)
        ));
        assert!(matches!(
            document(vec![inline_ad(Vec::new())]).classify(),
            Err(VastError::NoCreatives)
        ));
        let companion_only = inline_ad(vec![Creative::new(CreativeKind::CompanionAds(
            CompanionAds::default(),
        ))]);
        assert!(matches!(
            document(vec![companion_only]).classify(),
            Err(VastError::NoLinear)
        ));
        let no_media = inline_ad(vec![linear_creative(Vec::new())]);
        assert!(matches!(
            document(vec![no_media]).classify(),
            Err(VastError::NoMediaFiles)
        ));
    }

    #[test]
    fn classify_detects_vpaid_case_insensitively() {
        let vast = document(vec![inline_ad(vec![linear_creative(vec![media_file(
            Some("vpaid"),
        )])])]);
        assert_eq!(vast.classify().unwrap(), VastType::Vpaid);

        let vast = document(vec![inline_ad(vec![linear_creative(vec![media_file(
            None,
        )])])]);
        assert_eq!(vast.classify().unwrap(), VastType::Standard);
    }

    #[test]
    fn primary_media_pairs_file_with_duration() {
        let vast = document(vec![
            wrapper_ad("http://next.example/vast"),
            inline_ad(vec![linear_creative(vec![media_file(None)])]),
        ]);
        let (media, duration) = vast.primary_media().unwrap();
        assert_eq!(media.uri, "http://cdn.example/ad.mp4");
        assert_eq!(duration, Duration::from_secs(30));
    }

    #[test]
    fn primary_media_is_none_for_empty_tree() {
        assert!(document(Vec::new()).primary_media().is_none());
        assert!(
            document(vec![wrapper_ad("http://next.example/vast")])
                .primary_media()
                .is_none()
        );
    }

    #[test]
    fn click_through_returns_first_non_empty() {
        let mut creative = linear_creative(Vec::new());
        if let CreativeKind::Linear(linear) = &mut creative.kind {
            linear.video_clicks = Some(VideoClicks {
                click_throughs: vec![
                    VideoClick::new(""),
                    VideoClick::new("http://landing.example"),
                ],
                ..VideoClicks::default()
            });
        }
        let vast = document(vec![inline_ad(vec![creative])]);
        assert_eq!(vast.click_through(), "http://landing.example");

        assert_eq!(document(Vec::new()).click_through(), "");
    }

    #[test]
    fn duration_reports_each_missing_link() {
        assert!(matches!(
            document(Vec::new()).duration(),
            Err(VastError::NoAds)
        ));
        assert!(matches!(
            document(vec![wrapper_ad("http://x")]).duration(),
            Err(VastError::NoInline)
        ));
        assert!(matches!(
            document(vec![inline_ad(Vec::new())]).duration(),
            Err(VastError::NoCreatives)
        ));
        let companion_only = inline_ad(vec![Creative::new(CreativeKind::CompanionAds(
            CompanionAds::default(),
        ))]);
        assert!(matches!(
            document(vec![companion_only]).duration(),
            Err(VastError::NoLinear)
        ));

        let vast = document(vec![inline_ad(vec![linear_creative(Vec::new())])]);
        assert_eq!(vast.duration().unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn strip_clears_inline_but_not_wrapper() {
        let mut inline = inline_ad(vec![linear_creative(Vec::new())]);
        inline.body.impressions.push(Impression {
            id: None,
            uri: "http://inline.imp".to_string(),
        });
        inline.body.errors.push("http://inline.err".to_string());
        inline.add_tracking_events(vec![Tracking {
            event: "start".to_string(),
            offset: None,
            uri: "http://inline.track".to_string(),
        }]);

        let mut wrapper = wrapper_ad("http://next.example/vast");
        wrapper.body.impressions.push(Impression {
            id: None,
            uri: "http://wrapper.imp".to_string(),
        });

        let mut vast = document(vec![inline, wrapper]);
        vast.errors.push("http://doc.err".to_string());
        vast.strip_tracking_pixels();

        assert!(vast.errors.is_empty());
        assert!(vast.ads[0].body.impressions.is_empty());
        assert!(vast.ads[0].body.errors.is_empty());
        let CreativeKind::Linear(linear) = &vast.ads[0].body.creatives[0].kind else {
            panic!("expected a linear creative");
        };
        assert!(linear.tracking_events.is_empty());

        // The wrapper chain still needs its pixels
        assert_eq!(vast.ads[1].body.impressions.len(), 1);
    }

    #[test]
    fn normalize_trims_and_backfills_dimensions() {
        let mut media = media_file(None);
        media.uri = "  http://cdn.example/ad.mp4  ".to_string();
        media.width = 0;
        let mut ad = inline_ad(vec![linear_creative(vec![media])]);
        ad.body.ad_system = Some(AdSystem {
            name: " system ".to_string(),
            version: None,
        });
        ad.body.impressions.push(Impression {
            id: None,
            uri: " http://imp ".to_string(),
        });
        if let AdVariant::InLine(info) = &mut ad.body.variant {
            info.ad_title = " title ".to_string();
        }

        let mut vast = document(vec![ad]);
        vast.normalize(Some((1920, 1080)));

        let body = &vast.ads[0].body;
        assert_eq!(body.ad_system.as_ref().unwrap().name, "system");
        assert_eq!(body.impressions[0].uri, "http://imp");
        let AdVariant::InLine(info) = &body.variant else {
            panic!("expected an inline ad");
        };
        assert_eq!(info.ad_title, "title");
        let CreativeKind::Linear(linear) = &body.creatives[0].kind else {
            panic!("expected a linear creative");
        };
        assert_eq!(linear.media_files[0].uri, "http://cdn.example/ad.mp4");
        assert_eq!(linear.media_files[0].width, 1920);
        assert_eq!(linear.media_files[0].height, 1080);
    }

    #[test]
    fn normalize_without_defaults_leaves_dimensions() {
        let mut media = media_file(None);
        media.width = 0;
        let mut vast = document(vec![inline_ad(vec![linear_creative(vec![media])])]);
        vast.normalize(None);
        let CreativeKind::Linear(linear) = &vast.ads[0].body.creatives[0].kind else {
            panic!("expected a linear creative");
        };
        assert_eq!(linear.media_files[0].width, 0);
    }
}
