//! Additive mutation operations on an [`Ad`].
//!
//! Every operation is a no-op on empty input and never errors on missing
//! substructure: absent containers are either lazily created (extensions,
//! video clicks) or simply skipped (creatives without the targeted kind).
//! Nothing here ever removes an element, and because the inline/wrapper
//! split is a variant on the shared body, one implementation serves both
//! wire layouts.

use crate::extension::Extension;
use crate::models::*;

impl Ad {
    /// Append an extension, lazily creating the container.
    pub fn add_extension(&mut self, extension: Option<Extension>) {
        let Some(extension) = extension else {
            return;
        };
        self.body
            .extensions
            .get_or_insert_with(Vec::new)
            .push(extension);
    }

    /// Append impression pixels, preserving call order.
    pub fn add_impressions(&mut self, impressions: Vec<Impression>) {
        self.body.impressions.extend(impressions);
    }

    /// Append error pixels, preserving call order.
    pub fn add_errors(&mut self, errors: Vec<String>) {
        self.body.errors.extend(errors);
    }

    /// Append tracking events to every linear creative. Creatives without
    /// a linear kind are skipped, never created.
    pub fn add_tracking_events(&mut self, events: Vec<Tracking>) {
        if events.is_empty() {
            return;
        }
        for creative in &mut self.body.creatives {
            if let CreativeKind::Linear(linear) = &mut creative.kind {
                linear.tracking_events.extend(events.iter().cloned());
            }
        }
    }

    /// Append tracking events to every companion under every CompanionAds
    /// creative.
    pub fn add_companion_tracking_events(&mut self, events: Vec<Tracking>) {
        if events.is_empty() {
            return;
        }
        for creative in &mut self.body.creatives {
            if let CreativeKind::CompanionAds(companion_ads) = &mut creative.kind {
                for companion in &mut companion_ads.companions {
                    companion.tracking_events.extend(events.iter().cloned());
                }
            }
        }
    }

    /// Append click trackers to every linear creative, lazily creating the
    /// click structure.
    pub fn add_click_trackings(&mut self, clicks: Vec<VideoClick>) {
        if clicks.is_empty() {
            return;
        }
        for creative in &mut self.body.creatives {
            if let CreativeKind::Linear(linear) = &mut creative.kind {
                linear
                    .video_clicks
                    .get_or_insert_with(VideoClicks::default)
                    .click_trackings
                    .extend(clicks.iter().cloned());
            }
        }
    }

    /// Append click-through entries to every linear creative, lazily
    /// creating the click structure.
    pub fn add_click_throughs(&mut self, clicks: Vec<VideoClick>) {
        if clicks.is_empty() {
            return;
        }
        for creative in &mut self.body.creatives {
            if let CreativeKind::Linear(linear) = &mut creative.kind {
                linear
                    .video_clicks
                    .get_or_insert_with(VideoClicks::default)
                    .click_throughs
                    .extend(clicks.iter().cloned());
            }
        }
    }

    /// Append click trackers to every companion. Entry ids survive in the
    /// inline wire layout; the wrapper layout flattens to bare URIs at
    /// serialization.
    pub fn add_companion_click_trackings(&mut self, clicks: Vec<VideoClick>) {
        if clicks.is_empty() {
            return;
        }
        for creative in &mut self.body.creatives {
            if let CreativeKind::CompanionAds(companion_ads) = &mut creative.kind {
                for companion in &mut companion_ads.companions {
                    companion.click_trackings.extend(clicks.iter().cloned());
                }
            }
        }
    }

    /// Append a new creative wrapping the companion. Existing CompanionAds
    /// containers are never merged into.
    pub fn add_companion(&mut self, companion: Option<Companion>) {
        let Some(companion) = companion else {
            return;
        };
        self.body
            .creatives
            .push(Creative::new(CreativeKind::CompanionAds(CompanionAds {
                required: None,
                companions: vec![companion],
            })));
    }

    /// Unconditionally overwrite the ad system descriptor.
    pub fn set_ad_system(&mut self, name: &str, version: Option<&str>) {
        self.body.ad_system = Some(AdSystem {
            name: name.to_string(),
            version: version.map(str::to_string),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::ExtensionPayload;

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

    fn wrapper_ad(creatives: Vec<Creative>) -> Ad {
        let mut ad = inline_ad(creatives);
        ad.body.variant = AdVariant::Wrapper(WrapperInfo::default());
        ad
    }

    fn tracking(event: &str, uri: &str) -> Tracking {
        Tracking {
            event: event.to_string(),
            offset: None,
            uri: uri.to_string(),
        }
    }

    fn impression(uri: &str) -> Impression {
        Impression {
            id: None,
            uri: uri.to_string(),
        }
    }

    #[test]
    fn add_impressions_appends_in_order() {
        let mut ad = inline_ad(Vec::new());
        ad.add_impressions(vec![impression("http://a")]);
        ad.add_impressions(vec![impression("http://b"), impression("http://c")]);
        let uris: Vec<_> = ad.body.impressions.iter().map(|i| i.uri.as_str()).collect();
        assert_eq!(uris, vec!["http://a", "http://b", "http://c"]);
    }

    #[test]
    fn add_impressions_empty_is_noop() {
        let mut ad = inline_ad(Vec::new());
        ad.add_impressions(Vec::new());
        assert!(ad.body.impressions.is_empty());
    }

    #[test]
    fn add_extension_lazily_creates_container() {
        let mut ad = inline_ad(Vec::new());
        assert!(ad.body.extensions.is_none());
        ad.add_extension(None);
        assert!(ad.body.extensions.is_none());

        ad.add_extension(Some(Extension::data("vendor", "<A/>")));
        let extensions = ad.body.extensions.as_ref().unwrap();
        assert_eq!(extensions.len(), 1);
        assert_eq!(
            extensions[0].payload,
            ExtensionPayload::Data("<A/>".to_string())
        );
    }

    #[test]
    fn add_tracking_events_skips_creatives_without_linear() {
        let mut ad = inline_ad(vec![
            Creative::new(CreativeKind::Linear(Linear::default())),
            Creative::new(CreativeKind::CompanionAds(CompanionAds::default())),
        ]);
        ad.add_tracking_events(vec![tracking("start", "http://start")]);

        let CreativeKind::Linear(linear) = &ad.body.creatives[0].kind else {
            panic!("expected a linear creative");
        };
        assert_eq!(linear.tracking_events.len(), 1);

        let CreativeKind::CompanionAds(companion_ads) = &ad.body.creatives[1].kind else {
            panic!("expected a companion creative");
        };
        assert!(companion_ads.companions.is_empty());
    }

    #[test]
    fn add_tracking_events_is_equivalent_for_both_variants() {
        let events = vec![tracking("midpoint", "http://mid")];
        let creatives = vec![Creative::new(CreativeKind::Linear(Linear::default()))];

        let mut inline = inline_ad(creatives.clone());
        let mut wrapper = wrapper_ad(creatives);
        inline.add_tracking_events(events.clone());
        wrapper.add_tracking_events(events);

        assert_eq!(inline.body.creatives, wrapper.body.creatives);
    }

    #[test]
    fn add_click_trackings_lazily_creates_click_structure() {
        let mut ad = inline_ad(vec![Creative::new(CreativeKind::Linear(Linear::default()))]);
        ad.add_click_trackings(vec![VideoClick::new("http://click")]);

        let CreativeKind::Linear(linear) = &ad.body.creatives[0].kind else {
            panic!("expected a linear creative");
        };
        let clicks = linear.video_clicks.as_ref().unwrap();
        assert_eq!(clicks.click_trackings.len(), 1);
        assert!(clicks.click_throughs.is_empty());
    }

    #[test]
    fn add_companion_tracking_events_reaches_every_companion() {
        let mut ad = inline_ad(vec![Creative::new(CreativeKind::CompanionAds(
            CompanionAds {
                required: None,
                companions: vec![Companion::default(), Companion::default()],
            },
        ))]);
        ad.add_companion_tracking_events(vec![tracking("creativeView", "http://cv")]);

        let CreativeKind::CompanionAds(companion_ads) = &ad.body.creatives[0].kind else {
            panic!("expected a companion creative");
        };
        for companion in &companion_ads.companions {
            assert_eq!(companion.tracking_events.len(), 1);
        }
    }

    #[test]
    fn add_companion_appends_a_new_creative() {
        let mut ad = inline_ad(vec![Creative::new(CreativeKind::CompanionAds(
            CompanionAds::default(),
        ))]);
        ad.add_companion(Some(Companion {
            width: 300,
            height: 250,
            ..Companion::default()
        }));
        ad.add_companion(None);

        // The existing container is untouched; a new creative is appended
        assert_eq!(ad.body.creatives.len(), 2);
        let CreativeKind::CompanionAds(companion_ads) = &ad.body.creatives[1].kind else {
            panic!("expected a companion creative");
        };
        assert_eq!(companion_ads.companions.len(), 1);
        assert_eq!(companion_ads.companions[0].width, 300);
    }

    #[test]
    fn set_ad_system_overwrites() {
        let mut ad = wrapper_ad(Vec::new());
        ad.set_ad_system("first", None);
        ad.set_ad_system("second", Some("2.1"));
        let ad_system = ad.body.ad_system.as_ref().unwrap();
        assert_eq!(ad_system.name, "second");
        assert_eq!(ad_system.version.as_deref(), Some("2.1"));
    }

    #[test]
    fn add_errors_appends_preserving_existing() {
        let mut ad = inline_ad(Vec::new());
        ad.body.errors.push("http://existing".to_string());
        ad.add_errors(vec!["http://new".to_string()]);
        assert_eq!(
            ad.body.errors,
            vec!["http://existing".to_string(), "http://new".to_string()]
        );
    }
}
