use serde::{Deserialize, Serialize};

use crate::duration::Duration;
use crate::extension::Extension;
use crate::offset::Offset;

/// Represents a VAST document (Video Ad Serving Template)
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Vast {
    /// The VAST version (e.g., "2.0", "3.0", "4.0", etc.)
    pub version: String,

    /// The Ad elements within the VAST document
    pub ads: Vec<Ad>,

    /// Document-level error pixel URIs, requested on a "no ad" response
    pub errors: Vec<String>,
}

/// Represents an Ad within a VAST document.
///
/// The inline/wrapper split of the wire format is a tagged variant on the
/// shared [`AdBody`], so every mutation and query is written once and
/// behaves identically for both wire layouts.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Ad {
    /// The ad server-defined identifier
    pub id: Option<String>,

    /// The ad sequence number (for ad pods)
    pub sequence: Option<u32>,

    pub body: AdBody,
}

/// The fields shared by the InLine and Wrapper wire layouts, plus the
/// variant tag carrying whatever is unique to each
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct AdBody {
    /// The ad system name and version
    pub ad_system: Option<AdSystem>,

    /// Impression tracking pixels
    pub impressions: Vec<Impression>,

    /// Error tracking pixels
    pub errors: Vec<String>,

    /// Creative elements
    pub creatives: Vec<Creative>,

    /// Vendor extension payloads; absent until an extension is attached
    pub extensions: Option<Vec<Extension>>,

    /// Open Measurement verification resources (VAST 4.x)
    pub verifications: Vec<Verification>,

    pub variant: AdVariant,
}

/// The InLine-or-Wrapper discriminant of an [`Ad`]: exactly one, never both
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub enum AdVariant {
    InLine(InLineInfo),
    Wrapper(WrapperInfo),
}

/// Fields that only exist on a terminal (InLine) ad
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct InLineInfo {
    /// The common name of the ad
    pub ad_title: String,

    /// A longer description of the ad
    pub description: Option<String>,

    /// The advertiser name as defined by the ad serving party
    pub advertiser: Option<String>,

    /// A URI to a survey vendor
    pub survey: Option<String>,

    /// Pricing information for real-time bidding systems
    pub pricing: Option<Pricing>,
}

/// Fields that only exist on a redirecting (Wrapper) ad
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct WrapperInfo {
    /// The ad tag URI of the downstream ad server
    pub vast_ad_tag_uri: String,

    /// Emitted only when explicitly set, per the wrapper attribute rules
    pub fallback_on_no_ad: Option<bool>,
    pub allow_multiple_ads: Option<bool>,
    pub follow_additional_wrappers: Option<bool>,
}

/// Represents the ad system information
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct AdSystem {
    /// The ad system name
    pub name: String,

    /// The ad system version
    pub version: Option<String>,
}

/// Represents an impression tracking pixel
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Impression {
    /// The impression ID
    pub id: Option<String>,

    /// The impression tracking URI
    pub uri: String,
}

/// Represents pricing information
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Pricing {
    /// The pricing model (e.g., "cpm", "cpc", "cpe" or "cpv")
    pub model: String,

    /// The ISO-4217 currency of the value
    pub currency: String,

    /// The price value
    pub value: String,
}

/// Represents a creative element
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Creative {
    /// The creative ID
    pub id: Option<String>,

    /// The creative sequence number
    pub sequence: Option<u32>,

    /// The creative ad ID
    pub ad_id: Option<String>,

    /// The creative API framework
    pub api_framework: Option<String>,

    /// VAST 4.x universal ad id
    pub universal_ad_id: Option<UniversalAdId>,

    /// Extensions scoped to this creative
    pub creative_extensions: Option<Vec<Extension>>,

    pub kind: CreativeKind,
}

impl Creative {
    /// A bare creative wrapping the given sub-variant
    pub fn new(kind: CreativeKind) -> Self {
        Creative {
            id: None,
            sequence: None,
            ad_id: None,
            api_framework: None,
            universal_ad_id: None,
            creative_extensions: None,
            kind,
        }
    }
}

/// The linear/companion/non-linear discriminant of a [`Creative`]
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub enum CreativeKind {
    Linear(Linear),
    CompanionAds(CompanionAds),
    NonLinearAds(NonLinearAds),
}

/// Represents a linear (video) creative.
///
/// Duration, ad parameters and media files only appear in the inline wire
/// layout; a wrapper creative carries trackers and clicks alone.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct Linear {
    /// When the skip control should be offered
    pub skip_offset: Option<Offset>,

    /// The playable duration
    pub duration: Option<Duration>,

    /// Arbitrary data handed to the creative's API framework
    pub ad_parameters: Option<AdParameters>,

    /// Industry-initiative icons (e.g. AdChoices)
    pub icons: Vec<Icon>,

    /// Tracking events
    pub tracking_events: Vec<Tracking>,

    /// Video clicks
    pub video_clicks: Option<VideoClicks>,

    /// Media files
    pub media_files: Vec<MediaFile>,
}

/// Represents a tracking event callback
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Tracking {
    /// The event name (e.g., "start", "firstQuartile", "midpoint", "complete")
    pub event: String,

    /// The time at which the URI should be pinged; required for "progress"
    pub offset: Option<Offset>,

    /// The tracking URI
    pub uri: String,
}

/// Represents video click-through, click-tracking and custom-click URIs
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct VideoClicks {
    pub click_throughs: Vec<VideoClick>,
    pub click_trackings: Vec<VideoClick>,
    pub custom_clicks: Vec<VideoClick>,
}

/// A single click URI
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct VideoClick {
    pub id: Option<String>,
    pub uri: String,
}

impl VideoClick {
    pub fn new(uri: impl Into<String>) -> Self {
        VideoClick {
            id: None,
            uri: uri.into(),
        }
    }
}

/// Represents a reference to a linear creative asset
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct MediaFile {
    /// Optional identifier
    pub id: Option<String>,

    /// Method of delivery ("streaming" or "progressive")
    pub delivery: String,

    /// MIME type of the asset
    pub mime_type: String,

    /// The codec used to produce the media file
    pub codec: Option<String>,

    /// Bitrate of encoded video in Kbps
    pub bitrate: Option<u32>,

    /// Bitrate bounds of an adaptive stream in Kbps
    pub min_bitrate: Option<u32>,
    pub max_bitrate: Option<u32>,

    /// Pixel dimensions of the video; zero means unset and is backfilled
    /// by normalization
    pub width: u32,
    pub height: u32,

    /// Whether it is acceptable to scale the image
    pub scalable: bool,

    /// Whether the aspect ratio must be maintained when scaled
    pub maintain_aspect_ratio: bool,

    /// The API framework of an interactive asset (e.g. "VPAID")
    pub api_framework: Option<String>,

    /// The media file URI
    pub uri: String,
}

/// Which companions the player must attempt to display
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum Required {
    All,
    Any,
    None,
}

impl Required {
    pub(crate) fn from_attr(value: &str) -> Option<Required> {
        match value.to_ascii_lowercase().as_str() {
            "all" => Some(Required::All),
            "any" => Some(Required::Any),
            "none" => Some(Required::None),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Required::All => "all",
            Required::Any => "any",
            Required::None => "none",
        }
    }
}

/// Represents companion creatives
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct CompanionAds {
    pub required: Option<Required>,
    pub companions: Vec<Companion>,
}

/// Represents a companion (separate-slot banner) creative
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct Companion {
    /// Optional identifier
    pub id: Option<String>,

    /// Pixel dimensions of the companion slot
    pub width: u32,
    pub height: u32,

    /// Pixel dimensions of the companion asset
    pub asset_width: Option<u32>,
    pub asset_height: Option<u32>,

    /// Pixel dimensions when in expanded state
    pub expanded_width: Option<u32>,
    pub expanded_height: Option<u32>,

    /// The method to use for communication with the companion
    pub api_framework: Option<String>,

    /// Matches the companion to publisher placement areas on the page
    pub ad_slot_id: Option<String>,

    /// Destination page opened when the user clicks the banner
    pub click_through: Option<String>,

    /// URIs pinged when the user clicks the banner. The inline wire layout
    /// keeps the id attribute; the wrapper layout flattens to bare URIs.
    pub click_trackings: Vec<VideoClick>,

    /// Alt text when rendered in an HTML environment
    pub alt_text: Option<String>,

    /// Tracking events; creativeView is the only supported event
    pub tracking_events: Vec<Tracking>,

    /// Data to be passed into the companion
    pub ad_parameters: Option<AdParameters>,

    pub resource: Option<Resource>,
}

/// Represents non-linear (overlay) creatives
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct NonLinearAds {
    pub tracking_events: Vec<Tracking>,
    pub non_linears: Vec<NonLinear>,
}

/// Represents a non-linear creative unit
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct NonLinear {
    /// Optional identifier
    pub id: Option<String>,

    /// Pixel dimensions of the unit
    pub width: u32,
    pub height: u32,

    /// Pixel dimensions when in expanded state
    pub expanded_width: Option<u32>,
    pub expanded_height: Option<u32>,

    /// Whether it is acceptable to scale the image
    pub scalable: bool,

    /// Whether the aspect ratio must be maintained when scaled
    pub maintain_aspect_ratio: bool,

    /// Suggested display duration, typically for animation to complete
    pub min_suggested_duration: Option<Duration>,

    /// The method to use for communication with the unit
    pub api_framework: Option<String>,

    /// URIs pinged when the user clicks the unit
    pub click_trackings: Vec<String>,

    /// Destination page opened when the user clicks the unit
    pub click_through: Option<String>,

    /// Tracking events (wrapper wire layout only)
    pub tracking_events: Vec<Tracking>,

    /// Data to be passed into the unit
    pub ad_parameters: Option<AdParameters>,

    pub resource: Option<Resource>,
}

/// Represents an industry-initiative icon such as AdChoices
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct Icon {
    /// The industry initiative the icon supports
    pub program: Option<String>,

    /// Pixel dimensions of the icon
    pub width: u32,
    pub height: u32,

    /// Alignment in pixels or "left"/"right", "top"/"bottom"
    pub x_position: String,
    pub y_position: String,

    /// When the player should start displaying the icon
    pub offset: Option<Offset>,

    /// How long the player must display the icon
    pub duration: Option<Duration>,

    /// The method to use for communication with the icon
    pub api_framework: Option<String>,

    /// Destination page opened when the user clicks the icon
    pub click_through: Option<String>,

    /// URIs pinged when the user clicks the icon
    pub click_trackings: Vec<String>,

    pub resource: Option<Resource>,
}

/// The static/iframe/HTML asset choice shared by companions, non-linears
/// and icons
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub enum Resource {
    /// URI to a static file, such as an image
    Static(StaticResource),
    /// URI source for an IFrame displaying the element
    IFrame(String),
    /// Raw HTML displaying the element
    Html(HtmlResource),
}

/// A static creative asset reference
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct StaticResource {
    /// MIME type of the asset
    pub creative_type: Option<String>,

    pub uri: String,
}

/// A container for HTML data
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct HtmlResource {
    /// Whether the HTML is XML-encoded
    pub xml_encoded: bool,

    pub html: String,
}

/// Arbitrary parameters handed to a creative's API framework
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct AdParameters {
    /// Whether the parameters are XML-encoded
    pub xml_encoded: bool,

    pub parameters: String,
}

/// A VAST 4.x universal ad id
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct UniversalAdId {
    pub id_registry: Option<String>,
    pub id_value: Option<String>,
    pub id: String,
}

/// An Open Measurement verification resource
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct Verification {
    pub vendor: Option<String>,
    pub js_resource: Option<JavaScriptResource>,
    pub executable_resource: Option<ExecutableResource>,
    pub tracking_events: Vec<Tracking>,
    pub parameters: Option<String>,
}

/// A JavaScript measurement resource
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct JavaScriptResource {
    pub api_framework: Option<String>,
    pub browser_optional: bool,
    pub uri: String,
}

/// An executable measurement resource
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct ExecutableResource {
    pub api_framework: Option<String>,
    pub uri: String,
}
