use std::str::from_utf8;

use quick_xml::Reader;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Result, VastError};
use crate::extension::{self, Extension};
use crate::models::*;

/// Parse a VAST XML document into a [`Vast`] tree.
pub fn parse_vast(xml: &str) -> Result<Vast> {
    // Ad servers routinely break tags across lines; embedded newlines and
    // tabs mis-split attribute and text tokens in the reader.
    let cleaned = xml.replace(['\n', '\r', '\t'], "");
    let mut reader = Reader::from_str(&cleaned);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut vast = Vast {
        version: String::new(),
        ads: Vec::new(),
        errors: Vec::new(),
    };

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"VAST" => {
                vast.version = vast_version(e)?;
                parse_document(&mut reader, &mut vast)?;
                return Ok(vast);
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"VAST" => {
                vast.version = vast_version(e)?;
                return Ok(vast);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }

    Err(VastError::MissingField("VAST root element".to_string()))
}

fn vast_version(start: &BytesStart) -> Result<String> {
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == b"version" {
            if let Some(version) = attr_string(&attr) {
                if !version.is_empty() {
                    return Ok(version);
                }
            }
        }
    }
    Err(VastError::MissingField("VAST version".to_string()))
}

/// Parse the children of the `<VAST>` root
fn parse_document(reader: &mut Reader<&[u8]>, vast: &mut Vast) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"Ad" => {
                    let ad = parse_ad_element(reader, e)?;
                    vast.ads.push(ad);
                }
                b"Error" => vast.errors.push(read_text_element(reader)?),
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"VAST" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(())
}

/// Parse a single Ad element
fn parse_ad_element(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Ad> {
    let mut id = None;
    let mut sequence = None;
    for attr in start.attributes().flatten() {
        match attr.key.as_ref() {
            b"id" => id = attr_string(&attr),
            b"sequence" => sequence = attr_u32(&attr),
            _ => (),
        }
    }

    let mut body: Option<AdBody> = None;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"InLine" => body = Some(parse_inline(reader)?),
                b"Wrapper" => body = Some(parse_wrapper(reader, e)?),
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"Ad" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }

    let body = body.ok_or_else(|| {
        VastError::MissingField("Ad requires an InLine or Wrapper element".to_string())
    })?;
    Ok(Ad { id, sequence, body })
}

fn empty_body(variant: AdVariant) -> AdBody {
    AdBody {
        ad_system: None,
        impressions: Vec::new(),
        errors: Vec::new(),
        creatives: Vec::new(),
        extensions: None,
        verifications: Vec::new(),
        variant,
    }
}

/// Parse an InLine element
fn parse_inline(reader: &mut Reader<&[u8]>) -> Result<AdBody> {
    let mut body = empty_body(AdVariant::InLine(InLineInfo::default()));
    let mut info = InLineInfo::default();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"AdSystem" => body.ad_system = Some(parse_ad_system(reader, e)?),
                b"AdTitle" => info.ad_title = read_text_element(reader)?,
                b"Description" => info.description = Some(read_text_element(reader)?),
                b"Advertiser" => info.advertiser = Some(read_text_element(reader)?),
                b"Survey" => info.survey = Some(read_text_element(reader)?),
                b"Impression" => body.impressions.push(parse_impression(reader, e)?),
                b"Error" => body.errors.push(read_text_element(reader)?),
                b"Pricing" => info.pricing = Some(parse_pricing(reader, e)?),
                b"AdVerifications" => body.verifications = parse_verifications(reader)?,
                b"Extensions" => {
                    body.extensions = Some(parse_extensions(reader, b"Extensions", b"Extension")?);
                }
                b"Creatives" => body.creatives = parse_creatives(reader)?,
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"InLine" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }

    body.variant = AdVariant::InLine(info);
    Ok(body)
}

/// Parse a Wrapper element
fn parse_wrapper(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<AdBody> {
    let mut info = WrapperInfo::default();
    for attr in start.attributes().flatten() {
        match attr.key.as_ref() {
            b"fallbackOnNoAd" => info.fallback_on_no_ad = attr_bool(&attr),
            b"allowMultipleAds" => info.allow_multiple_ads = attr_bool(&attr),
            b"followAdditionalWrappers" => {
                info.follow_additional_wrappers = attr_bool(&attr)
            }
            _ => (),
        }
    }

    let mut body = empty_body(AdVariant::Wrapper(WrapperInfo::default()));
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"AdSystem" => body.ad_system = Some(parse_ad_system(reader, e)?),
                b"VASTAdTagURI" => info.vast_ad_tag_uri = read_text_element(reader)?,
                b"Impression" => body.impressions.push(parse_impression(reader, e)?),
                b"Error" => body.errors.push(read_text_element(reader)?),
                b"AdVerifications" => body.verifications = parse_verifications(reader)?,
                b"Extensions" => {
                    body.extensions = Some(parse_extensions(reader, b"Extensions", b"Extension")?);
                }
                b"Creatives" => body.creatives = parse_creatives(reader)?,
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"Wrapper" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }

    body.variant = AdVariant::Wrapper(info);
    Ok(body)
}

/// Parse AdSystem element
fn parse_ad_system(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<AdSystem> {
    let mut version = None;
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == b"version" {
            version = attr_string(&attr);
        }
    }
    Ok(AdSystem {
        name: read_text_element(reader)?,
        version,
    })
}

/// Parse Impression element
fn parse_impression(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Impression> {
    let mut id = None;
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == b"id" {
            id = attr_string(&attr);
        }
    }
    Ok(Impression {
        id,
        uri: read_text_element(reader)?,
    })
}

/// Parse Pricing element
fn parse_pricing(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Pricing> {
    let mut pricing = Pricing {
        model: String::new(),
        currency: String::new(),
        value: String::new(),
    };
    for attr in start.attributes().flatten() {
        match attr.key.as_ref() {
            b"model" => pricing.model = attr_string(&attr).unwrap_or_default(),
            b"currency" => pricing.currency = attr_string(&attr).unwrap_or_default(),
            _ => (),
        }
    }
    pricing.value = read_text_element(reader)?;
    Ok(pricing)
}

/// Parse an extension container (`Extensions` or `CreativeExtensions`)
fn parse_extensions(
    reader: &mut Reader<&[u8]>,
    end_name: &[u8],
    item_name: &[u8],
) -> Result<Vec<Extension>> {
    let mut extensions = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == item_name => {
                extensions.push(extension::parse_extension(reader, e)?);
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == item_name => {
                extensions.push(extension::extension_from_attrs(e));
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == end_name => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(extensions)
}

/// Parse AdVerifications element
fn parse_verifications(reader: &mut Reader<&[u8]>) -> Result<Vec<Verification>> {
    let mut verifications = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"Verification" => {
                verifications.push(parse_verification(reader, e)?);
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"AdVerifications" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(verifications)
}

/// Parse a Verification element
fn parse_verification(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Verification> {
    let mut verification = Verification::default();
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == b"vendor" {
            verification.vendor = attr_string(&attr);
        }
    }

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"JavaScriptResource" => {
                    let mut resource = JavaScriptResource::default();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"apiFramework" => resource.api_framework = attr_string(&attr),
                            b"browserOptional" => {
                                resource.browser_optional = attr_bool(&attr).unwrap_or(false)
                            }
                            _ => (),
                        }
                    }
                    resource.uri = read_text_element(reader)?;
                    verification.js_resource = Some(resource);
                }
                b"ExecutableResource" => {
                    let mut resource = ExecutableResource::default();
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"apiFramework" {
                            resource.api_framework = attr_string(&attr);
                        }
                    }
                    resource.uri = read_text_element(reader)?;
                    verification.executable_resource = Some(resource);
                }
                b"TrackingEvents" => verification.tracking_events = parse_tracking_events(reader)?,
                b"VerificationParameters" => {
                    verification.parameters = Some(read_text_element(reader)?)
                }
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"Verification" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(verification)
}

/// Parse Creatives element
fn parse_creatives(reader: &mut Reader<&[u8]>) -> Result<Vec<Creative>> {
    let mut creatives = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"Creative" => {
                creatives.push(parse_creative(reader, e)?);
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"Creatives" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(creatives)
}

/// Parse Creative element
fn parse_creative(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Creative> {
    let mut id = None;
    let mut sequence = None;
    let mut ad_id = None;
    let mut api_framework = None;
    for attr in start.attributes().flatten() {
        match attr.key.as_ref() {
            b"id" => id = attr_string(&attr),
            b"sequence" => sequence = attr_u32(&attr),
            b"AdID" | b"adId" => ad_id = attr_string(&attr),
            b"apiFramework" => api_framework = attr_string(&attr),
            _ => (),
        }
    }

    let mut universal_ad_id = None;
    let mut creative_extensions = None;
    let mut kind: Option<CreativeKind> = None;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"Linear" => kind = Some(CreativeKind::Linear(parse_linear(reader, e)?)),
                b"CompanionAds" => {
                    kind = Some(CreativeKind::CompanionAds(parse_companion_ads(reader, e)?))
                }
                b"NonLinearAds" => {
                    kind = Some(CreativeKind::NonLinearAds(parse_non_linear_ads(reader)?))
                }
                b"UniversalAdId" => universal_ad_id = Some(parse_universal_ad_id(reader, e)?),
                b"CreativeExtensions" => {
                    creative_extensions = Some(parse_extensions(
                        reader,
                        b"CreativeExtensions",
                        b"CreativeExtension",
                    )?);
                }
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"Creative" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }

    let kind = kind.ok_or_else(|| {
        VastError::MissingField(
            "Creative requires a Linear, CompanionAds or NonLinearAds element".to_string(),
        )
    })?;
    Ok(Creative {
        id,
        sequence,
        ad_id,
        api_framework,
        universal_ad_id,
        creative_extensions,
        kind,
    })
}

/// Parse UniversalAdId element
fn parse_universal_ad_id(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<UniversalAdId> {
    let mut id_registry = None;
    let mut id_value = None;
    for attr in start.attributes().flatten() {
        match attr.key.as_ref() {
            b"idRegistry" => id_registry = attr_string(&attr),
            b"idValue" => id_value = attr_string(&attr),
            _ => (),
        }
    }
    Ok(UniversalAdId {
        id_registry,
        id_value,
        id: read_text_element(reader)?,
    })
}

/// Parse Linear element
fn parse_linear(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Linear> {
    let mut linear = Linear::default();
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == b"skipoffset" {
            if let Ok(value) = from_utf8(&attr.value) {
                linear.skip_offset = Some(value.parse()?);
            }
        }
    }

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"Duration" => {
                    let text = read_text_element(reader)?;
                    linear.duration = Some(text.parse()?);
                }
                b"AdParameters" => linear.ad_parameters = Some(parse_ad_parameters(reader, e)?),
                b"Icons" => linear.icons = parse_icons(reader)?,
                b"TrackingEvents" => linear.tracking_events = parse_tracking_events(reader)?,
                b"VideoClicks" => linear.video_clicks = Some(parse_video_clicks(reader)?),
                b"MediaFiles" => linear.media_files = parse_media_files(reader)?,
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"Linear" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(linear)
}

/// Parse AdParameters element
fn parse_ad_parameters(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<AdParameters> {
    let mut xml_encoded = false;
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == b"xmlEncoded" {
            xml_encoded = attr_bool(&attr).unwrap_or(false);
        }
    }
    Ok(AdParameters {
        xml_encoded,
        parameters: read_text_element(reader)?,
    })
}

/// Parse TrackingEvents element
fn parse_tracking_events(reader: &mut Reader<&[u8]>) -> Result<Vec<Tracking>> {
    let mut tracking_events = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"Tracking" => {
                tracking_events.push(parse_tracking(reader, e)?);
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"Tracking" => {
                tracking_events.push(tracking_from_attrs(e)?);
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"TrackingEvents" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(tracking_events)
}

/// Build a tracking event from a start tag alone
pub(crate) fn tracking_from_attrs(start: &BytesStart) -> Result<Tracking> {
    let mut tracking = Tracking {
        event: String::new(),
        offset: None,
        uri: String::new(),
    };
    for attr in start.attributes().flatten() {
        match attr.key.as_ref() {
            b"event" => tracking.event = attr_string(&attr).unwrap_or_default(),
            b"offset" => {
                if let Ok(value) = from_utf8(&attr.value) {
                    tracking.offset = Some(value.parse()?);
                }
            }
            _ => (),
        }
    }
    Ok(tracking)
}

/// Parse a Tracking element
pub(crate) fn parse_tracking(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Tracking> {
    let mut tracking = tracking_from_attrs(start)?;
    tracking.uri = read_text_element(reader)?;
    Ok(tracking)
}

/// Parse VideoClicks element
fn parse_video_clicks(reader: &mut Reader<&[u8]>) -> Result<VideoClicks> {
    let mut video_clicks = VideoClicks::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"ClickThrough" => video_clicks
                    .click_throughs
                    .push(parse_video_click(reader, e)?),
                b"ClickTracking" => video_clicks
                    .click_trackings
                    .push(parse_video_click(reader, e)?),
                b"CustomClick" => video_clicks
                    .custom_clicks
                    .push(parse_video_click(reader, e)?),
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"VideoClicks" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(video_clicks)
}

/// Parse a single click element
fn parse_video_click(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<VideoClick> {
    let mut id = None;
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == b"id" {
            id = attr_string(&attr);
        }
    }
    Ok(VideoClick {
        id,
        uri: read_text_element(reader)?,
    })
}

/// Parse MediaFiles element
fn parse_media_files(reader: &mut Reader<&[u8]>) -> Result<Vec<MediaFile>> {
    let mut media_files = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"MediaFile" => {
                let mut media_file = media_file_from_attrs(e);
                media_file.uri = read_text_element(reader)?;
                media_files.push(media_file);
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"MediaFile" => {
                media_files.push(media_file_from_attrs(e));
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"MediaFiles" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(media_files)
}

fn media_file_from_attrs(start: &BytesStart) -> MediaFile {
    let mut media_file = MediaFile::default();
    for attr in start.attributes().flatten() {
        match attr.key.as_ref() {
            b"id" => media_file.id = attr_string(&attr),
            b"delivery" => media_file.delivery = attr_string(&attr).unwrap_or_default(),
            b"type" => media_file.mime_type = attr_string(&attr).unwrap_or_default(),
            b"codec" => media_file.codec = attr_string(&attr),
            b"bitrate" => media_file.bitrate = attr_u32(&attr),
            b"minBitrate" => media_file.min_bitrate = attr_u32(&attr),
            b"maxBitrate" => media_file.max_bitrate = attr_u32(&attr),
            b"width" => media_file.width = attr_u32(&attr).unwrap_or(0),
            b"height" => media_file.height = attr_u32(&attr).unwrap_or(0),
            b"scalable" => media_file.scalable = attr_bool(&attr).unwrap_or(false),
            b"maintainAspectRatio" => {
                media_file.maintain_aspect_ratio = attr_bool(&attr).unwrap_or(false)
            }
            b"apiFramework" => media_file.api_framework = attr_string(&attr),
            _ => (),
        }
    }
    media_file
}

/// Parse CompanionAds element
fn parse_companion_ads(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<CompanionAds> {
    let mut companion_ads = CompanionAds::default();
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == b"required" {
            if let Ok(value) = from_utf8(&attr.value) {
                companion_ads.required = Required::from_attr(value);
            }
        }
    }

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"Companion" => {
                companion_ads.companions.push(parse_companion(reader, e)?);
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"Companion" => {
                companion_ads.companions.push(companion_from_attrs(e));
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"CompanionAds" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(companion_ads)
}

fn companion_from_attrs(start: &BytesStart) -> Companion {
    let mut companion = Companion::default();
    for attr in start.attributes().flatten() {
        match attr.key.as_ref() {
            b"id" => companion.id = attr_string(&attr),
            b"width" => companion.width = attr_u32(&attr).unwrap_or(0),
            b"height" => companion.height = attr_u32(&attr).unwrap_or(0),
            b"assetWidth" => companion.asset_width = attr_u32(&attr),
            b"assetHeight" => companion.asset_height = attr_u32(&attr),
            b"expandedWidth" => companion.expanded_width = attr_u32(&attr),
            b"expandedHeight" => companion.expanded_height = attr_u32(&attr),
            b"apiFramework" => companion.api_framework = attr_string(&attr),
            b"adSlotId" => companion.ad_slot_id = attr_string(&attr),
            _ => (),
        }
    }
    companion
}

/// Parse a Companion element
fn parse_companion(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Companion> {
    let mut companion = companion_from_attrs(start);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"CompanionClickThrough" => {
                    companion.click_through = Some(read_text_element(reader)?)
                }
                b"CompanionClickTracking" => {
                    companion.click_trackings.push(parse_video_click(reader, e)?)
                }
                b"AltText" => companion.alt_text = Some(read_text_element(reader)?),
                b"TrackingEvents" => companion.tracking_events = parse_tracking_events(reader)?,
                b"AdParameters" => companion.ad_parameters = Some(parse_ad_parameters(reader, e)?),
                b"StaticResource" => {
                    companion.resource = Some(Resource::Static(parse_static_resource(reader, e)?))
                }
                b"IFrameResource" => {
                    companion.resource = Some(Resource::IFrame(read_text_element(reader)?))
                }
                b"HTMLResource" => {
                    companion.resource = Some(Resource::Html(parse_html_resource(reader, e)?))
                }
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"Companion" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(companion)
}

/// Parse NonLinearAds element
fn parse_non_linear_ads(reader: &mut Reader<&[u8]>) -> Result<NonLinearAds> {
    let mut non_linear_ads = NonLinearAds::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"TrackingEvents" => non_linear_ads.tracking_events = parse_tracking_events(reader)?,
                b"NonLinear" => non_linear_ads
                    .non_linears
                    .push(parse_non_linear(reader, e)?),
                _ => skip_element(reader, e)?,
            },
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"NonLinear" => {
                non_linear_ads.non_linears.push(non_linear_from_attrs(e)?);
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"NonLinearAds" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(non_linear_ads)
}

fn non_linear_from_attrs(start: &BytesStart) -> Result<NonLinear> {
    let mut non_linear = NonLinear::default();
    for attr in start.attributes().flatten() {
        match attr.key.as_ref() {
            b"id" => non_linear.id = attr_string(&attr),
            b"width" => non_linear.width = attr_u32(&attr).unwrap_or(0),
            b"height" => non_linear.height = attr_u32(&attr).unwrap_or(0),
            b"expandedWidth" => non_linear.expanded_width = attr_u32(&attr),
            b"expandedHeight" => non_linear.expanded_height = attr_u32(&attr),
            b"scalable" => non_linear.scalable = attr_bool(&attr).unwrap_or(false),
            b"maintainAspectRatio" => {
                non_linear.maintain_aspect_ratio = attr_bool(&attr).unwrap_or(false)
            }
            b"minSuggestedDuration" => {
                if let Ok(value) = from_utf8(&attr.value) {
                    non_linear.min_suggested_duration = Some(value.parse()?);
                }
            }
            b"apiFramework" => non_linear.api_framework = attr_string(&attr),
            _ => (),
        }
    }
    Ok(non_linear)
}

/// Parse a NonLinear element
fn parse_non_linear(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<NonLinear> {
    let mut non_linear = non_linear_from_attrs(start)?;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"NonLinearClickThrough" => {
                    non_linear.click_through = Some(read_text_element(reader)?)
                }
                b"NonLinearClickTracking" => {
                    non_linear.click_trackings.push(read_text_element(reader)?)
                }
                b"TrackingEvents" => non_linear.tracking_events = parse_tracking_events(reader)?,
                b"AdParameters" => non_linear.ad_parameters = Some(parse_ad_parameters(reader, e)?),
                b"StaticResource" => {
                    non_linear.resource = Some(Resource::Static(parse_static_resource(reader, e)?))
                }
                b"IFrameResource" => {
                    non_linear.resource = Some(Resource::IFrame(read_text_element(reader)?))
                }
                b"HTMLResource" => {
                    non_linear.resource = Some(Resource::Html(parse_html_resource(reader, e)?))
                }
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"NonLinear" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(non_linear)
}

/// Parse Icons element
fn parse_icons(reader: &mut Reader<&[u8]>) -> Result<Vec<Icon>> {
    let mut icons = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"Icon" => {
                icons.push(parse_icon(reader, e)?);
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"Icon" => {
                icons.push(icon_from_attrs(e)?);
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"Icons" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(icons)
}

fn icon_from_attrs(start: &BytesStart) -> Result<Icon> {
    let mut icon = Icon::default();
    for attr in start.attributes().flatten() {
        match attr.key.as_ref() {
            b"program" => icon.program = attr_string(&attr),
            b"width" => icon.width = attr_u32(&attr).unwrap_or(0),
            b"height" => icon.height = attr_u32(&attr).unwrap_or(0),
            b"xPosition" => icon.x_position = attr_string(&attr).unwrap_or_default(),
            b"yPosition" => icon.y_position = attr_string(&attr).unwrap_or_default(),
            b"offset" => {
                if let Ok(value) = from_utf8(&attr.value) {
                    icon.offset = Some(value.parse()?);
                }
            }
            b"duration" => {
                if let Ok(value) = from_utf8(&attr.value) {
                    icon.duration = Some(value.parse()?);
                }
            }
            b"apiFramework" => icon.api_framework = attr_string(&attr),
            _ => (),
        }
    }
    Ok(icon)
}

/// Parse an Icon element
fn parse_icon(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Icon> {
    let mut icon = icon_from_attrs(start)?;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"IconClicks" => parse_icon_clicks(reader, &mut icon)?,
                b"StaticResource" => {
                    icon.resource = Some(Resource::Static(parse_static_resource(reader, e)?))
                }
                b"IFrameResource" => {
                    icon.resource = Some(Resource::IFrame(read_text_element(reader)?))
                }
                b"HTMLResource" => {
                    icon.resource = Some(Resource::Html(parse_html_resource(reader, e)?))
                }
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"Icon" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(icon)
}

fn parse_icon_clicks(reader: &mut Reader<&[u8]>, icon: &mut Icon) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"IconClickThrough" => icon.click_through = Some(read_text_element(reader)?),
                b"IconClickTracking" => icon.click_trackings.push(read_text_element(reader)?),
                _ => skip_element(reader, e)?,
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"IconClicks" => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(())
}

/// Parse StaticResource element
fn parse_static_resource(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
) -> Result<StaticResource> {
    let mut creative_type = None;
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == b"creativeType" {
            creative_type = attr_string(&attr);
        }
    }
    Ok(StaticResource {
        creative_type,
        uri: read_text_element(reader)?,
    })
}

/// Parse HTMLResource element
fn parse_html_resource(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<HtmlResource> {
    let mut xml_encoded = false;
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() == b"xmlEncoded" {
            xml_encoded = attr_bool(&attr).unwrap_or(false);
        }
    }
    Ok(HtmlResource {
        xml_encoded,
        html: read_text_element(reader)?,
    })
}

/// Read the text content of an element, joining text and CDATA sections
fn read_text_element(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut text = String::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(e)) => text.push_str(&e.unescape()?),
            Ok(Event::CData(e)) => {
                if let Ok(value) = from_utf8(&e) {
                    text.push_str(value);
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => return Err(unexpected_eof()),
            Err(e) => return Err(VastError::XmlParseError(e)),
            _ => (),
        }
        buf.clear();
    }
    Ok(text)
}

/// Skip an element and all its children
fn skip_element(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<()> {
    let end = start.to_end().into_owned();
    reader.read_to_end(end.name())?;
    Ok(())
}

fn attr_string(attr: &Attribute) -> Option<String> {
    attr.unescape_value().ok().map(|v| v.into_owned())
}

fn attr_u32(attr: &Attribute) -> Option<u32> {
    attr.unescape_value()
        .ok()
        .and_then(|v| v.trim().parse().ok())
}

fn attr_bool(attr: &Attribute) -> Option<bool> {
    attr.unescape_value()
        .ok()
        .map(|v| v.eq_ignore_ascii_case("true"))
}

fn unexpected_eof() -> VastError {
    VastError::Other("Unexpected end of file".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::Duration;
    use crate::offset::Offset;

    #[test]
    fn parses_minimal_inline_linear() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <VAST version="2.0">
              <Ad id="601364">
                <InLine>
                  <AdSystem version="1.0"><![CDATA[Acudeo Compatible]]></AdSystem>
                  <AdTitle><![CDATA[VAST 2.0 Instream Test 1]]></AdTitle>
                  <Impression id="foo"><![CDATA[http://myTrackingURL/impression]]></Impression>
                  <Error><![CDATA[http://myErrorURL/error]]></Error>
                  <Creatives>
                    <Creative AdID="601364">
                      <Linear skipoffset="25%">
                        <Duration>00:00:30</Duration>
                        <TrackingEvents>
                          <Tracking event="start"><![CDATA[http://myTrackingURL/start]]></Tracking>
                        </TrackingEvents>
                        <VideoClicks>
                          <ClickThrough><![CDATA[http://www.tremormedia.com]]></ClickThrough>
                          <ClickTracking><![CDATA[http://myTrackingURL/click]]></ClickTracking>
                        </VideoClicks>
                        <MediaFiles>
                          <MediaFile delivery="progressive" type="video/x-flv" bitrate="500" width="400" height="300" scalable="true" maintainAspectRatio="true"><![CDATA[http://cdnp.tremormedia.com/video/Carrot.flv]]></MediaFile>
                        </MediaFiles>
                      </Linear>
                    </Creative>
                  </Creatives>
                </InLine>
              </Ad>
            </VAST>"#;

        let vast = parse_vast(xml).unwrap();
        assert_eq!(vast.version, "2.0");
        assert_eq!(vast.ads.len(), 1);

        let ad = &vast.ads[0];
        assert_eq!(ad.id.as_deref(), Some("601364"));
        assert_eq!(ad.sequence, None);

        let AdVariant::InLine(info) = &ad.body.variant else {
            panic!("expected an inline ad");
        };
        assert_eq!(info.ad_title, "VAST 2.0 Instream Test 1");
        let ad_system = ad.body.ad_system.as_ref().unwrap();
        assert_eq!(ad_system.name, "Acudeo Compatible");
        assert_eq!(ad_system.version.as_deref(), Some("1.0"));
        assert_eq!(ad.body.impressions.len(), 1);
        assert_eq!(ad.body.impressions[0].id.as_deref(), Some("foo"));
        assert_eq!(
            ad.body.impressions[0].uri,
            "http://myTrackingURL/impression"
        );
        assert_eq!(ad.body.errors, vec!["http://myErrorURL/error".to_string()]);

        assert_eq!(ad.body.creatives.len(), 1);
        let creative = &ad.body.creatives[0];
        assert_eq!(creative.ad_id.as_deref(), Some("601364"));
        let CreativeKind::Linear(linear) = &creative.kind else {
            panic!("expected a linear creative");
        };
        assert_eq!(linear.skip_offset, Some(Offset::Percent(0.25)));
        assert_eq!(linear.duration, Some(Duration::from_secs(30)));
        assert_eq!(linear.tracking_events.len(), 1);
        assert_eq!(linear.tracking_events[0].event, "start");
        assert_eq!(linear.tracking_events[0].uri, "http://myTrackingURL/start");

        let clicks = linear.video_clicks.as_ref().unwrap();
        assert_eq!(clicks.click_throughs[0].uri, "http://www.tremormedia.com");
        assert_eq!(clicks.click_trackings[0].uri, "http://myTrackingURL/click");

        assert_eq!(linear.media_files.len(), 1);
        let media = &linear.media_files[0];
        assert_eq!(media.delivery, "progressive");
        assert_eq!(media.mime_type, "video/x-flv");
        assert_eq!(media.bitrate, Some(500));
        assert_eq!(media.width, 400);
        assert_eq!(media.height, 300);
        assert!(media.scalable);
        assert!(media.maintain_aspect_ratio);
        assert_eq!(media.uri, "http://cdnp.tremormedia.com/video/Carrot.flv");
    }

    #[test]
    fn parses_wrapper_with_boolean_attributes() {
        let xml = r#"<VAST version="3.0">
              <Ad id="602833">
                <Wrapper fallbackOnNoAd="true" allowMultipleAds="false">
                  <AdSystem><![CDATA[Acudeo Compatible]]></AdSystem>
                  <VASTAdTagURI><![CDATA[http://demo.tremormedia.com/vast_inline_linear.xml]]></VASTAdTagURI>
                  <Impression><![CDATA[http://myTrackingURL/wrapper/impression]]></Impression>
                  <Creatives>
                    <Creative AdID="602833">
                      <Linear>
                        <TrackingEvents>
                          <Tracking event="creativeView"><![CDATA[http://myTrackingURL/wrapper/creativeView]]></Tracking>
                        </TrackingEvents>
                      </Linear>
                    </Creative>
                  </Creatives>
                </Wrapper>
              </Ad>
            </VAST>"#;

        let vast = parse_vast(xml).unwrap();
        let ad = &vast.ads[0];
        let AdVariant::Wrapper(info) = &ad.body.variant else {
            panic!("expected a wrapper ad");
        };
        assert_eq!(
            info.vast_ad_tag_uri,
            "http://demo.tremormedia.com/vast_inline_linear.xml"
        );
        assert_eq!(info.fallback_on_no_ad, Some(true));
        assert_eq!(info.allow_multiple_ads, Some(false));
        assert_eq!(info.follow_additional_wrappers, None);

        let CreativeKind::Linear(linear) = &ad.body.creatives[0].kind else {
            panic!("expected a linear creative");
        };
        assert_eq!(linear.duration, None);
        assert_eq!(linear.tracking_events.len(), 1);
    }

    #[test]
    fn strips_embedded_newlines_and_tabs() {
        let xml = "<VAST version=\"2.0\">\n\t<Ad\n id=\"1\">\n<InLine><AdSystem>sys</AdSystem><AdTitle>t</AdTitle>\n<Creatives></Creatives></InLine></Ad></VAST>";
        let vast = parse_vast(xml).unwrap();
        assert_eq!(vast.ads.len(), 1);
        assert_eq!(vast.ads[0].id.as_deref(), Some("1"));
    }

    #[test]
    fn missing_version_is_an_error() {
        let err = parse_vast("<VAST><Ad/></VAST>").unwrap_err();
        assert!(matches!(err, VastError::MissingField(_)));
    }

    #[test]
    fn ad_without_variant_is_an_error() {
        let err = parse_vast(r#"<VAST version="2.0"><Ad id="1"></Ad></VAST>"#).unwrap_err();
        assert!(matches!(err, VastError::MissingField(_)));
    }

    #[test]
    fn malformed_duration_propagates() {
        let xml = r#"<VAST version="2.0"><Ad><InLine><AdTitle>t</AdTitle><Creatives><Creative><Linear><Duration>00:00:60</Duration></Linear></Creative></Creatives></InLine></Ad></VAST>"#;
        let err = parse_vast(xml).unwrap_err();
        assert!(matches!(err, VastError::InvalidDuration(_)));
    }

    #[test]
    fn malformed_skip_offset_propagates() {
        let xml = r#"<VAST version="2.0"><Ad><InLine><AdTitle>t</AdTitle><Creatives><Creative><Linear skipoffset="abc%"><Duration>00:00:10</Duration></Linear></Creative></Creatives></InLine></Ad></VAST>"#;
        let err = parse_vast(xml).unwrap_err();
        assert!(matches!(err, VastError::InvalidOffset(_)));
    }

    #[test]
    fn document_level_errors_are_collected() {
        let xml = r#"<VAST version="3.0"><Error><![CDATA[http://no.ad/pixel]]></Error></VAST>"#;
        let vast = parse_vast(xml).unwrap();
        assert!(vast.ads.is_empty());
        assert_eq!(vast.errors, vec!["http://no.ad/pixel".to_string()]);
    }
}
