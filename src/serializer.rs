use std::io::{Cursor, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{Result, VastError};
use crate::extension::{self, Extension};
use crate::models::*;

/// Serialize a [`Vast`] tree to a single-line XML document with a standard
/// XML declaration.
///
/// Free-text leaves are wrapped in CDATA, wrapper booleans are emitted only
/// when explicitly set, and the inline/wrapper wire layouts are produced
/// from the unified tree here and nowhere else.
pub fn serialize_vast(vast: &Vast) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("VAST");
    root.push_attribute(("version", vast.version.as_str()));
    writer.write_event(Event::Start(root))?;

    for ad in &vast.ads {
        write_ad(&mut writer, ad)?;
    }
    for error in &vast.errors {
        write_cdata_element(&mut writer, "Error", error)?;
    }

    writer.write_event(Event::End(BytesEnd::new("VAST")))?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| VastError::Other(format!("invalid UTF-8: {e}")))
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn write_ad(writer: &mut XmlWriter, ad: &Ad) -> Result<()> {
    let mut start = BytesStart::new("Ad");
    if let Some(id) = &ad.id {
        start.push_attribute(("id", id.as_str()));
    }
    if let Some(sequence) = ad.sequence {
        start.push_attribute(("sequence", sequence.to_string().as_str()));
    }
    writer.write_event(Event::Start(start))?;

    match &ad.body.variant {
        AdVariant::InLine(info) => write_inline(writer, &ad.body, info)?,
        AdVariant::Wrapper(info) => write_wrapper(writer, &ad.body, info)?,
    }

    writer.write_event(Event::End(BytesEnd::new("Ad")))?;
    Ok(())
}

fn write_inline(writer: &mut XmlWriter, body: &AdBody, info: &InLineInfo) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("InLine")))?;

    if let Some(ad_system) = &body.ad_system {
        write_ad_system(writer, ad_system)?;
    }
    write_cdata_element(writer, "AdTitle", &info.ad_title)?;
    if let Some(description) = &info.description {
        write_cdata_element(writer, "Description", description)?;
    }
    if let Some(advertiser) = &info.advertiser {
        write_text_element(writer, "Advertiser", advertiser)?;
    }
    if let Some(survey) = &info.survey {
        write_cdata_element(writer, "Survey", survey)?;
    }
    for impression in &body.impressions {
        write_impression(writer, impression)?;
    }
    for error in &body.errors {
        write_cdata_element(writer, "Error", error)?;
    }
    if let Some(pricing) = &info.pricing {
        let mut start = BytesStart::new("Pricing");
        start.push_attribute(("model", pricing.model.as_str()));
        start.push_attribute(("currency", pricing.currency.as_str()));
        writer.write_event(Event::Start(start))?;
        writer.write_event(Event::CData(BytesCData::new(pricing.value.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new("Pricing")))?;
    }
    write_verifications(writer, &body.verifications)?;
    write_creatives(writer, &body.creatives, true)?;
    write_extension_list(writer, &body.extensions)?;

    writer.write_event(Event::End(BytesEnd::new("InLine")))?;
    Ok(())
}

fn write_wrapper(writer: &mut XmlWriter, body: &AdBody, info: &WrapperInfo) -> Result<()> {
    let mut start = BytesStart::new("Wrapper");
    if let Some(fallback) = info.fallback_on_no_ad {
        start.push_attribute(("fallbackOnNoAd", bool_attr(fallback)));
    }
    if let Some(allow) = info.allow_multiple_ads {
        start.push_attribute(("allowMultipleAds", bool_attr(allow)));
    }
    if let Some(follow) = info.follow_additional_wrappers {
        start.push_attribute(("followAdditionalWrappers", bool_attr(follow)));
    }
    writer.write_event(Event::Start(start))?;

    if let Some(ad_system) = &body.ad_system {
        write_ad_system(writer, ad_system)?;
    }
    write_cdata_element(writer, "VASTAdTagURI", &info.vast_ad_tag_uri)?;
    for impression in &body.impressions {
        write_impression(writer, impression)?;
    }
    for error in &body.errors {
        write_cdata_element(writer, "Error", error)?;
    }
    write_verifications(writer, &body.verifications)?;
    write_creatives(writer, &body.creatives, false)?;
    write_extension_list(writer, &body.extensions)?;

    writer.write_event(Event::End(BytesEnd::new("Wrapper")))?;
    Ok(())
}

fn write_ad_system(writer: &mut XmlWriter, ad_system: &AdSystem) -> Result<()> {
    let mut start = BytesStart::new("AdSystem");
    if let Some(version) = &ad_system.version {
        start.push_attribute(("version", version.as_str()));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::CData(BytesCData::new(ad_system.name.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new("AdSystem")))?;
    Ok(())
}

fn write_impression(writer: &mut XmlWriter, impression: &Impression) -> Result<()> {
    let mut start = BytesStart::new("Impression");
    if let Some(id) = &impression.id {
        start.push_attribute(("id", id.as_str()));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::CData(BytesCData::new(impression.uri.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new("Impression")))?;
    Ok(())
}

fn write_verifications(writer: &mut XmlWriter, verifications: &[Verification]) -> Result<()> {
    if verifications.is_empty() {
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new("AdVerifications")))?;
    for verification in verifications {
        let mut start = BytesStart::new("Verification");
        if let Some(vendor) = &verification.vendor {
            start.push_attribute(("vendor", vendor.as_str()));
        }
        writer.write_event(Event::Start(start))?;
        if let Some(resource) = &verification.js_resource {
            let mut start = BytesStart::new("JavaScriptResource");
            if let Some(api_framework) = &resource.api_framework {
                start.push_attribute(("apiFramework", api_framework.as_str()));
            }
            if resource.browser_optional {
                start.push_attribute(("browserOptional", "true"));
            }
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::CData(BytesCData::new(resource.uri.as_str())))?;
            writer.write_event(Event::End(BytesEnd::new("JavaScriptResource")))?;
        }
        if let Some(resource) = &verification.executable_resource {
            let mut start = BytesStart::new("ExecutableResource");
            if let Some(api_framework) = &resource.api_framework {
                start.push_attribute(("apiFramework", api_framework.as_str()));
            }
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::CData(BytesCData::new(resource.uri.as_str())))?;
            writer.write_event(Event::End(BytesEnd::new("ExecutableResource")))?;
        }
        write_tracking_events(writer, &verification.tracking_events)?;
        if let Some(parameters) = &verification.parameters {
            write_cdata_element(writer, "VerificationParameters", parameters)?;
        }
        writer.write_event(Event::End(BytesEnd::new("Verification")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("AdVerifications")))?;
    Ok(())
}

fn write_creatives(writer: &mut XmlWriter, creatives: &[Creative], inline: bool) -> Result<()> {
    if creatives.is_empty() {
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new("Creatives")))?;
    for creative in creatives {
        write_creative(writer, creative, inline)?;
    }
    writer.write_event(Event::End(BytesEnd::new("Creatives")))?;
    Ok(())
}

fn write_creative(writer: &mut XmlWriter, creative: &Creative, inline: bool) -> Result<()> {
    let mut start = BytesStart::new("Creative");
    if let Some(id) = &creative.id {
        start.push_attribute(("id", id.as_str()));
    }
    if let Some(sequence) = creative.sequence {
        start.push_attribute(("sequence", sequence.to_string().as_str()));
    }
    if let Some(ad_id) = &creative.ad_id {
        start.push_attribute(("AdID", ad_id.as_str()));
    }
    if inline {
        if let Some(api_framework) = &creative.api_framework {
            start.push_attribute(("apiFramework", api_framework.as_str()));
        }
    }
    writer.write_event(Event::Start(start))?;

    if inline {
        if let Some(universal_ad_id) = &creative.universal_ad_id {
            let mut start = BytesStart::new("UniversalAdId");
            if let Some(id_registry) = &universal_ad_id.id_registry {
                start.push_attribute(("idRegistry", id_registry.as_str()));
            }
            if let Some(id_value) = &universal_ad_id.id_value {
                start.push_attribute(("idValue", id_value.as_str()));
            }
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::CData(BytesCData::new(universal_ad_id.id.as_str())))?;
            writer.write_event(Event::End(BytesEnd::new("UniversalAdId")))?;
        }
    }

    match &creative.kind {
        CreativeKind::Linear(linear) => write_linear(writer, linear, inline)?,
        CreativeKind::CompanionAds(companion_ads) => {
            write_companion_ads(writer, companion_ads, inline)?
        }
        CreativeKind::NonLinearAds(non_linear_ads) => {
            write_non_linear_ads(writer, non_linear_ads, inline)?
        }
    }

    if inline {
        if let Some(extensions) = &creative.creative_extensions {
            writer.write_event(Event::Start(BytesStart::new("CreativeExtensions")))?;
            for ext in extensions {
                extension::write_extension(writer, "CreativeExtension", ext)?;
            }
            writer.write_event(Event::End(BytesEnd::new("CreativeExtensions")))?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("Creative")))?;
    Ok(())
}

fn write_linear(writer: &mut XmlWriter, linear: &Linear, inline: bool) -> Result<()> {
    let mut start = BytesStart::new("Linear");
    if inline {
        if let Some(skip_offset) = &linear.skip_offset {
            start.push_attribute(("skipoffset", skip_offset.to_string().as_str()));
        }
    }
    writer.write_event(Event::Start(start))?;

    if inline {
        if let Some(duration) = &linear.duration {
            write_text_element(writer, "Duration", &duration.to_string())?;
        }
        if let Some(ad_parameters) = &linear.ad_parameters {
            write_ad_parameters(writer, ad_parameters)?;
        }
    }
    write_icons(writer, &linear.icons)?;
    write_tracking_events(writer, &linear.tracking_events)?;
    if let Some(video_clicks) = &linear.video_clicks {
        write_video_clicks(writer, video_clicks)?;
    }
    if inline && !linear.media_files.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("MediaFiles")))?;
        for media_file in &linear.media_files {
            write_media_file(writer, media_file)?;
        }
        writer.write_event(Event::End(BytesEnd::new("MediaFiles")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Linear")))?;
    Ok(())
}

fn write_ad_parameters(writer: &mut XmlWriter, ad_parameters: &AdParameters) -> Result<()> {
    let mut start = BytesStart::new("AdParameters");
    if ad_parameters.xml_encoded {
        start.push_attribute(("xmlEncoded", "true"));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::CData(BytesCData::new(
        ad_parameters.parameters.as_str(),
    )))?;
    writer.write_event(Event::End(BytesEnd::new("AdParameters")))?;
    Ok(())
}

/// Write a TrackingEvents block; nothing is emitted for an empty list
fn write_tracking_events(writer: &mut XmlWriter, tracking_events: &[Tracking]) -> Result<()> {
    if tracking_events.is_empty() {
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new("TrackingEvents")))?;
    for tracking in tracking_events {
        write_tracking(writer, "Tracking", tracking)?;
    }
    writer.write_event(Event::End(BytesEnd::new("TrackingEvents")))?;
    Ok(())
}

/// Write a single tracking event under the given tag name
pub(crate) fn write_tracking<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    tracking: &Tracking,
) -> Result<()> {
    let mut start = BytesStart::new(tag);
    start.push_attribute(("event", tracking.event.as_str()));
    if let Some(offset) = &tracking.offset {
        start.push_attribute(("offset", offset.to_string().as_str()));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::CData(BytesCData::new(tracking.uri.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_video_clicks(writer: &mut XmlWriter, video_clicks: &VideoClicks) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("VideoClicks")))?;
    for click in &video_clicks.click_throughs {
        write_video_click(writer, "ClickThrough", click)?;
    }
    for click in &video_clicks.click_trackings {
        write_video_click(writer, "ClickTracking", click)?;
    }
    for click in &video_clicks.custom_clicks {
        write_video_click(writer, "CustomClick", click)?;
    }
    writer.write_event(Event::End(BytesEnd::new("VideoClicks")))?;
    Ok(())
}

fn write_video_click(writer: &mut XmlWriter, tag: &str, click: &VideoClick) -> Result<()> {
    let mut start = BytesStart::new(tag);
    if let Some(id) = &click.id {
        start.push_attribute(("id", id.as_str()));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::CData(BytesCData::new(click.uri.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_media_file(writer: &mut XmlWriter, media_file: &MediaFile) -> Result<()> {
    let mut start = BytesStart::new("MediaFile");
    if let Some(id) = &media_file.id {
        start.push_attribute(("id", id.as_str()));
    }
    start.push_attribute(("delivery", media_file.delivery.as_str()));
    start.push_attribute(("type", media_file.mime_type.as_str()));
    if let Some(codec) = &media_file.codec {
        start.push_attribute(("codec", codec.as_str()));
    }
    if let Some(bitrate) = media_file.bitrate {
        start.push_attribute(("bitrate", bitrate.to_string().as_str()));
    }
    if let Some(min_bitrate) = media_file.min_bitrate {
        start.push_attribute(("minBitrate", min_bitrate.to_string().as_str()));
    }
    if let Some(max_bitrate) = media_file.max_bitrate {
        start.push_attribute(("maxBitrate", max_bitrate.to_string().as_str()));
    }
    start.push_attribute(("width", media_file.width.to_string().as_str()));
    start.push_attribute(("height", media_file.height.to_string().as_str()));
    if media_file.scalable {
        start.push_attribute(("scalable", "true"));
    }
    if media_file.maintain_aspect_ratio {
        start.push_attribute(("maintainAspectRatio", "true"));
    }
    if let Some(api_framework) = &media_file.api_framework {
        start.push_attribute(("apiFramework", api_framework.as_str()));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::CData(BytesCData::new(media_file.uri.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new("MediaFile")))?;
    Ok(())
}

fn write_companion_ads(
    writer: &mut XmlWriter,
    companion_ads: &CompanionAds,
    inline: bool,
) -> Result<()> {
    let mut start = BytesStart::new("CompanionAds");
    if let Some(required) = companion_ads.required {
        start.push_attribute(("required", required.as_str()));
    }
    writer.write_event(Event::Start(start))?;
    for companion in &companion_ads.companions {
        write_companion(writer, companion, inline)?;
    }
    writer.write_event(Event::End(BytesEnd::new("CompanionAds")))?;
    Ok(())
}

fn write_companion(writer: &mut XmlWriter, companion: &Companion, inline: bool) -> Result<()> {
    let mut start = BytesStart::new("Companion");
    if let Some(id) = &companion.id {
        start.push_attribute(("id", id.as_str()));
    }
    start.push_attribute(("width", companion.width.to_string().as_str()));
    start.push_attribute(("height", companion.height.to_string().as_str()));
    if let Some(asset_width) = companion.asset_width {
        start.push_attribute(("assetWidth", asset_width.to_string().as_str()));
    }
    if let Some(asset_height) = companion.asset_height {
        start.push_attribute(("assetHeight", asset_height.to_string().as_str()));
    }
    if let Some(expanded_width) = companion.expanded_width {
        start.push_attribute(("expandedWidth", expanded_width.to_string().as_str()));
    }
    if let Some(expanded_height) = companion.expanded_height {
        start.push_attribute(("expandedHeight", expanded_height.to_string().as_str()));
    }
    if let Some(api_framework) = &companion.api_framework {
        start.push_attribute(("apiFramework", api_framework.as_str()));
    }
    if let Some(ad_slot_id) = &companion.ad_slot_id {
        start.push_attribute(("adSlotId", ad_slot_id.as_str()));
    }
    writer.write_event(Event::Start(start))?;

    if let Some(click_through) = &companion.click_through {
        write_cdata_element(writer, "CompanionClickThrough", click_through)?;
    }
    for click in &companion.click_trackings {
        if inline {
            // Inline companions keep the id attribute on each entry
            write_video_click(writer, "CompanionClickTracking", click)?;
        } else {
            // The wrapper layout flattens entries to bare URI strings
            write_cdata_element(writer, "CompanionClickTracking", &click.uri)?;
        }
    }
    if let Some(alt_text) = &companion.alt_text {
        write_text_element(writer, "AltText", alt_text)?;
    }
    write_tracking_events(writer, &companion.tracking_events)?;
    if let Some(ad_parameters) = &companion.ad_parameters {
        write_ad_parameters(writer, ad_parameters)?;
    }
    write_resource(writer, &companion.resource)?;

    writer.write_event(Event::End(BytesEnd::new("Companion")))?;
    Ok(())
}

fn write_non_linear_ads(
    writer: &mut XmlWriter,
    non_linear_ads: &NonLinearAds,
    inline: bool,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("NonLinearAds")))?;
    write_tracking_events(writer, &non_linear_ads.tracking_events)?;
    for non_linear in &non_linear_ads.non_linears {
        write_non_linear(writer, non_linear, inline)?;
    }
    writer.write_event(Event::End(BytesEnd::new("NonLinearAds")))?;
    Ok(())
}

fn write_non_linear(writer: &mut XmlWriter, non_linear: &NonLinear, inline: bool) -> Result<()> {
    let mut start = BytesStart::new("NonLinear");
    if let Some(id) = &non_linear.id {
        start.push_attribute(("id", id.as_str()));
    }
    start.push_attribute(("width", non_linear.width.to_string().as_str()));
    start.push_attribute(("height", non_linear.height.to_string().as_str()));
    if let Some(expanded_width) = non_linear.expanded_width {
        start.push_attribute(("expandedWidth", expanded_width.to_string().as_str()));
    }
    if let Some(expanded_height) = non_linear.expanded_height {
        start.push_attribute(("expandedHeight", expanded_height.to_string().as_str()));
    }
    if non_linear.scalable {
        start.push_attribute(("scalable", "true"));
    }
    if non_linear.maintain_aspect_ratio {
        start.push_attribute(("maintainAspectRatio", "true"));
    }
    if let Some(duration) = &non_linear.min_suggested_duration {
        start.push_attribute(("minSuggestedDuration", duration.to_string().as_str()));
    }
    if let Some(api_framework) = &non_linear.api_framework {
        start.push_attribute(("apiFramework", api_framework.as_str()));
    }
    writer.write_event(Event::Start(start))?;

    for click_tracking in &non_linear.click_trackings {
        write_cdata_element(writer, "NonLinearClickTracking", click_tracking)?;
    }
    if inline {
        if let Some(click_through) = &non_linear.click_through {
            write_cdata_element(writer, "NonLinearClickThrough", click_through)?;
        }
        if let Some(ad_parameters) = &non_linear.ad_parameters {
            write_ad_parameters(writer, ad_parameters)?;
        }
        write_resource(writer, &non_linear.resource)?;
    } else {
        write_tracking_events(writer, &non_linear.tracking_events)?;
    }

    writer.write_event(Event::End(BytesEnd::new("NonLinear")))?;
    Ok(())
}

fn write_icons(writer: &mut XmlWriter, icons: &[Icon]) -> Result<()> {
    if icons.is_empty() {
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new("Icons")))?;
    for icon in icons {
        let mut start = BytesStart::new("Icon");
        if let Some(program) = &icon.program {
            start.push_attribute(("program", program.as_str()));
        }
        start.push_attribute(("width", icon.width.to_string().as_str()));
        start.push_attribute(("height", icon.height.to_string().as_str()));
        start.push_attribute(("xPosition", icon.x_position.as_str()));
        start.push_attribute(("yPosition", icon.y_position.as_str()));
        if let Some(offset) = &icon.offset {
            start.push_attribute(("offset", offset.to_string().as_str()));
        }
        if let Some(duration) = &icon.duration {
            start.push_attribute(("duration", duration.to_string().as_str()));
        }
        if let Some(api_framework) = &icon.api_framework {
            start.push_attribute(("apiFramework", api_framework.as_str()));
        }
        writer.write_event(Event::Start(start))?;

        if icon.click_through.is_some() || !icon.click_trackings.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("IconClicks")))?;
            if let Some(click_through) = &icon.click_through {
                write_cdata_element(writer, "IconClickThrough", click_through)?;
            }
            for click_tracking in &icon.click_trackings {
                write_cdata_element(writer, "IconClickTracking", click_tracking)?;
            }
            writer.write_event(Event::End(BytesEnd::new("IconClicks")))?;
        }
        write_resource(writer, &icon.resource)?;

        writer.write_event(Event::End(BytesEnd::new("Icon")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Icons")))?;
    Ok(())
}

fn write_resource(writer: &mut XmlWriter, resource: &Option<Resource>) -> Result<()> {
    match resource {
        Some(Resource::Static(static_resource)) => {
            let mut start = BytesStart::new("StaticResource");
            if let Some(creative_type) = &static_resource.creative_type {
                start.push_attribute(("creativeType", creative_type.as_str()));
            }
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::CData(BytesCData::new(static_resource.uri.as_str())))?;
            writer.write_event(Event::End(BytesEnd::new("StaticResource")))?;
        }
        Some(Resource::IFrame(uri)) => write_cdata_element(writer, "IFrameResource", uri)?,
        Some(Resource::Html(html_resource)) => {
            let mut start = BytesStart::new("HTMLResource");
            if html_resource.xml_encoded {
                start.push_attribute(("xmlEncoded", "true"));
            }
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::CData(BytesCData::new(html_resource.html.as_str())))?;
            writer.write_event(Event::End(BytesEnd::new("HTMLResource")))?;
        }
        None => (),
    }
    Ok(())
}

fn write_extension_list(writer: &mut XmlWriter, extensions: &Option<Vec<Extension>>) -> Result<()> {
    // A present-but-empty container still round-trips as an element
    let Some(extensions) = extensions else {
        return Ok(());
    };
    writer.write_event(Event::Start(BytesStart::new("Extensions")))?;
    for ext in extensions {
        extension::write_extension(writer, "Extension", ext)?;
    }
    writer.write_event(Event::End(BytesEnd::new("Extensions")))?;
    Ok(())
}

fn bool_attr(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn write_cdata_element(writer: &mut XmlWriter, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::CData(BytesCData::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_text_element(writer: &mut XmlWriter, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::Duration;
    use crate::parser::parse_vast;

    fn minimal_vast() -> Vast {
        Vast {
            version: "2.0".to_string(),
            ads: vec![Ad {
                id: Some("1".to_string()),
                sequence: None,
                body: AdBody {
                    ad_system: Some(AdSystem {
                        name: "test".to_string(),
                        version: None,
                    }),
                    impressions: vec![Impression {
                        id: None,
                        uri: "http://imp.example/pixel".to_string(),
                    }],
                    errors: Vec::new(),
                    creatives: vec![Creative::new(CreativeKind::Linear(Linear {
                        duration: Some(Duration::from_secs(30)),
                        ..Linear::default()
                    }))],
                    extensions: None,
                    verifications: Vec::new(),
                    variant: AdVariant::InLine(InLineInfo {
                        ad_title: "title".to_string(),
                        ..InLineInfo::default()
                    }),
                },
            }],
            errors: Vec::new(),
        }
    }

    #[test]
    fn output_is_single_line_with_declaration() {
        let xml = serialize_vast(&minimal_vast()).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(!xml.contains('\n'));
        assert!(!xml.contains('\t'));
    }

    #[test]
    fn free_text_leaves_are_cdata_wrapped() {
        let xml = serialize_vast(&minimal_vast()).unwrap();
        assert!(xml.contains("<AdTitle><![CDATA[title]]></AdTitle>"));
        assert!(xml.contains("<Impression><![CDATA[http://imp.example/pixel]]></Impression>"));
        assert!(xml.contains("<Duration>00:00:30</Duration>"));
    }

    #[test]
    fn wrapper_booleans_are_emitted_only_when_set() {
        let mut vast = minimal_vast();
        vast.ads[0].body.variant = AdVariant::Wrapper(WrapperInfo {
            vast_ad_tag_uri: "http://next.example/vast".to_string(),
            fallback_on_no_ad: Some(false),
            allow_multiple_ads: None,
            follow_additional_wrappers: None,
        });
        let xml = serialize_vast(&vast).unwrap();
        assert!(xml.contains(r#"fallbackOnNoAd="false""#));
        assert!(!xml.contains("allowMultipleAds"));
        assert!(!xml.contains("followAdditionalWrappers"));
        assert!(
            xml.contains("<VASTAdTagURI><![CDATA[http://next.example/vast]]></VASTAdTagURI>")
        );
    }

    #[test]
    fn wrapper_layout_omits_inline_only_fields() {
        let mut vast = minimal_vast();
        vast.ads[0].body.variant = AdVariant::Wrapper(WrapperInfo {
            vast_ad_tag_uri: "http://next.example/vast".to_string(),
            ..WrapperInfo::default()
        });
        let xml = serialize_vast(&vast).unwrap();
        assert!(!xml.contains("AdTitle"));
        assert!(!xml.contains("Duration"));
    }

    #[test]
    fn companion_click_tracking_flattens_for_wrappers() {
        let companion = Companion {
            width: 300,
            height: 250,
            click_trackings: vec![VideoClick {
                id: Some("ct1".to_string()),
                uri: "http://click.example/1".to_string(),
            }],
            ..Companion::default()
        };

        let mut inline_vast = minimal_vast();
        inline_vast.ads[0].body.creatives =
            vec![Creative::new(CreativeKind::CompanionAds(CompanionAds {
                required: None,
                companions: vec![companion.clone()],
            }))];
        let xml = serialize_vast(&inline_vast).unwrap();
        assert!(xml.contains(
            r#"<CompanionClickTracking id="ct1"><![CDATA[http://click.example/1]]></CompanionClickTracking>"#
        ));

        let mut wrapper_vast = inline_vast.clone();
        wrapper_vast.ads[0].body.variant = AdVariant::Wrapper(WrapperInfo {
            vast_ad_tag_uri: "http://next.example/vast".to_string(),
            ..WrapperInfo::default()
        });
        let xml = serialize_vast(&wrapper_vast).unwrap();
        assert!(xml.contains(
            "<CompanionClickTracking><![CDATA[http://click.example/1]]></CompanionClickTracking>"
        ));
        assert!(!xml.contains(r#"id="ct1""#));
    }

    #[test]
    fn serialized_document_reparses_equivalently() {
        let vast = minimal_vast();
        let xml = serialize_vast(&vast).unwrap();
        let reparsed = parse_vast(&xml).unwrap();
        assert_eq!(reparsed, vast);
    }
}
