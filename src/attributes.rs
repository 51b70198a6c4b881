//! Projection of a sanitized activity record into the flat attribute
//! schema expected by the target feature layer.
//!
//! Every base key is always emitted — absent source data becomes an empty
//! string or a JSON null, never a missing key. The location-variant
//! supplemental keys are the only conditional ones.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::location::{LocationSource, ResolvedLocation};

/// The fixed-shape attribute record for one normalized activity.
///
/// Field names serialize to the exact case-sensitive keys of the layer
/// schema. Numeric, boolean and date fields are `Option` so that missing
/// or unparseable input surfaces as a JSON null instead of a thrown error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attributes {
    pub activity_id: String,
    pub body: String,
    pub verb: String,
    #[serde(rename = "postedTime")]
    pub posted_time: Option<DateTime<Utc>>,
    pub link: String,
    #[serde(rename = "retweetCount")]
    pub retweet_count: Option<i64>,
    #[serde(rename = "favoritesCount")]
    pub favorites_count: Option<i64>,

    pub actor_id: String,
    pub actor_type: String,
    pub actor_link: String,
    #[serde(rename = "actor_displayName")]
    pub actor_display_name: String,
    pub actor_image: String,
    pub actor_summary: String,
    #[serde(rename = "actor_postedTime")]
    pub actor_posted_time: Option<DateTime<Utc>>,
    #[serde(rename = "actor_friendsCount")]
    pub actor_friends_count: Option<i64>,
    #[serde(rename = "actor_followsCount")]
    pub actor_follows_count: Option<i64>,
    #[serde(rename = "actor_listedCount")]
    pub actor_listed_count: Option<i64>,
    #[serde(rename = "actor_statusesCount")]
    pub actor_statuses_count: Option<i64>,
    #[serde(rename = "actor_favoritesCount")]
    pub actor_favorites_count: Option<i64>,
    pub actor_timezone: String,
    #[serde(rename = "actor_utcOffset")]
    pub actor_utc_offset: Option<i64>,
    pub actor_verified: Option<bool>,
    #[serde(rename = "actor_preferredUsername")]
    pub actor_preferred_username: String,
    pub actor_languages: String,
    pub actor_location_type: String,
    #[serde(rename = "actor_location_displayName")]
    pub actor_location_display_name: String,

    #[serde(rename = "generator_displayName")]
    pub generator_display_name: String,
    pub generator_link: String,
    pub provider_type: String,
    #[serde(rename = "provider_displayName")]
    pub provider_display_name: String,
    pub provider_link: String,

    pub object_type: String,
    pub object_id: String,
    pub object_summary: String,
    pub object_link: String,
    #[serde(rename = "object_postedTime")]
    pub object_posted_time: Option<DateTime<Utc>>,

    // Schema placeholders: the payloads this tool ingests carry no entity
    // annotations, but the layer schema expects the columns.
    pub twitter_hashtags: String,
    pub twitter_symbols: String,
    pub twitter_urls: String,
    #[serde(rename = "twitter_userMentions")]
    pub twitter_user_mentions: String,
    pub twitter_filter_level: String,
    pub twitter_language: String,

    pub gnip_klout_score: Option<f64>,
    pub gnip_language: String,

    // Supplemental keys, present only when a location variant resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_source: Option<String>,
    #[serde(rename = "loc_displayName", skip_serializing_if = "Option::is_none")]
    pub loc_display_name: Option<String>,
    #[serde(rename = "loc_name", skip_serializing_if = "Option::is_none")]
    pub loc_name: Option<String>,
    #[serde(rename = "loc_country", skip_serializing_if = "Option::is_none")]
    pub loc_country: Option<String>,
    #[serde(rename = "loc_countryCode", skip_serializing_if = "Option::is_none")]
    pub loc_country_code: Option<String>,
    #[serde(rename = "gnip_profileLoc_displayName", skip_serializing_if = "Option::is_none")]
    pub profile_loc_display_name: Option<String>,
    #[serde(rename = "gnip_profileLoc_name", skip_serializing_if = "Option::is_none")]
    pub profile_loc_name: Option<String>,
    #[serde(rename = "gnip_profileLoc_adr_country", skip_serializing_if = "Option::is_none")]
    pub profile_loc_country: Option<String>,
    #[serde(rename = "gnip_profileLoc_adr_countryCode", skip_serializing_if = "Option::is_none")]
    pub profile_loc_country_code: Option<String>,
    #[serde(rename = "gnip_profileLoc_adr_locality", skip_serializing_if = "Option::is_none")]
    pub profile_loc_locality: Option<String>,
    #[serde(rename = "gnip_profileLoc_adr_region", skip_serializing_if = "Option::is_none")]
    pub profile_loc_region: Option<String>,
    #[serde(rename = "gnip_profileLoc_adr_subRegion", skip_serializing_if = "Option::is_none")]
    pub profile_loc_sub_region: Option<String>,
}

/// Maps a sanitized record, plus the resolver's outcome, into the flat
/// attribute schema.
///
/// # Errors
///
/// Returns an error when one of the required sub-documents (`actor`,
/// `generator`, `provider`, `object`, `gnip`) is missing or not an object.
/// Missing scalar fields never fail — they degrade to empty values.
pub fn map_attributes(record: &Value, location: Option<&ResolvedLocation>) -> Result<Attributes> {
    let actor = require_object(record, "actor")?;
    let generator = require_object(record, "generator")?;
    let provider = require_object(record, "provider")?;
    let object = require_object(record, "object")?;
    let gnip = require_object(record, "gnip")?;

    let mut attributes = Attributes {
        activity_id: text(record, "id"),
        body: text(record, "body"),
        verb: text(record, "verb"),
        posted_time: time(record, "postedTime"),
        link: text(record, "link"),
        retweet_count: count(record, "retweetCount"),
        favorites_count: count(record, "favoritesCount"),

        actor_id: text(actor, "id"),
        actor_type: text(actor, "objectType"),
        actor_link: text(actor, "link"),
        actor_display_name: text(actor, "displayName"),
        actor_image: text(actor, "image"),
        actor_summary: text(actor, "summary"),
        actor_posted_time: time(actor, "postedTime"),
        actor_friends_count: count(actor, "friendsCount"),
        actor_follows_count: count(actor, "followersCount"),
        actor_listed_count: count(actor, "listedCount"),
        actor_statuses_count: count(actor, "statusesCount"),
        actor_favorites_count: count(actor, "favoritesCount"),
        actor_timezone: text(actor, "twitterTimeZone"),
        actor_utc_offset: utc_offset(actor),
        actor_verified: actor.get("verified").and_then(Value::as_bool),
        actor_preferred_username: text(actor, "preferredUsername"),
        actor_languages: languages(actor),
        actor_location_type: text(&actor["location"], "objectType"),
        actor_location_display_name: text(&actor["location"], "displayName"),

        generator_display_name: text(generator, "displayName"),
        generator_link: text(generator, "link"),
        provider_type: text(provider, "objectType"),
        provider_display_name: text(provider, "displayName"),
        provider_link: text(provider, "link"),

        object_type: text(object, "objectType"),
        object_id: text(object, "id"),
        object_summary: text(object, "summary"),
        object_link: text(object, "link"),
        object_posted_time: time(object, "postedTime"),

        twitter_hashtags: String::new(),
        twitter_symbols: String::new(),
        twitter_urls: String::new(),
        twitter_user_mentions: String::new(),
        twitter_filter_level: text(record, "twitter_filter_level"),
        twitter_language: text(record, "twitter_lang"),

        gnip_klout_score: gnip.get("klout_score").and_then(Value::as_f64),
        gnip_language: text(&gnip["language"], "value"),

        location_source: None,
        loc_display_name: None,
        loc_name: None,
        loc_country: None,
        loc_country_code: None,
        profile_loc_display_name: None,
        profile_loc_name: None,
        profile_loc_country: None,
        profile_loc_country_code: None,
        profile_loc_locality: None,
        profile_loc_region: None,
        profile_loc_sub_region: None,
    };

    if let Some(location) = location {
        merge_location_attributes(&mut attributes, record, location);
    }

    Ok(attributes)
}

/// Merges the variant-specific supplemental fields into the base record.
fn merge_location_attributes(
    attributes: &mut Attributes,
    record: &Value,
    location: &ResolvedLocation,
) {
    attributes.location_source = Some(location.source.as_str().to_string());

    match location.source {
        // A direct geotag carries no descriptive place fields.
        LocationSource::PointGeo => {}
        LocationSource::BoundingBox => {
            let place = &record["location"];
            attributes.loc_display_name = Some(text(place, "displayName"));
            attributes.loc_name = Some(text(place, "name"));
            // Upstream quirk: `country_code` holds the country name and
            // `twitter_country_code` the ISO code.
            attributes.loc_country = Some(text(place, "country_code"));
            attributes.loc_country_code = Some(text(place, "twitter_country_code"));
        }
        LocationSource::ProfileLocation => {
            let profile = &record["gnip"]["profileLocations"][0];
            let address = &profile["address"];
            attributes.profile_loc_display_name = Some(text(profile, "displayName"));
            attributes.profile_loc_name = Some(text(profile, "name"));
            attributes.profile_loc_country = Some(text(address, "country"));
            attributes.profile_loc_country_code = Some(text(address, "countryCode"));
            attributes.profile_loc_locality = Some(text(address, "locality"));
            attributes.profile_loc_region = Some(text(address, "region"));
            attributes.profile_loc_sub_region = Some(text(address, "subRegion"));
        }
    }
}

fn require_object<'a>(record: &'a Value, key: &str) -> Result<&'a Value> {
    record
        .get(key)
        .filter(|v| v.is_object())
        .with_context(|| format!("record is missing the `{key}` sub-document"))
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn count(value: &Value, key: &str) -> Option<i64> {
    value.get(key).and_then(Value::as_i64)
}

fn time(value: &Value, key: &str) -> Option<DateTime<Utc>> {
    value
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

/// `utcOffset` arrives as a string of seconds ("-18000") in most payloads
/// but as a bare number in some. Anything else is reported as null.
fn utc_offset(actor: &Value) -> Option<i64> {
    match actor.get("utcOffset") {
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(Value::Number(n)) => n.as_i64(),
        _ => None,
    }
}

/// The actor's language sequence, flattened to one comma-joined value.
fn languages(actor: &Value) -> String {
    actor
        .get("languages")
        .and_then(Value::as_array)
        .map(|langs| {
            langs
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// The keys that must be present for every transformable record.
    const BASE_KEYS: &[&str] = &[
        "activity_id",
        "body",
        "verb",
        "postedTime",
        "link",
        "retweetCount",
        "favoritesCount",
        "actor_id",
        "actor_type",
        "actor_link",
        "actor_displayName",
        "actor_image",
        "actor_summary",
        "actor_postedTime",
        "actor_friendsCount",
        "actor_followsCount",
        "actor_listedCount",
        "actor_statusesCount",
        "actor_favoritesCount",
        "actor_timezone",
        "actor_utcOffset",
        "actor_verified",
        "actor_preferredUsername",
        "actor_languages",
        "actor_location_type",
        "actor_location_displayName",
        "generator_displayName",
        "generator_link",
        "provider_type",
        "provider_displayName",
        "provider_link",
        "object_type",
        "object_id",
        "object_summary",
        "object_link",
        "object_postedTime",
        "twitter_hashtags",
        "twitter_symbols",
        "twitter_urls",
        "twitter_userMentions",
        "twitter_filter_level",
        "twitter_language",
        "gnip_klout_score",
        "gnip_language",
    ];

    fn minimal_record() -> Value {
        let mut record = json!({
            "actor": {},
            "generator": {},
            "provider": {},
            "object": {},
            "gnip": {}
        });
        crate::sanitize::sanitize_record(&mut record);
        record
    }

    #[test]
    fn test_every_base_key_is_always_present() {
        let attributes = map_attributes(&minimal_record(), None).unwrap();
        let map = serde_json::to_value(&attributes).unwrap();
        let map = map.as_object().unwrap();

        for key in BASE_KEYS {
            assert!(map.contains_key(*key), "missing key {key}");
        }
    }

    #[test]
    fn test_supplemental_keys_absent_without_location() {
        let attributes = map_attributes(&minimal_record(), None).unwrap();
        let map = serde_json::to_value(&attributes).unwrap();

        assert!(map.get("location_source").is_none());
        assert!(map.get("loc_displayName").is_none());
        assert!(map.get("gnip_profileLoc_adr_country").is_none());
    }

    #[test]
    fn test_missing_actor_is_an_error() {
        let record = json!({
            "generator": {}, "provider": {}, "object": {}, "gnip": {"language": {"value": ""}}
        });
        let err = map_attributes(&record, None).unwrap_err();

        assert!(err.to_string().contains("actor"));
    }

    #[test]
    fn test_scalar_fields_degrade_to_empty() {
        let attributes = map_attributes(&minimal_record(), None).unwrap();

        assert_eq!(attributes.body, "");
        assert_eq!(attributes.actor_display_name, "");
        assert_eq!(attributes.posted_time, None);
        assert_eq!(attributes.retweet_count, None);
        assert_eq!(attributes.actor_verified, None);
        assert_eq!(attributes.gnip_klout_score, None);
    }

    #[test]
    fn test_date_and_count_parsing() {
        let mut record = minimal_record();
        record["postedTime"] = json!("2014-03-14T09:26:53.000Z");
        record["retweetCount"] = json!(7);
        let attributes = map_attributes(&record, None).unwrap();

        assert_eq!(
            attributes.posted_time.unwrap().to_rfc3339(),
            "2014-03-14T09:26:53+00:00"
        );
        assert_eq!(attributes.retweet_count, Some(7));
    }

    #[test]
    fn test_utc_offset_parsing() {
        let mut record = minimal_record();
        record["actor"]["utcOffset"] = json!("-18000");
        assert_eq!(map_attributes(&record, None).unwrap().actor_utc_offset, Some(-18000));

        record["actor"]["utcOffset"] = json!(3600);
        assert_eq!(map_attributes(&record, None).unwrap().actor_utc_offset, Some(3600));

        record["actor"]["utcOffset"] = json!("not a number");
        assert_eq!(map_attributes(&record, None).unwrap().actor_utc_offset, None);
    }

    #[test]
    fn test_languages_joined() {
        let mut record = minimal_record();
        record["actor"]["languages"] = json!(["en", "fr"]);
        let attributes = map_attributes(&record, None).unwrap();

        assert_eq!(attributes.actor_languages, "en,fr");
    }

    #[test]
    fn test_entity_placeholders_are_empty_strings() {
        let attributes = map_attributes(&minimal_record(), None).unwrap();

        assert_eq!(attributes.twitter_hashtags, "");
        assert_eq!(attributes.twitter_symbols, "");
        assert_eq!(attributes.twitter_urls, "");
        assert_eq!(attributes.twitter_user_mentions, "");
    }

    #[test]
    fn test_point_geo_adds_only_the_source_tag() {
        let location = ResolvedLocation {
            longitude: 1.0,
            latitude: 2.0,
            source: LocationSource::PointGeo,
        };
        let attributes = map_attributes(&minimal_record(), Some(&location)).unwrap();

        assert_eq!(attributes.location_source.as_deref(), Some("geo"));
        assert_eq!(attributes.loc_display_name, None);
        assert_eq!(attributes.profile_loc_display_name, None);
    }

    #[test]
    fn test_bounding_box_supplemental_fields() {
        let mut record = minimal_record();
        record["location"] = json!({
            "displayName": "Texas, USA",
            "name": "Texas",
            "country_code": "United States",
            "twitter_country_code": "US"
        });
        let location = ResolvedLocation {
            longitude: -99.0,
            latitude: 31.0,
            source: LocationSource::BoundingBox,
        };
        let attributes = map_attributes(&record, Some(&location)).unwrap();

        assert_eq!(attributes.location_source.as_deref(), Some("location"));
        assert_eq!(attributes.loc_display_name.as_deref(), Some("Texas, USA"));
        assert_eq!(attributes.loc_name.as_deref(), Some("Texas"));
        assert_eq!(attributes.loc_country.as_deref(), Some("United States"));
        assert_eq!(attributes.loc_country_code.as_deref(), Some("US"));
    }

    #[test]
    fn test_profile_location_supplemental_fields() {
        let mut record = minimal_record();
        record["gnip"]["profileLocations"] = json!([{
            "displayName": "Seattle, Washington, United States",
            "name": "Seattle",
            "address": {
                "country": "United States",
                "countryCode": "US",
                "locality": "Seattle",
                "region": "Washington",
                "subRegion": "King County"
            },
            "geo": {"type": "Point", "coordinates": [-122.33, 47.60]}
        }]);
        let location = ResolvedLocation {
            longitude: -122.33,
            latitude: 47.60,
            source: LocationSource::ProfileLocation,
        };
        let attributes = map_attributes(&record, Some(&location)).unwrap();

        assert_eq!(attributes.location_source.as_deref(), Some("profileLocations"));
        assert_eq!(
            attributes.profile_loc_display_name.as_deref(),
            Some("Seattle, Washington, United States")
        );
        assert_eq!(attributes.profile_loc_locality.as_deref(), Some("Seattle"));
        assert_eq!(attributes.profile_loc_region.as_deref(), Some("Washington"));
        assert_eq!(attributes.profile_loc_sub_region.as_deref(), Some("King County"));
        assert_eq!(attributes.profile_loc_country_code.as_deref(), Some("US"));
    }
}
