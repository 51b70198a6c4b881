use esri_gnip::geometry::EsriPoint;
use esri_gnip::parser::parse_activities;
use esri_gnip::stats::BatchStats;
use esri_gnip::transform::{ParseOptions, parse_records};

#[test]
fn test_full_pipeline() {
    let bytes = include_bytes!("fixtures/activities.json");
    let records = parse_activities(bytes).expect("Failed to parse fixture");
    assert_eq!(records.len(), 5);

    let output = parse_records(&records, &ParseOptions::default());

    // 3 located (geo, bounding box, profile location), 1 without any
    // location information, 1 that fails mid-translation.
    assert_eq!(output.normalized.len(), 3);
    assert_eq!(output.unlocated.len(), 1);
    assert_eq!(output.translation_errors.len(), 1);

    // Direct geo point, stored latitude-first upstream.
    let geotagged = &output.normalized[0];
    assert_eq!(
        geotagged.attributes.location_source.as_deref(),
        Some("geo")
    );
    assert_eq!(geotagged.attributes.actor_utc_offset, Some(-18000));
    assert_eq!(
        geotagged.geometry.unwrap(),
        EsriPoint::from_lon_lat(-73.99, 40.75)
    );

    // Bounding box collapses to its centroid.
    let bounded = &output.normalized[1];
    assert_eq!(
        bounded.attributes.location_source.as_deref(),
        Some("location")
    );
    assert_eq!(bounded.attributes.loc_name.as_deref(), Some("Texas"));
    assert_eq!(bounded.geometry.unwrap(), EsriPoint::from_lon_lat(5.0, 5.0));

    // Profile location coordinates are taken verbatim.
    let profiled = &output.normalized[2];
    assert_eq!(
        profiled.attributes.location_source.as_deref(),
        Some("profileLocations")
    );
    assert_eq!(
        profiled.attributes.profile_loc_locality.as_deref(),
        Some("Seattle")
    );
    assert_eq!(
        profiled.geometry.unwrap(),
        EsriPoint::from_lon_lat(-122.3320708, 47.6062095)
    );

    // Unlocated record comes back untouched.
    assert_eq!(
        output.unlocated[0]["id"],
        "tag:search.twitter.com,2005:444000000000000004"
    );

    // The truncated record is isolated, with the original preserved.
    let failure = &output.translation_errors[0];
    assert!(failure.message.contains("actor"));
    assert_eq!(
        failure.record["id"],
        "tag:search.twitter.com,2005:444000000000000005"
    );

    let stats = BatchStats::from_output(&output);
    assert_eq!(stats.total_records, 5);
    assert_eq!(stats.from_geo, 1); // the second geo record failed translation
    assert_eq!(stats.from_bounding_box, 1);
    assert_eq!(stats.from_profile_locations, 1);
    assert_eq!(stats.located_pct(), 60.0);
}
