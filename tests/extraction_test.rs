use event_ocr_extractor::config::ExtractionConfig;
use event_ocr_extractor::constants::SENTINEL;
use event_ocr_extractor::{EventRecord, Extractor, Field, ImageSource};

fn source() -> ImageSource {
    ImageSource {
        index: 3,
        event_name: "03 Papon Live".to_string(),
        source_image: "03_Papon_Live.png".to_string(),
    }
}

fn extract(text: &str) -> EventRecord {
    Extractor::new(ExtractionConfig::default())
        .unwrap()
        .extract(text, &source())
}

fn assert_sentinel_complete(record: &EventRecord) {
    for field in Field::ALL {
        let value = record.field(field);
        assert!(!value.trim().is_empty(), "{field} is empty");
        assert_eq!(value, value.trim(), "{field} has stray whitespace");
    }
}

#[test]
fn test_full_panel() {
    let record = extract(
        "Sat 12 Jul 2025\n7:30 PM\n2 hours 30 min\nHindi\nEpicentre: Gurugram\n₹1,500 onwards",
    );

    assert_eq!(record.event_name, "03 Papon Live");
    assert_eq!(record.date_range, "12 Jul 2025");
    assert_eq!(record.event_end_date, SENTINEL);
    assert_eq!(record.event_time, "7:30 PM");
    assert_eq!(record.duration, "2 hours 30 min");
    assert_eq!(record.language, "Hindi");
    assert_eq!(record.venue, "Epicentre: Gurugram");
    assert_eq!(record.price, "₹1,500 Onwards");
    assert_eq!(record.age_limit, SENTINEL);
    assert_eq!(record.seats_status, SENTINEL);
    assert_eq!(record.source_image, "03_Papon_Live.png");
}

#[test]
fn test_empty_text_is_all_sentinel() {
    let record = extract("");
    for field in Field::ALL {
        assert_eq!(record.field(field), SENTINEL, "{field}");
    }
    assert_eq!(record.event_name, "03 Papon Live");
    assert_eq!(record.source_image, "03_Papon_Live.png");
}

#[test]
fn test_first_status_line_wins() {
    let record = extract("Hindi\nFast Filling\nVIP Lounge\nSold Out");
    assert_eq!(record.seats_status, "Fast Filling");
}

#[test]
fn test_small_bare_number_is_not_a_price() {
    let record = extract("42");
    assert_eq!(record.price, SENTINEL);
}

#[test]
fn test_noisy_panel_with_age_limit_and_lookahead_venue() {
    let record = extract(
        "Interested?\n\
         Fri 1 Aug 2025 - Sun 3 Aug 2025\n\
         5:00 PM\n\
         Duration 5 Hours\n\
         Age Limit - 18 yrs +\n\
         English, Hindi By\n\
         Mahalaxmi Race Course:\n\
         Mumbai <12\n\
         Rs. 2,999 onwards\n\
         Filling Fast",
    );

    assert_eq!(record.date_range, "1 Aug 2025");
    assert_eq!(record.event_end_date, "3 Aug 2025");
    assert_eq!(record.event_time, "5:00 PM");
    assert_eq!(record.duration, "5 Hours");
    assert_eq!(record.age_limit, "18yrs+");
    assert_eq!(record.language, "English, Hindi");
    assert_eq!(record.venue, "Mahalaxmi Race Course: Mumbai");
    assert_eq!(record.price, "₹2,999 Onwards");
    assert_eq!(record.seats_status, "Fast Filling");
    assert_sentinel_complete(&record);
}

#[test]
fn test_age_line_failing_strict_match_is_dropped() {
    let record = extract("Age Limit\nTamil");
    assert_eq!(record.age_limit, SENTINEL);
    assert_eq!(record.language, "Tamil");
}

#[test]
fn test_venue_never_resolved_without_language() {
    for text in [
        "Phoenix Marketcity Arena\n₹799",
        "Venue: Indira Gandhi Stadium\n7:00 PM",
        "",
    ] {
        let record = extract(text);
        assert_eq!(record.language, SENTINEL);
        assert_eq!(record.venue, SENTINEL, "venue resolved for {text:?}");
    }
}

#[test]
fn test_extraction_is_deterministic() {
    let text = "Sun 5 Oct 2025\n8:00 pm\nKannada\nChowdiah Memorial Hall\nINR 350\nAvailable";
    let extractor = Extractor::new(ExtractionConfig::default()).unwrap();
    let first = extractor.extract(text, &source());
    let second = extractor.extract(text, &source());
    assert_eq!(first, second);
    assert_eq!(first.venue, "Chowdiah Memorial Hall");
    assert_eq!(first.price, "₹350");
    assert_eq!(first.seats_status, "Available");
}

#[test]
fn test_configured_threshold_and_suffixes() {
    let config = ExtractionConfig {
        price_threshold: 10,
        price_suffixes: vec!["per person".to_string()],
        ..ExtractionConfig::default()
    };
    let extractor = Extractor::new(config).unwrap();
    assert_eq!(extractor.config().price_threshold, 10);

    assert_eq!(extractor.extract("42", &source()).price, "₹42");
    assert_eq!(extractor.extract("8 per person", &source()).price, "₹8 Per Person");
    assert_eq!(extractor.extract("8 onwards", &source()).price, SENTINEL);
}
