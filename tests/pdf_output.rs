#![recursion_limit = "256"]

mod common;

use std::path::PathBuf;

use health_profile_pdf::pdf::layout;
use health_profile_pdf::{
    CONTENT_TYPE, Error, FontSource, RenderOptions, convert_record_bytes_to_pdf,
    render_health_profile, suggested_filename,
};

#[test]
fn rendered_bytes_form_a_complete_pdf() {
    common::init_logging();
    let record = common::full_record();
    let options = common::options();
    let pages = layout(&record, &options).unwrap().page_count();
    let bytes = render_health_profile(&record, &options).unwrap();

    assert!(bytes.starts_with(b"%PDF-"));
    assert!(common::contains(&bytes, b"%%EOF"));
    assert!(common::contains(&bytes, format!("/Count {pages}").as_bytes()));
    assert!(common::contains(&bytes, b"/WinAnsiEncoding"));
    assert!(common::contains(&bytes, b"/Times-Bold"));
    assert!(common::contains(&bytes, b"Health Profile"));
    assert_eq!(CONTENT_TYPE, "application/pdf");
}

#[test]
fn output_is_reproducible_for_a_fixed_date() {
    let record = common::with_chronic_conditions(30);
    let a = render_health_profile(&record, &common::options()).unwrap();
    let b = render_health_profile(&record, &common::options()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn missing_custom_font_fails_before_layout() {
    let options = RenderOptions {
        fonts: FontSource::Custom {
            regular: PathBuf::from("/nonexistent/Regular.ttf"),
            bold: PathBuf::from("/nonexistent/Bold.ttf"),
        },
        ..common::options()
    };
    let err = render_health_profile(&common::empty_record(), &options).unwrap_err();
    match err {
        Error::Font { path, .. } => assert_eq!(path, PathBuf::from("/nonexistent/Regular.ttf")),
        other => panic!("expected a font error, got {other}"),
    }
}

#[test]
fn envelope_json_converts_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let record = common::full_record();
    let out = dir.path().join(suggested_filename(record.record_id()));
    assert!(out.ends_with("health_profile_65f0a1b2c3.pdf"));

    let json = common::full_record_json().to_string();
    convert_record_bytes_to_pdf(json.as_bytes(), &out, &common::options()).unwrap();
    let written = std::fs::read(&out).unwrap();
    assert!(written.starts_with(b"%PDF-"));
}

#[test]
fn malformed_json_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.pdf");
    let err = convert_record_bytes_to_pdf(b"{not json", &out, &common::options()).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
    assert!(!out.exists());
}

#[test]
fn record_with_store_key_and_virtual_id_renders() {
    let json = br#"{"success": true, "data": {"_id": "65f0", "id": "65f0", "firstName": "Asha"}}"#;
    let record = health_profile_pdf::HealthRecord::from_json_bytes(json).unwrap();
    assert_eq!(suggested_filename(record.record_id()), "health_profile_65f0.pdf");
    let bytes = render_health_profile(&record, &common::options()).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}
