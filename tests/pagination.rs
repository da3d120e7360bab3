#![recursion_limit = "256"]

mod common;

use health_profile_pdf::pdf::cursor::FOOTER_HEIGHT;
use health_profile_pdf::pdf::layout;
use health_profile_pdf::{BlockKind, DrawOp, PageSize};

const CHRONIC: &str = "Chronic Conditions";

#[test]
fn long_table_continues_on_next_page_without_header() {
    common::init_logging();
    let record = common::with_chronic_conditions(25);
    let doc = layout(&record, &common::options()).unwrap();

    assert!(doc.page_count() > 1, "25 rows must not fit on one page");
    assert_eq!(common::count_in(&doc, CHRONIC, common::is_row), 25);
    assert_eq!(
        common::count_in(&doc, CHRONIC, |k| k == BlockKind::TableHeader),
        1
    );

    let blocks: Vec<_> = doc.blocks_in(CHRONIC).collect();
    let break_at = blocks
        .iter()
        .position(|b| b.kind == BlockKind::ContinuationHeader)
        .expect("table spans a page break");
    let continued_page = blocks[break_at].page;
    assert!(continued_page > 0);
    // rows resume directly under the continuation banner
    assert!(matches!(blocks[break_at + 1].kind, BlockKind::TableRow { .. }));
    assert!(
        blocks[break_at + 1..]
            .iter()
            .all(|b| b.kind != BlockKind::TableHeader)
    );

    let banner = doc.pages()[continued_page].texts().next();
    assert_eq!(banner, Some("Chronic Conditions \u{2014} Continued"));
    assert!(
        !doc.pages()[continued_page]
            .texts()
            .any(|t| t == "Diagnosed Date")
    );
}

#[test]
fn row_indices_stay_continuous_across_pages() {
    let record = common::with_chronic_conditions(25);
    let doc = layout(&record, &common::options()).unwrap();
    let indices: Vec<usize> = doc
        .blocks_in(CHRONIC)
        .filter_map(|b| match b.kind {
            BlockKind::TableRow { index } => Some(index),
            _ => None,
        })
        .collect();
    assert_eq!(indices, (0..25).collect::<Vec<_>>());
}

#[test]
fn footer_counts_every_page() {
    let record = common::with_chronic_conditions(60);
    let doc = layout(&record, &common::options()).unwrap();
    let total = doc.page_count();
    assert!(total >= 3);

    for (i, page) in doc.pages().iter().enumerate() {
        let expected = format!("Page {} of {}", i + 1, total);
        assert!(
            page.texts().any(|t| t == expected),
            "page {} lacks its footer",
            i + 1
        );
        assert!(page.texts().any(|t| t == "Health Profile Generated on 6/9/2024"));
    }
    let last = doc.pages().last().unwrap();
    assert!(last.texts().any(|t| t == format!("Page {total} of {total}")));
}

#[test]
fn every_later_page_starts_with_a_continuation_banner() {
    let record = common::with_chronic_conditions(60);
    let doc = layout(&record, &common::options()).unwrap();
    for page in &doc.pages()[1..] {
        let first = page.texts().next().unwrap();
        assert!(first.ends_with("\u{2014} Continued"), "unexpected banner {first:?}");
    }
}

#[test]
fn content_never_reaches_into_footer_band() {
    let record = common::with_chronic_conditions(60);
    let doc = layout(&record, &common::options()).unwrap();
    for page in doc.pages() {
        for op in page.ops() {
            if let DrawOp::Text { text, y, .. } = op {
                if text.starts_with("Page ") || text.contains("Generated on") {
                    continue;
                }
                assert!(*y >= FOOTER_HEIGHT, "{text:?} drawn at {y}");
            }
        }
    }
}

#[test]
fn letter_pages_use_letter_geometry() {
    let record = common::with_chronic_conditions(25);
    let options = health_profile_pdf::RenderOptions {
        page_size: PageSize::LETTER,
        ..common::options()
    };
    let doc = layout(&record, &options).unwrap();
    assert!(doc.pages().iter().all(|p| p.size() == PageSize::LETTER));
}
