use super::*;

// ==================== Helper functions ====================

fn item(id: &str, mood: Mood, mode: Mode, energy: u8, engagement: u64) -> ContentItem {
    ContentItem::new(id, mood, mode, energy, engagement).unwrap()
}

fn ids(items: &[ContentItem]) -> Vec<&str> {
    items.iter().map(ContentItem::id).collect()
}

/// The home feed catalog of the mobile client
fn home_catalog() -> Vec<ContentItem> {
    vec![
        item("coding-tip", Mood::Learn, Mode::Spark, 85, 892),
        item("digital-consciousness", Mood::Learn, Mode::Deep, 92, 8900),
        item("recipe-hack", Mood::Fun, Mode::Spark, 78, 3100),
        item("digital-detox", Mood::Chill, Mode::Deep, 88, 4500),
        item("workout-boost", Mood::Focus, Mode::Spark, 75, 2400),
    ]
}

// ==================== Scenario ====================

#[test]
fn test_scenario_low_usage_keeps_deep_first() {
    let items = vec![
        item("A", Mood::Learn, Mode::Deep, 92, 8900),
        item("B", Mood::Learn, Mode::Spark, 85, 892),
    ];

    let ranked = rank_feed(&items, Mood::Learn, 0.2);
    assert_eq!(ids(&ranked), vec!["A", "B"]);

    let ranker = FeedRanker::default();
    assert!((ranker.score(&items[0]) - 100.9).abs() < 1e-9);
    assert!((ranker.score(&items[1]) - 85.892).abs() < 1e-9);
}

#[test]
fn test_scenario_high_usage_drops_deep() {
    let items = vec![
        item("A", Mood::Learn, Mode::Deep, 92, 8900),
        item("B", Mood::Learn, Mode::Spark, 85, 892),
    ];

    let ranked = rank_feed(&items, Mood::Learn, 0.8);
    assert_eq!(ids(&ranked), vec!["B"]);
}

// ==================== Filtering ====================

#[test]
fn test_output_is_filtered_strictly_by_mood() {
    let catalog = home_catalog();
    for mood in Mood::ALL {
        for ratio in [0.0, 0.5, 0.69, 0.7, 1.4] {
            let ranked = rank_feed(&catalog, mood, ratio);
            assert!(ranked.iter().all(|i| i.mood() == mood));
        }
    }
}

#[test]
fn test_deep_items_kept_below_cutoff() {
    let catalog = home_catalog();
    for ratio in [0.0, 0.3, 0.699_999] {
        let ranked = rank_feed(&catalog, Mood::Chill, ratio);
        assert!(ranked.iter().any(|i| i.mode() == Mode::Deep), "ratio {ratio}");
    }
}

#[test]
fn test_deep_items_dropped_at_and_above_cutoff() {
    let catalog = home_catalog();
    for mood in Mood::ALL {
        for ratio in [0.7, 0.75, 1.0, 3.0] {
            let ranked = rank_feed(&catalog, mood, ratio);
            assert!(ranked.iter().all(|i| i.mode() != Mode::Deep));
        }
    }
}

#[test]
fn test_custom_cutoff() {
    let ranker = FeedRanker {
        deep_content_cutoff: 0.5,
        ..FeedRanker::default()
    };
    let ranked = ranker.rank(&home_catalog(), Mood::Learn, 0.6);
    assert_eq!(ids(&ranked), vec!["coding-tip"]);
}

#[test]
fn test_empty_inputs_yield_empty_feed() {
    assert!(rank_feed(&[], Mood::Fun, 0.1).is_empty());

    let only_fun = vec![item("x", Mood::Fun, Mode::Spark, 50, 0)];
    assert!(rank_feed(&only_fun, Mood::Focus, 0.1).is_empty());
}

// ==================== Ordering ====================

#[test]
fn test_sorted_by_descending_score() {
    let items = vec![
        item("low", Mood::Focus, Mode::Spark, 40, 0),
        item("high", Mood::Focus, Mode::Spark, 90, 0),
        item("mid-engaged", Mood::Focus, Mode::Spark, 60, 15_000),
    ];

    let ranked = rank_feed(&items, Mood::Focus, 0.0);
    assert_eq!(ids(&ranked), vec!["high", "mid-engaged", "low"]);
}

#[test]
fn test_ties_keep_catalog_order() {
    let items = vec![
        item("first", Mood::Fun, Mode::Spark, 70, 500),
        item("other", Mood::Fun, Mode::Spark, 90, 0),
        item("second", Mood::Fun, Mode::Deep, 70, 500),
        item("third", Mood::Fun, Mode::Spark, 70, 500),
    ];

    let ranked = rank_feed(&items, Mood::Fun, 0.1);
    assert_eq!(ids(&ranked), vec!["other", "first", "second", "third"]);
}

#[test]
fn test_ranking_is_idempotent_and_leaves_input_untouched() {
    let catalog = home_catalog();
    let before = catalog.clone();

    let first = rank_feed(&catalog, Mood::Learn, 0.2);
    let second = rank_feed(&catalog, Mood::Learn, 0.2);

    assert_eq!(first, second);
    assert_eq!(catalog, before);
}
