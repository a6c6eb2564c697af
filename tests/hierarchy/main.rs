//! Integration tests for hierarchy editing and bulk-import compilation
//!
//! These tests drive the model only through its public operations and check
//! the numbering invariants after every step.

use lecture_organizer::app::hierarchy::{HierarchyModel, Mutation};
use lecture_organizer::app::import::BulkImportCompiler;
use lecture_organizer::app::models::CatalogItem;
use lecture_organizer::app::tags::TagFilterComposer;
use lecture_organizer::errors::StructuralError;
use tokio_test::{assert_err, assert_ok};

fn playlist(count: usize) -> Vec<CatalogItem> {
    (0..count)
        .map(|i| CatalogItem {
            id: format!("video-{}", i),
            title: format!("Lesson {}", i + 1),
            description: format!("Part {} of the series", i + 1),
            duration_seconds: 120 + i as u64,
            thumbnail_url: format!("https://img.example/{}.jpg", i),
            external_url: format!("https://video.example/watch?v={}", i),
            source_index: i,
        })
        .collect()
}

fn assert_contiguous(model: &HierarchyModel) {
    let numbers: Vec<u32> = model.chapters().iter().map(|c| c.number).collect();
    let expected: Vec<u32> = (1..=model.chapters().len() as u32).collect();
    assert_eq!(numbers, expected);

    for chapter in model.chapters() {
        let expected: Vec<u32> = (1..=chapter.lectures.len() as u32).collect();
        assert_eq!(chapter.lecture_positions(), expected, "chapter {}", chapter.name);
    }
    assert_ok!(model.verify_invariants());
}

#[test]
fn test_partition_then_return_scenario() {
    let mut model = HierarchyModel::with_pool(playlist(5));
    let last_item = model.unassigned_pool()[4].id.clone();

    assert_ok!(model.assign().auto_partition(2));
    let sizes: Vec<usize> = model.chapters().iter().map(|c| c.lectures.len()).collect();
    assert_eq!(sizes, vec![2, 2, 1]);
    assert!(model.unassigned_pool().is_empty());

    // The item now lives in chapter 3, not in the pool
    let first_chapter = model.chapters()[0].id.clone();
    let err = assert_err!(model.assign().move_to_chapter(&last_item, &first_chapter));
    assert_eq!(err, StructuralError::ItemNotInPool { item_id: last_item.clone() });
    assert_eq!(model.chapters()[0].lectures.len(), 2);

    let third_chapter = model.chapters()[2].id.clone();
    assert_ok!(model.assign().remove_from_chapter(&third_chapter, 0));

    assert!(model.chapters()[2].is_empty());
    assert_eq!(model.unassigned_pool().len(), 1);
    assert_eq!(model.unassigned_pool()[0].id, last_item);
    assert_eq!(model.unassigned_pool()[0].source_index, 4);
    assert_contiguous(&model);
}

#[test]
fn test_auto_partition_is_deterministic() {
    let mut first = HierarchyModel::with_pool(playlist(7));
    let mut second = HierarchyModel::with_pool(playlist(7).into_iter().rev().collect());

    for model in [&mut first, &mut second] {
        assert_ok!(model.assign().auto_partition(3));
        // Nothing left to partition
        assert_eq!(assert_ok!(model.assign().auto_partition(3)).len(), 0);
    }

    let layout = |model: &HierarchyModel| -> Vec<Vec<String>> {
        model
            .chapters()
            .iter()
            .map(|c| c.lectures.iter().map(|l| l.title.clone()).collect())
            .collect()
    };
    assert_eq!(layout(&first), layout(&second));
    assert_eq!(
        layout(&first)
            .iter()
            .map(Vec::len)
            .collect::<Vec<_>>(),
        vec![3, 3, 1]
    );
    assert_eq!(layout(&first)[2], vec!["Lesson 7"]);
}

#[test]
fn test_invariants_hold_across_edit_sequence() {
    let mut model = HierarchyModel::with_pool(playlist(12));
    assert_ok!(model.assign().auto_partition(4));

    let id = |model: &HierarchyModel, index: usize| model.chapters()[index].id.clone();

    let edits = vec![
        Mutation::ReorderWithinChapter {
            chapter_id: id(&model, 0),
            from_index: 0,
            to_index: 3,
        },
        Mutation::MoveBetweenChapters {
            from_chapter_id: id(&model, 1),
            lecture_index: 2,
            to_chapter_id: id(&model, 2),
            to_index: 0,
        },
        Mutation::RemoveFromChapter {
            chapter_id: id(&model, 2),
            lecture_index: 4,
        },
        Mutation::AddChapter {
            name: "Extras".to_string(),
        },
        Mutation::RemoveChapter {
            chapter_id: id(&model, 0),
        },
    ];

    for edit in &edits {
        assert_ok!(edit.apply(&mut model), "{}", edit.name());
        assert_contiguous(&model);
    }

    assert_eq!(model.chapters().len(), 3);
    assert_eq!(model.chapters()[2].name, "Extras");
    assert_eq!(model.unassigned_pool().len(), 5);
    assert_eq!(model.lecture_count() + model.unassigned_pool().len(), 12);

    // The engine can place returned items again
    let extras = id(&model, 2);
    let item = model.unassigned_pool()[0].id.clone();
    assert_ok!(model.assign().move_to_chapter(&item, &extras));
    assert_contiguous(&model);

    // Returned items are appended to the pool but partitioned in playlist order
    let created = assert_ok!(model.assign().auto_partition(10));
    assert_eq!(created.len(), 1);
    let order: Vec<usize> = model.chapters()[3]
        .lectures
        .iter()
        .filter_map(|l| l.source_index)
        .collect();
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(order.len(), 4);
    assert_eq!(order, sorted);
    assert_contiguous(&model);
}

#[test]
fn test_failed_edits_change_nothing() {
    let mut model = HierarchyModel::with_pool(playlist(4));
    assert_ok!(model.assign().auto_partition(2));
    let before = model.clone();
    let chapter = model.chapters()[0].id.clone();

    assert_err!(model.assign().reorder_within_chapter(&chapter, 0, 2));
    assert_err!(model.assign().remove_from_chapter("no-such-chapter", 0));
    assert_err!(model.assign().move_between_chapters(&chapter, 0, "no-such-chapter", 0));
    assert_err!(model.assign().auto_partition(0));

    assert_eq!(model, before);
}

#[test]
fn test_compile_round_trip() {
    let mut model = HierarchyModel::with_pool(playlist(5)).with_chapter_prefix("Week");
    assert_ok!(model.assign().auto_partition(2));
    let first = model.chapters()[0].id.clone();
    assert_ok!(model.assign().reorder_within_chapter(&first, 1, 0));
    assert_ok!(model.rename_chapter(&first, "Getting started"));

    let payload = assert_ok!(BulkImportCompiler::compile(&model));
    assert_eq!(payload.len(), 5);
    assert_eq!(payload[0].title, "Lesson 2");
    assert_eq!(payload[0].chapter_name, "Getting started");

    let rebuilt = HierarchyModel::from_payload(&payload);
    let outline = |model: &HierarchyModel| -> Vec<(String, Vec<String>)> {
        model
            .chapters()
            .iter()
            .map(|c| {
                (
                    c.name.clone(),
                    c.lectures.iter().map(|l| l.title.clone()).collect(),
                )
            })
            .collect()
    };
    assert_eq!(outline(&rebuilt), outline(&model));
    assert_contiguous(&rebuilt);
}

#[test]
fn test_empty_hierarchy_does_not_compile() {
    let mut model = HierarchyModel::with_pool(playlist(2));
    model.add_chapter("Empty");
    let err = assert_err!(BulkImportCompiler::compile(&model));
    assert_eq!(err, StructuralError::EmptyImport);
}

#[test]
fn test_tag_composition() {
    assert_eq!(TagFilterComposer::compose(["JS", " js", "Js "], None), "tags=js");
    assert_eq!(
        TagFilterComposer::compose(["C++", "c#"], Some("intro course")),
        "tags=c%23%2Cc%2B%2B&course=intro+course"
    );
    let none: Vec<String> = Vec::new();
    assert_eq!(TagFilterComposer::compose(none, Some("  ")), "");
}
