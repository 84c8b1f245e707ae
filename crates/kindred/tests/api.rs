//! Integration tests for the public API

use kindred::prelude::*;
use kindred::{layout, organize, ClassificationSource, ConnectionKind};

fn ids(people: &[Person]) -> Vec<i64> {
    people.iter().map(|p| p.id.0).collect()
}

#[test]
fn test_couple_of_similar_age_are_both_parents() {
    let family = organize(
        &[
            Person::new(1, "Ann").with_age(40).with_gender(Gender::Female),
            Person::new(2, "Bob").with_age(38).with_gender(Gender::Male),
        ],
        &[],
    );
    assert_eq!(ids(family.parents()), vec![1, 2]);
    assert!(family.children().is_empty());
    assert_eq!(family.source(), ClassificationSource::Heuristic);
}

#[test]
fn test_forty_and_ten_are_parent_and_child() {
    for gender in [Gender::Male, Gender::Female] {
        let family = organize(
            &[
                Person::new(1, "Kid").with_age(10).with_gender(gender),
                Person::new(2, "Mum").with_age(40).with_gender(Gender::Female),
            ],
            &[],
        );
        assert_eq!(ids(family.parents()), vec![2]);
        assert_eq!(ids(family.children()), vec![1]);
    }
}

#[test]
fn test_three_members_with_mixed_gender_couple() {
    let family = organize(
        &[
            Person::new(1, "Dad").with_age(45).with_gender(Gender::Male),
            Person::new(2, "Mum").with_age(42).with_gender(Gender::Female),
            Person::new(3, "Son").with_age(15).with_gender(Gender::Male),
        ],
        &[],
    );
    assert_eq!(ids(family.parents()), vec![1, 2]);
    assert_eq!(ids(family.children()), vec![3]);
}

#[test]
fn test_three_members_same_gender_oldest_pair() {
    let family = organize(
        &[
            Person::new(1, "Dad").with_age(45).with_gender(Gender::Male),
            Person::new(2, "Uncle").with_age(40).with_gender(Gender::Male),
            Person::new(3, "Son").with_age(15).with_gender(Gender::Male),
        ],
        &[],
    );
    assert_eq!(ids(family.parents()), vec![1]);
    assert_eq!(ids(family.children()), vec![2, 3]);
}

#[test]
fn test_heuristic_never_fills_outer_tiers() {
    let family = organize(
        &[
            Person::new(1, "Great").with_age(95),
            Person::new(2, "Gran").with_age(70),
            Person::new(3, "Mum").with_age(45),
            Person::new(4, "Baby").with_age(1),
        ],
        &[],
    );
    assert!(family.grandparents().is_empty());
    assert!(family.grandchildren().is_empty());
    assert_eq!(family.len(), 4);
}

#[test]
fn test_parent_edges_for_two_generations() {
    let people = vec![
        Person::new(1, "Pat").with_age(41),
        Person::new(2, "Sam").with_age(12),
        Person::new(3, "Lou").with_age(9),
    ];
    let edges = vec![RelationshipEdge::parent(1, 2), RelationshipEdge::parent(1, 3)];
    let family = organize(&people, &edges);

    assert_eq!(family.level_of(PersonId(1)), Some(1));
    assert_eq!(family.generation_of(PersonId(2)), Some(Generation::Child));
    assert_eq!(family.source(), ClassificationSource::Relationships);
}

#[test]
fn test_grandchild_edge_keeps_person_at_level_zero() {
    let people = vec![
        Person::new(1, "Pat").with_age(70),
        Person::new(2, "Sam").with_age(42),
        Person::new(3, "Lou").with_age(39),
        Person::new(4, "Max").with_age(8),
    ];
    let edges = vec![
        RelationshipEdge::parent(1, 2),
        RelationshipEdge::parent(1, 3),
        RelationshipEdge::parent(2, 4),
    ];
    let family = organize(&people, &edges);

    assert_eq!(family.level_of(PersonId(1)), Some(0));
    assert_eq!(ids(family.grandparents()), vec![1]);
    assert_eq!(ids(family.children()), vec![4]);
}

#[test]
fn test_ancestor_edge_places_ancestor_above() {
    let people = vec![
        Person::new(9, "Old").with_age(80),
        Person::new(1, "Pat").with_age(50),
        Person::new(2, "Sam").with_age(20),
        Person::new(3, "Lou").with_age(18),
    ];
    let edges = vec![
        RelationshipEdge::new(1, 9, RelationshipType::Child),
        RelationshipEdge::parent(1, 2),
        RelationshipEdge::parent(1, 3),
    ];
    let family = organize(&people, &edges);

    assert_eq!(family.level_of(PersonId(9)), Some(0));
    assert_eq!(family.level_of(PersonId(1)), Some(1));
    assert_eq!(ids(family.children()), vec![2, 3]);
}

#[test]
fn test_inactive_edges_do_not_count() {
    let people = vec![
        Person::new(1, "Ann").with_age(40).with_gender(Gender::Female),
        Person::new(2, "Bob").with_age(38).with_gender(Gender::Male),
    ];
    let edges = vec![RelationshipEdge::parent(1, 2).inactive()];
    let family = organize(&people, &edges);

    assert_eq!(family.source(), ClassificationSource::Heuristic);
    assert!(family.parent_child_map().is_empty());
}

#[test]
fn test_family_document_round_trip() {
    let json = r#"{
        "people": [
            {"id": 1, "name": "Ann", "age": 40, "gender": "female"},
            {"id": 2, "name": "Kim", "gender": "other"},
            {"id": 0, "name": "Placeholder"}
        ],
        "relationships": [
            {"person_a": 1, "person_b": 2, "relationship_type": "parent", "notes": "adopted"},
            {"person_a": 1, "person_b": 2, "relationship_type": "niece_nephew", "is_active": false}
        ]
    }"#;
    let input = FamilyInput::from_json(json).unwrap();
    assert_eq!(input.people.len(), 3);
    assert!(input.relationships[0].is_active);
    assert_eq!(input.relationships[0].notes.as_deref(), Some("adopted"));
    assert_eq!(
        input.relationships[1].relationship_type,
        RelationshipType::NieceNephew
    );

    let family = organize(&input.people, &input.relationships);
    assert_eq!(family.len(), 2);

    let value = serde_json::to_value(&family).unwrap();
    assert_eq!(value["parents"][0]["name"], "Ann");
    assert_eq!(value["generation_levels"]["2"], "child");
    assert_eq!(value["parent_children"]["1"][0], 2);
    assert_eq!(value["source"], "relationships");
}

#[test]
fn test_layout_is_idempotent() {
    let people = vec![
        Person::new(1, "Dad").with_age(45).with_gender(Gender::Male),
        Person::new(2, "Mum").with_age(42).with_gender(Gender::Female),
        Person::new(3, "Son").with_age(15),
        Person::new(4, "Daughter").with_age(11),
    ];
    let family = organize(&people, &[]);

    let first = layout(&family, 1000.0, false, &DragOffsets::new());
    let second = layout(&family, 1000.0, false, &DragOffsets::new());
    assert_eq!(first, second);
}

#[test]
fn test_drag_offset_does_not_move_others() {
    let people = vec![
        Person::new(1, "Dad").with_age(45).with_gender(Gender::Male),
        Person::new(2, "Mum").with_age(42).with_gender(Gender::Female),
        Person::new(3, "Son").with_age(15),
        Person::new(4, "Daughter").with_age(11),
    ];
    let family = organize(&people, &[]);
    let plain = layout(&family, 1000.0, false, &DragOffsets::new());

    let mut offsets = DragOffsets::new();
    offsets.set(2, DragOffset::new(-30.0, 12.0));
    let dragged = layout(&family, 1000.0, false, &offsets);

    for node in &dragged.positions {
        let before = plain.node(node.person_id).unwrap();
        assert_eq!(node.base, before.base);
        if node.person_id != PersonId(2) {
            assert_eq!(node.position(), before.position());
        }
    }
    let mum = dragged.position_of(PersonId(2)).unwrap();
    let mum_before = plain.position_of(PersonId(2)).unwrap();
    assert_eq!((mum.x, mum.y), (mum_before.x - 30.0, mum_before.y + 12.0));
}

#[test]
fn test_layout_connections_use_type_tags() {
    let people = vec![
        Person::new(1, "Dad").with_age(45).with_gender(Gender::Male),
        Person::new(2, "Mum").with_age(42).with_gender(Gender::Female),
        Person::new(3, "Son").with_age(15),
    ];
    let family = organize(&people, &[]);
    let tree = layout(&family, 1000.0, false, &DragOffsets::new());

    let kinds: Vec<ConnectionKind> = tree.connections.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ConnectionKind::ParentChild,
            ConnectionKind::ParentChild,
            ConnectionKind::SpouseConnection,
        ]
    );

    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json["connections"][2]["type"], "spouse-connection");
    assert!(json["container_height"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_extreme_ages_are_classified_without_overflow() {
    let family = organize(
        &[
            Person::new(1, "Eldest").with_age(u32::MAX).with_gender(Gender::Male),
            Person::new(2, "Next").with_age(u32::MAX - 1).with_gender(Gender::Female),
            Person::new(3, "Third").with_age(u32::MAX - 5),
        ],
        &[],
    );
    assert_eq!(ids(family.parents()), vec![1]);
    assert_eq!(ids(family.children()), vec![2, 3]);
}
