//! # End-to-End Mapper Behavior
//!
//! Exercises the full declare → build → map/diff pipeline against realistic
//! record models: strings, integers, optional integers, floats, and
//! date-time members, plus a computed read-only member for the writability
//! failure path.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::Serialize;

use fieldmap::{comparer_fn, field, Accessor, FieldDiff, MapperBuilder, RuleIssue};

// ---------------------------------------------------------------------------
// Fixture models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Upstream {
    string_prop: String,
    int_prop: i32,
    float_prop: f32,
    observed_at: DateTime<Utc>,
    offset_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq)]
struct Record {
    string_prop: String,
    int_prop: i32,
    int_nullable: Option<i32>,
    observed_at: DateTime<Utc>,
    offset_as_utc: Option<DateTime<Utc>>,
}

fn upstream() -> Upstream {
    Upstream {
        string_prop: "source".into(),
        int_prop: 42,
        float_prop: 43.1,
        observed_at: Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap(),
        offset_time: Some(
            FixedOffset::east_opt(3600)
                .unwrap()
                .with_ymd_and_hms(2024, 5, 17, 10, 30, 0)
                .unwrap(),
        ),
    }
}

fn empty_record() -> Record {
    Record {
        string_prop: String::new(),
        int_prop: 0,
        int_nullable: None,
        observed_at: Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap(),
        offset_as_utc: None,
    }
}

// ---------------------------------------------------------------------------
// Conditional copy
// ---------------------------------------------------------------------------

#[test]
fn maps_int_member_and_reports_change() {
    let mapper = MapperBuilder::<Upstream, Record>::new()
        .bind(field!(Record, int_prop), |s: &Upstream| s.int_prop)
        .build()
        .unwrap();

    let source = upstream();
    let mut target = empty_record();

    assert!(mapper.map(&source, &mut target));
    assert_eq!(target.int_prop, 42);

    let report = mapper.diff(&source, &empty_record());
    assert_eq!(
        report,
        vec![FieldDiff::new("int_prop", &0, &42)],
        "diff reports the before/after pair for the one declared member"
    );
}

#[test]
fn detects_when_no_change_was_made() {
    let mapper = MapperBuilder::<Upstream, Record>::new()
        .bind(field!(Record, int_prop), |s: &Upstream| s.int_prop)
        .build()
        .unwrap();

    let source = upstream();
    let mut target = Record {
        int_prop: source.int_prop,
        ..empty_record()
    };

    assert!(!mapper.map(&source, &mut target));
    assert_eq!(target.int_prop, 42);
    assert!(mapper.diff(&source, &target).is_empty());
}

#[test]
fn maps_multiple_members_including_date_times() {
    let mapper = MapperBuilder::<Upstream, Record>::new()
        .bind(field!(Record, string_prop), |s: &Upstream| {
            s.string_prop.clone()
        })
        .bind(field!(Record, int_prop), |s: &Upstream| s.int_prop)
        .bind(field!(Record, observed_at), |s: &Upstream| s.observed_at)
        .build()
        .unwrap();

    let source = upstream();
    let mut target = empty_record();

    assert!(mapper.map(&source, &mut target));
    assert_eq!(target.string_prop, source.string_prop);
    assert_eq!(target.int_prop, source.int_prop);
    assert_eq!(target.observed_at, source.observed_at);
}

#[test]
fn only_differing_members_are_assigned() {
    let mapper = MapperBuilder::<Upstream, Record>::new()
        .bind(field!(Record, string_prop), |s: &Upstream| {
            s.string_prop.clone()
        })
        .bind(field!(Record, int_prop), |s: &Upstream| s.int_prop)
        .build()
        .unwrap();

    let source = upstream();
    let mut target = Record {
        string_prop: source.string_prop.clone(),
        ..empty_record()
    };

    assert!(mapper.map(&source, &mut target));
    let report = mapper.diff(
        &source,
        &Record {
            string_prop: source.string_prop.clone(),
            ..empty_record()
        },
    );
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].field, "int_prop");
}

// ---------------------------------------------------------------------------
// Nullable-wrap conversion
// ---------------------------------------------------------------------------

#[test]
fn plain_int_maps_into_optional_int_member() {
    let mapper = MapperBuilder::<Upstream, Record>::new()
        .bind(field!(Record, int_nullable), |s: &Upstream| s.int_prop)
        .build()
        .unwrap();

    let source = upstream();
    let mut target = empty_record();

    assert!(mapper.map(&source, &mut target));
    assert_eq!(target.int_nullable, Some(42));
    assert!(!mapper.map(&source, &mut target));
}

#[test]
fn caller_expression_adapts_offset_time_to_utc() {
    let mapper = MapperBuilder::<Upstream, Record>::new()
        .bind(field!(Record, offset_as_utc), |s: &Upstream| {
            s.offset_time.map(|t| t.with_timezone(&Utc))
        })
        .build()
        .unwrap();

    let source = upstream();
    let mut target = empty_record();

    assert!(mapper.map(&source, &mut target));
    assert_eq!(
        target.offset_as_utc,
        Some(Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap())
    );
}

// ---------------------------------------------------------------------------
// Build-time rejection
// ---------------------------------------------------------------------------

#[test]
fn read_only_member_fails_the_build() {
    let err = MapperBuilder::<Upstream, Record>::new()
        .bind(
            Accessor::read_only("int_doubled", |r: &Record| r.int_prop * 2),
            |s: &Upstream| s.int_prop,
        )
        .build()
        .unwrap_err();

    assert!(matches!(
        err.issues(),
        [RuleIssue::WriteTarget { field }] if field == "int_doubled"
    ));
}

#[test]
fn narrowing_without_cast_fails_the_build() {
    let err = MapperBuilder::<Upstream, Record>::new()
        .bind(field!(Record, int_prop), |s: &Upstream| s.float_prop)
        .build()
        .unwrap_err();

    assert!(matches!(
        err.issues(),
        [RuleIssue::IncompatibleType {
            field,
            source_type,
            target_type,
        }] if field == "int_prop" && *source_type == "f32" && *target_type == "i32"
    ));
}

#[test]
fn narrowing_with_explicit_cast_is_accepted() {
    let mapper = MapperBuilder::<Upstream, Record>::new()
        .bind(field!(Record, int_prop), |s: &Upstream| s.float_prop as i32)
        .build()
        .unwrap();

    let source = upstream();
    let mut target = empty_record();

    assert!(mapper.map(&source, &mut target));
    assert_eq!(target.int_prop, 43);
}

// ---------------------------------------------------------------------------
// Custom equality strategies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Badge {
    name: String,
    points: u32,
}

#[derive(Debug, Clone)]
struct Player {
    primary: Badge,
    backup: Badge,
}

fn badge(name: &str, points: u32) -> Badge {
    Badge {
        name: name.into(),
        points,
    }
}

#[test]
fn shared_comparer_instance_treats_matching_keys_as_unchanged() {
    // One instance shared by both rules: equality is "same badge name",
    // regardless of points.
    let by_name = comparer_fn(|t: &Badge, s: &Badge| t.name == s.name);

    let mapper = MapperBuilder::<Player, Player>::new()
        .bind_compared(
            field!(Player, primary),
            |p: &Player| p.primary.clone(),
            Arc::clone(&by_name),
        )
        .bind_compared(
            field!(Player, backup),
            |p: &Player| p.backup.clone(),
            by_name,
        )
        .build()
        .unwrap();

    let source = Player {
        primary: badge("gold", 100),
        backup: badge("silver", 50),
    };
    let mut target = Player {
        primary: badge("gold", 1),
        backup: badge("silver", 2),
    };

    // Names match on both members, so nothing counts as changed even though
    // the points differ.
    assert!(!mapper.map(&source, &mut target));
    assert_eq!(target.primary.points, 1);
    assert_eq!(target.backup.points, 2);
    assert!(mapper.diff(&source, &target).is_empty());

    // A differing key copies the whole value.
    target.primary = badge("bronze", 1);
    assert!(mapper.map(&source, &mut target));
    assert_eq!(target.primary, badge("gold", 100));
    assert_eq!(target.backup.points, 2);
}

// ---------------------------------------------------------------------------
// Declaration order
// ---------------------------------------------------------------------------

#[test]
fn diff_rows_follow_declaration_order() {
    let mapper = MapperBuilder::<Upstream, Record>::new()
        .bind(field!(Record, int_prop), |s: &Upstream| s.int_prop)
        .bind(field!(Record, string_prop), |s: &Upstream| {
            s.string_prop.clone()
        })
        .bind(field!(Record, int_nullable), |s: &Upstream| s.int_prop)
        .build()
        .unwrap();

    let fields: Vec<_> = mapper
        .diff(&upstream(), &empty_record())
        .into_iter()
        .map(|row| row.field)
        .collect();
    assert_eq!(fields, vec!["int_prop", "string_prop", "int_nullable"]);
}

#[test]
fn later_rule_wins_when_two_rules_target_one_member() {
    let mapper = MapperBuilder::<Upstream, Record>::new()
        .bind(field!(Record, int_prop), |s: &Upstream| s.int_prop)
        .bind(field!(Record, int_prop), |s: &Upstream| s.int_prop + 1)
        .build()
        .unwrap();

    let source = upstream();
    let mut target = empty_record();

    assert!(mapper.map(&source, &mut target));
    assert_eq!(target.int_prop, 43, "the last declared rule assigns last");
}
