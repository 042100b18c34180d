mod common;

use common::{metadata, position, telemetry};
use domain::{AssetKind, FilterRule, FilterRuleSet};
use kio_reconcile::merge;

#[test]
fn mac_with_separators_joins_telemetry() {
    let outcome = merge(
        &FilterRuleSet::default(),
        vec![metadata("aa:bb:cc", "Nano Tag", "t1")],
        vec![telemetry("aabbcc", 0, 21.0)],
        vec![],
    );
    assert_eq!(outcome.devices.len(), 1);
    let device = &outcome.devices[0];
    assert_eq!(device.tracking_id, "aabbcc");
    assert_eq!(device.kind, AssetKind::Tag);
    assert_eq!(device.readings.temperature, Some(21.0));
    assert_eq!(outcome.stats.merged, 1);
}

#[test]
fn latest_telemetry_wins() {
    let outcome = merge(
        &FilterRuleSet::default(),
        vec![metadata("aabbcc", "Nano Tag", "t1")],
        vec![
            telemetry("aabbcc", 20, 25.0),
            telemetry("aabbcc", 10, 19.0),
        ],
        vec![],
    );
    assert_eq!(outcome.devices[0].readings.temperature, Some(25.0));
    assert_eq!(outcome.devices[0].captured_at, Some(common::at(20)));
}

#[test]
fn equal_timestamps_keep_first_record() {
    let outcome = merge(
        &FilterRuleSet::default(),
        vec![metadata("aabbcc", "Nano Tag", "t1")],
        vec![
            telemetry("aabbcc", 10, 19.0),
            telemetry("AA:BB:CC", 10, 30.0),
        ],
        vec![],
    );
    assert_eq!(outcome.devices[0].readings.temperature, Some(19.0));
}

#[test]
fn duplicated_batches_merge_to_same_devices() {
    let devices = vec![
        metadata("aabbcc", "Nano Tag", "t1"),
        metadata("ddeeff", "Smart Badge", "b1"),
    ];
    let readings = vec![telemetry("aabbcc", 1, 20.0), telemetry("ddeeff", 2, 22.0)];
    let positions = vec![position("ddeeff", 3, 1.0, 2.0, 7)];

    let once = merge(
        &FilterRuleSet::default(),
        devices.clone(),
        readings.clone(),
        positions.clone(),
    );
    let twice = merge(
        &FilterRuleSet::default(),
        [devices.clone(), devices].concat(),
        [readings.clone(), readings].concat(),
        [positions.clone(), positions].concat(),
    );
    assert_eq!(once.devices, twice.devices);
}

#[test]
fn position_keeps_metadata_fields() {
    let mut item = metadata("aabbcc", "Nano Tag", "t1");
    item.battery_level = 42;
    item.firmware = "2.1".to_string();
    let outcome = merge(
        &FilterRuleSet::default(),
        vec![item],
        vec![telemetry("aabbcc", 1, 20.0)],
        vec![position("aabbcc", 5, 10.0, 5.0, 3)],
    );
    let device = &outcome.devices[0];
    assert_eq!(device.battery_level, 42);
    assert_eq!(device.firmware, "2.1");
    assert_eq!(device.name, "t1");
    assert_eq!(device.readings.temperature, Some(20.0));
    let local = device.position.expect("position");
    assert_eq!((local.x, local.y, local.floor_id), (10.0, 5.0, 3));
}

#[test]
fn position_only_device_is_merged() {
    let outcome = merge(
        &FilterRuleSet::default(),
        vec![metadata("aabbcc", "Puck Beacon", "p1")],
        vec![],
        vec![
            position("aabbcc", 1, 1.0, 1.0, 3),
            position("aabbcc", 9, 4.0, 4.0, 3),
        ],
    );
    assert_eq!(outcome.devices.len(), 1);
    let device = &outcome.devices[0];
    assert_eq!(device.kind, AssetKind::Beacon);
    assert_eq!(device.captured_at, None);
    assert_eq!(device.position.map(|p| p.x), Some(4.0));
}

#[test]
fn unmatched_and_unsupported_are_counted() {
    let outcome = merge(
        &FilterRuleSet::default(),
        vec![
            metadata("aabbcc", "Portal Light", "l1"),
            metadata("ddeeff", "Portal Beam", "pb"),
        ],
        vec![
            telemetry("aabbcc", 1, 20.0),
            telemetry("ddeeff", 1, 20.0),
            telemetry("112233", 1, 20.0),
        ],
        vec![],
    );
    assert_eq!(outcome.devices.len(), 1);
    assert_eq!(outcome.devices[0].kind, AssetKind::PortalBeam);
    assert_eq!(outcome.stats.unmatched, 1);
    assert_eq!(outcome.stats.unsupported, 1);
}

#[test]
fn filtered_devices_are_dropped_before_merge() {
    let rules = FilterRuleSet::new(vec![vec![FilterRule::new("product", "Nano Tag")]]);
    let outcome = merge(
        &rules,
        vec![
            metadata("aabbcc", "Nano Tag", "t1"),
            metadata("ddeeff", "Smart Badge", "b1"),
        ],
        vec![telemetry("aabbcc", 1, 20.0), telemetry("ddeeff", 1, 20.0)],
        vec![],
    );
    assert_eq!(outcome.devices.len(), 1);
    assert_eq!(outcome.devices[0].tracking_id, "aabbcc");
    assert_eq!(outcome.stats.filtered, 1);
    assert_eq!(outcome.stats.unmatched, 0);
}

#[test]
fn positions_of_filtered_devices_are_not_unmatched() {
    let rules = FilterRuleSet::new(vec![vec![FilterRule::new("product", "Nano Tag")]]);
    let outcome = merge(
        &rules,
        vec![
            metadata("aabbcc", "Nano Tag", "t1"),
            metadata("dd:ee:ff", "Smart Badge", "b1"),
        ],
        vec![],
        vec![
            position("aabbcc", 1, 1.0, 2.0, 10),
            position("ddeeff", 1, 3.0, 4.0, 10),
            position("ddeeff", 2, 5.0, 6.0, 10),
            position("112233", 1, 7.0, 8.0, 10),
        ],
    );
    assert_eq!(outcome.devices.len(), 1);
    assert_eq!(outcome.stats.filtered, 1);
    // 只有设备清单里完全没有的 112233 计入 unmatched
    assert_eq!(outcome.stats.unmatched, 1);
}

#[test]
fn filter_error_drops_every_device_it_touches() {
    let rules = FilterRuleSet::new(vec![vec![FilterRule::new("colour", ".*")]]);
    let outcome = merge(
        &rules,
        vec![metadata("aabbcc", "Nano Tag", "t1")],
        vec![telemetry("aabbcc", 1, 20.0)],
        vec![],
    );
    assert!(outcome.devices.is_empty());
    assert_eq!(outcome.stats.filter_errors, 1);
}

#[test]
fn metadata_only_device_is_not_output() {
    let outcome = merge(
        &FilterRuleSet::default(),
        vec![metadata("aabbcc", "Nano Tag", "t1")],
        vec![],
        vec![],
    );
    assert!(outcome.devices.is_empty());
}

#[test]
fn output_is_sorted_by_tracking_id() {
    let outcome = merge(
        &FilterRuleSet::default(),
        vec![
            metadata("cc", "Nano Tag", "c"),
            metadata("aa", "Nano Tag", "a"),
        ],
        vec![telemetry("cc", 1, 1.0), telemetry("aa", 1, 1.0)],
        vec![],
    );
    let ids: Vec<_> = outcome
        .devices
        .iter()
        .map(|device| device.tracking_id.as_str())
        .collect();
    assert_eq!(ids, vec!["aa", "cc"]);
}
