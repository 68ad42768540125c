// Host-side tests for pure input functions.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod input {
    include!("../src/input.rs");
}

use castle_core::error::AdapterError;
use castle_core::hotspot::correct_material;
use castle_core::{HotspotId, SceneNotice, ScenePhase};
use glam::Vec2;
use input::*;

#[test]
fn scroll_fraction_guards_short_pages() {
    assert_eq!(scroll_fraction(0.0, 800.0, 800.0), 0.0);
    assert_eq!(scroll_fraction(100.0, 500.0, 800.0), 0.0);
    assert_eq!(scroll_fraction(600.0, 2000.0, 800.0), 0.5);
    assert_eq!(scroll_fraction(5000.0, 2000.0, 800.0), 1.0);
}

#[test]
fn mobile_breakpoint() {
    assert!(is_mobile_width(767.0));
    assert!(!is_mobile_width(768.0));
}

#[test]
fn drag_reports_deltas_only_while_held() {
    let mut d = DragState::default();
    assert_eq!(d.moved(10.0, 10.0), None);
    d.begin(10.0, 10.0);
    assert_eq!(d.moved(14.0, 7.0), Some(Vec2::new(4.0, -3.0)));
    assert_eq!(d.moved(14.0, 7.0), None);
    d.end();
    assert_eq!(d.moved(20.0, 20.0), None);
}

#[test]
fn notice_details() {
    assert_eq!(
        notice_detail(&SceneNotice::HotspotChanged(Some(HotspotId::Database))),
        Some(HotspotId::Database.as_str())
    );
    assert_eq!(notice_detail(&SceneNotice::HotspotChanged(None)), None);
    assert_eq!(notice_detail(&SceneNotice::PhaseChanged(ScenePhase::Fog)), Some("fog"));
    assert_eq!(notice_detail(&SceneNotice::Revealed), None);
}

#[test]
fn geolocation_error_codes() {
    assert_eq!(geolocation_error(Some(1.0)), AdapterError::Denied);
    assert_eq!(geolocation_error(Some(3.0)), AdapterError::Timeout);
    assert_eq!(geolocation_error(Some(2.0)), AdapterError::Unavailable);
    assert_eq!(geolocation_error(None), AdapterError::Unavailable);
}

#[test]
fn hologram_correction_survives_the_material_bridge() {
    let flat = [0.9, 0.9, 0.9, 0.0, 0.0, 0.0, 1.0, 0.1, 0.1, 0.1, 0.0, 0.5, 0.5, 1.0];
    let mut mats = decode_materials(&flat);
    assert_eq!(mats.len(), 2);
    assert!(mats[1].is_emissive());
    for m in &mut mats {
        correct_material(HotspotId::HologramDisc, m);
    }
    let out = encode_materials(&mats);
    assert_eq!(out.len(), flat.len());
    assert!(out[0] < 0.5, "bright material darkened");
    assert!((out[6] - 0.7).abs() < 1e-6);
    assert_eq!(&out[7..], &flat[7..]);
}
