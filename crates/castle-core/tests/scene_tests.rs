use castle_core::camera::CameraMode;
use castle_core::constants::STORY_TINT_COLOR;
use castle_core::hotspot::HOTSPOT_COUNT;
use castle_core::scene::{CrystalHandles, LightHandle, MaterialHandle};
use castle_core::{
    FrameInput, HeroScene, HotspotId, SceneConfig, SceneEvent, SceneHandles, SceneNotice,
    ScenePhase, WeatherCategory, WeatherSnapshot,
};
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DT: f32 = 1.0 / 60.0;

fn input(pointer: Vec2) -> FrameInput {
    FrameInput {
        dt_sec: DT,
        scroll: 0.0,
        pointer,
        local_hour: 12,
    }
}

fn loaded_scene(config: SceneConfig) -> (HeroScene, SceneHandles) {
    let scene = HeroScene::new(config);
    let mut handles = scene.handles();
    handles.attach_lights();
    handles.attach_castle();
    handles.attach_clouds();
    handles.rain = Some(scene.rain_buffer());
    (scene, handles)
}

fn run_until(
    scene: &mut HeroScene,
    handles: &mut SceneHandles,
    input: FrameInput,
    phase: ScenePhase,
) -> u32 {
    let mut frames = 0;
    while scene.phase() != phase {
        scene.frame(&input, handles);
        frames += 1;
        assert!(frames < 1000, "never reached {phase:?}");
    }
    frames
}

#[test]
fn load_fog_ready_and_parallax_gate() {
    let (mut scene, mut h) = loaded_scene(SceneConfig::default());
    let pointer = Vec2::new(0.4, -0.3);

    for _ in 0..30 {
        scene.frame(&input(pointer), &mut h);
    }
    assert_eq!(scene.phase(), ScenePhase::Loading);
    assert_eq!(scene.camera().parallax_offset(), Vec2::ZERO);

    scene.push(SceneEvent::LoadProgress(100.0));
    let settle = run_until(&mut scene, &mut h, input(pointer), ScenePhase::Fog);
    let settle_sec = settle as f32 * DT;
    assert!((0.49..0.55).contains(&settle_sec), "settle took {settle_sec}s");
    assert_eq!(scene.camera().parallax_offset(), Vec2::ZERO);

    let dwell = run_until(&mut scene, &mut h, input(pointer), ScenePhase::Ready);
    let dwell_sec = dwell as f32 * DT;
    assert!((1.98..2.05).contains(&dwell_sec), "fog took {dwell_sec}s");

    let before = h.camera.eye;
    for _ in 0..10 {
        scene.frame(&input(pointer), &mut h);
    }
    let offset = scene.camera().parallax_offset();
    assert!(offset.x > 0.0 && offset.y > 0.0);
    assert_ne!(h.camera.eye, before);

    let notices: Vec<_> = scene.drain_notices().into_iter().map(|n| n.item).collect();
    assert_eq!(
        notices,
        vec![
            SceneNotice::PhaseChanged(ScenePhase::Fog),
            SceneNotice::Revealed,
            SceneNotice::PhaseChanged(ScenePhase::Ready),
        ]
    );
}

#[test]
fn progress_dip_cancels_settle() {
    let (mut scene, mut h) = loaded_scene(SceneConfig::default());
    scene.push(SceneEvent::LoadProgress(100.0));
    for _ in 0..20 {
        scene.frame(&input(Vec2::ZERO), &mut h);
    }
    scene.push(SceneEvent::LoadProgress(80.0));
    for _ in 0..60 {
        scene.frame(&input(Vec2::ZERO), &mut h);
    }
    assert_eq!(scene.phase(), ScenePhase::Loading);
}

#[test]
fn phase_never_regresses() {
    let mut rng = StdRng::seed_from_u64(9);
    for _ in 0..20 {
        let (mut scene, mut h) = loaded_scene(SceneConfig::default());
        let mut seen = ScenePhase::Loading;
        for _ in 0..600 {
            if rng.gen_bool(0.2) {
                let p = if rng.gen_bool(0.5) { 100.0 } else { rng.gen_range(0.0..100.0) };
                scene.push(SceneEvent::LoadProgress(p));
            }
            scene.frame(&input(Vec2::ZERO), &mut h);
            assert!(scene.phase() >= seen);
            seen = scene.phase();
        }
    }
}

#[test]
fn missing_objects_are_skipped_until_attached() {
    let mut scene = HeroScene::new(SceneConfig::default());
    let mut h = scene.handles();
    scene.push(SceneEvent::ToggleHotspot(HotspotId::Database));
    for _ in 0..10 {
        scene.frame(&input(Vec2::ZERO), &mut h);
    }
    assert!(h.cyan.is_none());

    let glow = MaterialHandle {
        emissive: Vec3::ONE,
        ..MaterialHandle::default()
    };
    h.attach_crystal(
        HotspotId::Database,
        CrystalHandles::from_materials(
            HotspotId::Database,
            vec![glow],
            Some(LightHandle::new(Vec3::new(0.0, 0.1, 0.0), Vec3::ONE, 2.0, 1.2)),
        ),
    );
    scene.frame(&input(Vec2::ZERO), &mut h);
    let c = h.crystals[HotspotId::Database.index()].as_ref().unwrap();
    assert_eq!(c.transform.scale, Vec3::splat(0.14));
    assert_eq!(c.light.unwrap().intensity, 4.0);
    assert!(c.emissive[0].emissive_intensity > 5.0);
    assert!(c.transform.position.length() > 1.0);
}

#[test]
fn replay_is_deterministic() {
    let rain = WeatherSnapshot::synthesized(WeatherCategory::Rain, None);
    let run = || {
        let (mut scene, mut h) = loaded_scene(SceneConfig::default());
        scene.push(SceneEvent::LoadProgress(100.0));
        scene.push(SceneEvent::Weather(Some(rain.clone())));
        for i in 0..400 {
            if i == 150 {
                scene.push(SceneEvent::ToggleHotspot(HotspotId::AiCube));
            }
            let f = FrameInput {
                dt_sec: DT,
                scroll: (i as f32 / 400.0).min(1.0),
                pointer: Vec2::new(0.1, 0.2),
                local_hour: 21,
            };
            scene.frame(&f, &mut h);
        }
        h
    };
    assert_eq!(run(), run());
}

#[test]
fn database_crystal_triples_cyan_light() {
    let (mut base_scene, mut base) = loaded_scene(SceneConfig::default());
    let (mut scene, mut h) = loaded_scene(SceneConfig::default());
    scene.push(SceneEvent::ToggleHotspot(HotspotId::Database));
    for _ in 0..400 {
        base_scene.frame(&input(Vec2::ZERO), &mut base);
        scene.frame(&input(Vec2::ZERO), &mut h);
    }
    let ratio = h.cyan.unwrap().intensity / base.cyan.unwrap().intensity;
    assert!((ratio - 3.0).abs() < 1e-2, "ratio {ratio}");
}

#[test]
fn hotspot_notices_follow_toggles() {
    let (mut scene, mut h) = loaded_scene(SceneConfig::default());
    scene.push(SceneEvent::ToggleHotspot(HotspotId::GearNature));
    scene.push(SceneEvent::ToggleHotspot(HotspotId::GearNature));
    scene.push(SceneEvent::ClearHotspot);
    scene.frame(&input(Vec2::ZERO), &mut h);
    let notices: Vec<_> = scene.drain_notices().into_iter().map(|n| n.item).collect();
    assert_eq!(
        notices,
        vec![
            SceneNotice::HotspotChanged(Some(HotspotId::GearNature)),
            SceneNotice::HotspotChanged(None),
        ]
    );
    assert_eq!(scene.active_hotspot(), None);
}

#[test]
fn weather_eases_in_and_degrades_to_neutral() {
    let (mut scene, mut h) = loaded_scene(SceneConfig::default());
    scene.push(SceneEvent::Weather(Some(WeatherSnapshot::synthesized(
        WeatherCategory::Rain,
        None,
    ))));
    scene.frame(&input(Vec2::ZERO), &mut h);
    let first = scene.drivers().weather.rain;
    assert!(first > 0.0 && first < 0.1);
    for _ in 0..300 {
        scene.frame(&input(Vec2::ZERO), &mut h);
    }
    assert!(scene.drivers().weather.rain > 0.99);
    assert!(h.rain.as_ref().unwrap().visible);

    scene.push(SceneEvent::Weather(None));
    for _ in 0..600 {
        scene.frame(&input(Vec2::ZERO), &mut h);
    }
    let w = scene.drivers().weather;
    assert!((w.ambient - 1.0).abs() < 1e-3);
    assert!(w.rain < 1e-3);
}

#[test]
fn time_of_day_lighting_toggle() {
    let (mut scene, mut h) = loaded_scene(SceneConfig::default());
    let night = FrameInput {
        local_hour: 23,
        ..input(Vec2::ZERO)
    };
    scene.frame(&night, &mut h);
    let neutral = scene.lighting().ambient;
    scene.push(SceneEvent::TimeLighting(true));
    scene.frame(&night, &mut h);
    assert_eq!(scene.time_multipliers().ambient, 0.5);
    assert!((scene.lighting().ambient - neutral * 0.5).abs() < 1e-5);
}

#[test]
fn story_owns_the_camera() {
    let (mut scene, mut h) = loaded_scene(SceneConfig::default());
    scene.push(SceneEvent::LoadProgress(100.0));
    run_until(&mut scene, &mut h, input(Vec2::ZERO), ScenePhase::Ready);
    let yaw = scene.camera().orbit().yaw;
    scene.push(SceneEvent::Story {
        active: true,
        progress: 0.5,
        block: 4,
    });
    scene.push(SceneEvent::OrbitDrag { dx: 100.0, dy: 0.0 });
    for _ in 0..300 {
        scene.frame(&input(Vec2::new(0.5, 0.5)), &mut h);
    }
    assert_eq!(scene.camera().mode(), CameraMode::Story);
    assert_eq!(scene.camera().orbit().yaw, yaw);
    assert!(scene.camera().parallax_offset().length() < 1e-6);
    let target = scene.story().camera_target();
    assert!(h.camera.eye.distance(target) < 1e-3);
}

#[test]
fn story_range_is_excluded_from_scroll() {
    let config = SceneConfig {
        story_end: Some(0.4),
        ..SceneConfig::default()
    };
    let (mut scene, mut h) = loaded_scene(config);
    let f = FrameInput {
        scroll: 0.3,
        ..input(Vec2::ZERO)
    };
    scene.frame(&f, &mut h);
    assert_eq!(scene.scroll().adjusted, 0.0);
    assert_eq!(h.castle.unwrap().rotation.y, 0.0);
    let f = FrameInput {
        scroll: 0.7,
        ..input(Vec2::ZERO)
    };
    scene.frame(&f, &mut h);
    assert!((scene.scroll().adjusted - 0.5).abs() < 1e-6);
}

fn story(active: bool, block: u8) -> SceneEvent {
    SceneEvent::Story {
        active,
        progress: 0.5,
        block,
    }
}

/// Steps a story scene and a plain one in lockstep.
fn lockstep(a: &mut HeroScene, b: &mut HeroScene, h: &mut [SceneHandles; 2], frames: u32) {
    for _ in 0..frames {
        a.frame(&input(Vec2::ZERO), &mut h[0]);
        b.frame(&input(Vec2::ZERO), &mut h[1]);
    }
}

#[test]
fn story_blocks_boost_cyan() {
    for (block, gain) in [(1, 1.4), (3, 1.3), (2, 1.0)] {
        let (mut story_scene, h0) = loaded_scene(SceneConfig::default());
        let (mut plain, h1) = loaded_scene(SceneConfig::default());
        let mut h = [h0, h1];
        story_scene.push(story(true, block));
        lockstep(&mut story_scene, &mut plain, &mut h, 30);
        let ratio = story_scene.lighting().cyan / plain.lighting().cyan;
        assert!((ratio - gain).abs() < 1e-4, "block {block}: ratio {ratio}");
        assert_eq!(h[0].cyan.unwrap().intensity, story_scene.lighting().cyan);
    }
}

#[test]
fn third_block_tints_ambient_until_story_ends() {
    let (mut story_scene, h0) = loaded_scene(SceneConfig::default());
    let (mut plain, h1) = loaded_scene(SceneConfig::default());
    let mut h = [h0, h1];
    let base = plain.lighting().ambient_color;

    story_scene.push(story(true, 3));
    lockstep(&mut story_scene, &mut plain, &mut h, 2);
    let early = story_scene.lighting().ambient_color;
    assert!(early.distance(base) > 1e-3);
    assert!(early.distance(STORY_TINT_COLOR) > 0.1, "tint should ease in");

    lockstep(&mut story_scene, &mut plain, &mut h, 400);
    assert!(story_scene.lighting().ambient_color.distance(STORY_TINT_COLOR) < 1e-3);

    story_scene.push(story(false, 3));
    lockstep(&mut story_scene, &mut plain, &mut h, 400);
    let back = story_scene.lighting().ambient_color;
    assert!(back.distance(plain.lighting().ambient_color) < 1e-3);
    assert_eq!(story_scene.lighting().cyan, plain.lighting().cyan);
}

#[test]
fn first_block_leaves_ambient_colour_alone() {
    let (mut story_scene, h0) = loaded_scene(SceneConfig::default());
    let (mut plain, h1) = loaded_scene(SceneConfig::default());
    let mut h = [h0, h1];
    story_scene.push(story(true, 1));
    lockstep(&mut story_scene, &mut plain, &mut h, 120);
    assert_eq!(story_scene.lighting().ambient_color, plain.lighting().ambient_color);
}

#[test]
fn orbiters_follow_roster() {
    let desktop = HeroScene::new(SceneConfig::default());
    let mobile = HeroScene::new(SceneConfig::mobile());
    assert_eq!(desktop.handles().orbiters.len(), desktop.orbiters().len());
    assert!(mobile.orbiters().len() < desktop.orbiters().len());
    assert_eq!(mobile.rain_buffer().points.len(), 400);
    assert_eq!(HOTSPOT_COUNT, 5);
}
