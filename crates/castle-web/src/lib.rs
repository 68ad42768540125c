#![cfg(target_arch = "wasm32")]
//! Browser front end: owns the animation-frame loop, DOM listeners,
//! persistence and network I/O, and exposes a small API to the page.

mod dom;
mod frame;
mod input;
mod net;
mod storage;

use castle_core::hotspot::correct_material;
use castle_core::orbiters::ORBITER_MODELS;
use castle_core::reactions::CastleReactions;
use castle_core::scene::{AssetManifest, CrystalHandles};
use castle_core::{
    Clock, HeroScene, HotspotId, LocationController, SceneConfig, SceneEvent, SystemClock,
    WeatherCache, WeatherCategory, WeatherRequest, WeatherService,
};
use frame::FrameContext;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

const CANVAS_ID: &str = "hero-canvas";

thread_local! {
    static APP: RefCell<Option<Rc<RefCell<FrameContext>>>> = const { RefCell::new(None) };
}

fn app() -> Option<Rc<RefCell<FrameContext>>> {
    APP.with(|a| a.borrow().clone())
}

fn with_app(f: impl FnOnce(&mut FrameContext)) {
    match app() {
        Some(ctx) => f(&mut ctx.borrow_mut()),
        None => log::warn!("castle-web not initialised yet"),
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("castle-web starting");
    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let (vw, _) = dom::viewport_size();
    let config = if input::is_mobile_width(vw) {
        SceneConfig::mobile()
    } else {
        SceneConfig::default()
    };

    let scene = HeroScene::new(config);
    let mut handles = scene.handles();
    handles.attach_lights();
    handles.attach_clouds();
    handles.rain = Some(scene.rain_buffer());

    let clock = SystemClock::new();
    let cache = WeatherCache::with_ttl(clock.clone(), scene.config().weather_ttl);
    let ctx = Rc::new(RefCell::new(FrameContext {
        scene,
        handles,
        weather: WeatherService::new(cache),
        location: LocationController::new(storage::LocalStore::open()),
        clock,
        pointer: glam::Vec2::ZERO,
        drag: input::DragState::default(),
        on_params: None,
        last_instant: Instant::now(),
        packed: Vec::new(),
        effects: Vec::new(),
    }));
    APP.with(|a| *a.borrow_mut() = Some(ctx.clone()));

    install_listeners(&window, &ctx);
    frame::start_loop(ctx);
    Ok(())
}

fn install_listeners(window: &web::Window, ctx: &Rc<RefCell<FrameContext>>) {
    let c = ctx.clone();
    dom::add_listener(window, "pointermove", move |ev: web::PointerEvent| {
        let (vw, vh) = dom::viewport_size();
        let (x, y) = (ev.client_x() as f32, ev.client_y() as f32);
        let mut c = c.borrow_mut();
        c.pointer = castle_core::normalize_pointer(x, y, vw as f32, vh as f32);
        if let Some(d) = c.drag.moved(x, y) {
            c.scene.push(SceneEvent::OrbitDrag { dx: d.x, dy: d.y });
        }
    });
    let c = ctx.clone();
    dom::add_listener(window, "pointerup", move |_: web::PointerEvent| {
        c.borrow_mut().drag.end();
    });

    let canvas = dom::window_document().and_then(|d| d.get_element_by_id(CANVAS_ID));
    match canvas {
        Some(el) => {
            let c = ctx.clone();
            dom::add_listener(&el, "pointerdown", move |ev: web::PointerEvent| {
                if ev.button() == 0 {
                    c.borrow_mut()
                        .drag
                        .begin(ev.client_x() as f32, ev.client_y() as f32);
                }
            });
        }
        None => log::warn!("missing #{CANVAS_ID}; orbit drag disabled"),
    }
}

/// Issues the network fetch for a weather ticket, or publishes a cache hit.
pub(crate) fn handle_weather_request(ctx: &Rc<RefCell<FrameContext>>, req: WeatherRequest) {
    match req {
        WeatherRequest::Disabled => {}
        WeatherRequest::Cached => ctx.borrow_mut().publish_weather(),
        WeatherRequest::Fetch(ticket) => {
            let ctx = ctx.clone();
            spawn_local(async move {
                let result = net::fetch_forecast(ticket.coord).await;
                let mut c = ctx.borrow_mut();
                if c.weather.complete(ticket, result) {
                    c.publish_weather();
                }
            });
        }
    }
}

pub(crate) fn announce_location(ctx: &Rc<RefCell<FrameContext>>) {
    let name = ctx.borrow().location.current().name.clone();
    dom::dispatch("threemodel:location", Some(&name));
}

fn request_current_weather(ctx: &Rc<RefCell<FrameContext>>, refetch: bool) {
    let req = {
        let mut c = ctx.borrow_mut();
        let coord = c.location.current().coord();
        if refetch {
            c.weather.refetch(coord)
        } else {
            c.weather.request(coord)
        }
    };
    handle_weather_request(ctx, req);
}

// ---------------- Page API ----------------

/// Registers `cb(params, effects, rain, status)`, called once per frame.
#[wasm_bindgen]
pub fn on_frame(cb: js_sys::Function) {
    with_app(|c| c.on_params = Some(cb));
}

#[wasm_bindgen]
pub fn asset_manifest() -> String {
    let urls: serde_json::Map<String, serde_json::Value> = AssetManifest::standard()
        .iter()
        .map(|(k, v)| (k.to_string(), v.into()))
        .collect();
    serde_json::Value::Object(urls).to_string()
}

/// A model finished loading. `materials` holds [`input::MATERIAL_STRIDE`]
/// floats per material; the returned array carries any load-time colour
/// corrections the page should apply.
#[wasm_bindgen]
pub fn model_loaded(name: &str, materials: Vec<f32>) -> Vec<f32> {
    let mut mats = input::decode_materials(&materials);
    let Some(ctx) = app() else { return materials };
    let mut c = ctx.borrow_mut();
    if name == "castle" {
        c.handles.attach_castle();
        CastleReactions::attach(&mut c.handles.reactions);
    } else if let Some(id) = HotspotId::from_name(name) {
        for m in &mut mats {
            correct_material(id, m);
        }
        let spec = id.spec();
        let light = castle_core::scene::LightHandle::new(
            glam::Vec3::new(0.0, 0.1, 0.0),
            castle_core::color::hex(spec.light_color),
            0.0,
            0.0,
        );
        c.handles
            .attach_crystal(id, CrystalHandles::from_materials(id, mats.clone(), Some(light)));
    } else if ORBITER_MODELS.iter().any(|(n, _)| *n == name) {
        let slots: Vec<_> = c
            .scene
            .orbiters()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.model == name)
            .map(|(i, s)| (i, s.handles(mats.clone())))
            .collect();
        for (i, h) in slots {
            c.handles.attach_orbiter(i, h);
        }
    } else {
        log::warn!("unknown model {name}");
    }
    log::debug!("model loaded: {name}");
    input::encode_materials(&mats)
}

#[wasm_bindgen]
pub fn set_load_progress(percent: f32) {
    with_app(|c| c.scene.push(SceneEvent::LoadProgress(percent)));
}

#[wasm_bindgen]
pub fn toggle_hotspot(name: &str) {
    match HotspotId::from_name(name) {
        Some(id) => with_app(|c| c.scene.push(SceneEvent::ToggleHotspot(id))),
        None => log::warn!("unknown hotspot {name}"),
    }
}

#[wasm_bindgen]
pub fn clear_hotspot() {
    with_app(|c| c.scene.push(SceneEvent::ClearHotspot));
}

#[wasm_bindgen]
pub fn set_story(active: bool, progress: f32, block: u8) {
    with_app(|c| {
        c.scene.push(SceneEvent::Story {
            active,
            progress,
            block,
        })
    });
}

/// Scroll fraction where the story section ends; negative clears it.
#[wasm_bindgen]
pub fn set_story_end(end: f32) {
    let end = (end >= 0.0).then_some(end);
    with_app(|c| c.scene.push(SceneEvent::StoryEnd(end)));
}

#[wasm_bindgen]
pub fn set_time_lighting(enabled: bool) {
    with_app(|c| c.scene.push(SceneEvent::TimeLighting(enabled)));
}

#[wasm_bindgen]
pub fn set_weather_enabled(enabled: bool) {
    let Some(ctx) = app() else { return };
    {
        let mut c = ctx.borrow_mut();
        c.weather.set_enabled(enabled);
        c.publish_weather();
    }
    if enabled {
        request_current_weather(&ctx, false);
    }
}

/// Preview a category ("clear", "clouds", "rain", "fog", ...); empty clears.
#[wasm_bindgen]
pub fn set_weather_override(name: &str) {
    let category = WeatherCategory::from_name(name);
    if category.is_none() && !name.is_empty() {
        log::warn!("unknown weather category {name}");
    }
    with_app(|c| {
        c.weather.set_override(category);
        c.publish_weather();
    });
}

#[wasm_bindgen]
pub fn refetch_weather() {
    if let Some(ctx) = app() {
        request_current_weather(&ctx, true);
    }
}

/// JSON snapshot for the weather panel.
#[wasm_bindgen]
pub fn weather_status() -> String {
    let Some(ctx) = app() else {
        return "null".into();
    };
    let c = ctx.borrow();
    let effective = c.weather.effective();
    let loc = c.location.current();
    serde_json::json!({
        "enabled": c.weather.is_enabled(),
        "loading": c.weather.is_loading(),
        "error": c.weather.error().map(|e| e.to_string()),
        "override": c.weather.override_category().map(WeatherCategory::as_str),
        "category": effective.as_ref().map(|w| w.category.as_str()),
        "icon": effective.as_ref().map(|w| w.display.icon),
        "label": effective.as_ref().map(|w| w.display.label),
        "temperature": effective.as_ref().map(|w| w.temperature),
        "windSpeed": effective.as_ref().map(|w| w.wind_speed),
        "location": { "name": loc.name, "lat": loc.lat, "lon": loc.lon },
        "geolocating": c.location.is_geolocating(),
    })
    .to_string()
}

#[wasm_bindgen]
pub fn use_default_location() {
    let Some(ctx) = app() else { return };
    ctx.borrow_mut().location.select_default();
    announce_location(&ctx);
    request_current_weather(&ctx, false);
}

#[wasm_bindgen]
pub fn use_my_location() {
    let Some(ctx) = app() else { return };
    let ticket = {
        let mut c = ctx.borrow_mut();
        let now = c.clock.now();
        c.location.begin_geolocation(now)
    };
    let Some(ticket) = ticket else { return };
    spawn_local(async move {
        let coord = match net::current_position().await {
            Ok((lat, lon)) => ctx.borrow_mut().location.fix_acquired(ticket, lat, lon),
            Err(e) => {
                if ctx.borrow_mut().location.fix_failed(ticket, e) {
                    announce_location(&ctx);
                    request_current_weather(&ctx, false);
                }
                return;
            }
        };
        let Some(coord) = coord else { return };
        announce_location(&ctx);
        request_current_weather(&ctx, false);
        let name = net::reverse_geocode(coord).await;
        if ctx.borrow_mut().location.name_resolved(ticket, name) {
            announce_location(&ctx);
        }
    });
}
