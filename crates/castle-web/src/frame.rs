use crate::dom;
use crate::input::DragState;
use crate::storage::LocalStore;
use castle_core::scene::ParticlePoint;
use castle_core::{
    Clock, FrameInput, HeroScene, LocationController, SceneEvent, SceneHandles, SceneNotice,
    SystemClock, WeatherRequest, WeatherService,
};
use glam::Vec2;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

pub struct FrameContext {
    pub scene: HeroScene,
    pub handles: SceneHandles,
    pub weather: WeatherService<SystemClock>,
    pub location: LocationController<LocalStore>,
    pub clock: SystemClock,

    pub pointer: Vec2,
    pub drag: DragState,
    pub on_params: Option<js_sys::Function>,

    pub last_instant: Instant,
    pub packed: Vec<f32>,
    pub effects: Vec<f32>,
}

/// What a frame hands to the page once the context is released.
pub struct Published {
    pub notices: Vec<SceneNotice>,
    pub weather_request: Option<WeatherRequest>,
    pub location_changed: bool,
    pub callback: Option<(js_sys::Function, js_sys::Array)>,
}

impl FrameContext {
    /// Forwards the current effective weather to the scene.
    pub fn publish_weather(&mut self) {
        self.scene.push(SceneEvent::Weather(self.weather.effective()));
    }

    pub fn frame(&mut self) -> Published {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32();
        self.last_instant = now;

        let mut weather_request = None;
        let location_changed = self.location.poll_timeout(self.clock.now());
        if location_changed {
            weather_request = Some(self.weather.request(self.location.current().coord()));
        }

        let input = FrameInput {
            dt_sec,
            scroll: dom::scroll_fraction(),
            pointer: self.pointer,
            local_hour: js_sys::Date::new_0().get_hours(),
        };
        self.scene.frame(&input, &mut self.handles);

        let callback = self.on_params.clone().map(|cb| {
            self.handles.pack(&mut self.packed);
            self.handles.pack_effects(&mut self.effects);
            let rain: &[f32] = self
                .handles
                .rain
                .as_ref()
                .map(|r| bytemuck::cast_slice::<ParticlePoint, f32>(&r.points))
                .unwrap_or(&[]);
            let overlay = self.scene.overlay();
            let status = [
                self.scene.fog_opacity(),
                overlay.percent() as f32,
                overlay.glitch_intensity(),
            ];
            let args = js_sys::Array::new();
            args.push(&js_sys::Float32Array::from(&self.packed[..]));
            args.push(&js_sys::Float32Array::from(&self.effects[..]));
            args.push(&js_sys::Float32Array::from(rain));
            args.push(&js_sys::Float32Array::from(&status[..]));
            (cb, args)
        });

        Published {
            notices: self.scene.drain_notices().into_iter().map(|n| n.item).collect(),
            weather_request,
            location_changed,
            callback,
        }
    }
}

/// Runs outside the context borrow so page handlers may call back into
/// the exported API.
fn deliver(ctx: &Rc<RefCell<FrameContext>>, out: Published) {
    for notice in &out.notices {
        dom::dispatch(notice.dom_name(), crate::input::notice_detail(notice));
    }
    if let Some(req) = out.weather_request {
        crate::handle_weather_request(ctx, req);
    }
    if out.location_changed {
        crate::announce_location(ctx);
    }
    if let Some((cb, args)) = out.callback {
        if let Err(e) = cb.apply(&JsValue::NULL, &args) {
            log::error!("params callback error: {e:?}");
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let out = frame_ctx.borrow_mut().frame();
        deliver(&frame_ctx, out);
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let cb = tick.borrow().as_ref().map(|c| c.as_ref().clone());
    let (Some(w), Some(cb)) = (web::window(), cb) else {
        return;
    };
    if let Err(e) = w.request_animation_frame(cb.unchecked_ref()) {
        log::error!("requestAnimationFrame failed: {e:?}");
    }
}
