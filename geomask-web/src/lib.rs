//! GeoMask Web - the silhouette on a 2D canvas
//!
//! Mounts a [`SilhouetteRenderer`] on a `<canvas>` element, forwards DOM
//! input to it and drives frames with `requestAnimationFrame`.
use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use geomask_core::surface::GradientStop;
use geomask_core::{
    EnvironmentError, FrameTicket, InputEvent, Paint, Rgba, Settings, SilhouetteRenderer, Surface,
};
use nalgebra::Point2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, CanvasGradient, CanvasRenderingContext2d, Document, Event,
    EventTarget, HtmlCanvasElement, HtmlElement, MouseEvent, TouchEvent, VisibilityState, Window,
};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    Ok(())
}

/// A `Surface` backed by a canvas 2D context, in CSS pixels
struct CanvasSurface {
    context: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasSurface {
    fn gradient(&self, paint: &Paint) -> Option<CanvasGradient> {
        let (gradient, stops) = match paint {
            Paint::Solid(_) => return None,
            Paint::Radial {
                center,
                radius,
                stops,
            } => {
                let (x, y) = (center.x as f64, center.y as f64);
                let gradient = self
                    .context
                    .create_radial_gradient(x, y, 0.0, x, y, (*radius).max(0.0) as f64);
                (gradient.map_err(trace).ok()?, stops)
            }
            Paint::Linear { from, to, stops } => (
                self.context.create_linear_gradient(
                    from.x as f64,
                    from.y as f64,
                    to.x as f64,
                    to.y as f64,
                ),
                stops,
            ),
        };
        for GradientStop { offset, color } in stops {
            if let Err(err) = gradient.add_color_stop(offset.clamp(0.0, 1.0), &color.to_string()) {
                trace(err);
            }
        }
        Some(gradient)
    }

    fn set_fill(&self, paint: &Paint) {
        match (paint, self.gradient(paint)) {
            (_, Some(gradient)) => self.context.set_fill_style_canvas_gradient(&gradient),
            (Paint::Solid(color), None) => self.context.set_fill_style_str(&color.to_string()),
            _ => self
                .context
                .set_fill_style_str(&Rgba::TRANSPARENT.to_string()),
        }
    }

    fn set_stroke(&self, paint: &Paint) {
        match (paint, self.gradient(paint)) {
            (_, Some(gradient)) => self.context.set_stroke_style_canvas_gradient(&gradient),
            (Paint::Solid(color), None) => self.context.set_stroke_style_str(&color.to_string()),
            _ => self
                .context
                .set_stroke_style_str(&Rgba::TRANSPARENT.to_string()),
        }
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self) {
        self.context.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn fill_rect(&mut self, origin: Point2<f32>, width: f32, height: f32, paint: &Paint) {
        self.set_fill(paint);
        self.context
            .fill_rect(origin.x as f64, origin.y as f64, width as f64, height as f64);
    }

    fn fill_triangle(&mut self, points: [Point2<f32>; 3], color: Rgba) {
        let ctx = &self.context;
        ctx.begin_path();
        ctx.move_to(points[0].x as f64, points[0].y as f64);
        ctx.line_to(points[1].x as f64, points[1].y as f64);
        ctx.line_to(points[2].x as f64, points[2].y as f64);
        ctx.close_path();
        ctx.set_fill_style_str(&color.to_string());
        ctx.fill();
    }

    fn stroke_line(&mut self, from: Point2<f32>, to: Point2<f32>, width: f32, paint: &Paint) {
        self.set_stroke(paint);
        let ctx = &self.context;
        ctx.set_line_width(width as f64);
        ctx.begin_path();
        ctx.move_to(from.x as f64, from.y as f64);
        ctx.line_to(to.x as f64, to.y as f64);
        ctx.stroke();
    }

    fn fill_circle(&mut self, center: Point2<f32>, radius: f32, paint: &Paint) {
        if radius <= 0.0 {
            return;
        }
        self.set_fill(paint);
        self.context.begin_path();
        match self
            .context
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
        {
            Ok(()) => self.context.fill(),
            Err(err) => trace(err),
        }
    }

    fn stroke_circle(&mut self, center: Point2<f32>, radius: f32, width: f32, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let ctx = &self.context;
        ctx.set_stroke_style_str(&color.to_string());
        ctx.set_line_width(width as f64);
        ctx.begin_path();
        match ctx.arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU) {
            Ok(()) => ctx.stroke(),
            Err(err) => trace(err),
        }
    }

    fn fill_ellipse(&mut self, center: Point2<f32>, radius_x: f32, radius_y: f32, color: Rgba) {
        if radius_x <= 0.0 || radius_y <= 0.0 {
            return;
        }
        let ctx = &self.context;
        ctx.set_fill_style_str(&color.to_string());
        ctx.begin_path();
        match ctx.ellipse(
            center.x as f64,
            center.y as f64,
            radius_x as f64,
            radius_y as f64,
            0.0,
            0.0,
            TAU,
        ) {
            Ok(()) => ctx.fill(),
            Err(err) => trace(err),
        }
    }
}

fn trace(err: JsValue) {
    log::debug!("canvas call failed: {err:?}");
}

/// Everything a mounted silhouette needs between callbacks
struct App {
    renderer: SilhouetteRenderer,
    surface: CanvasSurface,
    canvas: HtmlCanvasElement,
    window: Window,
    document: Document,
}

type Shared = Rc<RefCell<App>>;

impl App {
    fn now(&self) -> f64 {
        self.window.performance().map_or(0.0, |p| p.now())
    }

    /// Match the backing store to the displayed size and device pixel ratio
    fn resize(&mut self) {
        let width = self.canvas.client_width().max(0) as f64;
        let height = self.canvas.client_height().max(0) as f64;
        let ratio = self.window.device_pixel_ratio().max(1.0);

        self.canvas.set_width((width * ratio).round() as u32);
        self.canvas.set_height((height * ratio).round() as u32);
        if let Err(err) = self
            .surface
            .context
            .set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0)
        {
            trace(err);
        }
        self.surface.width = width;
        self.surface.height = height;
        self.renderer.resize(width as f32, height as f32);
    }

    /// Client coordinates to canvas coordinates, and whether they fall inside it
    fn locate(&self, client_x: i32, client_y: i32) -> (Point2<f32>, bool) {
        let rect = self.canvas.get_bounding_client_rect();
        let x = client_x as f64 - rect.left();
        let y = client_y as f64 - rect.top();
        let inside = x >= 0.0 && y >= 0.0 && x <= rect.width() && y <= rect.height();
        (Point2::new(x as f32, y as f32), inside)
    }
}

/// Hand `event` to the renderer and schedule a frame if it resumes rendering
fn dispatch(app: &Shared, event: InputEvent) {
    let ticket = {
        let mut app = app.borrow_mut();
        let now = app.now();
        app.renderer.handle_event(event, now)
    };
    if let Some(ticket) = ticket {
        schedule(app, ticket);
    }
}

fn schedule(app: &Shared, ticket: FrameTicket) {
    let pending = Rc::clone(app);
    let callback = Closure::once_into_js(move |time: f64| frame(&pending, ticket, time));
    let window = app.borrow().window.clone();
    if let Err(err) = window.request_animation_frame(callback.unchecked_ref()) {
        log::warn!("requestAnimationFrame failed: {err:?}");
    }
}

fn frame(app: &Shared, ticket: FrameTicket, time: f64) {
    let next = {
        let mut guard = app.borrow_mut();
        let App {
            renderer, surface, ..
        } = &mut *guard;
        renderer.render_frame(ticket, surface, time)
    };
    if let Some(next) = next {
        schedule(app, next);
    }
}

/// A registered DOM listener, removed again on drop
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach<F>(target: &EventTarget, kind: &'static str, passive: bool, handler: F) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref())
        {
            trace(err);
        }
    }
}

/// First touch point of a touch event, in client coordinates
fn first_touch(event: &Event) -> Option<(i32, i32)> {
    let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
    Some((touch.client_x(), touch.client_y()))
}

fn bind(app: &Shared, container: &HtmlElement) -> Result<Vec<Listener>, JsValue> {
    let (window, document) = {
        let app = app.borrow();
        (app.window.clone(), app.document.clone())
    };
    let mut listeners = Vec::new();

    // Hover is tracked on the window so drags keep following outside the canvas
    let shared = Rc::clone(app);
    listeners.push(Listener::attach(&window, "mousemove", false, move |event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let (position, inside) = shared.borrow().locate(mouse.client_x(), mouse.client_y());
        let dragging = shared.borrow().renderer.input().is_dragging();
        if inside || dragging {
            dispatch(&shared, InputEvent::PointerMove { position });
        }
    })?);

    let shared = Rc::clone(app);
    listeners.push(Listener::attach(container, "mouseleave", false, move |_| {
        dispatch(&shared, InputEvent::PointerLeave);
    })?);

    let shared = Rc::clone(app);
    listeners.push(Listener::attach(container, "mousedown", false, move |event| {
        if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
            let (position, _) = shared.borrow().locate(mouse.client_x(), mouse.client_y());
            dispatch(&shared, InputEvent::PointerDown { position });
        }
    })?);

    let shared = Rc::clone(app);
    listeners.push(Listener::attach(&window, "mouseup", false, move |_| {
        dispatch(&shared, InputEvent::PointerUp);
    })?);

    let shared = Rc::clone(app);
    listeners.push(Listener::attach(container, "touchstart", true, move |event| {
        if let Some((x, y)) = first_touch(&event) {
            let (position, _) = shared.borrow().locate(x, y);
            dispatch(&shared, InputEvent::PointerDown { position });
        }
    })?);

    let shared = Rc::clone(app);
    listeners.push(Listener::attach(container, "touchmove", true, move |event| {
        if let Some((x, y)) = first_touch(&event) {
            let (position, _) = shared.borrow().locate(x, y);
            dispatch(&shared, InputEvent::PointerMove { position });
        }
    })?);

    let shared = Rc::clone(app);
    listeners.push(Listener::attach(container, "touchend", true, move |_| {
        dispatch(&shared, InputEvent::PointerUp);
    })?);

    let shared = Rc::clone(app);
    listeners.push(Listener::attach(&window, "scroll", true, move |_| {
        let offset = shared.borrow().window.scroll_y().unwrap_or(0.0);
        dispatch(&shared, InputEvent::Scroll { offset: offset as f32 });
    })?);

    let shared = Rc::clone(app);
    listeners.push(Listener::attach(&window, "resize", false, move |_| {
        shared.borrow_mut().resize();
    })?);

    let shared = Rc::clone(app);
    listeners.push(Listener::attach(&document, "visibilitychange", false, move |_| {
        let visible = shared.borrow().document.visibility_state() == VisibilityState::Visible;
        dispatch(&shared, InputEvent::Visibility { visible });
    })?);

    Ok(listeners)
}

struct Mounted {
    app: Shared,
    listeners: Vec<Listener>,
}

/// Locate the canvas, its 2D context and the element that receives input
fn environment(
    canvas_id: &str,
) -> Result<(Window, Document, HtmlCanvasElement, CanvasRenderingContext2d, HtmlElement), EnvironmentError>
{
    let window = web_sys::window().ok_or(EnvironmentError::NoSurface)?;
    let document = window.document().ok_or(EnvironmentError::NoSurface)?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok())
        .ok_or(EnvironmentError::NoSurface)?;
    let context = canvas
        .get_context("2d")
        .map_err(|err| EnvironmentError::NoContext(format!("{err:?}")))?
        .and_then(|context| context.dyn_into::<CanvasRenderingContext2d>().ok())
        .ok_or_else(|| EnvironmentError::NoContext("2d".to_string()))?;
    let container = canvas
        .parent_element()
        .and_then(|parent| parent.dyn_into::<HtmlElement>().ok())
        .unwrap_or_else(|| canvas.clone().unchecked_into());
    Ok((window, document, canvas, context, container))
}

#[wasm_bindgen]
pub struct WebRenderer {
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl WebRenderer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebRenderer {
        WebRenderer { mounted: None }
    }

    /// Mount the silhouette on the canvas with id `canvas_id`.
    ///
    /// Resolves to `false`, without rendering, when the canvas or its 2D
    /// context is unavailable.
    pub fn init(&mut self, canvas_id: &str) -> Result<bool, JsValue> {
        self.destroy();

        let (window, document, canvas, context, container) = match environment(canvas_id) {
            Ok(found) => found,
            Err(err) => {
                log::warn!("silhouette disabled: {err}");
                return Ok(false);
            }
        };

        let now = window.performance().map_or(0.0, |p| p.now());
        let renderer = SilhouetteRenderer::new(Settings::default(), now)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let app = Rc::new(RefCell::new(App {
            renderer,
            surface: CanvasSurface {
                context,
                width: 0.0,
                height: 0.0,
            },
            canvas,
            window,
            document,
        }));
        app.borrow_mut().resize();

        let listeners = bind(&app, &container)?;
        let ticket = app.borrow_mut().renderer.start();
        if let Some(ticket) = ticket {
            schedule(&app, ticket);
        }

        self.mounted = Some(Mounted { app, listeners });
        Ok(true)
    }

    /// Stop rendering and remove every listener
    pub fn destroy(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.app.borrow_mut().renderer.shutdown();
            drop(mounted.listeners);
            log::info!("silhouette destroyed");
        }
    }
}

impl Default for WebRenderer {
    fn default() -> Self {
        Self::new()
    }
}
