//! Sinner Roulette entry point
//!
//! Wires the selection engine to the page in the browser. Natively it runs a
//! headless sinner + persona draw and prints the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use sinner_roulette::consts::RUN_TIMER_TICK_MS;
    use sinner_roulette::engine::{ScrollPhase, SecureRandom, SelectionEvent, SpinStart};
    use sinner_roulette::platform::dom::{ListView, TimerView};
    use sinner_roulette::ranking::{PersonalRanking, PersonalRecord, now_iso};
    use sinner_roulette::{
        AppConfig, Catalog, FilterState, RankingError, RunTimer, SelectionEngine, ValidationError,
        WheelKind,
    };

    const WHEELS: [WheelKind; 2] = [WheelKind::Sinner, WheelKind::Persona];

    /// A `setInterval` registration. Dropping it after `clear` releases the closure.
    struct Interval {
        handle: i32,
        _closure: Closure<dyn FnMut()>,
    }

    impl Interval {
        fn new(ms: u32, f: impl FnMut() + 'static) -> Option<Self> {
            let closure = Closure::<dyn FnMut()>::new(f);
            let window = web_sys::window()?;
            match window.set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                ms as i32,
            ) {
                Ok(handle) => Some(Self {
                    handle,
                    _closure: closure,
                }),
                Err(e) => {
                    log::error!("Failed to start interval: {:?}", e);
                    None
                }
            }
        }

        fn clear(self) {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(self.handle);
            }
        }
    }

    /// Application instance holding all state
    pub struct App {
        engine: SelectionEngine,
        sinner_view: Option<ListView>,
        persona_view: Option<ListView>,
        sinner_timer: Option<Interval>,
        persona_timer: Option<Interval>,
        tick_interval_ms: u32,
        ranking: PersonalRanking,
        run_timer: RunTimer,
        run_interval: Option<Interval>,
        timer_view: TimerView,
    }

    impl App {
        fn view(&self, kind: WheelKind) -> Option<&ListView> {
            match kind {
                WheelKind::Sinner => self.sinner_view.as_ref(),
                WheelKind::Persona => self.persona_view.as_ref(),
            }
        }

        fn timer_mut(&mut self, kind: WheelKind) -> &mut Option<Interval> {
            match kind {
                WheelKind::Sinner => &mut self.sinner_timer,
                WheelKind::Persona => &mut self.persona_timer,
            }
        }

        /// Clear the interval before dropping its closure
        fn clear_timer(&mut self, kind: WheelKind) {
            if let Some(timer) = self.timer_mut(kind).take() {
                timer.clear();
            }
        }

        /// Rebuild the rows of `kind` and jump to the engine's offset
        fn render(&self, kind: WheelKind) {
            let Some(view) = self.view(kind) else {
                return;
            };
            let entries = self.engine.entries(kind);
            let result = view
                .render(self.engine.list(kind), &entries)
                .and_then(|_| view.set_offset(self.engine.offset(kind), None));
            if let Err(e) = result {
                log::error!("Failed to render {} list: {:?}", kind.as_str(), e);
            }
        }

        fn apply_highlight(&self, kind: WheelKind) {
            if let Some(view) = self.view(kind) {
                if let Err(e) = view.apply_highlight(self.engine.list(kind)) {
                    log::warn!("Failed to update {} highlight: {:?}", kind.as_str(), e);
                }
            }
        }

        /// Button states and result labels
        fn sync_controls(&self) {
            for kind in WHEELS {
                if let Some(view) = self.view(kind) {
                    view.set_buttons(self.engine.can_start(kind), self.engine.can_stop(kind));
                }
            }
            let (sinner, persona) = self.engine.selection().names();
            if let Some(view) = &self.sinner_view {
                view.set_selected(sinner);
            }
            if let Some(view) = &self.persona_view {
                view.set_selected(persona);
            }
        }

        /// Bring the page up to date after an engine change
        fn after_change(&mut self, rerender: &[WheelKind]) {
            let mut rerender = rerender.to_vec();
            for event in self.engine.drain_events() {
                match &event {
                    SelectionEvent::PersonaListRebuilt { .. } => {
                        if !rerender.contains(&WheelKind::Persona) {
                            rerender.push(WheelKind::Persona);
                        }
                    }
                    SelectionEvent::EasterEggCheck { sinner, persona } => {
                        log::debug!("Easter egg check: {} / {}", sinner, persona);
                    }
                    _ => log::debug!("{:?}", event),
                }
            }

            for kind in WHEELS {
                if rerender.contains(&kind) {
                    self.render(kind);
                } else {
                    self.apply_highlight(kind);
                }
            }
            self.sync_controls();
        }

        /// Run a filter edit. Only wheels whose spin the rebuild cancelled lose their interval.
        fn edit_filters(
            &mut self,
            f: impl FnOnce(&mut SelectionEngine) -> Result<(), ValidationError>,
        ) -> Result<(), ValidationError> {
            let result = f(&mut self.engine);
            for kind in WHEELS {
                if self.engine.phase(kind) != ScrollPhase::Spinning {
                    self.clear_timer(kind);
                }
            }
            self.after_change(&WHEELS);
            result
        }

        fn stop_run_interval(&mut self) {
            if let Some(interval) = self.run_interval.take() {
                interval.clear();
            }
        }
    }

    thread_local! {
        static APP: RefCell<Option<Rc<RefCell<App>>>> = const { RefCell::new(None) };
    }

    /// Run a closure against the app, if it has started
    pub fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
        let app = app_handle()?;
        let mut app = app.borrow_mut();
        Some(f(&mut app))
    }

    pub fn alert(message: &str) {
        log::warn!("{}", message);
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    /// Resolve after `ms` milliseconds
    async fn sleep_ms(ms: u32) {
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    &resolve,
                    ms as i32,
                );
            }
        });
        let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Sinner Roulette starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document available");
            return;
        };

        let config = AppConfig::load();
        let catalog = match Catalog::builtin() {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("Failed to load sinner data: {}", e);
                return;
            }
        };
        let filters = FilterState::load(&catalog);

        let views = WHEELS.map(|kind| match ListView::new(&document, kind) {
            Ok(view) => Some(view),
            Err(e) => {
                log::error!("{} list disabled: {}", kind.as_str(), e);
                None
            }
        });
        let [sinner_view, persona_view] = views;

        let engine = SelectionEngine::new(catalog, filters, SecureRandom::new(), config.scroll.clone());
        let app = Rc::new(RefCell::new(App {
            engine,
            sinner_view,
            persona_view,
            sinner_timer: None,
            persona_timer: None,
            tick_interval_ms: config.scroll.tick_interval_ms,
            ranking: PersonalRanking::load(),
            run_timer: RunTimer::new(),
            run_interval: None,
            timer_view: TimerView::new(&document),
        }));

        for kind in WHEELS {
            setup_buttons(app.clone(), kind);
        }
        setup_run_timer(app.clone());
        app.borrow_mut().after_change(&WHEELS);

        let invalid = app.borrow().engine.validate_filters().err();
        APP.with(|cell| *cell.borrow_mut() = Some(app));

        if let Some(e) = invalid {
            alert(&e.to_string());
        }

        log::info!("Sinner Roulette ready");
    }

    fn setup_buttons(app: Rc<RefCell<App>>, kind: WheelKind) {
        let (start_btn, stop_btn) = {
            let a = app.borrow();
            let Some(view) = a.view(kind) else {
                return;
            };
            (view.start_button().clone(), view.stop_button().clone())
        };

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                start_spin(&app, kind);
            });
            let _ = start_btn
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                stop_spin(&app, kind);
            });
            let _ = stop_btn
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn start_spin(app: &Rc<RefCell<App>>, kind: WheelKind) {
        let mut a = app.borrow_mut();
        let outcome = a.engine.start_spin(kind);
        match outcome {
            Err(e) => {
                drop(a);
                alert(&e.to_string());
            }
            Ok(SpinStart::Immediate) => a.after_change(&[]),
            Ok(SpinStart::AlreadySpinning | SpinStart::Blocked) => {}
            Ok(SpinStart::Spinning(_)) => {
                if let Some(view) = a.view(kind) {
                    let _ = view.set_offset(a.engine.offset(kind), None);
                }
                a.after_change(&[]);

                let tick_app = app.clone();
                let interval = Interval::new(a.tick_interval_ms, move || {
                    let mut a = tick_app.borrow_mut();
                    if let Some(offset) = a.engine.tick(kind) {
                        if let Some(view) = a.view(kind) {
                            let _ = view.set_offset(offset, None);
                        }
                    }
                });
                *a.timer_mut(kind) = interval;
            }
        }
    }

    fn stop_spin(app: &Rc<RefCell<App>>, kind: WheelKind) {
        let mut a = app.borrow_mut();
        a.clear_timer(kind);

        let plan = match a.engine.stop_spin(kind) {
            Ok(Some(plan)) => plan,
            Ok(None) => return,
            Err(e) => {
                a.after_change(&WHEELS);
                drop(a);
                alert(&e.to_string());
                return;
            }
        };

        if let Some(view) = a.view(kind) {
            if let Err(e) = view.set_offset(plan.target_offset, Some((plan.duration_ms, plan.easing))) {
                log::warn!("Failed to start snap: {:?}", e);
            }
        }
        a.sync_controls();
        drop(a);

        let app = app.clone();
        wasm_bindgen_futures::spawn_local(async move {
            sleep_ms(plan.duration_ms).await;
            let mut a = app.borrow_mut();
            if a.engine.finish_spin(kind, plan.token) {
                a.after_change(&[]);
            }
        });
    }

    // === Run timer ===

    fn setup_run_timer(app: Rc<RefCell<App>>) {
        let buttons = {
            let a = app.borrow();
            a.timer_view.update(&a.run_timer);
            [
                a.timer_view.start_button().cloned(),
                a.timer_view.pause_button().cloned(),
                a.timer_view.reset_button().cloned(),
            ]
        };
        let actions: [fn(&Rc<RefCell<App>>); 3] = [start_run_timer, pause_run_timer, reset_run_timer];

        for (btn, action) in buttons.into_iter().zip(actions) {
            let Some(btn) = btn else {
                continue;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                action(&app);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn start_run_timer(app: &Rc<RefCell<App>>) {
        let mut a = app.borrow_mut();
        if !a.run_timer.start() {
            return;
        }
        let tick_app = app.clone();
        a.run_interval = Interval::new(RUN_TIMER_TICK_MS, move || {
            let mut a = tick_app.borrow_mut();
            if a.run_timer.tick().is_some() {
                a.timer_view.update(&a.run_timer);
            }
        });
        a.timer_view.update(&a.run_timer);
    }

    fn pause_run_timer(app: &Rc<RefCell<App>>) {
        let mut a = app.borrow_mut();
        if a.run_timer.pause() {
            a.stop_run_interval();
        }
        a.timer_view.update(&a.run_timer);
    }

    fn reset_run_timer(app: &Rc<RefCell<App>>) {
        let mut a = app.borrow_mut();
        a.stop_run_interval();
        a.run_timer.reset();
        a.timer_view.update(&a.run_timer);
        log::info!("Run timer reset");
    }

    fn app_handle() -> Option<Rc<RefCell<App>>> {
        APP.with(|cell| cell.borrow().clone())
    }

    pub fn start_timer() {
        if let Some(app) = app_handle() {
            start_run_timer(&app);
        }
    }

    pub fn pause_timer() {
        if let Some(app) = app_handle() {
            pause_run_timer(&app);
        }
    }

    pub fn reset_timer() {
        if let Some(app) = app_handle() {
            reset_run_timer(&app);
        }
    }

    pub fn elapsed_seconds() -> f64 {
        with_app(|app| app.run_timer.elapsed_seconds() as f64).unwrap_or(0.0)
    }

    // === Filter panel / result panel bindings ===

    /// Apply a filter edit, alerting when it emptied a spinning list
    fn edit_filters(f: impl FnOnce(&mut SelectionEngine) -> Result<(), ValidationError>) {
        if let Some(Err(e)) = with_app(|app| app.edit_filters(f)) {
            alert(&e.to_string());
        }
    }

    pub fn set_sinner_enabled(id: u32, enabled: bool) {
        edit_filters(|engine| engine.set_sinner_enabled(id, enabled));
    }

    pub fn set_persona_enabled(id: u32, index: usize, enabled: bool) {
        edit_filters(|engine| engine.set_persona_enabled(id, index, enabled));
    }

    pub fn select_all_sinners() {
        edit_filters(|engine| engine.update_filters(|filters, catalog| filters.select_all(catalog)));
    }

    pub fn deselect_all_sinners() {
        edit_filters(|engine| engine.update_filters(|filters, _| filters.deselect_all()));
    }

    pub fn invert_sinner_selection() {
        edit_filters(|engine| engine.update_filters(|filters, catalog| filters.invert(catalog)));
    }

    pub fn apply_filters() -> bool {
        match with_app(|app| app.engine.apply_filters()) {
            Some(Ok(())) => true,
            Some(Err(e)) => {
                alert(&e.to_string());
                false
            }
            None => false,
        }
    }

    pub fn has_unsaved_changes() -> bool {
        with_app(|app| app.engine.filters().has_unsaved_changes()).unwrap_or(false)
    }

    /// Store the run timer's time for the current selection. Returns the rank (0 on failure).
    pub fn save_personal_record(comment: &str) -> u32 {
        let result = with_app(|app| {
            let record = PersonalRecord::from_selection(
                app.run_timer.elapsed_seconds(),
                comment,
                app.engine.selection(),
                now_iso(),
            )?;
            let rank = app.ranking.add_record(record)?;
            app.ranking.save();
            Ok::<_, RankingError>(rank as u32)
        });
        match result {
            Some(Ok(rank)) => rank,
            Some(Err(e)) => {
                alert(&e.to_string());
                0
            }
            None => 0,
        }
    }

    pub fn selected_names() -> Option<String> {
        with_app(|app| {
            let (sinner, persona) = app.engine.selection().names();
            serde_json::json!({ "sinner": sinner, "persona": persona }).to_string()
        })
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_sinner_enabled(id: u32, enabled: bool) {
    wasm_app::set_sinner_enabled(id, enabled);
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_persona_enabled(id: u32, index: usize, enabled: bool) {
    wasm_app::set_persona_enabled(id, index, enabled);
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn select_all_sinners() {
    wasm_app::select_all_sinners();
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn deselect_all_sinners() {
    wasm_app::deselect_all_sinners();
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn invert_sinner_selection() {
    wasm_app::invert_sinner_selection();
}

/// Validate and persist the filters. Alerts and returns false when invalid.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn apply_filters() -> bool {
    wasm_app::apply_filters()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn has_unsaved_changes() -> bool {
    wasm_app::has_unsaved_changes()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn save_personal_record(comment: &str) -> u32 {
    wasm_app::save_personal_record(comment)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_timer() {
    wasm_app::start_timer();
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn pause_timer() {
    wasm_app::pause_timer();
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn reset_timer() {
    wasm_app::reset_timer();
}

/// Run timer seconds
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn elapsed_seconds() -> f64 {
    wasm_app::elapsed_seconds()
}

/// `{"sinner": .., "persona": ..}` as JSON
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn selected_names() -> Option<String> {
    wasm_app::selected_names()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Sinner Roulette (native) starting...");
    log::info!("Native mode runs a headless draw - use `trunk serve` for the web version");

    if let Err(e) = headless_draw() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Spin both wheels with simulated ticks and print the pair
#[cfg(not(target_arch = "wasm32"))]
fn headless_draw() -> Result<(), Box<dyn std::error::Error>> {
    use sinner_roulette::engine::{SecureRandom, SpinStart};
    use sinner_roulette::{AppConfig, Catalog, FilterState, SelectionEngine, WheelKind};

    let config = AppConfig::load();
    let catalog = Catalog::builtin()?;
    let filters = FilterState::all_enabled(&catalog);
    filters.validate(&catalog)?;

    let random = SecureRandom::new();
    let mut engine = SelectionEngine::new(catalog, filters, random, config.scroll.clone());
    // One second of spin at the configured tick rate
    let ticks = 1000 / config.scroll.tick_interval_ms.max(1);

    for kind in [WheelKind::Sinner, WheelKind::Persona] {
        match engine.start_spin(kind)? {
            SpinStart::Spinning(token) => {
                for _ in 0..ticks {
                    engine.tick(kind);
                }
                if let Some(plan) = engine.stop_spin(kind)? {
                    for step in 0..=4 {
                        let elapsed = plan.duration_ms as f32 * step as f32 / 4.0;
                        let offset = engine.snap_offset_at(kind, elapsed).unwrap_or(plan.target_offset);
                        log::debug!("{} snap {:.0}ms -> {:.1}px", kind.as_str(), elapsed, offset);
                    }
                    engine.finish_spin(kind, token);
                }
            }
            SpinStart::Immediate => log::info!("{} chosen without a spin", kind.as_str()),
            other => log::warn!("Unexpected {} start: {:?}", kind.as_str(), other),
        }
    }

    for event in engine.drain_events() {
        log::debug!("{:?}", event);
    }

    let (sinner, persona) = engine.selection().names();
    println!("Sinner:  {}", sinner.unwrap_or("-"));
    println!("Persona: {}", persona.unwrap_or("-"));
    Ok(())
}
