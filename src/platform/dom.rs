//! DOM rendering for the scroll lists (WASM only)
//!
//! Mirrors `TiledList` into `div.scroll-item` rows. Rows carry
//! `data-original-index` so every tile copy of the winner can be highlighted.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement};

use crate::engine::{ListEntry, ListLayout, TiledList, WheelKind};
use crate::error::InitError;
use crate::timer::RunTimer;

/// CSS class marking the winning rows
const SELECTED_CLASS: &str = "selected";
/// Avatar size (pixels)
const AVATAR_SIZE: &str = "30px";

/// Element ids used by one wheel
struct WheelIds {
    scroll: &'static str,
    start: &'static str,
    stop: &'static str,
    selected: &'static str,
    empty: &'static str,
}

fn ids(kind: WheelKind) -> WheelIds {
    match kind {
        WheelKind::Sinner => WheelIds {
            scroll: "sinner-scroll",
            start: "sinner-start-btn",
            stop: "sinner-stop-btn",
            selected: "selected-sinner",
            empty: "sinner-empty",
        },
        WheelKind::Persona => WheelIds {
            scroll: "persona-scroll",
            start: "persona-start-btn",
            stop: "persona-stop-btn",
            selected: "selected-persona",
            empty: "persona-empty",
        },
    }
}

fn required<T: JsCast>(document: &Document, id: &'static str) -> Result<T, InitError> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<T>().ok())
        .ok_or(InitError::MissingElement(id))
}

/// One scrollable list and its controls
pub struct ListView {
    kind: WheelKind,
    document: Document,
    scroll: HtmlElement,
    start_btn: HtmlButtonElement,
    stop_btn: HtmlButtonElement,
    selected_label: Element,
    empty_hint: Option<Element>,
}

impl ListView {
    /// Look up the wheel's elements. Any missing required element fails the wheel.
    pub fn new(document: &Document, kind: WheelKind) -> Result<Self, InitError> {
        let ids = ids(kind);
        Ok(Self {
            kind,
            document: document.clone(),
            scroll: required(document, ids.scroll)?,
            start_btn: required(document, ids.start)?,
            stop_btn: required(document, ids.stop)?,
            selected_label: required(document, ids.selected)?,
            empty_hint: document.get_element_by_id(ids.empty),
        })
    }

    pub fn kind(&self) -> WheelKind {
        self.kind
    }

    pub fn start_button(&self) -> &HtmlButtonElement {
        &self.start_btn
    }

    pub fn stop_button(&self) -> &HtmlButtonElement {
        &self.stop_btn
    }

    fn placeholder_text(&self) -> &'static str {
        match self.kind {
            WheelKind::Sinner => "Enable a sinner first",
            WheelKind::Persona => "Select a sinner first",
        }
    }

    /// Replace all rows with `list`
    pub fn render(&self, list: &TiledList, entries: &[ListEntry<'_>]) -> Result<(), JsValue> {
        self.scroll.set_inner_html("");

        if let Some(parent) = self.scroll.parent_element() {
            if let Ok(parent) = parent.dyn_into::<HtmlElement>() {
                parent
                    .style()
                    .set_property("height", &px(list.viewport_height()))?;
            }
        }

        let row_height = px(list.row_height());
        for row in list.rows() {
            let item = self.create_html("div")?;
            item.set_class_name("scroll-item");
            item.style().set_property("height", &row_height)?;

            let content = self.create_html("div")?;
            content.set_class_name("scroll-item-content");

            let entry = row.original_index.and_then(|i| entries.get(i));
            match entry {
                Some(entry) => {
                    if let Some(i) = row.original_index {
                        item.set_attribute("data-original-index", &i.to_string())?;
                    }
                    content.append_child(&self.avatar(entry)?)?;
                    content.append_child(&self.text(entry.name)?)?;
                }
                None => {
                    item.class_list().add_1("disabled")?;
                    content.append_child(&self.unknown_avatar()?)?;
                    content.append_child(&self.text(self.placeholder_text())?)?;
                }
            }

            item.append_child(&content)?;
            self.scroll.append_child(&item)?;
        }

        self.scroll
            .style()
            .set_property("height", &px(list.content_height()))?;

        if let Some(hint) = &self.empty_hint {
            let show = list.layout() == ListLayout::Placeholder;
            hint.class_list().toggle_with_force("hidden", !show)?;
        }

        self.apply_highlight(list)
    }

    /// Sync the `selected` class with the model, row for row
    pub fn apply_highlight(&self, list: &TiledList) -> Result<(), JsValue> {
        let nodes = self.scroll.query_selector_all(".scroll-item")?;
        for (i, row) in list.rows().iter().enumerate() {
            let Some(node) = nodes.get(i as u32) else {
                break;
            };
            if let Ok(el) = node.dyn_into::<Element>() {
                el.class_list()
                    .toggle_with_force(SELECTED_CLASS, row.highlighted)?;
            }
        }
        Ok(())
    }

    /// Translate the list. `transition` is `(duration_ms, timing function)`; `None` jumps.
    pub fn set_offset(&self, offset: f32, transition: Option<(u32, &str)>) -> Result<(), JsValue> {
        let style = self.scroll.style();
        match transition {
            Some((ms, easing)) => {
                style.set_property("transition", &format!("transform {}ms {}", ms, easing))?
            }
            None => style.set_property("transition", "none")?,
        }
        style.set_property("transform", &format!("translateY(-{}px)", offset))
    }

    pub fn set_buttons(&self, can_start: bool, can_stop: bool) {
        self.start_btn.set_disabled(!can_start);
        self.stop_btn.set_disabled(!can_stop);
    }

    pub fn set_selected(&self, name: Option<&str>) {
        self.selected_label
            .set_text_content(Some(name.unwrap_or("Not selected")));
    }

    fn create_html(&self, tag: &str) -> Result<HtmlElement, JsValue> {
        self.document.create_element(tag)?.dyn_into::<HtmlElement>().map_err(JsValue::from)
    }

    fn text(&self, text: &str) -> Result<Element, JsValue> {
        let span = self.document.create_element("span")?;
        span.set_text_content(Some(text));
        Ok(span)
    }

    fn avatar(&self, entry: &ListEntry<'_>) -> Result<Element, JsValue> {
        let Some(src) = entry.avatar else {
            return self.unknown_avatar();
        };
        let img = self.create_html("img")?;
        img.set_class_name("avatar-placeholder");
        img.style().set_property("width", AVATAR_SIZE)?;
        img.style().set_property("height", AVATAR_SIZE)?;
        img.set_attribute("src", src)?;
        img.set_attribute("alt", entry.name)?;
        // Broken images fall back to the grey placeholder styling
        img.set_attribute(
            "onerror",
            "this.onerror=null;this.removeAttribute('src');this.classList.add('avatar-missing');",
        )?;
        Ok(img.into())
    }

    fn unknown_avatar(&self) -> Result<Element, JsValue> {
        let el = self.create_html("div")?;
        el.set_class_name("avatar-placeholder avatar-missing");
        el.style().set_property("width", AVATAR_SIZE)?;
        el.style().set_property("height", AVATAR_SIZE)?;
        el.set_text_content(Some("?"));
        Ok(el.into())
    }
}

/// Run timer display and controls. Every element is optional.
pub struct TimerView {
    display: Option<Element>,
    start_btn: Option<HtmlButtonElement>,
    pause_btn: Option<HtmlButtonElement>,
    reset_btn: Option<HtmlButtonElement>,
}

impl TimerView {
    pub fn new(document: &Document) -> Self {
        let button = |id: &str| {
            document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
        };
        Self {
            display: document.get_element_by_id("timer-display"),
            start_btn: button("timer-start-btn"),
            pause_btn: button("timer-pause-btn"),
            reset_btn: button("timer-reset-btn"),
        }
    }

    pub fn start_button(&self) -> Option<&HtmlButtonElement> {
        self.start_btn.as_ref()
    }

    pub fn pause_button(&self) -> Option<&HtmlButtonElement> {
        self.pause_btn.as_ref()
    }

    pub fn reset_button(&self) -> Option<&HtmlButtonElement> {
        self.reset_btn.as_ref()
    }

    pub fn update(&self, timer: &RunTimer) {
        if let Some(display) = &self.display {
            display.set_text_content(Some(&timer.display()));
        }
        if let Some(btn) = &self.start_btn {
            btn.set_disabled(timer.is_running());
        }
        if let Some(btn) = &self.pause_btn {
            btn.set_disabled(!timer.is_running());
        }
    }
}

fn px(value: f32) -> String {
    format!("{}px", value)
}
