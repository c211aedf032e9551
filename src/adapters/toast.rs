use std::time::Duration;

use js_sys::Function;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element};

use super::js::{self, JsError};
use crate::ports::{Feedback, MessageKind};

const STYLE_ID: &str = "bussid-push-style";
const TEST_BUTTON_ID: &str = "testNotifBtn";
const FADE_OUT: Duration = Duration::from_millis(300);

const STYLESHEET: &str = "
@keyframes slideInRight {
    from { transform: translateX(100%); opacity: 0; }
    to { transform: translateX(0); opacity: 1; }
}
@keyframes slideOutRight {
    from { transform: translateX(0); opacity: 1; }
    to { transform: translateX(100%); opacity: 0; }
}
#testNotifBtn:hover {
    transform: translateY(-2px);
    box-shadow: 0 6px 20px rgba(0, 114, 255, 0.4);
}
";

const TEST_BUTTON_STYLE: &str = "position: fixed; bottom: 20px; left: 20px; \
    background: linear-gradient(135deg, #0072ff, #00c6ff); color: white; border: none; \
    padding: 12px 18px; border-radius: 25px; cursor: pointer; z-index: 10000; \
    font-weight: 600; box-shadow: 0 4px 15px rgba(0, 114, 255, 0.3); \
    transition: all 0.3s ease; \
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;";

fn toast_style(kind: MessageKind, animation: &str) -> String {
    format!(
        "position: fixed; top: 20px; right: 20px; background: {}; color: white; \
         padding: 12px 18px; border-radius: 8px; box-shadow: 0 4px 12px rgba(0,0,0,0.3); \
         z-index: 10000; font-size: 14px; font-weight: 500; \
         animation: {animation} 0.3s ease; max-width: 300px;",
        kind.color()
    )
}

/// Toasts in the top-right corner of the page.
pub struct DomToaster {
    document: Document,
    duration: Duration,
}

impl DomToaster {
    pub fn new(document: Document, duration: Duration) -> Self {
        Self { document, duration }
    }

    fn render(&self, text: &str, kind: MessageKind) -> Result<(), JsError> {
        install_stylesheet(&self.document)?;
        let body = self
            .document
            .body()
            .ok_or_else(|| JsError::new("document has no body"))?;

        let toast = create(&self.document, "div")?;
        set_style(&toast, &toast_style(kind, "slideInRight"))?;
        toast.set_text_content(Some(text));
        body.append_child(&toast)
            .map_err(|err| JsError::from_js("appendChild", err))?;

        let fading = toast.clone();
        let fade: Function = Closure::once_into_js(move || {
            let _ = fading.set_attribute("style", &toast_style(kind, "slideOutRight"));
            let remove: Function = Closure::once_into_js(move || fading.remove()).unchecked_into();
            if let Err(err) = js::set_timeout(&remove, FADE_OUT) {
                tracing::warn!(error = %err, "failed to schedule toast removal");
            }
        })
        .unchecked_into();
        js::set_timeout(&fade, self.duration)?;
        Ok(())
    }
}

impl Feedback for DomToaster {
    fn show(&self, text: &str, kind: MessageKind) {
        if let Err(err) = self.render(text, kind) {
            tracing::warn!(error = %err, %text, "failed to show toast");
        }
    }
}

/// Adds the floating test button once. A second call is a no-op.
pub fn insert_test_button(
    document: &Document,
    label: &str,
    on_click: impl FnMut() + 'static,
) -> Result<(), JsError> {
    if document.get_element_by_id(TEST_BUTTON_ID).is_some() {
        return Ok(());
    }
    install_stylesheet(document)?;
    let body = document
        .body()
        .ok_or_else(|| JsError::new("document has no body"))?;

    let button = create(document, "button")?;
    button.set_id(TEST_BUTTON_ID);
    button.set_text_content(Some(label));
    set_style(&button, TEST_BUTTON_STYLE)?;

    let on_click = Closure::<dyn FnMut()>::new(on_click);
    button
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
        .map_err(|err| JsError::from_js("addEventListener", err))?;
    on_click.forget();

    body.append_child(&button)
        .map_err(|err| JsError::from_js("appendChild", err))?;
    Ok(())
}

fn install_stylesheet(document: &Document) -> Result<(), JsError> {
    if document.get_element_by_id(STYLE_ID).is_some() {
        return Ok(());
    }
    let head = document
        .head()
        .ok_or_else(|| JsError::new("document has no head"))?;
    let style = create(document, "style")?;
    style.set_id(STYLE_ID);
    style.set_text_content(Some(STYLESHEET));
    head.append_child(&style)
        .map_err(|err| JsError::from_js("appendChild", err))?;
    Ok(())
}

fn create(document: &Document, tag: &str) -> Result<Element, JsError> {
    document
        .create_element(tag)
        .map_err(|err| JsError::from_js("createElement", err))
}

fn set_style(element: &Element, css: &str) -> Result<(), JsError> {
    element
        .set_attribute("style", css)
        .map_err(|err: JsValue| JsError::from_js("setAttribute", err))
}
