//! Outline, slide and variant records.
//!
//! The presentation service owns these schemas. Records are kept as the JSON
//! objects the service sent; the few attributes the orchestrator reads are
//! exposed through lenient accessors that return `None` on an absent key or
//! an unexpected type instead of rejecting the record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const SLIDE_ORDER: &str = "slide_order";
const IMAGES_ON_SLIDE: &str = "images_on_slide";
const ACTIVE_VARIANT_ID: &str = "active_variant_id";

/// Server-proposed content skeleton for one slide.
///
/// Any JSON object is a valid outline. It serializes back to exactly the
/// object it was read from, apart from images attached locally.
///
/// # Examples
///
/// ```
/// use pagedeck_core::Outline;
/// use serde_json::json;
///
/// let mut outline: Outline = serde_json::from_value(json!({
///     "slide_title": "Intro",
///     "slide_order": 1.0,
///     "slide_instructions": null,
///     "layout_hint": "two-column"
/// })).unwrap();
/// assert_eq!(outline.slide_order(), Some(1.0));
///
/// outline.attach_image(json!({"id": "img-1"}));
/// let back = serde_json::to_value(&outline).unwrap();
/// assert_eq!(back["layout_hint"], "two-column");
/// assert!(back.as_object().unwrap().contains_key("slide_instructions"));
/// assert_eq!(back["images_on_slide"][0]["id"], "img-1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outline(Map<String, Value>);

impl Outline {
    /// Every key the service sent.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Position of the slide in the deck, when numeric.
    pub fn slide_order(&self) -> Option<f64> {
        self.0.get(SLIDE_ORDER).and_then(Value::as_f64)
    }

    /// Slide title, when it is a string.
    pub fn slide_title(&self) -> Option<&str> {
        self.0.get("slide_title").and_then(Value::as_str)
    }

    /// Body context for the slide, whatever its shape.
    pub fn slide_context(&self) -> Option<&Value> {
        self.0.get("slide_context")
    }

    /// Per-slide instructions, whatever their shape.
    pub fn slide_instructions(&self) -> Option<&Value> {
        self.0.get("slide_instructions")
    }

    /// Images attached to the slide, when the key holds an array.
    pub fn images_on_slide(&self) -> Option<&Vec<Value>> {
        self.0.get(IMAGES_ON_SLIDE).and_then(Value::as_array)
    }

    /// Append an uploaded image descriptor to `images_on_slide`.
    ///
    /// A key that is absent, null or not an array is replaced by a new list.
    pub fn attach_image(&mut self, image: Value) {
        match self.0.get_mut(IMAGES_ON_SLIDE) {
            Some(Value::Array(images)) => images.push(image),
            _ => {
                self.0
                    .insert(IMAGES_ON_SLIDE.to_string(), Value::Array(vec![image]));
            }
        }
    }

    /// Title for log lines, falling back to a placeholder.
    pub fn display_title(&self) -> &str {
        self.slide_title().unwrap_or("<untitled>")
    }
}

impl From<Map<String, Value>> for Outline {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// A materialized slide returned by outline-to-slide conversion.
///
/// Only a string `id` is required. The server's `active_variant_id` is
/// informational; [`Slide::confirmed_variant_id`] tracks the variant this
/// run confirmed.
///
/// # Examples
///
/// ```
/// use pagedeck_core::Slide;
/// use serde_json::json;
///
/// let mut slide: Slide = serde_json::from_value(json!({
///     "id": "s-1",
///     "slide_order": 2.5,
///     "active_variant_id": "server-default"
/// })).unwrap();
/// assert_eq!(slide.slide_order(), Some(2.5));
///
/// slide.activate("v-9").unwrap();
/// assert_eq!(slide.confirmed_variant_id(), Some("v-9"));
/// assert_eq!(serde_json::to_value(&slide).unwrap()["active_variant_id"], "v-9");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Slide {
    id: String,
    slide_outline: Outline,
    confirmed_variant_id: Option<String>,
    fields: Map<String, Value>,
}

impl Slide {
    /// Build a slide from its id, order and outline.
    pub fn new(id: impl Into<String>, slide_order: i64, slide_outline: Outline) -> Self {
        let id = id.into();
        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::String(id.clone()));
        fields.insert(SLIDE_ORDER.to_string(), Value::from(slide_order));
        fields.insert(
            "slide_outline".to_string(),
            Value::Object(slide_outline.fields().clone()),
        );
        Self {
            id,
            slide_outline,
            confirmed_variant_id: None,
            fields,
        }
    }

    /// Stable slide identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sort key, when numeric; integers and floats are both accepted.
    pub fn slide_order(&self) -> Option<f64> {
        self.fields.get(SLIDE_ORDER).and_then(Value::as_f64)
    }

    /// Outline the slide was rendered from; empty when absent or not an object.
    pub fn slide_outline(&self) -> &Outline {
        &self.slide_outline
    }

    /// Active variant recorded on the slide: the service's value until this
    /// run confirms one.
    pub fn server_active_variant_id(&self) -> Option<&str> {
        self.fields.get(ACTIVE_VARIANT_ID).and_then(Value::as_str)
    }

    /// Variant confirmed active during this run.
    pub fn confirmed_variant_id(&self) -> Option<&str> {
        self.confirmed_variant_id.as_deref()
    }

    /// Every key the service sent.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Record the variant the service confirmed active.
    ///
    /// Succeeds once per slide. A second call returns the variant confirmed
    /// earlier and leaves the slide unchanged.
    pub fn activate(&mut self, variant_id: impl Into<String>) -> Result<(), String> {
        if let Some(confirmed) = &self.confirmed_variant_id {
            return Err(confirmed.clone());
        }
        let variant_id = variant_id.into();
        self.fields.insert(
            ACTIVE_VARIANT_ID.to_string(),
            Value::String(variant_id.clone()),
        );
        self.confirmed_variant_id = Some(variant_id);
        Ok(())
    }
}

impl TryFrom<Map<String, Value>> for Slide {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = fields
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| "slide has no string id".to_string())?
            .to_string();
        let slide_outline = match fields.get("slide_outline") {
            Some(Value::Object(outline)) => Outline::from(outline.clone()),
            _ => Outline::default(),
        };
        Ok(Self {
            id,
            slide_outline,
            confirmed_variant_id: None,
            fields,
        })
    }
}

impl From<Slide> for Map<String, Value> {
    fn from(slide: Slide) -> Self {
        slide.fields
    }
}

/// One rendered layout candidate for a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    id: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Variant {
    /// Interpret a streamed message as a variant descriptor.
    ///
    /// Returns `None` when the message has no string `id`.
    pub fn from_message(message: &Value) -> Option<Self> {
        serde_json::from_value(message.clone()).ok()
    }

    /// Variant identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Every other key the service sent.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}
