//! Per-slide variant generation and activation.

use crate::Pipeline;
use derive_getters::Getters;
use pagedeck_client::StreamExchange;
use pagedeck_client::endpoints::SLIDE_VARIANTS_WS;
use pagedeck_core::{SessionState, Slide, Variant};
use pagedeck_error::{PipelineErrorKind, PipelineResult};
use serde_json::{Value, json};
use std::cmp::Ordering;
use tracing::{debug, error, info, instrument, warn};

const VARIANTS_STEP: &str = "create_and_stream_slide_variants";

/// How one slide fared.
#[derive(Debug, Clone)]
pub enum SlideStatus {
    /// A variant was confirmed active
    Activated {
        /// Confirmed variant
        variant_id: String,
        /// Whether the slide entity update was accepted
        entity_updated: bool,
    },
    /// The slide was left as created
    Skipped(PipelineErrorKind),
}

/// Result for one slide.
#[derive(Debug, Clone, Getters)]
pub struct SlideOutcome {
    slide_id: String,
    /// Numeric `slide_order`, when the service sent one
    #[getter(copy)]
    slide_order: Option<f64>,
    status: SlideStatus,
}

impl SlideOutcome {
    /// Whether a variant was activated.
    pub fn is_activated(&self) -> bool {
        matches!(self.status, SlideStatus::Activated { .. })
    }
}

/// Slides from the first create-slides message, in ascending `slide_order`.
///
/// Returns `None` when the message has no `slides` array. Entries that are
/// not objects with a string `id` are dropped with a warning. Integer and
/// float orders compare numerically; slides without a numeric order keep
/// their arrival order after the rest.
pub fn parse_slides(message: &Value) -> Option<Vec<Slide>> {
    let raw = message.get("slides")?.as_array()?;
    let mut slides: Vec<Slide> = raw
        .iter()
        .filter_map(|entry| match serde_json::from_value::<Slide>(entry.clone()) {
            Ok(slide) => Some(slide),
            Err(e) => {
                warn!("Ignoring malformed slide entry: {}", e);
                None
            }
        })
        .collect();
    slides.sort_by(|a, b| by_slide_order(a.slide_order(), b.slide_order()));
    Some(slides)
}

fn by_slide_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn variant_request(token: &str, presentation_id: &str, slide: &Slide) -> Value {
    let outline = slide.slide_outline();
    json!({
        "auth_token": token,
        "presentation_id": presentation_id,
        "slide_id": slide.id(),
        "slide_specific_context": outline.slide_context(),
        "images_on_slide": outline
            .fields()
            .get("images_on_slide")
            .cloned()
            .unwrap_or_else(|| json!([])),
        "additional_instructions": outline.slide_instructions(),
        "layout_type": "AI_GENERATED_LAYOUT",
        "update_tone_verbosity_calibration_status": false,
    })
}

impl Pipeline {
    /// Process `slides` in order; failures are recorded per slide and never
    /// stop the loop.
    pub(crate) async fn process_slides(
        &self,
        session: &mut SessionState,
        slides: Vec<Slide>,
    ) -> PipelineResult<Vec<SlideOutcome>> {
        let token = session.require_token()?.to_string();
        let presentation_id = session.require_presentation_id()?.to_string();

        let mut outcomes = Vec::with_capacity(slides.len());
        for mut slide in slides {
            info!(
                "Processing slide {}: {}",
                slide.fields().get("slide_order").unwrap_or(&serde_json::Value::Null),
                slide.slide_outline().display_title()
            );
            let status = match self
                .activate_variant(session, &token, &presentation_id, &mut slide)
                .await
            {
                Ok(status) => status,
                Err(kind) => {
                    error!("Skipping slide {}: {}", slide.id(), kind);
                    SlideStatus::Skipped(kind)
                }
            };
            outcomes.push(SlideOutcome {
                slide_id: slide.id().to_string(),
                slide_order: slide.slide_order(),
                status,
            });
        }
        Ok(outcomes)
    }

    #[instrument(skip_all, fields(slide_id = %slide.id()))]
    async fn activate_variant(
        &self,
        session: &mut SessionState,
        token: &str,
        presentation_id: &str,
        slide: &mut Slide,
    ) -> Result<SlideStatus, PipelineErrorKind> {
        if let Some(active) = slide.confirmed_variant_id() {
            return Err(PipelineErrorKind::VariantAlreadyActive {
                slide_id: slide.id().to_string(),
                active: active.to_string(),
            });
        }
        if let Some(previous) = slide.server_active_variant_id() {
            debug!("Slide {} arrived with active variant {}", slide.id(), previous);
        }

        let request = variant_request(token, presentation_id, slide);
        let outcome =
            StreamExchange::new(self.connector.as_ref(), SLIDE_VARIANTS_WS, VARIANTS_STEP)
                .run(&request, session.audit_mut())
                .await;

        let messages = outcome.messages;
        if messages.len() < 2 {
            return Err(PipelineErrorKind::TooFewVariantMessages {
                slide_id: slide.id().to_string(),
                received: messages.len(),
            });
        }
        let variant = Variant::from_message(&messages[1])
            .ok_or_else(|| PipelineErrorKind::MissingVariantId(slide.id().to_string()))?;
        let variant_id = variant.id().to_string();

        self.api
            .set_active_variant(session.audit_mut(), token, slide.id(), &variant_id)
            .await
            .map_err(PipelineErrorKind::Api)?;
        // Confirmed remotely; the entity update follows regardless.
        if let Err(previous) = slide.activate(variant_id.clone()) {
            warn!("Slide {} was already confirmed with variant {}", slide.id(), previous);
        }

        let mut entity = messages.into_iter().next().unwrap_or(Value::Null);
        if let Some(fields) = entity.as_object_mut() {
            fields.insert("active_variant_id".to_string(), Value::String(variant_id.clone()));
        }
        let entity_updated = match self
            .api
            .update_slide_entity(session.audit_mut(), token, entity)
            .await
        {
            Ok(_) => {
                info!("Updated slide entity for slide {}", slide.id());
                true
            }
            Err(e) => {
                warn!("Failed to update slide entity: {}", e.kind);
                false
            }
        };

        Ok(SlideStatus::Activated {
            variant_id,
            entity_updated,
        })
    }
}
