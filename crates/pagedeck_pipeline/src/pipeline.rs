//! The run driver and its steps.

use crate::images::{select_upload_images, splice_images};
use crate::variants::{SlideOutcome, parse_slides};
use derive_getters::Getters;
use pagedeck_client::endpoints::{CREATE_SLIDES_WS, OUTLINE_WS, view_link};
use pagedeck_client::{AlaiApi, Connector, Credentials, StreamExchange};
use pagedeck_core::{Outline, SessionState, generate_unique_id};
use pagedeck_error::{JsonError, PipelineError, PipelineErrorKind, PipelineResult};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Answers given, in order, to the service's first three presentation questions.
pub const QUESTION_ANSWERS: [&str; 3] = [
    "Professional Meeting",
    "Business Executives who need detailed information",
    "medium to Vast",
];

/// Upper bound on images uploaded per run.
pub const DEFAULT_MAX_UPLOAD_IMAGES: usize = 5;

const OUTLINE_STEP: &str = "generate_slides_outline";
const CREATE_SLIDES_STEP: &str = "create_slides_from_outlines";
const IMAGE_NULL_DIRECTIVE: &str = "Keep images null for all slides";
const START_PREVIEW_CHARS: usize = 200;

/// Inputs for one run.
///
/// # Examples
///
/// ```
/// use pagedeck_pipeline::RunRequestBuilder;
///
/// let request = RunRequestBuilder::default()
///     .content("Scraped article text")
///     .instructions("Five slides for executives")
///     .build()
///     .unwrap();
/// assert!(request.image_paths().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct RunRequest {
    /// Source text the presentation is built from
    content: String,
    /// Presentation brief
    instructions: String,
    /// Candidate images to upload
    #[builder(default)]
    image_paths: Vec<PathBuf>,
}

/// What a completed run produced.
#[derive(Debug, Clone, Getters)]
pub struct RunReport {
    /// Viewer link for the presentation
    link: String,
    /// Whether `link` is the direct fallback rather than a share link
    #[getter(copy)]
    fallback_link: bool,
    /// Presentation created by the run
    presentation_id: String,
    /// Where the audit log was written
    audit_path: PathBuf,
    /// Per-slide results, in processing order
    slides: Vec<SlideOutcome>,
}

/// Drives one presentation run end to end.
pub struct Pipeline {
    pub(crate) api: AlaiApi,
    pub(crate) connector: Arc<dyn Connector>,
    credentials: Credentials,
    audit_dir: PathBuf,
    max_upload_images: usize,
}

struct Produced {
    link: String,
    fallback_link: bool,
    slides: Vec<SlideOutcome>,
}

impl Pipeline {
    /// Pipeline writing its audit log to the working directory.
    pub fn new(api: AlaiApi, connector: Arc<dyn Connector>, credentials: Credentials) -> Self {
        Self {
            api,
            connector,
            credentials,
            audit_dir: PathBuf::from("."),
            max_upload_images: DEFAULT_MAX_UPLOAD_IMAGES,
        }
    }

    /// Directory for `presentation_responses_*.json`.
    pub fn with_audit_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.audit_dir = dir.into();
        self
    }

    /// Upload at most `max` images.
    pub fn with_max_upload_images(mut self, max: usize) -> Self {
        self.max_upload_images = max;
        self
    }

    /// Execute every step for `request`.
    ///
    /// Request-style steps abort the run; per-slide and image failures do
    /// not. The audit log is persisted in both cases, with a final `error`
    /// entry on abort.
    #[instrument(skip_all, fields(content_len = request.content.len()))]
    pub async fn run(&self, request: &RunRequest) -> PipelineResult<RunReport> {
        let mut session = SessionState::new();
        session
            .audit_mut()
            .record_success("start", start_payload(request));

        match self.execute(&mut session, request).await {
            Ok(produced) => {
                info!("Presentation generation complete");
                let audit_path = self.persist(&session).await?;
                let presentation_id = session.require_presentation_id()?.to_string();
                Ok(RunReport {
                    link: produced.link,
                    fallback_link: produced.fallback_link,
                    presentation_id,
                    audit_path,
                    slides: produced.slides,
                })
            }
            Err(err) => {
                error!("Error in presentation run: {}", err.kind);
                session
                    .audit_mut()
                    .record_failure("error", Value::Null, err.kind.to_string());
                if let Err(persist_err) = self.persist(&session).await {
                    error!("Failed to save audit log: {}", persist_err.kind);
                }
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        session: &mut SessionState,
        request: &RunRequest,
    ) -> PipelineResult<Produced> {
        self.authenticate(session).await?;
        self.create_presentation(session).await?;
        self.load_primary_slide(session).await?;
        self.generate_outlines(session, request).await?;
        if !request.image_paths.is_empty() {
            self.attach_images(session, &request.image_paths).await?;
        }
        self.calibrate(session, &request.content).await?;
        let first = self.create_slides(session, request).await?;

        info!("Processing slide variants");
        let slides = match parse_slides(&first) {
            Some(slides) => self.process_slides(session, slides).await?,
            None => {
                warn!("No slides data found to process variants");
                Vec::new()
            }
        };

        let (link, fallback_link) = self.share(session).await?;
        Ok(Produced {
            link,
            fallback_link,
            slides,
        })
    }

    async fn persist(&self, session: &SessionState) -> PipelineResult<PathBuf> {
        let path = session
            .audit()
            .persist(
                &self.audit_dir,
                session.presentation_id(),
                session.primary_slide_id(),
            )
            .await?;
        info!("Saved all responses to {}", path.display());
        Ok(path)
    }

    async fn authenticate(&self, session: &mut SessionState) -> PipelineResult<()> {
        let token = self
            .api
            .authenticate(session.audit_mut(), &self.credentials)
            .await?;
        session.set_auth_token(token);
        Ok(())
    }

    async fn create_presentation(&self, session: &mut SessionState) -> PipelineResult<()> {
        let token = session.require_token()?.to_string();

        let existing = match self.api.list_presentations(session.audit_mut(), &token).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Could not list existing presentations, assuming none: {}", e.kind);
                HashSet::new()
            }
        };

        let id = generate_unique_id(&existing);
        session.assign_presentation_id(id.clone())?;
        session
            .audit_mut()
            .record_success("presentation_id", Value::String(id.clone()));

        self.api
            .create_presentation(session.audit_mut(), &token, &id)
            .await?;
        info!("Created new presentation with ID: {}", id);
        Ok(())
    }

    async fn load_primary_slide(&self, session: &mut SessionState) -> PipelineResult<()> {
        let token = session.require_token()?.to_string();
        let presentation_id = session.require_presentation_id()?.to_string();
        let slide_id = self
            .api
            .first_slide_id(session.audit_mut(), &token, &presentation_id)
            .await?;
        info!("Retrieved slide ID: {}", slide_id);
        session.set_primary_slide_id(slide_id);
        Ok(())
    }

    async fn generate_outlines(
        &self,
        session: &mut SessionState,
        request: &RunRequest,
    ) -> PipelineResult<()> {
        let token = session.require_token()?.to_string();
        let presentation_id = session.require_presentation_id()?.to_string();

        let questions = self
            .api
            .presentation_questions(session.audit_mut(), &token, &presentation_id)
            .await?;
        let questions = answer_questions(questions)?;

        let message = json!({
            "auth_token": token,
            "presentation_id": presentation_id,
            "slide_order": 0,
            "raw_context": request.content,
            "presentation_instructions": format!("{}{}", request.instructions, IMAGE_NULL_DIRECTIVE),
            "slide_range": "2-5",
            "presentation_questions": questions,
        });

        info!("Generating slides outline");
        let outcome = StreamExchange::new(self.connector.as_ref(), OUTLINE_WS, OUTLINE_STEP)
            .run(&message, session.audit_mut())
            .await;

        for message in outcome.messages {
            match message {
                Value::Object(fields) => session.push_outline(Outline::from(fields)),
                other => warn!("Ignoring outline message that is not a JSON object: {}", other),
            }
        }

        if session.slide_outlines().is_empty() {
            return Err(PipelineError::new(PipelineErrorKind::EmptyExchange(
                OUTLINE_STEP.to_string(),
            )));
        }
        info!(count = session.slide_outlines().len(), "Received slide outlines");
        Ok(())
    }

    async fn attach_images(
        &self,
        session: &mut SessionState,
        paths: &[PathBuf],
    ) -> PipelineResult<()> {
        info!("Attempting to upload {} images", paths.len());
        let selected = select_upload_images(paths, self.max_upload_images).await;
        if selected.is_empty() {
            warn!("No valid JPG images to upload");
            return Ok(());
        }

        let token = session.require_token()?.to_string();
        let presentation_id = session.require_presentation_id()?.to_string();
        match self
            .api
            .upload_images(session.audit_mut(), &token, &presentation_id, &selected)
            .await
        {
            Ok(uploaded) => {
                let attached = splice_images(
                    session.slide_outlines_mut(),
                    &uploaded,
                    self.max_upload_images,
                );
                info!("Added {} images to slides", attached);
            }
            Err(e) => warn!("Image upload failed: {}", e.kind),
        }
        Ok(())
    }

    async fn calibrate(&self, session: &mut SessionState, content: &str) -> PipelineResult<()> {
        let token = session.require_token()?.to_string();
        let presentation_id = session.require_presentation_id()?.to_string();
        if let Err(e) = self
            .api
            .calibration_sample(session.audit_mut(), &token, &presentation_id, content)
            .await
        {
            warn!("Failed to get calibration sample text: {}", e.kind);
        }
        Ok(())
    }

    /// Returns the first streamed message, which carries the slides.
    async fn create_slides(
        &self,
        session: &mut SessionState,
        request: &RunRequest,
    ) -> PipelineResult<Value> {
        let token = session.require_token()?.to_string();
        let presentation_id = session.require_presentation_id()?.to_string();
        let slide_id = session
            .primary_slide_id()
            .ok_or_else(|| PipelineError::new(PipelineErrorKind::NoPrimarySlide))?
            .to_string();

        let outlines = serde_json::to_value(session.slide_outlines()).map_err(JsonError::from)?;

        let message = json!({
            "auth_token": token,
            "presentation_id": presentation_id,
            "slide_id": slide_id,
            "slide_outlines": outlines,
            "raw_context": request.content,
            "presentation_instructions": request.instructions,
            "starting_slide_order": 0,
            "update_tone_verbosity_calibration_status": true,
        });

        info!("Creating slides from outlines");
        let outcome =
            StreamExchange::new(self.connector.as_ref(), CREATE_SLIDES_WS, CREATE_SLIDES_STEP)
                .run(&message, session.audit_mut())
                .await;

        outcome.messages.into_iter().next().ok_or_else(|| {
            PipelineError::new(PipelineErrorKind::EmptyExchange(
                CREATE_SLIDES_STEP.to_string(),
            ))
        })
    }

    async fn share(&self, session: &mut SessionState) -> PipelineResult<(String, bool)> {
        let token = session.require_token()?.to_string();
        let presentation_id = session.require_presentation_id()?.to_string();
        match self
            .api
            .share_presentation(session.audit_mut(), &token, &presentation_id)
            .await
        {
            Ok(code) => {
                let link = view_link(&code);
                info!("Generated shareable link: {}", link);
                Ok((link, false))
            }
            Err(e) => {
                let link = view_link(&presentation_id);
                warn!("Using fallback shareable link {}: {}", link, e.kind);
                Ok((link, true))
            }
        }
    }
}

fn answer_questions(mut questions: Vec<Value>) -> PipelineResult<Vec<Value>> {
    if questions.len() < QUESTION_ANSWERS.len() {
        return Err(PipelineError::new(PipelineErrorKind::TooFewQuestions {
            expected: QUESTION_ANSWERS.len(),
            actual: questions.len(),
        }));
    }
    for (question, answer) in questions.iter_mut().zip(QUESTION_ANSWERS) {
        let Some(fields) = question.as_object_mut() else {
            return Err(PipelineError::new(PipelineErrorKind::MalformedPayload {
                step: "get_presentation_questions".to_string(),
                message: format!("question is not an object: {}", question),
            }));
        };
        fields.insert("answer".to_string(), Value::String(answer.to_string()));
    }
    Ok(questions)
}

fn start_payload(request: &RunRequest) -> Value {
    let preview = match request.content.char_indices().nth(START_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &request.content[..cut]),
        None => request.content.clone(),
    };
    let image_paths: Vec<String> = request
        .image_paths
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    json!({
        "content_data": preview,
        "instructions": request.instructions,
        "image_paths": image_paths,
    })
}
