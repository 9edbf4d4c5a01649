//! Page sessions: the server-side state of one mounted birthday page.
//!
//! A session owns its content slots, its two observed regions and the petal
//! window. Dropping the session tears all of it down: pending timers are
//! aborted and late fetch results are discarded by the slots themselves.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::animation::{OneShotAnimation, TimedWindow, VisibilitySensor};
use crate::config::{CardSource, CardSources, ImageSource};
use crate::errors::AppError;
use crate::genai_client::prompts::{
    COMPLIMENT_PROMPT, FORECAST_PROMPT, HISTORY_PROMPT, IMAGE_PROMPT, POEM_PROMPT,
};
use crate::genai_client::GenAiClient;
use crate::page::content;
use crate::poem::{layout, RenderedPoem};
use crate::slot::fetchers::{ImageFetcher, TextFetcher};
use crate::slot::{ContentSlot, Fallback, Fetcher, SlotState, SlotStatus, TriggerPolicy};

pub const PETAL_COUNT: usize = 30;
pub const PETAL_DURATION: Duration = Duration::from_millis(5000);
pub const IMAGE_SPARKLES: usize = 10;
pub const FOOTER_SPARKLES: usize = 15;

// ────────────────────────────────────────────────────────────────────────────
// Names used by the HTTP API
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotName {
    Poem,
    Forecast,
    History,
    Image,
    Compliment,
}

impl FromStr for SlotName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "poem" => Ok(SlotName::Poem),
            "forecast" => Ok(SlotName::Forecast),
            "history" => Ok(SlotName::History),
            "image" => Ok(SlotName::Image),
            "compliment" => Ok(SlotName::Compliment),
            other => Err(AppError::Validation(format!("Unknown slot '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    ImageCard,
    Footer,
}

impl FromStr for Region {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image_card" => Ok(Region::ImageCard),
            "footer" => Ok(Region::Footer),
            other => Err(AppError::Validation(format!("Unknown region '{other}'"))),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Views
// ────────────────────────────────────────────────────────────────────────────

/// A slot as seen by a client. `policy` is absent for static cards.
#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub name: &'static str,
    pub policy: Option<TriggerPolicy>,
    pub status: SlotStatus,
    pub value: String,
    pub error_message: Option<String>,
    pub revision: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SlotView {
    fn from_slot(slot: &ContentSlot<String>, state: SlotState<String>) -> Self {
        Self {
            name: slot.name(),
            policy: Some(slot.policy()),
            status: state.status,
            value: state.value,
            error_message: state.error_message,
            revision: state.revision,
            updated_at: Some(state.updated_at),
        }
    }

    fn fixed(name: &'static str, text: &str) -> Self {
        Self {
            name,
            policy: None,
            status: SlotStatus::Ready,
            value: text.to_string(),
            error_message: None,
            revision: 0,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnimationView {
    pub observing: bool,
    pub armed: bool,
    pub active: bool,
    pub particles: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PetalsView {
    pub active: bool,
    pub count: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoemCardView {
    pub status: SlotStatus,
    pub generated: bool,
    /// The word spelled by the verse initials.
    pub acrostic: String,
    pub poem: RenderedPoem,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextCardView {
    pub status: SlotStatus,
    pub generated: bool,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageCardView {
    pub enabled: bool,
    pub status: SlotStatus,
    /// Set only once the image is `Ready`. Until then the slot value is a
    /// caption (loading text, or the unavailable message on error).
    pub image_url: Option<String>,
    pub sparkles: AnimationView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplimentView {
    pub status: SlotStatus,
    pub text: String,
    /// Still the canned text: rendered as pre-wrapped lines rather than one italic sentence.
    pub is_initial: bool,
    pub button_label: &'static str,
    pub button_disabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterView {
    pub lines: [&'static str; 2],
    pub sparkles: AnimationView,
}

/// Everything a client needs to draw the page.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub headline: &'static str,
    pub intro: &'static str,
    pub error_banner: Option<String>,
    pub petals: PetalsView,
    pub poem: PoemCardView,
    pub forecast: TextCardView,
    pub history: TextCardView,
    pub image: ImageCardView,
    pub compliment: ComplimentView,
    pub footer: FooterView,
}

// ────────────────────────────────────────────────────────────────────────────
// Session parts
// ────────────────────────────────────────────────────────────────────────────

/// A text card: canned, or generated once on mount with the canned text as fallback.
pub enum CardContent {
    Static(&'static str),
    Generated(Arc<ContentSlot<String>>),
}

impl CardContent {
    fn build(
        name: &'static str,
        source: CardSource,
        canned: &'static str,
        fetcher: impl FnOnce() -> Arc<dyn Fetcher<String>>,
    ) -> Self {
        match source {
            CardSource::Static => CardContent::Static(canned),
            CardSource::Generated => CardContent::Generated(ContentSlot::new(
                name,
                TriggerPolicy::OnMount,
                canned.to_string(),
                Fallback::uniform(canned.to_string()),
                fetcher(),
            )),
        }
    }

    fn activate(&self) {
        if let CardContent::Generated(slot) = self {
            slot.activate();
        }
    }

    /// Current text, status and whether it came from the model.
    fn current(&self) -> (String, SlotStatus, bool) {
        match self {
            CardContent::Static(text) => (text.to_string(), SlotStatus::Ready, false),
            CardContent::Generated(slot) => {
                let state = slot.snapshot();
                (state.value, state.status, true)
            }
        }
    }

    fn text_view(&self) -> TextCardView {
        let (text, status, generated) = self.current();
        TextCardView {
            status,
            generated,
            text,
        }
    }

    fn slot_view(&self, name: &'static str) -> SlotView {
        match self {
            CardContent::Static(text) => SlotView::fixed(name, text),
            CardContent::Generated(slot) => SlotView::from_slot(slot, slot.snapshot()),
        }
    }

    async fn settled_view(&self, name: &'static str) -> SlotView {
        match self {
            CardContent::Static(text) => SlotView::fixed(name, text),
            CardContent::Generated(slot) => SlotView::from_slot(slot, slot.settled().await),
        }
    }
}

struct ObservedRegion {
    sensor: VisibilitySensor,
    animation: OneShotAnimation,
}

impl ObservedRegion {
    fn new(particles: usize) -> Self {
        Self {
            sensor: VisibilitySensor::default(),
            animation: OneShotAnimation::sparkles(particles),
        }
    }

    fn view(&self) -> AnimationView {
        AnimationView {
            observing: self.sensor.is_observing(),
            armed: self.animation.is_armed(),
            active: self.animation.is_active(),
            particles: self.animation.particles(),
        }
    }
}

/// Builds sessions with the deployment's card sources and the shared client.
#[derive(Clone)]
pub struct PageFactory {
    client: GenAiClient,
    sources: CardSources,
}

impl PageFactory {
    pub fn new(client: GenAiClient, sources: CardSources) -> Self {
        Self { client, sources }
    }

    /// Creates a session and mounts it: on-mount slots fire, petals start falling.
    /// Must be called from within a tokio runtime.
    pub fn mount(&self) -> Arc<PageSession> {
        let text = |prompt: &'static str| -> Arc<dyn Fetcher<String>> {
            Arc::new(TextFetcher::new(self.client.clone(), prompt))
        };

        let image = match self.sources.image {
            ImageSource::Generated => Some(ContentSlot::new(
                "image",
                TriggerPolicy::OnMount,
                content::IMAGE_LOADING.to_string(),
                Fallback::uniform(content::IMAGE_UNAVAILABLE.to_string()),
                Arc::new(ImageFetcher::new(self.client.clone(), IMAGE_PROMPT)),
            )),
            ImageSource::Disabled => None,
        };

        let mut petals = TimedWindow::new(PETAL_DURATION);
        petals.open();

        let session = Arc::new(PageSession {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            poem: CardContent::build("poem", self.sources.poem, content::POEM, || {
                text(POEM_PROMPT)
            }),
            forecast: CardContent::build(
                "forecast",
                self.sources.forecast,
                content::FORECAST,
                || text(FORECAST_PROMPT),
            ),
            history: CardContent::build("history", self.sources.history, content::HISTORY, || {
                text(HISTORY_PROMPT)
            }),
            image,
            compliment: ContentSlot::new(
                "compliment",
                TriggerPolicy::OnDemand,
                content::INITIAL_COMPLIMENT.to_string(),
                Fallback {
                    not_configured: content::COMPLIMENT_NOT_CONFIGURED.to_string(),
                    failed: content::COMPLIMENT_FAILED.to_string(),
                },
                text(COMPLIMENT_PROMPT),
            ),
            image_region: Mutex::new(ObservedRegion::new(IMAGE_SPARKLES)),
            footer_region: Mutex::new(ObservedRegion::new(FOOTER_SPARKLES)),
            petals,
        });

        session.activate();
        info!(session_id = %session.id, "Page session mounted");
        session
    }
}

pub struct PageSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    poem: CardContent,
    forecast: CardContent,
    history: CardContent,
    image: Option<Arc<ContentSlot<String>>>,
    compliment: Arc<ContentSlot<String>>,
    image_region: Mutex<ObservedRegion>,
    footer_region: Mutex<ObservedRegion>,
    petals: TimedWindow,
}

impl PageSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Fires every on-mount slot. Safe to call again: slots fire once.
    pub fn activate(&self) {
        self.poem.activate();
        self.forecast.activate();
        self.history.activate();
        if let Some(image) = &self.image {
            image.activate();
        }
    }

    /// Asks for a new compliment. False when one is already being generated.
    pub fn request_compliment(&self) -> bool {
        self.compliment.request_refresh()
    }

    pub fn compliment_view(&self) -> ComplimentView {
        let state = self.compliment.snapshot();
        let loading = state.is_loading();
        ComplimentView {
            status: state.status,
            text: if loading {
                content::COMPLIMENT_LOADING.to_string()
            } else {
                state.value
            },
            is_initial: state.revision == 0 && !loading,
            button_label: if loading {
                content::COMPLIMENT_BUTTON_BUSY
            } else {
                content::COMPLIMENT_BUTTON
            },
            button_disabled: loading,
        }
    }

    pub fn slot_view(&self, name: SlotName) -> SlotView {
        match name {
            SlotName::Poem => self.poem.slot_view("poem"),
            SlotName::Forecast => self.forecast.slot_view("forecast"),
            SlotName::History => self.history.slot_view("history"),
            SlotName::Image => match &self.image {
                Some(slot) => SlotView::from_slot(slot, slot.snapshot()),
                None => SlotView::fixed("image", ""),
            },
            SlotName::Compliment => SlotView::from_slot(&self.compliment, self.compliment.snapshot()),
        }
    }

    /// Like `slot_view`, but first waits for an in-flight fetch to resolve.
    pub async fn settled_slot_view(&self, name: SlotName) -> SlotView {
        match name {
            SlotName::Poem => self.poem.settled_view("poem").await,
            SlotName::Forecast => self.forecast.settled_view("forecast").await,
            SlotName::History => self.history.settled_view("history").await,
            SlotName::Image => match &self.image {
                Some(slot) => SlotView::from_slot(slot, slot.settled().await),
                None => SlotView::fixed("image", ""),
            },
            SlotName::Compliment => {
                SlotView::from_slot(&self.compliment, self.compliment.settled().await)
            }
        }
    }

    /// Feeds a visible-area ratio for a region into its sensor and animation.
    pub async fn report_visibility(&self, region: Region, ratio: f32) -> AnimationView {
        let mut observed = self.region(region).lock().await;
        if let Some(visible) = observed.sensor.report(ratio) {
            observed.animation.observe(visible);
        }
        observed.view()
    }

    pub async fn view(&self) -> PageView {
        let (poem_text, poem_status, poem_generated) = self.poem.current();
        let poem = layout(&poem_text);

        let (image, error_banner) = match &self.image {
            Some(slot) => {
                let state = slot.snapshot();
                let banner = (state.status == SlotStatus::Error).then(|| state.value.clone());
                let url = (state.status == SlotStatus::Ready).then_some(state.value);
                ((true, state.status, url), banner)
            }
            None => ((false, SlotStatus::Idle, None), None),
        };
        let (enabled, image_status, image_url) = image;

        PageView {
            session_id: self.id,
            created_at: self.created_at,
            headline: content::HEADLINE,
            intro: content::INTRO,
            error_banner,
            petals: PetalsView {
                active: self.petals.is_active(),
                count: PETAL_COUNT,
                duration_ms: self.petals.duration().as_millis() as u64,
            },
            poem: PoemCardView {
                status: poem_status,
                generated: poem_generated,
                acrostic: poem.acrostic(),
                poem,
            },
            forecast: self.forecast.text_view(),
            history: self.history.text_view(),
            image: ImageCardView {
                enabled,
                status: image_status,
                image_url,
                sparkles: self.image_region.lock().await.view(),
            },
            compliment: self.compliment_view(),
            footer: FooterView {
                lines: content::FOOTER_LINES,
                sparkles: self.footer_region.lock().await.view(),
            },
        }
    }

    fn region(&self, region: Region) -> &Mutex<ObservedRegion> {
        match region {
            Region::ImageCard => &self.image_region,
            Region::Footer => &self.footer_region,
        }
    }
}
