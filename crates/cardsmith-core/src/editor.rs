//! Editor controller: routes pointer input to the active tool and owns the
//! scene, history, asset loader and injected services.

use crate::assets::AssetLoader;
use crate::composer::{CompositionReport, compose};
use crate::config::EditorConfig;
use crate::effects::{self, EffectTrail, WackyEffect};
use crate::elements::{Element, ElementId, ElementKind, ElementTag, Figure, Placement, SerializableColor, Text};
use crate::export::{CardSink, ExportError, Rasterizer, export_card};
use crate::fill::{FillPattern, fill_background};
use crate::history::{HistoryManager, SuspendGuard};
use crate::import::{ImportError, import_data_url};
use crate::scene::CardScene;
use crate::services::{Services, SoundEffect};
use crate::tools::{StrokeBuilder, ToolKind, ToolSettings};
use kurbo::{Point, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::Cell;
use std::rc::Rc;

/// Pointer slop when picking elements with the move tool.
const HIT_TOLERANCE: f64 = 4.0;

/// Smallest scale the selection can be shrunk to.
const MIN_SCALE: f64 = 0.1;

pub const NEW_CARD_PROMPT: &str = "Start a fresh new sparkly card?";
pub const TEXT_PROMPT: &str = "Enter text:";

/// Shared "operation in progress" flag.
///
/// Clones observe the same flag, so a UI can grey out a button while the
/// editor future is still pending.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Rc<Cell<bool>>);

impl BusyFlag {
    pub fn is_busy(&self) -> bool {
        self.0.get()
    }

    /// Mark busy. `None` if already busy.
    pub fn try_begin(&self) -> Option<BusyGuard> {
        if self.0.replace(true) {
            return None;
        }
        Some(BusyGuard(Rc::clone(&self.0)))
    }
}

/// Clears its [`BusyFlag`] when dropped.
#[must_use]
pub struct BusyGuard(Rc<Cell<bool>>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[derive(Debug, Clone, Copy)]
struct MoveDrag {
    id: ElementId,
    last: Point,
    moved: bool,
}

/// The greeting-card editor.
pub struct Editor<L> {
    scene: CardScene,
    history: HistoryManager,
    settings: ToolSettings,
    config: EditorConfig,
    strokes: StrokeBuilder,
    trail: EffectTrail,
    drag: Option<MoveDrag>,
    /// Keeps history muted for the length of a drag gesture.
    gesture_mute: Option<SuspendGuard>,
    selection: Option<ElementId>,
    services: Services,
    loader: L,
    rng: StdRng,
    generating: BusyFlag,
    exporting: BusyFlag,
}

impl<L> Editor<L> {
    /// Create an editor with an empty card and its baseline history state.
    pub fn new(config: EditorConfig, loader: L, services: Services) -> Self {
        let mut scene = CardScene::new(config.canvas_width, config.canvas_height);
        let history = HistoryManager::new();
        scene.subscribe(Rc::new(history.clone()));
        history.capture_baseline(&scene);

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            scene,
            history,
            settings: config.tools.clone(),
            config,
            strokes: StrokeBuilder::new(),
            trail: EffectTrail::new(),
            drag: None,
            gesture_mute: None,
            selection: None,
            services,
            loader,
            rng,
            generating: BusyFlag::default(),
            exporting: BusyFlag::default(),
        }
    }

    pub fn scene(&self) -> &CardScene {
        &self.scene
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Tool options such as color, sizes, stamp and font.
    pub fn settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.settings
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn selection(&self) -> Option<ElementId> {
        self.selection
    }

    pub fn is_generating(&self) -> bool {
        self.generating.is_busy()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.is_busy()
    }

    pub fn generating_flag(&self) -> BusyFlag {
        self.generating.clone()
    }

    pub fn exporting_flag(&self) -> BusyFlag {
        self.exporting.clone()
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.commit_gesture();
        if tool != ToolKind::Move {
            self.selection = None;
        }
        self.settings.tool = tool;
        self.services.play(SoundEffect::Click);
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.settings.color = color;
        self.services.play(SoundEffect::Click);
    }

    /// Fill the background and record it as one history step.
    pub fn fill(&mut self, color: SerializableColor, pattern: FillPattern) -> Option<ElementId> {
        let backdrop = {
            let _mute = self.history.suspend();
            fill_background(&mut self.scene, color, pattern)
        };
        self.history.snapshot(&self.scene);
        self.services.play(SoundEffect::Fill);
        backdrop
    }

    /// Clear the card after the user confirms. Returns whether it was cleared.
    pub fn new_card(&mut self) -> bool {
        if !self.services.prompt.confirm(NEW_CARD_PROMPT) {
            return false;
        }
        self.cancel_gesture();
        self.selection = None;
        self.scene.clear();
        self.services.play(SoundEffect::Click);
        true
    }

    /// Import a picture from a `data:` URL and select it.
    pub fn import_image(&mut self, data_url: &str) -> Result<ElementId, ImportError> {
        match import_data_url(&mut self.scene, data_url, self.config.import_max_dimension) {
            Ok(id) => {
                self.selection = Some(id);
                self.services.play(SoundEffect::Stamp);
                Ok(id)
            }
            Err(e) => {
                log::error!("Failed to load image: {e}");
                Err(e)
            }
        }
    }

    /// Add a quick phrase near the top-left of the card.
    pub fn add_special_text(&mut self, content: &str) -> ElementId {
        let x = 150.0 + self.rng.random::<f64>() * 100.0;
        let y = 150.0 + self.rng.random::<f64>() * 100.0;
        let id = self.add_text(content, Point::new(x, y), 32.0);
        self.services.play(SoundEffect::Stamp);
        id
    }

    /// Add user-typed text at the center of the card.
    pub fn add_custom_text(&mut self, content: &str) -> ElementId {
        let center = Point::new(self.scene.width() / 2.0, self.scene.height() / 2.0);
        let id = self.add_text(content, center, 36.0);
        self.services.play(SoundEffect::Click);
        id
    }

    fn add_text(&mut self, content: &str, center: Point, size: f64) -> ElementId {
        let text = Text::new(content, self.settings.font, size, self.settings.color);
        let id = self
            .scene
            .add(Element::new(ElementTag::Text, Placement::at(center), ElementKind::Text(text)));
        self.scene.bring_to_front(id);
        self.selection = Some(id);
        id
    }

    /// Scale the selected element by `factor`, never below 10%.
    pub fn scale_selected(&mut self, factor: f64) -> bool {
        let Some(id) = self.selection else {
            return false;
        };
        let Some(element) = self.scene.get_mut(id) else {
            return false;
        };
        let current = element.placement.scale_x.abs().min(element.placement.scale_y.abs());
        let factor = if current * factor < MIN_SCALE && current > 0.0 {
            MIN_SCALE / current
        } else {
            factor
        };
        element.scale_by(factor);
        self.scene.mark_modified(vec![id]);
        true
    }

    pub fn bring_selected_to_front(&mut self) -> bool {
        let Some(id) = self.selection.filter(|id| self.scene.contains(*id)) else {
            return false;
        };
        self.scene.bring_to_front(id);
        self.scene.mark_modified(vec![id]);
        true
    }

    /// Send the selection to the back, keeping the background below it.
    pub fn send_selected_to_back(&mut self) -> bool {
        let Some(id) = self.selection.filter(|id| self.scene.contains(*id)) else {
            return false;
        };
        self.scene.send_to_back(id);
        if let Some(background) = self.scene.background_element() {
            self.scene.send_to_back(background);
        }
        self.scene.mark_modified(vec![id]);
        true
    }

    /// Export the card as a PNG through `sink`.
    pub fn export<R, S>(&self, rasterizer: &R, sink: &S) -> Result<String, ExportError>
    where
        R: Rasterizer + ?Sized,
        S: CardSink + ?Sized,
    {
        let Some(_busy) = self.exporting.try_begin() else {
            return Err(ExportError::Busy);
        };
        export_card(
            &self.scene,
            rasterizer,
            sink,
            &self.services,
            &self.config.export_prefix,
        )
    }

    pub fn pointer_move(&mut self, point: Point) {
        if self.strokes.is_active() {
            self.strokes.update(point);
        } else if self.trail.is_active() {
            let effect = self.settings.wacky_effect;
            if self.settings.tool != ToolKind::Wacky || !effect.is_drag() {
                self.cancel_gesture();
                return;
            }
            self.trail.extend(&mut self.scene, effect, point, &mut self.rng);
        } else if let Some(drag) = self.drag.as_mut() {
            let delta: Vec2 = point - drag.last;
            if let Some(element) = self.scene.get_mut(drag.id) {
                element.translate(delta);
                drag.last = point;
                drag.moved = true;
            }
        }
    }

    /// Finish the current gesture. Returns the stroke element it produced.
    pub fn pointer_up(&mut self, point: Point) -> Option<ElementId> {
        if self.strokes.is_active() {
            let element = self.strokes.end(point)?;
            return Some(self.scene.add(element));
        }
        self.commit_gesture();
        None
    }

    /// Record the end of a drag gesture as one history step.
    fn commit_gesture(&mut self) {
        self.strokes.cancel();
        let trail_ended = self.trail.end();
        self.gesture_mute = None;
        if let Some(drag) = self.drag.take() {
            if drag.moved {
                self.scene.mark_modified(vec![drag.id]);
            }
        }
        if trail_ended {
            self.history.snapshot(&self.scene);
        }
    }

    fn cancel_gesture(&mut self) {
        self.strokes.cancel();
        self.trail.end();
        self.drag = None;
        self.gesture_mute = None;
    }

    fn place_text(&mut self, point: Point) -> Option<ElementId> {
        let content = self.services.prompt.prompt_text(TEXT_PROMPT)?;
        if content.is_empty() {
            return None;
        }
        let size = self.settings.figure_size();
        let id = self.add_text(&content, point, size);
        self.services.play(SoundEffect::Click);
        Some(id)
    }

    fn place_shape(&mut self, point: Point) -> ElementId {
        let figure = Figure::new(self.settings.shape, self.settings.figure_size(), self.settings.color);
        let id = self
            .scene
            .add(Element::new(ElementTag::Shape, Placement::at(point), ElementKind::Figure(figure)));
        self.scene.bring_to_front(id);
        self.services.play(SoundEffect::Stamp);
        id
    }

    fn apply_wacky(&mut self, point: Point) -> Option<ElementId> {
        match self.settings.wacky_effect {
            WackyEffect::Mirror => {
                effects::mirror(&mut self.scene);
            }
            WackyEffect::Scramble => {
                effects::scramble(&mut self.scene, &mut self.rng);
            }
            WackyEffect::Pixelate => {
                {
                    let _mute = self.history.suspend();
                    effects::pixelate(&mut self.scene, point, &mut self.rng);
                }
                self.history.snapshot(&self.scene);
            }
            WackyEffect::Smear | WackyEffect::Rainbow => {
                self.trail.begin(point);
                self.gesture_mute = Some(self.history.suspend());
                return None;
            }
        }
        self.services.play(SoundEffect::Wacky);
        None
    }

    fn begin_move(&mut self, point: Point) -> Option<ElementId> {
        let hit = self
            .scene
            .elements_at_point(point, HIT_TOLERANCE, true)
            .first()
            .copied();
        self.selection = hit;
        let id = hit?;
        self.drag = Some(MoveDrag {
            id,
            last: point,
            moved: false,
        });
        self.gesture_mute = Some(self.history.suspend());
        Some(id)
    }
}

impl<L: AssetLoader> Editor<L> {
    /// Start a gesture with the active tool.
    ///
    /// Returns the element the press created or picked, if any.
    pub async fn pointer_down(&mut self, point: Point) -> Option<ElementId> {
        self.cancel_gesture();
        match self.settings.tool {
            ToolKind::Brush => {
                let brush = self.settings.brush();
                self.strokes.begin(point, brush, ElementTag::Stroke);
                self.services
                    .play(if brush.spray { SoundEffect::Spray } else { SoundEffect::Draw });
                None
            }
            ToolKind::Eraser => {
                let brush = self.settings.eraser(self.scene.background());
                self.strokes.begin(point, brush, ElementTag::Eraser);
                self.services.play(SoundEffect::Erase);
                None
            }
            ToolKind::Fill => self.fill(self.settings.color, self.settings.pattern),
            ToolKind::Stamp => self.place_stamp(point).await,
            ToolKind::Text => self.place_text(point),
            ToolKind::Shapes => Some(self.place_shape(point)),
            ToolKind::Wacky => self.apply_wacky(point),
            ToolKind::Move => self.begin_move(point),
        }
    }

    /// Stamp the current stamp at `point`. Asset paths are loaded; any other
    /// stamp string is placed as text.
    async fn place_stamp(&mut self, point: Point) -> Option<ElementId> {
        let stamp = self.settings.stamp.clone();
        let size = self.settings.stamp_size;
        let element = if stamp.starts_with('/') {
            match self.loader.load(&stamp).await {
                Ok(image) => {
                    let picture = image.into_picture();
                    let placement = Placement::at(point).with_scale(picture.scale_to_fit(size));
                    Element::new(ElementTag::Stamp, placement, ElementKind::Picture(picture))
                }
                Err(e) => {
                    log::warn!("Error loading stamp image {stamp}: {e}");
                    return None;
                }
            }
        } else {
            let text = Text::new(stamp, self.settings.font, size, SerializableColor::black());
            Element::new(ElementTag::Stamp, Placement::at(point), ElementKind::Text(text))
        };
        let id = self.scene.add(element);
        self.scene.bring_to_front(id);
        self.services.play(SoundEffect::Stamp);
        Some(id)
    }

    pub async fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        self.services.play(SoundEffect::Undo);
        self.cancel_gesture();
        let restored = self.history.undo(&mut self.scene).await;
        self.retain_selection();
        restored
    }

    pub async fn redo(&mut self) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        self.services.play(SoundEffect::Undo);
        self.cancel_gesture();
        let restored = self.history.redo(&mut self.scene).await;
        self.retain_selection();
        restored
    }

    fn retain_selection(&mut self) {
        self.selection = self.selection.filter(|id| self.scene.contains(*id));
    }

    /// Replace the card with a random design, recorded as one history step.
    ///
    /// Returns `None` when a design is already being generated.
    pub async fn random_design(&mut self) -> Option<CompositionReport> {
        let Some(_busy) = self.generating.try_begin() else {
            log::debug!("Random design already in progress");
            return None;
        };
        self.services.play(SoundEffect::Wacky);
        self.cancel_gesture();
        self.selection = None;

        let report = {
            let _mute = self.history.suspend();
            compose(&mut self.scene, &self.loader, &mut self.rng).await
        };
        self.history.snapshot(&self.scene);
        self.services.play(SoundEffect::Stamp);
        Some(report)
    }
}
