//! The card scene: element storage, z-order, change events and snapshots.

use crate::elements::{Element, ElementId, ElementTag, SerializableColor};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use thiserror::Error;
use uuid::Uuid;

/// Boxed future for single-threaded async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Scene errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("Restore failed: {0}")]
    Restore(String),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Opaque serialized form of a whole scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SceneSnapshot(String);

impl SceneSnapshot {
    pub fn new(json: impl Into<String>) -> Self {
        Self(json.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Change notifications emitted by [`CardScene`].
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    ElementAdded { id: ElementId, tag: ElementTag },
    ElementRemoved { id: ElementId },
    /// One or more existing elements changed placement or style.
    ElementsModified { ids: Vec<ElementId> },
    BackgroundChanged,
    Cleared,
}

/// Receives scene change notifications.
pub trait SceneObserver {
    fn on_scene_event(&self, scene: &CardScene, event: &SceneEvent);
}

/// A scene that can be captured and later restored.
///
/// Restoring is asynchronous; callers must not assume it completes before the
/// returned future resolves.
pub trait SceneGraph {
    fn serialize(&self) -> SceneResult<SceneSnapshot>;

    fn restore<'a>(&'a mut self, snapshot: &'a SceneSnapshot) -> BoxFuture<'a, SceneResult<()>>;
}

/// Serialized layout of a scene. Elements are stored back to front.
#[derive(Debug, Serialize, Deserialize)]
struct SceneDocument {
    id: String,
    width: f64,
    height: f64,
    background: SerializableColor,
    elements: Vec<Element>,
}

/// The card being edited.
pub struct CardScene {
    id: String,
    width: f64,
    height: f64,
    background: SerializableColor,
    elements: HashMap<ElementId, Element>,
    /// Back to front.
    z_order: Vec<ElementId>,
    observers: Vec<Rc<dyn SceneObserver>>,
}

impl fmt::Debug for CardScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardScene")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("background", &self.background)
            .field("elements", &self.z_order.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for CardScene {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl CardScene {
    /// Create an empty white scene.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            width,
            height,
            background: SerializableColor::white(),
            elements: HashMap::new(),
            z_order: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Register an observer for change events.
    pub fn subscribe(&mut self, observer: Rc<dyn SceneObserver>) {
        self.observers.push(observer);
    }

    fn emit(&self, event: SceneEvent) {
        if self.observers.is_empty() {
            return;
        }
        let observers = self.observers.clone();
        for observer in observers {
            observer.on_scene_event(self, &event);
        }
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    pub fn background(&self) -> SerializableColor {
        self.background
    }

    pub fn set_background(&mut self, color: SerializableColor) {
        self.background = color;
        self.emit(SceneEvent::BackgroundChanged);
    }

    /// Add an element on top of the stack and return its id.
    pub fn add(&mut self, element: Element) -> ElementId {
        let id = element.id();
        let tag = element.tag;
        if self.elements.insert(id, element).is_none() {
            self.z_order.push(id);
        }
        self.emit(SceneEvent::ElementAdded { id, tag });
        id
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let removed = self.elements.remove(&id)?;
        self.z_order.retain(|&z| z != id);
        self.emit(SceneEvent::ElementRemoved { id });
        Some(removed)
    }

    /// Remove every element and reset the background to white.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.z_order.clear();
        self.background = SerializableColor::white();
        self.emit(SceneEvent::Cleared);
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Mutable access; call [`CardScene::mark_modified`] afterwards.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.z_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z_order.is_empty()
    }

    /// Ids from back to front.
    pub fn z_order(&self) -> &[ElementId] {
        &self.z_order
    }

    /// Elements from back to front.
    pub fn elements_ordered(&self) -> impl Iterator<Item = &Element> {
        self.z_order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Notify observers that elements were changed in place.
    pub fn mark_modified(&mut self, ids: Vec<ElementId>) {
        if ids.is_empty() {
            return;
        }
        self.emit(SceneEvent::ElementsModified { ids });
    }

    /// Move an element by a delta and emit a modification event.
    pub fn translate(&mut self, id: ElementId, delta: Vec2) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.translate(delta);
            self.mark_modified(vec![id]);
        }
    }

    pub fn bring_to_front(&mut self, id: ElementId) {
        if let Some(pos) = self.z_order.iter().position(|&z| z == id) {
            self.z_order.remove(pos);
            self.z_order.push(id);
        }
    }

    pub fn send_to_back(&mut self, id: ElementId) {
        if let Some(pos) = self.z_order.iter().position(|&z| z == id) {
            self.z_order.remove(pos);
            self.z_order.insert(0, id);
        }
    }

    /// Index of an element in the stack (0 = back).
    pub fn z_index(&self, id: ElementId) -> Option<usize> {
        self.z_order.iter().position(|&z| z == id)
    }

    /// Topmost element id, if any.
    pub fn topmost(&self) -> Option<ElementId> {
        self.z_order.last().copied()
    }

    /// Elements under a point, front to back.
    pub fn elements_at_point(&self, point: Point, tolerance: f64, selectable_only: bool) -> Vec<ElementId> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|id| self.elements.get(id))
            .filter(|e| !selectable_only || e.selectable)
            .filter(|e| e.hit_test(point, tolerance))
            .map(|e| e.id())
            .collect()
    }

    /// The pattern or picture element covering the canvas, if present.
    pub fn background_element(&self) -> Option<ElementId> {
        self.elements_ordered()
            .find(|e| e.tag.is_background())
            .map(|e| e.id())
    }

    /// Ids of elements carrying a given tag, back to front.
    pub fn ids_with_tag(&self, tag: ElementTag) -> Vec<ElementId> {
        self.elements_ordered()
            .filter(|e| e.tag == tag)
            .map(|e| e.id())
            .collect()
    }

    fn to_document(&self) -> SceneDocument {
        SceneDocument {
            id: self.id.clone(),
            width: self.width,
            height: self.height,
            background: self.background,
            elements: self.elements_ordered().cloned().collect(),
        }
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_document())
    }

    /// Deserialize from a JSON string. Observers are not carried over.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let doc: SceneDocument = serde_json::from_str(json)?;
        let mut scene = Self::new(doc.width, doc.height);
        scene.id = doc.id;
        scene.background = doc.background;
        for element in doc.elements {
            scene.z_order.push(element.id());
            scene.elements.insert(element.id(), element);
        }
        Ok(scene)
    }
}

impl SceneGraph for CardScene {
    fn serialize(&self) -> SceneResult<SceneSnapshot> {
        self.to_json()
            .map(SceneSnapshot::new)
            .map_err(|e| SceneError::Serialization(e.to_string()))
    }

    /// Replace the scene contents with a snapshot.
    ///
    /// Every element is re-added in order and emits `ElementAdded`.
    fn restore<'a>(&'a mut self, snapshot: &'a SceneSnapshot) -> BoxFuture<'a, SceneResult<()>> {
        Box::pin(async move {
            let doc: SceneDocument = serde_json::from_str(snapshot.as_str())
                .map_err(|e| SceneError::InvalidSnapshot(e.to_string()))?;
            self.id = doc.id;
            self.width = doc.width;
            self.height = doc.height;
            self.background = doc.background;
            self.elements.clear();
            self.z_order.clear();
            for element in doc.elements {
                self.add(element);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementKind, Figure, Placement, ShapeKind};
    use std::cell::RefCell;

    fn square_at(x: f64, y: f64) -> Element {
        Element::new(
            ElementTag::Shape,
            Placement::at(Point::new(x, y)),
            ElementKind::Figure(Figure::new(ShapeKind::Square, 20.0, SerializableColor::black())),
        )
    }

    #[derive(Default)]
    struct Recorder(RefCell<Vec<SceneEvent>>);

    impl SceneObserver for Recorder {
        fn on_scene_event(&self, _scene: &CardScene, event: &SceneEvent) {
            self.0.borrow_mut().push(event.clone());
        }
    }

    #[test]
    fn test_add_remove() {
        let mut scene = CardScene::new(800.0, 600.0);
        let id = scene.add(square_at(10.0, 10.0));
        assert_eq!(scene.len(), 1);
        assert!(scene.contains(id));
        assert!(scene.remove(id).is_some());
        assert!(scene.is_empty());
        assert!(scene.remove(id).is_none());
    }

    #[test]
    fn test_z_order() {
        let mut scene = CardScene::new(800.0, 600.0);
        let a = scene.add(square_at(50.0, 50.0));
        let b = scene.add(square_at(50.0, 50.0));
        let c = scene.add(square_at(50.0, 50.0));
        assert_eq!(scene.z_order(), &[a, b, c]);

        scene.bring_to_front(a);
        assert_eq!(scene.z_order(), &[b, c, a]);
        scene.send_to_back(c);
        assert_eq!(scene.z_order(), &[c, b, a]);
        assert_eq!(scene.elements_at_point(Point::new(50.0, 50.0), 0.0, false), vec![a, b, c]);
    }

    #[test]
    fn test_events_emitted() {
        let recorder = Rc::new(Recorder::default());
        let mut scene = CardScene::new(800.0, 600.0);
        scene.subscribe(recorder.clone());

        let id = scene.add(square_at(10.0, 10.0));
        scene.translate(id, Vec2::new(5.0, 0.0));
        scene.set_background(SerializableColor::black());
        scene.remove(id);
        scene.clear();

        let events = recorder.0.borrow();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], SceneEvent::ElementAdded { id, tag: ElementTag::Shape });
        assert_eq!(events[1], SceneEvent::ElementsModified { ids: vec![id] });
        assert_eq!(events[2], SceneEvent::BackgroundChanged);
        assert_eq!(events[3], SceneEvent::ElementRemoved { id });
        assert_eq!(events[4], SceneEvent::Cleared);
    }

    #[test]
    fn test_clear_resets_background() {
        let mut scene = CardScene::new(800.0, 600.0);
        scene.set_background(SerializableColor::black());
        scene.add(square_at(10.0, 10.0));
        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(scene.background(), SerializableColor::white());
    }

    #[test]
    fn test_json_roundtrip_preserves_order() {
        let mut scene = CardScene::new(640.0, 480.0);
        let a = scene.add(square_at(1.0, 1.0));
        let b = scene.add(square_at(2.0, 2.0));
        scene.send_to_back(b);

        let json = scene.to_json().expect("serialize");
        let loaded = CardScene::from_json(&json).expect("deserialize");
        assert_eq!(loaded.z_order(), &[b, a]);
        assert_eq!(loaded.size(), (640.0, 480.0));
        assert_eq!(loaded.get(a), scene.get(a));
    }

    #[test]
    fn test_restore_readds_elements() {
        let mut scene = CardScene::new(800.0, 600.0);
        let a = scene.add(square_at(1.0, 1.0));
        let snapshot = scene.serialize().expect("serialize");
        scene.clear();

        let recorder = Rc::new(Recorder::default());
        scene.subscribe(recorder.clone());
        pollster::block_on(scene.restore(&snapshot)).expect("restore");

        assert_eq!(scene.z_order(), &[a]);
        assert_eq!(
            recorder.0.borrow().as_slice(),
            &[SceneEvent::ElementAdded { id: a, tag: ElementTag::Shape }]
        );
        assert_eq!(scene.serialize().expect("serialize"), snapshot);
    }

    #[test]
    fn test_restore_rejects_garbage() {
        let mut scene = CardScene::new(800.0, 600.0);
        let a = scene.add(square_at(1.0, 1.0));
        let result = pollster::block_on(scene.restore(&SceneSnapshot::new("{not json")));
        assert!(matches!(result, Err(SceneError::InvalidSnapshot(_))));
        assert!(scene.contains(a));
    }
}
