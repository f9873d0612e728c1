//! Linear undo/redo history over whole-scene snapshots.
//!
//! The manager is a cheap clone handle; every clone shares the same buffer.
//! It is also a [`SceneObserver`], so subscribing it to a [`CardScene`] makes
//! every user-visible change land in the history automatically.

use crate::scene::{CardScene, SceneEvent, SceneGraph, SceneObserver, SceneSnapshot};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Maximum number of history states to keep.
pub const MAX_HISTORY: usize = 50;

#[derive(Debug)]
struct HistoryState {
    entries: Vec<SceneSnapshot>,
    /// Index of the entry matching the current scene. `None` when empty.
    cursor: Option<usize>,
    /// True while a restore triggered by undo/redo is in flight.
    restoring: bool,
    /// Number of live [`SuspendGuard`]s.
    suspended: usize,
    capacity: usize,
}

/// Shared undo/redo buffer.
#[derive(Clone)]
pub struct HistoryManager {
    state: Rc<RefCell<HistoryState>>,
}

impl fmt::Debug for HistoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("HistoryManager")
            .field("len", &state.entries.len())
            .field("cursor", &state.cursor)
            .field("restoring", &state.restoring)
            .finish()
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    /// Create a manager keeping at most `capacity` states, between one and [`MAX_HISTORY`].
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(HistoryState {
                entries: Vec::new(),
                cursor: None,
                restoring: false,
                suspended: 0,
                capacity: capacity.clamp(1, MAX_HISTORY),
            })),
        }
    }

    /// Record the current scene as the newest state.
    ///
    /// Discards any redo states past the cursor and evicts the oldest state
    /// when full. Ignored while restoring or suspended. Returns whether a
    /// state was recorded.
    pub fn snapshot<S: SceneGraph + ?Sized>(&self, scene: &S) -> bool {
        {
            let state = self.state.borrow();
            if state.restoring || state.suspended > 0 {
                return false;
            }
        }

        let snapshot = match scene.serialize() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::debug!("Skipping history snapshot: {e}");
                return false;
            }
        };

        let mut state = self.state.borrow_mut();
        let keep = state.cursor.map_or(0, |c| c + 1);
        state.entries.truncate(keep);
        state.entries.push(snapshot);
        if state.entries.len() > state.capacity {
            state.entries.remove(0);
        }
        state.cursor = Some(state.entries.len() - 1);
        log::debug!("History snapshot {} of {}", state.entries.len(), state.capacity);
        true
    }

    /// Record the initial state once, if nothing has been recorded yet.
    pub fn capture_baseline<S: SceneGraph + ?Sized>(&self, scene: &S) -> bool {
        if !self.state.borrow().entries.is_empty() {
            return false;
        }
        self.snapshot(scene)
    }

    /// Step back one state. Returns whether the scene was restored.
    pub async fn undo<S: SceneGraph + ?Sized>(&self, scene: &mut S) -> bool {
        let target = {
            let state = self.state.borrow();
            match state.cursor {
                Some(c) if c > 0 && !state.restoring => c - 1,
                _ => return false,
            }
        };
        self.restore_to(scene, target).await
    }

    /// Step forward one state. Returns whether the scene was restored.
    pub async fn redo<S: SceneGraph + ?Sized>(&self, scene: &mut S) -> bool {
        let target = {
            let state = self.state.borrow();
            match state.cursor {
                Some(c) if c + 1 < state.entries.len() && !state.restoring => c + 1,
                _ => return false,
            }
        };
        self.restore_to(scene, target).await
    }

    async fn restore_to<S: SceneGraph + ?Sized>(&self, scene: &mut S, target: usize) -> bool {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            let Some(snapshot) = state.entries.get(target).cloned() else {
                return false;
            };
            state.restoring = true;
            snapshot
        };

        let result = scene.restore(&snapshot).await;

        let mut state = self.state.borrow_mut();
        state.restoring = false;
        match result {
            Ok(()) => {
                state.cursor = Some(target);
                log::debug!("History restored state {target}");
                true
            }
            Err(e) => {
                log::warn!("History restore failed: {e}");
                false
            }
        }
    }

    /// Mute snapshots until the returned guard is dropped.
    pub fn suspend(&self) -> SuspendGuard {
        self.state.borrow_mut().suspended += 1;
        SuspendGuard {
            state: Rc::clone(&self.state),
        }
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.state.borrow().cursor, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        let state = self.state.borrow();
        matches!(state.cursor, Some(c) if c + 1 < state.entries.len())
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.state.borrow().cursor
    }

    pub fn capacity(&self) -> usize {
        self.state.borrow().capacity
    }

    pub fn is_restoring(&self) -> bool {
        self.state.borrow().restoring
    }

    pub fn is_suspended(&self) -> bool {
        self.state.borrow().suspended > 0
    }

    /// Snapshot stored at `index`, oldest first.
    pub fn entry(&self, index: usize) -> Option<SceneSnapshot> {
        self.state.borrow().entries.get(index).cloned()
    }
}

impl SceneObserver for HistoryManager {
    fn on_scene_event(&self, scene: &CardScene, event: &SceneEvent) {
        match event {
            SceneEvent::ElementAdded { .. }
            | SceneEvent::ElementsModified { .. }
            | SceneEvent::BackgroundChanged
            | SceneEvent::Cleared => {
                self.snapshot(scene);
            }
            SceneEvent::ElementRemoved { .. } => {}
        }
    }
}

/// Keeps history muted while alive.
#[must_use = "history resumes as soon as the guard is dropped"]
pub struct SuspendGuard {
    state: Rc<RefCell<HistoryState>>,
}

impl Drop for SuspendGuard {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.suspended = state.suspended.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Element, ElementKind, ElementTag, Figure, Placement, SerializableColor, ShapeKind};
    use kurbo::Point;

    fn dot() -> Element {
        Element::new(
            ElementTag::Shape,
            Placement::at(Point::new(10.0, 10.0)),
            ElementKind::Figure(Figure::new(ShapeKind::Circle, 10.0, SerializableColor::black())),
        )
    }

    fn observed_scene() -> (CardScene, HistoryManager) {
        let history = HistoryManager::new();
        let mut scene = CardScene::new(800.0, 600.0);
        scene.subscribe(Rc::new(history.clone()));
        history.capture_baseline(&scene);
        (scene, history)
    }

    #[test]
    fn test_empty_history() {
        let history = HistoryManager::new();
        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_baseline_once() {
        let (scene, history) = observed_scene();
        assert_eq!(history.len(), 1);
        assert!(!history.capture_baseline(&scene));
        assert_eq!(history.cursor(), Some(0));
    }

    #[test]
    fn test_observer_snapshots_on_add() {
        let (mut scene, history) = observed_scene();
        scene.add(dot());
        scene.add(dot());
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), Some(2));
        assert!(history.can_undo());
    }

    #[test]
    fn test_removal_not_recorded() {
        let (mut scene, history) = observed_scene();
        let id = scene.add(dot());
        scene.remove(id);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_undo_redo_restores() {
        let (mut scene, history) = observed_scene();
        scene.add(dot());
        assert!(pollster::block_on(history.undo(&mut scene)));
        assert!(scene.is_empty());
        assert_eq!(history.cursor(), Some(0));
        assert_eq!(history.len(), 2);

        assert!(pollster::block_on(history.redo(&mut scene)));
        assert_eq!(scene.len(), 1);
        assert_eq!(history.cursor(), Some(1));
        assert_eq!(history.len(), 2);
        assert!(!history.is_restoring());
    }

    #[test]
    fn test_new_snapshot_discards_redo() {
        let (mut scene, history) = observed_scene();
        scene.add(dot());
        scene.add(dot());
        pollster::block_on(history.undo(&mut scene));
        scene.add(dot());
        assert_eq!(history.len(), 3);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_fifo_eviction() {
        let history = HistoryManager::with_capacity(3);
        let mut scene = CardScene::new(100.0, 100.0);
        let mut recorded = Vec::new();
        for _ in 0..5 {
            scene.add(dot());
            history.snapshot(&scene);
            recorded.push(scene.serialize().expect("serialize"));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), Some(2));
        assert_eq!(history.entry(0), Some(recorded[2].clone()));
    }

    #[test]
    fn test_capacity_never_exceeds_max() {
        assert_eq!(HistoryManager::with_capacity(500).capacity(), MAX_HISTORY);
        assert_eq!(HistoryManager::with_capacity(0).capacity(), 1);

        let history = HistoryManager::with_capacity(500);
        let mut scene = CardScene::new(100.0, 100.0);
        for _ in 0..MAX_HISTORY + 5 {
            scene.add(dot());
            history.snapshot(&scene);
        }
        assert_eq!(history.len(), MAX_HISTORY);
    }

    #[test]
    fn test_suspend_guard() {
        let (mut scene, history) = observed_scene();
        {
            let _guard = history.suspend();
            scene.add(dot());
            scene.add(dot());
            assert!(history.is_suspended());
            assert!(!history.snapshot(&scene));
        }
        assert!(!history.is_suspended());
        assert!(history.snapshot(&scene));
        assert_eq!(history.len(), 2);
    }
}
