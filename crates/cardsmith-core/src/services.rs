//! Host services injected into the editor: sound cues and user prompts.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Sound cues the editor can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Tool selection.
    Click,
    /// Submenu or option selection.
    Option,
    Draw,
    Stamp,
    Fill,
    Erase,
    Undo,
    Pop,
    Success,
    Wacky,
    Spray,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 11] = [
        SoundEffect::Click,
        SoundEffect::Option,
        SoundEffect::Draw,
        SoundEffect::Stamp,
        SoundEffect::Fill,
        SoundEffect::Erase,
        SoundEffect::Undo,
        SoundEffect::Pop,
        SoundEffect::Success,
        SoundEffect::Wacky,
        SoundEffect::Spray,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Click => "click",
            SoundEffect::Option => "option",
            SoundEffect::Draw => "draw",
            SoundEffect::Stamp => "stamp",
            SoundEffect::Fill => "fill",
            SoundEffect::Erase => "erase",
            SoundEffect::Undo => "undo",
            SoundEffect::Pop => "pop",
            SoundEffect::Success => "success",
            SoundEffect::Wacky => "wacky",
            SoundEffect::Spray => "spray",
        }
    }

    /// Audio asset path for this cue.
    pub fn asset_path(&self) -> &'static str {
        match self {
            SoundEffect::Click => "/sounds/kidpix-menu-click-main-tools.wav.mp3",
            SoundEffect::Option => "/sounds/kidpix-menu-click-submenu-options.wav.mp3",
            SoundEffect::Draw => "/sounds/kidpix-tool-pencil.wav.mp3",
            SoundEffect::Stamp => "/sounds/stamp0.wav.mp3",
            SoundEffect::Fill => "/sounds/flood0.wav.mp3",
            SoundEffect::Erase => "/sounds/kidpix-tool-eraser-tnt-explosion.wav.mp3",
            SoundEffect::Undo => "/sounds/oops0.wav.mp3",
            SoundEffect::Pop => "/sounds/bubble-pop-WAVSOUND.R_000031f6.wav.mp3",
            SoundEffect::Success => "/sounds/chord.wav.mp3",
            SoundEffect::Wacky => "/sounds/electric-mixer-pip-drum-crash-1WAVSOUND.R_0002d96e.wav.mp3",
            SoundEffect::Spray => "/sounds/kidpix-submenu-brush-spraypaint.wav.mp3",
        }
    }
}

/// Fire-and-forget sound playback.
pub trait SoundPlayer {
    fn play(&self, effect: SoundEffect);
}

/// Sound player that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct MutedSound;

impl SoundPlayer for MutedSound {
    fn play(&self, _effect: SoundEffect) {}
}

/// Blocking dialogs shown to the user.
pub trait UserPrompt {
    fn alert(&self, message: &str);

    /// Ask a yes/no question.
    fn confirm(&self, message: &str) -> bool;

    /// Ask for a line of text. `None` when cancelled.
    fn prompt_text(&self, message: &str) -> Option<String>;
}

/// Prompt that answers every question with fixed replies and records alerts.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    confirm_answer: bool,
    text_answers: RefCell<VecDeque<String>>,
    alerts: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(confirm_answer: bool) -> Self {
        Self {
            confirm_answer,
            ..Self::default()
        }
    }

    /// Queue a reply for the next `prompt_text`.
    pub fn push_text(&self, text: impl Into<String>) {
        self.text_answers.borrow_mut().push_back(text.into());
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }
}

impl UserPrompt for ScriptedPrompt {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn confirm(&self, _message: &str) -> bool {
        self.confirm_answer
    }

    fn prompt_text(&self, _message: &str) -> Option<String> {
        self.text_answers.borrow_mut().pop_front()
    }
}

/// Services handed to the editor.
#[derive(Clone)]
pub struct Services {
    pub sound: Rc<dyn SoundPlayer>,
    pub prompt: Rc<dyn UserPrompt>,
}

impl Services {
    pub fn new(sound: Rc<dyn SoundPlayer>, prompt: Rc<dyn UserPrompt>) -> Self {
        Self { sound, prompt }
    }

    /// Muted sound and a prompt that confirms everything.
    pub fn headless() -> Self {
        Self::new(Rc::new(MutedSound), Rc::new(ScriptedPrompt::new(true)))
    }

    pub fn play(&self, effect: SoundEffect) {
        self.sound.play(effect);
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::headless()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_paths_unique() {
        let mut paths: Vec<_> = SoundEffect::ALL.iter().map(|s| s.asset_path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), SoundEffect::ALL.len());
        assert!(paths.iter().all(|p| p.starts_with("/sounds/")));
    }

    #[test]
    fn test_scripted_prompt() {
        let prompt = ScriptedPrompt::new(false);
        prompt.push_text("hi");
        assert!(!prompt.confirm("sure?"));
        assert_eq!(prompt.prompt_text("text?"), Some("hi".to_string()));
        assert_eq!(prompt.prompt_text("text?"), None);
        prompt.alert("done");
        assert_eq!(prompt.alerts(), vec!["done".to_string()]);
    }
}
