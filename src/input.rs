//! Keyboard bindings
//!
//! Key events from the platform are matched against a fixed binding table and
//! folded into a [`TickInput`] for the next frame plus a queue of front-end
//! commands. Nothing here knows about the DOM; the browser entry point
//! forwards `key`/modifier pairs.

use crate::sim::TickInput;

/// Modifier keys held with an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        alt: false,
        ctrl: false,
        meta: false,
        shift: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        alt: false,
        ctrl: false,
        meta: false,
        shift: true,
    };
}

/// Everything a key can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    TurnLeft,
    TurnRight,
    Thrust,
    Shoot,
    Hyperspace,
    Pause,
    NewGame,
    ShowDebug,
    DrawDebug,
    FullScreen,
    Mute,
}

/// Front-end requests that never reach the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    ToggleShowDebug,
    ToggleDrawDebug,
    RequestFullScreen,
    ToggleMute,
}

/// When a binding takes effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// Active for as long as the key is down
    Held,
    /// Once per key-down; auto-repeat is ignored
    Down,
    /// Once when a key that went down comes back up
    Press,
}

#[derive(Debug, Clone)]
struct Binding {
    key: &'static str,
    modifiers: Modifiers,
    action: Action,
    trigger: Trigger,
    is_down: bool,
}

impl Binding {
    const fn new(key: &'static str, modifiers: Modifiers, action: Action, trigger: Trigger) -> Self {
        Self {
            key,
            modifiers,
            action,
            trigger,
            is_down: false,
        }
    }

    /// Releases match on the key alone so a modifier let go first cannot
    /// leave the binding stuck down
    fn matches(&self, key: &str, modifiers: Modifiers, is_release: bool) -> bool {
        self.key == key && (is_release || self.modifiers == modifiers)
    }
}

fn default_bindings() -> Vec<Binding> {
    use Action::*;
    use Trigger::*;
    vec![
        Binding::new("ArrowLeft", Modifiers::NONE, TurnLeft, Held),
        Binding::new("ArrowRight", Modifiers::NONE, TurnRight, Held),
        Binding::new("ArrowUp", Modifiers::NONE, Thrust, Held),
        Binding::new(" ", Modifiers::NONE, Shoot, Down),
        Binding::new("ArrowDown", Modifiers::NONE, Hyperspace, Down),
        Binding::new("p", Modifiers::NONE, Pause, Down),
        Binding::new("s", Modifiers::NONE, NewGame, Press),
        Binding::new("d", Modifiers::NONE, ShowDebug, Press),
        Binding::new("D", Modifiers::SHIFT, DrawDebug, Press),
        Binding::new("f", Modifiers::NONE, FullScreen, Press),
        Binding::new("m", Modifiers::NONE, Mute, Press),
    ]
}

/// Keys whose browser default (scrolling) is suppressed
pub fn should_prevent_default(key: &str) -> bool {
    key.starts_with("Arrow") || key == " "
}

/// Collects key events between frames
#[derive(Debug, Clone)]
pub struct InputManager {
    bindings: Vec<Binding>,
    edges: TickInput,
    commands: Vec<UiCommand>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            bindings: default_bindings(),
            edges: TickInput::default(),
            commands: Vec::new(),
        }
    }

    /// Handle a key-down; returns true when the default action should be prevented
    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) -> bool {
        let mut fired = Vec::new();
        for binding in &mut self.bindings {
            if !binding.matches(key, modifiers, false) || binding.is_down {
                continue;
            }
            binding.is_down = true;
            if binding.trigger == Trigger::Down {
                fired.push(binding.action);
            }
        }
        for action in fired {
            self.fire(action);
        }
        should_prevent_default(key)
    }

    /// Handle a key-up; returns true when the default action should be prevented
    pub fn key_up(&mut self, key: &str, modifiers: Modifiers) -> bool {
        let mut fired = Vec::new();
        for binding in &mut self.bindings {
            if !binding.matches(key, modifiers, true) {
                continue;
            }
            if binding.is_down && binding.trigger == Trigger::Press {
                fired.push(binding.action);
            }
            binding.is_down = false;
        }
        for action in fired {
            self.fire(action);
        }
        should_prevent_default(key)
    }

    /// Release everything (window lost focus); no presses fire
    pub fn clear_keys_down(&mut self) {
        for binding in &mut self.bindings {
            binding.is_down = false;
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.bindings
            .iter()
            .any(|b| b.action == action && b.trigger == Trigger::Held && b.is_down)
    }

    /// Queue a pause toggle from outside the keyboard (focus loss)
    pub fn request_pause(&mut self) {
        self.edges.pause = true;
    }

    fn fire(&mut self, action: Action) {
        match action {
            Action::Shoot => self.edges.shoot = true,
            Action::Hyperspace => self.edges.hyperspace = true,
            // Two toggles within a frame cancel out
            Action::Pause => self.edges.pause = !self.edges.pause,
            Action::NewGame => self.edges.new_game = true,
            Action::ShowDebug => self.commands.push(UiCommand::ToggleShowDebug),
            Action::DrawDebug => self.commands.push(UiCommand::ToggleDrawDebug),
            Action::FullScreen => self.commands.push(UiCommand::RequestFullScreen),
            Action::Mute => self.commands.push(UiCommand::ToggleMute),
            Action::TurnLeft | Action::TurnRight | Action::Thrust => {}
        }
    }

    /// Held state plus the edges collected since the last frame
    pub fn take_tick_input(&mut self) -> TickInput {
        let edges = std::mem::take(&mut self.edges);
        TickInput {
            turn_left: self.is_held(Action::TurnLeft),
            turn_right: self.is_held(Action::TurnRight),
            thrust: self.is_held(Action::Thrust),
            ..edges
        }
    }

    pub fn take_ui_commands(&mut self) -> Vec<UiCommand> {
        std::mem::take(&mut self.commands)
    }
}
