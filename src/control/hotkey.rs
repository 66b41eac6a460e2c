//! Global hotkeys
//!
//! Key names from the settings are parsed into `rdev` keys once, and raw key
//! presses are mapped to a typed [`HotkeyAction`] at the boundary.

use std::thread;

use crossbeam_channel::Sender;
use once_cell::sync::Lazy;
use rdev::{listen, EventType, Key};
use serde::{Deserialize, Serialize};

/// Everything a hotkey can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    Start,
    Pause,
    Exit,
    Help,
}

/// Key names for each action, as stored in the settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyBindings {
    pub start: String,
    pub pause: String,
    pub exit: String,
    pub help: String,
}

impl Default for HotkeyBindings {
    fn default() -> Self {
        Self {
            start: "F8".into(),
            pause: "F9".into(),
            exit: "F12".into(),
            // the key left of 1, which is ² on AZERTY layouts
            help: "BackQuote".into(),
        }
    }
}

impl HotkeyBindings {
    /// (action, key name) pairs
    pub fn entries(&self) -> [(HotkeyAction, &str); 4] {
        [
            (HotkeyAction::Start, self.start.as_str()),
            (HotkeyAction::Pause, self.pause.as_str()),
            (HotkeyAction::Exit, self.exit.as_str()),
            (HotkeyAction::Help, self.help.as_str()),
        ]
    }
}

static NAMED_KEYS: Lazy<Vec<(&'static str, Key)>> = Lazy::new(|| {
    vec![
        ("SPACE", Key::Space),
        ("TAB", Key::Tab),
        ("ENTER", Key::Return),
        ("RETURN", Key::Return),
        ("ESC", Key::Escape),
        ("ESCAPE", Key::Escape),
        ("DELETE", Key::Delete),
        ("INSERT", Key::Insert),
        ("HOME", Key::Home),
        ("END", Key::End),
        ("PAGEUP", Key::PageUp),
        ("PAGEDOWN", Key::PageDown),
        ("PAUSE", Key::Pause),
        ("SCROLLLOCK", Key::ScrollLock),
        ("PRINTSCREEN", Key::PrintScreen),
        ("BACKQUOTE", Key::BackQuote),
        ("GRAVE", Key::BackQuote),
        ("²", Key::BackQuote),
        ("`", Key::BackQuote),
        ("MINUS", Key::Minus),
        ("EQUAL", Key::Equal),
    ]
});

/// Parse a key name like "F8", "Space" or "BackQuote"
pub fn parse_key(name: &str) -> Option<Key> {
    let upper = name.trim().to_uppercase();
    if let Some((_, key)) = NAMED_KEYS.iter().find(|(n, _)| *n == upper) {
        return Some(*key);
    }

    if let Some(number) = upper.strip_prefix('F').filter(|n| !n.is_empty()) {
        return match number.parse::<u8>().ok()? {
            1 => Some(Key::F1),
            2 => Some(Key::F2),
            3 => Some(Key::F3),
            4 => Some(Key::F4),
            5 => Some(Key::F5),
            6 => Some(Key::F6),
            7 => Some(Key::F7),
            8 => Some(Key::F8),
            9 => Some(Key::F9),
            10 => Some(Key::F10),
            11 => Some(Key::F11),
            12 => Some(Key::F12),
            _ => None,
        };
    }

    let mut chars = upper.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(match c {
        '0' => Key::Num0,
        '1' => Key::Num1,
        '2' => Key::Num2,
        '3' => Key::Num3,
        '4' => Key::Num4,
        '5' => Key::Num5,
        '6' => Key::Num6,
        '7' => Key::Num7,
        '8' => Key::Num8,
        '9' => Key::Num9,
        'A' => Key::KeyA,
        'B' => Key::KeyB,
        'C' => Key::KeyC,
        'D' => Key::KeyD,
        'E' => Key::KeyE,
        'F' => Key::KeyF,
        'G' => Key::KeyG,
        'H' => Key::KeyH,
        'I' => Key::KeyI,
        'J' => Key::KeyJ,
        'K' => Key::KeyK,
        'L' => Key::KeyL,
        'M' => Key::KeyM,
        'N' => Key::KeyN,
        'O' => Key::KeyO,
        'P' => Key::KeyP,
        'Q' => Key::KeyQ,
        'R' => Key::KeyR,
        'S' => Key::KeyS,
        'T' => Key::KeyT,
        'U' => Key::KeyU,
        'V' => Key::KeyV,
        'W' => Key::KeyW,
        'X' => Key::KeyX,
        'Y' => Key::KeyY,
        'Z' => Key::KeyZ,
        _ => return None,
    })
}

/// Resolved key to action table
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<(Key, HotkeyAction)>,
}

impl Keymap {
    /// Parse every binding; unknown names and duplicate keys are rejected
    pub fn from_bindings(bindings: &HotkeyBindings) -> Result<Self, HotkeyError> {
        let mut resolved: Vec<(Key, HotkeyAction)> = Vec::with_capacity(4);
        for (action, name) in bindings.entries() {
            let key = parse_key(name).ok_or_else(|| HotkeyError::UnknownKey {
                action,
                name: name.to_string(),
            })?;
            if let Some((_, other)) = resolved.iter().find(|(k, _)| *k == key) {
                return Err(HotkeyError::DuplicateKey {
                    name: name.to_string(),
                    first: *other,
                    second: action,
                });
            }
            resolved.push((key, action));
        }
        Ok(Self { bindings: resolved })
    }

    /// Action bound to a key, if any
    pub fn action_for(&self, key: Key) -> Option<HotkeyAction> {
        self.bindings
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, action)| *action)
    }
}

/// Spawn the global key listener.
///
/// `rdev::listen` never returns on success, so the thread cannot be joined.
/// Once the receiving side is dropped the callback stops forwarding and the
/// thread dies with the process.
pub fn spawn_listener(
    keymap: Keymap,
    sender: Sender<HotkeyAction>,
) -> Result<thread::JoinHandle<()>, HotkeyError> {
    thread::Builder::new()
        .name("hotkeys".into())
        .spawn(move || {
            let mut closed = false;
            let callback = move |event: rdev::Event| {
                if closed {
                    return;
                }
                let EventType::KeyPress(key) = event.event_type else {
                    return;
                };
                if let Some(action) = keymap.action_for(key) {
                    log::debug!("Hotkey {:?} -> {:?}", key, action);
                    if sender.send(action).is_err() {
                        closed = true;
                    }
                }
            };
            if let Err(e) = listen(callback) {
                log::error!("Global hotkey listener failed: {:?}", e);
            }
        })
        .map_err(HotkeyError::Spawn)
}

/// Hotkey errors
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("Unknown key '{name}' bound to {action:?}")]
    UnknownKey { action: HotkeyAction, name: String },
    #[error("Key '{name}' is bound to both {first:?} and {second:?}")]
    DuplicateKey {
        name: String,
        first: HotkeyAction,
        second: HotkeyAction,
    },
    #[error("Failed to start hotkey listener: {0}")]
    Spawn(#[source] std::io::Error),
}
