//! Key combination sets requested by pages and modals.
//!
//! The textual form lists combinations separated by `|`, each an optional
//! chain of `Ctrl-`, `Alt-`, `Shift-` prefixes followed by a key name, e.g.
//! `"Enter|Esc|Ctrl-Q|q"`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeySetError {
    #[error("empty key combination in {0:?}")]
    Empty(String),
    #[error("unknown key name {0:?}")]
    UnknownKey(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyCombo {
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Character keys ignore Shift: the terminal already reports `Q` vs `q`.
    /// With Ctrl or Alt held the case of the character is not significant.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        match (self.code, event.code) {
            (KeyCode::Char(want), KeyCode::Char(got)) => {
                let mods = event.modifiers - KeyModifiers::SHIFT;
                if mods != self.modifiers - KeyModifiers::SHIFT {
                    return false;
                }
                if mods.is_empty() {
                    want == got
                } else {
                    want.eq_ignore_ascii_case(&got)
                }
            }
            (want, got) => want == got && event.modifiers == self.modifiers,
        }
    }
}

impl FromStr for KeyCombo {
    type Err = KeySetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeySetError::Empty(s.to_string()));
        }

        let mut modifiers = KeyModifiers::NONE;
        let mut rest = s;
        // A lone "-" is the minus key, not an empty modifier chain.
        while let Some((prefix, tail)) = rest.split_once('-') {
            if tail.is_empty() {
                break;
            }
            match prefix.to_ascii_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return Err(KeySetError::UnknownKey(s.to_string())),
            }
            rest = tail;
        }

        let code = parse_key_name(rest).ok_or_else(|| KeySetError::UnknownKey(s.to_string()))?;
        Ok(Self { code, modifiers })
    }
}

fn parse_key_name(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }

    let code = match name.to_ascii_lowercase().as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" => KeyCode::Insert,
        "space" => KeyCode::Char(' '),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        other => {
            let n: u8 = other.strip_prefix('f')?.parse().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            KeyCode::F(n)
        }
    };
    Some(code)
}

/// A set of key combinations. Order is kept only for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    combos: Vec<KeyCombo>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, combo: KeyCombo) -> Self {
        if !self.combos.contains(&combo) {
            self.combos.push(combo);
        }
        self
    }

    pub fn with_code(self, code: KeyCode) -> Self {
        self.with(KeyCombo::plain(code))
    }

    /// Merge another set into this one.
    pub fn union(mut self, other: &KeySet) -> Self {
        for combo in &other.combos {
            self = self.with(*combo);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.combos.is_empty()
    }

    pub fn contains(&self, event: &KeyEvent) -> bool {
        self.combos.iter().any(|c| c.matches(event))
    }

    pub fn combos(&self) -> &[KeyCombo] {
        &self.combos
    }
}

impl FromStr for KeySet {
    type Err = KeySetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "|" alone (or "a||b") names the pipe key.
        let mut set = KeySet::new();
        let mut parts = s.split('|').peekable();
        while let Some(part) = parts.next() {
            if part.is_empty() && parts.peek().is_some_and(|next| next.is_empty()) {
                parts.next();
                set = set.with_code(KeyCode::Char('|'));
                continue;
            }
            set = set.with(part.parse()?);
        }
        Ok(set)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            write!(f, "Ctrl-")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            write!(f, "Alt-")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            write!(f, "Shift-")?;
        }
        match self.code {
            KeyCode::Char(' ') => write!(f, "Space"),
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::F(n) => write!(f, "F{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}

impl fmt::Display for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, combo) in self.combos.iter().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{}", combo)?;
        }
        Ok(())
    }
}
