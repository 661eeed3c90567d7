use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::warn;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// the hex keypad has keys 0x0 to 0xf
pub const CHIP8_KEY_COUNT: u8 = 16;

/// left-hand side of a qwerty keyboard, laid out like the COSMAC VIP keypad
/// 1 2 3 C / 4 5 6 D / 7 8 9 E / A 0 B F
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals report presses but not releases, so a key stays down this long
/// after the last press (auto-repeat keeps a held key alive)
const KEY_HOLD: Duration = Duration::from_millis(150);

/// reports which logical keys are held down
pub trait Input {
    /// pick up whatever the keyboard has reported since the last call; run on
    /// every timer tick whether or not the program asks about keys
    fn poll(&mut self) -> Result<(), io::Error> {
        Ok(())
    }

    /// is logical key `key` (0x0-0xf) held down right now?
    fn is_key_down(&mut self, key: u8) -> Result<bool, io::Error>;

    /// lowest-numbered key that is held down, if any
    fn first_key_down(&mut self) -> Result<Option<u8>, io::Error> {
        for key in 0..CHIP8_KEY_COUNT {
            if self.is_key_down(key)? {
                return Ok(Some(key));
            }
        }
        Ok(None)
    }
}

/// remembers when each key was last pressed
struct KeyLatch {
    pressed_at: [Option<Instant>; CHIP8_KEY_COUNT as usize],
}

impl KeyLatch {
    fn new() -> Self {
        KeyLatch {
            pressed_at: [None; CHIP8_KEY_COUNT as usize],
        }
    }

    fn press(&mut self, key: u8, at: Instant) {
        if let Some(slot) = self.pressed_at.get_mut(key as usize) {
            *slot = Some(at);
        }
    }

    fn is_held(&self, key: u8, now: Instant) -> bool {
        match self.pressed_at.get(key as usize) {
            Some(Some(at)) => now.saturating_duration_since(*at) < KEY_HOLD,
            _ => false,
        }
    }
}

/// what a terminal key event means to the machine
#[derive(Debug, PartialEq, Eq)]
enum KeyAction {
    Press(u8),
    Quit,
    Ignore,
}

fn classify(keymap: &HashMap<char, u8>, evt: KeyEvent) -> KeyAction {
    match evt.code {
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char(key) => match keymap.get(&key.to_ascii_lowercase()) {
            Some(mapped_key) => KeyAction::Press(*mapped_key),
            None => {
                warn!("can't map {:?} to a COSMAC key", key);
                KeyAction::Ignore
            }
        },
        _ => KeyAction::Ignore,
    }
}

/// keyboard input from the terminal, in raw mode. Esc (or ctrl-c, which raw
/// mode swallows) raises the shared stop flag.
pub struct TermInput {
    latch: KeyLatch,
    keymap: HashMap<char, u8>,
    stop: Arc<AtomicBool>,
}

impl TermInput {
    pub fn new(stop: Arc<AtomicBool>) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            latch: KeyLatch::new(),
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            stop,
        })
    }

    /// drain pending terminal events without blocking
    fn read_events(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match classify(&self.keymap, evt) {
                    KeyAction::Press(key) => self.latch.press(key, Instant::now()),
                    KeyAction::Quit => self.stop.store(true, Ordering::Relaxed),
                    KeyAction::Ignore => {}
                }
            }
        }
        Ok(())
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll(&mut self) -> Result<(), io::Error> {
        self.read_events()
    }

    fn is_key_down(&mut self, key: u8) -> Result<bool, io::Error> {
        self.read_events()?;
        Ok(self.latch.is_held(key, Instant::now()))
    }

    fn first_key_down(&mut self) -> Result<Option<u8>, io::Error> {
        self.read_events()?;
        let now = Instant::now();
        Ok((0..CHIP8_KEY_COUNT).find(|key| self.latch.is_held(*key, now)))
    }
}

/// dummy Input implementation for testing; keys stay down until released
pub struct DummyInput {
    keys: Vec<u8>,
    pub polls: usize,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            keys: Vec::from(keys),
            polls: 0,
        }
    }

    pub fn press(&mut self, key: u8) {
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }

    pub fn release(&mut self, key: u8) {
        self.keys.retain(|k| *k != key);
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<(), io::Error> {
        self.polls += 1;
        Ok(())
    }

    fn is_key_down(&mut self, key: u8) -> Result<bool, io::Error> {
        Ok(self.keys.contains(&key))
    }
}
