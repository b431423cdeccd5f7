use embassy_futures::select::{Either, select};
use embassy_time::{Instant, Timer};
use heapless::Vec;

use crate::Runnable;
use crate::boot::{self, BootRequest};
use crate::channel::{KEY_EVENT_CHANNEL, KEYBOARD_REPORT_CHANNEL};
use crate::config::BehaviorConfig;
use crate::event::{KeyEvent, KeyPos};
use crate::hid::{KeyboardReport, Report};
use crate::keyboard_macro::{self, MacroOperation};
use crate::keymap::{KeyMap, LayerState};
use crate::tap_hold::{HoldingKey, TapHoldDecision, TapHoldState};
use crate::types::action::{Action, KeyAction};
use crate::types::keycode::KeyCode;
use crate::types::modifier::{HidModifiers, ModifierCombination};

/// Maximum number of tap-hold keys which can be held at the same time
pub const HOLDING_KEY_MAX: usize = 4;

/// Maximum number of keys which can hold modifiers at the same time
pub const MODIFIER_KEY_MAX: usize = 16;

/// Maximum number of outputs produced by processing one event
pub const OUTPUT_BUFFER_SIZE: usize = 16;

/// Outputs of one [`Keyboard::process`] or [`Keyboard::poll`] call, in order
pub type Outputs = Vec<KeyboardOutput, OUTPUT_BUFFER_SIZE>;

/// What the keyboard asks the outside world to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyboardOutput {
    /// Send the report to the host
    Report(KeyboardReport),
    /// Reset the device
    Boot(BootRequest),
}

/// The keyboard resolves key events against the keymap and produces HID reports.
///
/// The processing is synchronous and takes the current time explicitly, the async
/// [`Runnable`] implementation connects it to the key event and report channels.
pub struct Keyboard<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    /// Keymap
    keymap: &'a KeyMap<'a, ROW, COL, NUM_LAYER>,

    /// Active layers and layer cache
    layer_state: LayerState<ROW, COL, NUM_LAYER>,

    /// Configurable action behavior
    behavior: BehaviorConfig,

    /// Pressed tap-hold keys, in press order
    holding_keys: Vec<HoldingKey, HOLDING_KEY_MAX>,

    /// Modifiers registered by each pressed key.
    /// A key only releases its own modifiers, the report carries the union of all of them.
    held_modifiers: Vec<(KeyPos, HidModifiers), MODIFIER_KEY_MAX>,

    /// Registered keycodes, sent in the keycode array of the report
    held_keycodes: [KeyCode; 6],

    /// Which key registered the keycode in the same slot of `held_keycodes`
    registered_keys: [Option<KeyPos>; 6],

    /// Outputs of the event being processed
    outputs: Outputs,
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> Keyboard<'a, ROW, COL, NUM_LAYER> {
    pub fn new(keymap: &'a KeyMap<'a, ROW, COL, NUM_LAYER>, behavior: BehaviorConfig) -> Self {
        Keyboard {
            keymap,
            layer_state: LayerState::new(),
            behavior,
            holding_keys: Vec::new(),
            held_modifiers: Vec::new(),
            held_keycodes: [KeyCode::No; 6],
            registered_keys: [None; 6],
            outputs: Vec::new(),
        }
    }

    pub fn layer_state(&self) -> &LayerState<ROW, COL, NUM_LAYER> {
        &self.layer_state
    }

    /// The earliest time at which a pending tap-hold key becomes a hold.
    ///
    /// [`Keyboard::poll`] should be called at that time if no key event arrives before.
    pub fn next_timeout(&self) -> Option<Instant> {
        self.holding_keys
            .iter()
            .filter(|k| k.is_pending())
            .map(|k| k.deadline(self.behavior.tap_hold.hold_timeout))
            .min()
    }

    /// Commit the tap-hold keys whose hold timeout has expired at `now`
    pub fn poll(&mut self, now: Instant) -> Outputs {
        self.commit_expired(now);
        core::mem::take(&mut self.outputs)
    }

    /// Process a key event which happened at `now`
    pub fn process(&mut self, key_event: KeyEvent, now: Instant) -> Outputs {
        self.commit_expired(now);

        // Pressing another key decides all pending tap-hold keys as hold
        if key_event.pressed {
            self.commit_pending();
        }

        let key_action = self
            .keymap
            .get_action_with_layer_cache(key_event, &mut self.layer_state);
        let key_action = self.keymap.resolve_fn(key_action);
        self.process_key_action(key_action, key_event, now);

        core::mem::take(&mut self.outputs)
    }

    fn process_key_action(&mut self, key_action: KeyAction, key_event: KeyEvent, now: Instant) {
        match key_action {
            KeyAction::No | KeyAction::Transparent => (),
            KeyAction::Single(action) => self.process_key_action_normal(action, key_event),
            KeyAction::TapHold(tap_action, hold_action) => {
                self.process_key_action_tap_hold(tap_action, hold_action, key_event, now)
            }
            KeyAction::Fn(index) => {
                // Resolved by the keymap before
                warn!("Unresolved fn action {}", index);
            }
        }
    }

    fn process_key_action_normal(&mut self, action: Action, key_event: KeyEvent) {
        match action {
            Action::No => (),
            Action::Key(key) => self.process_action_key(key, key_event),
            Action::KeyWithModifier(key, modifiers) => {
                self.process_key_action_with_modifier(key, modifiers, key_event)
            }
            Action::Modifier(modifiers) => {
                if key_event.pressed {
                    self.register_modifiers(modifiers, key_event.pos());
                } else {
                    self.unregister_modifiers(modifiers, key_event.pos());
                }
                self.send_keyboard_report();
            }
            Action::LayerOn(layer_num) => self.process_action_layer_switch(layer_num, key_event),
            Action::LayerToggle(layer_num) => {
                // Toggle a layer when the key is released
                if !key_event.pressed {
                    self.layer_state.toggle_layer(layer_num);
                    debug!("Toggle layer {}, active: {}", layer_num, self.layer_state.is_active(layer_num));
                }
            }
            Action::TriggerMacro(id) => self.process_action_macro(id, key_event),
            Action::Function(id) => {
                if key_event.pressed {
                    if let Some(request) = boot::dispatch(id) {
                        self.push_output(KeyboardOutput::Boot(request));
                    }
                }
            }
        }
    }

    fn process_key_action_with_modifier(&mut self, key: KeyCode, modifiers: ModifierCombination, key_event: KeyEvent) {
        // The modifiers are sent in the same report as the key
        if key_event.pressed {
            self.register_modifiers(modifiers, key_event.pos());
        } else {
            self.unregister_modifiers(modifiers, key_event.pos());
        }
        self.process_action_key(key, key_event);
    }

    /// Tap-hold keys are resolved as follows:
    ///
    /// - On press, the key is pending. A layer switching hold action is applied immediately,
    ///   so that keys pressed while holding see the layer.
    /// - Pressing another key, or holding longer than the hold timeout, commits the key as hold.
    /// - Releasing a pending key undoes the hold action and triggers a tap of the tap action.
    fn process_key_action_tap_hold(
        &mut self,
        tap_action: Action,
        hold_action: Action,
        key_event: KeyEvent,
        now: Instant,
    ) {
        let pos = key_event.pos();
        if key_event.pressed {
            let holding_key = HoldingKey::new(pos, tap_action, hold_action, now);
            if self.holding_keys.push(holding_key).is_err() {
                warn!("Too many tap-hold keys are held, {:?} is processed as hold", pos);
                self.process_key_action_normal(hold_action, key_event);
                return;
            }
            if let Action::LayerOn(layer_num) = hold_action {
                self.layer_state.activate_layer(layer_num);
            }
            return;
        }

        let Some(index) = self.holding_keys.iter().position(|k| k.pos == pos) else {
            // Pressed while the holding buffer was full
            self.process_key_action_normal(hold_action, key_event);
            return;
        };
        let holding_key = self.holding_keys.remove(index);

        match holding_key.decide_on_release() {
            TapHoldDecision::Tap => {
                debug!(
                    "TAP action: {:?}, time elapsed: {}ms",
                    tap_action,
                    now.saturating_duration_since(holding_key.pressed_time).as_millis()
                );
                if let Action::LayerOn(layer_num) = hold_action {
                    self.layer_state.deactivate_layer(layer_num);
                }
                self.process_key_action_normal(tap_action, KeyEvent::press(pos.row, pos.col));
                self.process_key_action_normal(tap_action, KeyEvent::release(pos.row, pos.col));
            }
            TapHoldDecision::Hold => {
                debug!("HOLD releasing: {:?}, {:?}", hold_action, pos);
                self.process_key_action_normal(hold_action, key_event);
            }
        }
    }

    /// Commit pending keys whose hold timeout has expired
    fn commit_expired(&mut self, now: Instant) {
        let hold_timeout = self.behavior.tap_hold.hold_timeout;
        for index in 0..self.holding_keys.len() {
            if self.holding_keys[index].is_expired(now, hold_timeout) {
                debug!("Hold timeout, got HOLD: {:?}", self.holding_keys[index]);
                self.commit_hold(index);
            }
        }
    }

    /// Commit all pending keys
    fn commit_pending(&mut self) {
        for index in 0..self.holding_keys.len() {
            if self.holding_keys[index].is_pending() {
                debug!("Another key pressed, got HOLD: {:?}", self.holding_keys[index]);
                self.commit_hold(index);
            }
        }
    }

    fn commit_hold(&mut self, index: usize) {
        let holding_key = &mut self.holding_keys[index];
        holding_key.state = TapHoldState::Hold;
        let hold_action = holding_key.hold_action;
        let pos = holding_key.pos;

        match hold_action {
            // Already activated on press
            Action::LayerOn(_) => (),
            _ => self.process_key_action_normal(hold_action, KeyEvent::press(pos.row, pos.col)),
        }
    }

    fn process_action_layer_switch(&mut self, layer_num: u8, key_event: KeyEvent) {
        if key_event.pressed {
            self.layer_state.activate_layer(layer_num);
        } else {
            self.layer_state.deactivate_layer(layer_num);
        }
        debug!("Layer {} on: {}", layer_num, key_event.pressed);
    }

    fn process_action_key(&mut self, key: KeyCode, key_event: KeyEvent) {
        if key_event.pressed {
            self.register_key(key, key_event.pos());
        } else {
            self.unregister_key(key, key_event.pos());
        }
        self.send_keyboard_report();
    }

    /// Play the macro, every operation is sent in its own report
    fn process_action_macro(&mut self, id: u8, key_event: KeyEvent) {
        let pos = key_event.pos();
        for operation in keyboard_macro::play(id, key_event.pressed) {
            match operation {
                MacroOperation::Press(key) => self.register_key(key, pos),
                MacroOperation::Release(key) => self.unregister_key(key, pos),
                MacroOperation::End => break,
            }
            self.send_keyboard_report();
        }
    }

    fn send_keyboard_report(&mut self) {
        let report = KeyboardReport {
            modifier: self.resolve_modifiers().into_bits(),
            reserved: 0,
            leds: 0,
            keycodes: self.held_keycodes.map(|k| k as u8),
        };
        self.push_output(KeyboardOutput::Report(report));
    }

    fn push_output(&mut self, output: KeyboardOutput) {
        if self.outputs.push(output).is_err() {
            error!("Keyboard output buffer is full, dropping {:?}", output);
        }
    }

    /// Register a key, the key can be a basic keycode or a modifier.
    fn register_key(&mut self, key: KeyCode, pos: KeyPos) {
        if key.is_modifier() {
            self.register_modifiers(key.to_modifier_combination(), pos);
        } else if key.is_basic() {
            self.register_keycode(key, pos);
        }
    }

    /// Unregister a key, the key can be a basic keycode or a modifier.
    fn unregister_key(&mut self, key: KeyCode, pos: KeyPos) {
        if key.is_modifier() {
            self.unregister_modifiers(key.to_modifier_combination(), pos);
        } else if key.is_basic() {
            self.unregister_keycode(key, pos);
        }
    }

    /// Register a key to be sent in hid report.
    fn register_keycode(&mut self, key: KeyCode, pos: KeyPos) {
        if self.held_keycodes.contains(&key) {
            return;
        }

        if let Some(index) = self.held_keycodes.iter().position(|&k| k == KeyCode::No) {
            self.held_keycodes[index] = key;
            self.registered_keys[index] = Some(pos);
        } else {
            warn!("All keycode slots are used, {:?} is not sent", key);
        }
    }

    /// Unregister a key from hid report.
    fn unregister_keycode(&mut self, key: KeyCode, pos: KeyPos) {
        // Release the same key registered by this position first, then any same key
        let index = self
            .held_keycodes
            .iter()
            .zip(self.registered_keys.iter())
            .position(|(k, p)| *k == key && *p == Some(pos))
            .or_else(|| self.held_keycodes.iter().position(|&k| k == key));

        if let Some(index) = index {
            self.held_keycodes[index] = KeyCode::No;
            self.registered_keys[index] = None;
        }
    }

    /// All modifiers held by pressed keys
    pub fn resolve_modifiers(&self) -> HidModifiers {
        self.held_modifiers
            .iter()
            .fold(HidModifiers::new(), |acc, (_, modifiers)| acc | *modifiers)
    }

    /// Register a modifier combination held by the key at `pos`.
    fn register_modifiers(&mut self, modifiers: ModifierCombination, pos: KeyPos) {
        let modifiers = modifiers.to_hid_modifiers();
        if let Some((_, held)) = self.held_modifiers.iter_mut().find(|(p, _)| *p == pos) {
            *held |= modifiers;
        } else if self.held_modifiers.push((pos, modifiers)).is_err() {
            warn!("Too many keys hold modifiers, modifiers of {:?} are not sent", pos);
        }
    }

    /// Unregister a modifier combination held by the key at `pos`.
    /// The same modifiers held by other keys stay registered.
    fn unregister_modifiers(&mut self, modifiers: ModifierCombination, pos: KeyPos) {
        let modifiers = modifiers.to_hid_modifiers();
        if let Some(index) = self.held_modifiers.iter().position(|(p, _)| *p == pos) {
            self.held_modifiers[index].1 &= !modifiers;
            if self.held_modifiers[index].1.into_bits() == 0 {
                self.held_modifiers.swap_remove(index);
            }
        }
    }
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> Runnable for Keyboard<'a, ROW, COL, NUM_LAYER> {
    /// Main keyboard processing task, it receives key events from the matrix and sends reports to the HID reporter.
    async fn run(&mut self) {
        loop {
            let outputs = match self.next_timeout() {
                Some(deadline) => match select(KEY_EVENT_CHANNEL.receive(), Timer::at(deadline)).await {
                    Either::First(key_event) => self.process(key_event, Instant::now()),
                    Either::Second(_) => self.poll(Instant::now()),
                },
                None => {
                    let key_event = KEY_EVENT_CHANNEL.receive().await;
                    self.process(key_event, Instant::now())
                }
            };

            for output in outputs {
                match output {
                    KeyboardOutput::Report(report) => {
                        KEYBOARD_REPORT_CHANNEL.send(Report::KeyboardReport(report)).await;
                    }
                    KeyboardOutput::Boot(request) => boot::perform(request),
                }
            }
        }
    }
}
