use core::fmt;

use crate::event::{KeyEvent, KeyPos};
use crate::types::action::{Action, FnAction, KeyAction};

/// Keymap represents the stack of layers and the fn action table.
///
/// The conception of Keymap is borrowed from qmk: <https://docs.qmk.fm/#/keymap>.
///
/// Keymap should be binded to the actual pcb matrix definition.
/// Hardware key strokes use tuple `(row, col, layer)` to retrieve the action from Keymap.
/// Both tables are immutable, all runtime state lives in [`LayerState`].
pub struct KeyMap<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    /// Layers
    layers: &'a [[[KeyAction; COL]; ROW]; NUM_LAYER],
    /// `KeyAction::Fn(n)` refers to `fn_actions[n]`
    fn_actions: &'a [FnAction],
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> KeyMap<'a, ROW, COL, NUM_LAYER> {
    pub const fn new(layers: &'a [[[KeyAction; COL]; ROW]; NUM_LAYER], fn_actions: &'a [FnAction]) -> Self {
        Self { layers, fn_actions }
    }

    pub fn get_keymap_config(&self) -> (usize, usize, usize) {
        (ROW, COL, NUM_LAYER)
    }

    /// Raw cell of the layer table, `KeyAction::No` for positions outside of the matrix
    pub fn get_action_at(&self, pos: KeyPos, layer_num: usize) -> KeyAction {
        self.layers
            .get(layer_num)
            .and_then(|layer| layer.get(pos.row as usize))
            .and_then(|row| row.get(pos.col as usize))
            .copied()
            .unwrap_or(KeyAction::No)
    }

    /// Get the entry of the fn action table
    pub fn fn_action(&self, index: u8) -> Option<FnAction> {
        self.fn_actions.get(index as usize).copied()
    }

    /// Resolve the action at `pos` against the active layers.
    ///
    /// Iterate from higher layer to lower layer, the lowest checked layer is the base layer.
    /// The first non-transparent cell wins, `KeyAction::No` is returned if all of them are transparent.
    pub fn lookup(&self, pos: KeyPos, state: &LayerState<ROW, COL, NUM_LAYER>) -> KeyAction {
        self.lookup_with_layer(pos, state).0
    }

    /// Same as [`KeyMap::lookup`], also returns the layer the action was found on
    pub fn lookup_with_layer(&self, pos: KeyPos, state: &LayerState<ROW, COL, NUM_LAYER>) -> (KeyAction, u8) {
        if pos.row as usize >= ROW || pos.col as usize >= COL {
            warn!("Key position ({}, {}) is out of the matrix", pos.row, pos.col);
            return (KeyAction::No, 0);
        }

        for (layer_idx, layer) in self.layers.iter().enumerate().rev() {
            if layer_idx == 0 || state.is_active(layer_idx as u8) {
                let action = layer[pos.row as usize][pos.col as usize];
                if action == KeyAction::Transparent {
                    continue;
                }
                return (action, layer_idx as u8);
            }
        }

        (KeyAction::No, 0)
    }

    /// Fetch the action in keymap, with layer cache.
    ///
    /// A pressed key saves the layer it was resolved on, its release uses that layer again.
    pub fn get_action_with_layer_cache(
        &self,
        key_event: KeyEvent,
        state: &mut LayerState<ROW, COL, NUM_LAYER>,
    ) -> KeyAction {
        let pos = key_event.pos();
        if !key_event.pressed {
            // Releasing a pressed key, use cached layer and restore the cache
            let layer = state.pop_layer_from_cache(pos);
            return match self.get_action_at(pos, layer as usize) {
                KeyAction::Transparent => KeyAction::No,
                action => action,
            };
        }

        let (action, layer) = self.lookup_with_layer(pos, state);
        state.save_layer_cache(pos, layer);
        action
    }

    /// Replace `KeyAction::Fn` with the action of the fn action table
    pub fn resolve_fn(&self, action: KeyAction) -> KeyAction {
        match action {
            KeyAction::Fn(index) => match self.fn_action(index) {
                Some(fn_action) => fn_action.to_key_action(),
                None => {
                    warn!("Fn action {} is not defined", index);
                    KeyAction::No
                }
            },
            _ => action,
        }
    }

    /// Check the tables: fn references, referenced layers and the base layer
    pub fn validate(&self) -> Result<(), KeymapError> {
        for (index, fn_action) in self.fn_actions.iter().enumerate() {
            if let Some(layer) = fn_action.layer() {
                if layer as usize >= NUM_LAYER {
                    return Err(KeymapError::InvalidLayer {
                        fn_index: index as u8,
                        layer,
                    });
                }
            }
        }

        for (layer_idx, layer) in self.layers.iter().enumerate() {
            for (row, keys) in layer.iter().enumerate() {
                for (col, action) in keys.iter().enumerate() {
                    match action {
                        KeyAction::Fn(index) if *index as usize >= self.fn_actions.len() => {
                            return Err(KeymapError::UndefinedFn {
                                layer: layer_idx as u8,
                                row: row as u8,
                                col: col as u8,
                                index: *index,
                            });
                        }
                        KeyAction::Transparent if layer_idx == 0 => {
                            return Err(KeymapError::TransparentBaseLayer {
                                row: row as u8,
                                col: col as u8,
                            });
                        }
                        KeyAction::Single(Action::LayerOn(l) | Action::LayerToggle(l))
                        | KeyAction::TapHold(_, Action::LayerOn(l))
                            if *l as usize >= NUM_LAYER =>
                        {
                            return Err(KeymapError::InvalidLayer { fn_index: u8::MAX, layer: *l });
                        }
                        _ => (),
                    }
                }
            }
        }

        Ok(())
    }
}

/// Errors found by [`KeyMap::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeymapError {
    /// A cell references an fn action which doesn't exist
    UndefinedFn { layer: u8, row: u8, col: u8, index: u8 },
    /// An action switches to a layer which doesn't exist, `fn_index` is `u8::MAX` for plain cells
    InvalidLayer { fn_index: u8, layer: u8 },
    /// The base layer has nothing to fall through to
    TransparentBaseLayer { row: u8, col: u8 },
}

impl fmt::Display for KeymapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeymapError::UndefinedFn { layer, row, col, index } => {
                write!(f, "FN{} at ({}, {}) on layer {} is not defined", index, row, col, layer)
            }
            KeymapError::InvalidLayer { fn_index, layer } => {
                if *fn_index == u8::MAX {
                    write!(f, "Layer {} doesn't exist", layer)
                } else {
                    write!(f, "FN{} switches to layer {} which doesn't exist", fn_index, layer)
                }
            }
            KeymapError::TransparentBaseLayer { row, col } => {
                write!(f, "Base layer is transparent at ({}, {})", row, col)
            }
        }
    }
}

/// Runtime layer state: which layers are active, and the layer cache of pressed keys.
///
/// Layer 0 is the base layer and is always active.
#[derive(Clone, Debug)]
pub struct LayerState<const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    /// Current state of each layer
    layer_state: [bool; NUM_LAYER],
    /// Layer on which each pressed key was resolved
    layer_cache: [[u8; COL]; ROW],
}

impl<const ROW: usize, const COL: usize, const NUM_LAYER: usize> Default for LayerState<ROW, COL, NUM_LAYER> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const ROW: usize, const COL: usize, const NUM_LAYER: usize> LayerState<ROW, COL, NUM_LAYER> {
    pub const fn new() -> Self {
        Self {
            layer_state: [false; NUM_LAYER],
            layer_cache: [[0; COL]; ROW],
        }
    }

    /// Create a state with the given layers turned on
    pub fn with_layers(layers: &[u8]) -> Self {
        let mut state = Self::new();
        for layer in layers {
            state.activate_layer(*layer);
        }
        state
    }

    pub fn is_active(&self, layer_num: u8) -> bool {
        layer_num == 0 || self.layer_state.get(layer_num as usize).copied().unwrap_or(false)
    }

    /// The highest active layer
    pub fn get_activated_layer(&self) -> u8 {
        for (layer_idx, active) in self.layer_state.iter().enumerate().rev() {
            if *active {
                return layer_idx as u8;
            }
        }

        0
    }

    /// Activate given layer
    pub fn activate_layer(&mut self, layer_num: u8) {
        if layer_num as usize >= NUM_LAYER {
            warn!(
                "Not a valid layer {}, keyboard supports only {} layers",
                layer_num, NUM_LAYER
            );
            return;
        }
        self.layer_state[layer_num as usize] = true;
    }

    /// Deactivate given layer
    pub fn deactivate_layer(&mut self, layer_num: u8) {
        if layer_num as usize >= NUM_LAYER {
            warn!(
                "Not a valid layer {}, keyboard supports only {} layers",
                layer_num, NUM_LAYER
            );
            return;
        }
        self.layer_state[layer_num as usize] = false;
    }

    /// Toggle given layer
    pub fn toggle_layer(&mut self, layer_num: u8) {
        if layer_num as usize >= NUM_LAYER {
            warn!(
                "Not a valid layer {}, keyboard supports only {} layers",
                layer_num, NUM_LAYER
            );
            return;
        }

        self.layer_state[layer_num as usize] = !self.layer_state[layer_num as usize];
    }

    fn pop_layer_from_cache(&mut self, pos: KeyPos) -> u8 {
        match self
            .layer_cache
            .get_mut(pos.row as usize)
            .and_then(|row| row.get_mut(pos.col as usize))
        {
            Some(cached) => core::mem::replace(cached, 0),
            None => 0,
        }
    }

    fn save_layer_cache(&mut self, pos: KeyPos, layer_num: u8) {
        if let Some(cached) = self
            .layer_cache
            .get_mut(pos.row as usize)
            .and_then(|row| row.get_mut(pos.col as usize))
        {
            *cached = layer_num;
        }
    }
}
