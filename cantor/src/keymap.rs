use cantor_types::action::KeyAction;

use crate::event::KeyPos;
use crate::layer::{LayerActivation, LayerState};

/// Keymap represents the stack of layers.
///
/// The layer tables are static, only the set of active layers changes at runtime.
/// `(row, col)` is resolved against the active layers from the top down.
pub struct KeyMap<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    /// Layers
    layers: &'a [[[KeyAction; COL]; ROW]; NUM_LAYER],
    /// Active layers
    layer_state: LayerState,
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> KeyMap<'a, ROW, COL, NUM_LAYER> {
    pub fn new(layers: &'a [[[KeyAction; COL]; ROW]; NUM_LAYER]) -> Self {
        KeyMap {
            layers,
            layer_state: LayerState::new(),
        }
    }

    /// The action of the topmost active layer that isn't transparent at `pos`.
    ///
    /// Transparent all the way down to the base layer resolves to `KeyAction::No`,
    /// so does a position outside of the matrix.
    pub fn get_action(&self, pos: KeyPos) -> KeyAction {
        let (row, col) = (pos.row as usize, pos.col as usize);
        if row >= ROW || col >= COL {
            return KeyAction::No;
        }
        for layer in self.layer_state.iter_top_down() {
            let Some(table) = self.layers.get(layer as usize) else {
                continue;
            };
            match table[row][col] {
                KeyAction::Transparent => continue,
                action => return action,
            }
        }
        KeyAction::No
    }

    /// The action at `pos` on a specific layer, without looking through
    pub fn get_action_at_layer(&self, pos: KeyPos, layer: u8) -> KeyAction {
        self.layers
            .get(layer as usize)
            .and_then(|l| l.get(pos.row as usize))
            .and_then(|r| r.get(pos.col as usize))
            .copied()
            .unwrap_or(KeyAction::No)
    }

    pub fn layer_state(&self) -> &LayerState {
        &self.layer_state
    }

    pub fn activate_layer(&mut self, layer: u8, activation: LayerActivation) {
        if layer as usize >= NUM_LAYER {
            warn!("Not a valid layer: {}", layer);
            return;
        }
        debug!("Activate layer {} ({:?})", layer, activation);
        self.layer_state.push(layer, activation);
    }

    pub fn deactivate_layer(&mut self, layer: u8, activation: LayerActivation) {
        debug!("Deactivate layer {} ({:?})", layer, activation);
        self.layer_state.remove(layer, activation);
    }

    pub fn toggle_layer(&mut self, layer: u8) {
        if layer as usize >= NUM_LAYER {
            warn!("Not a valid layer: {}", layer);
            return;
        }
        self.layer_state.toggle(layer);
    }

    pub fn switch_to_layer(&mut self, layer: u8) {
        if layer as usize >= NUM_LAYER {
            warn!("Not a valid layer: {}", layer);
            return;
        }
        debug!("Switch to layer {}", layer);
        self.layer_state.switch_to(layer);
    }

    /// Pop the one-shot layer after the key it was waiting for
    pub fn pop_oneshot_layer(&mut self) {
        if self.layer_state.pop_oneshot() {
            debug!("One-shot layer released");
        }
    }
}
