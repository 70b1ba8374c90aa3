use heapless::Vec;

/// Maximum number of layer activations stacked on top of the base layer
pub const LAYER_STACK_DEPTH: usize = 16;

/// Why a layer is on the stack
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerActivation {
    /// Toggled on, stays until toggled off
    Toggled,
    /// Held by a key
    Momentary,
    /// Pops after the next non-layer key
    OneShot,
    /// Set by a switch-to key
    SwitchTo,
}

/// Ordered set of active layers. The base layer is implicit and always at the bottom.
#[derive(Debug, Default)]
pub struct LayerState {
    stack: Vec<(u8, LayerActivation), LAYER_STACK_DEPTH>,
}

impl LayerState {
    pub const BASE: u8 = 0;

    pub const fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Active layers from top to bottom, the base layer included
    pub fn iter_top_down(&self) -> impl Iterator<Item = u8> + '_ {
        self.stack
            .iter()
            .rev()
            .map(|(layer, _)| *layer)
            .chain(core::iter::once(Self::BASE))
    }

    /// The topmost active layer
    pub fn highest(&self) -> u8 {
        self.stack.last().map(|(l, _)| *l).unwrap_or(Self::BASE)
    }

    pub fn is_active(&self, layer: u8) -> bool {
        layer == Self::BASE || self.stack.iter().any(|(l, _)| *l == layer)
    }

    pub fn push(&mut self, layer: u8, activation: LayerActivation) {
        if layer == Self::BASE {
            return;
        }
        if self.stack.push((layer, activation)).is_err() {
            warn!("Layer stack is full, layer {} not activated", layer);
        }
    }

    /// Remove the topmost activation of `layer` with the given kind
    pub fn remove(&mut self, layer: u8, activation: LayerActivation) -> bool {
        match self.stack.iter().rposition(|e| *e == (layer, activation)) {
            Some(idx) => {
                self.stack.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn toggle(&mut self, layer: u8) {
        if !self.remove(layer, LayerActivation::Toggled) {
            self.push(layer, LayerActivation::Toggled);
        }
    }

    /// Clear everything above the base layer, then make `layer` the only active one
    pub fn switch_to(&mut self, layer: u8) {
        self.stack.clear();
        self.push(layer, LayerActivation::SwitchTo);
    }

    /// The one-shot layer waiting for its key, if any
    pub fn oneshot(&self) -> Option<u8> {
        self.stack
            .iter()
            .rev()
            .find(|(_, a)| *a == LayerActivation::OneShot)
            .map(|(l, _)| *l)
    }

    /// Pop all one-shot layers, returns whether there were any
    pub fn pop_oneshot(&mut self) -> bool {
        let before = self.stack.len();
        self.stack.retain(|(_, a)| *a != LayerActivation::OneShot);
        before != self.stack.len()
    }
}
