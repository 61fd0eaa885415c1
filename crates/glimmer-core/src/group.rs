//! Shader groups: layers, finalization, and the symbol table
//!
//! A [`ShaderGroup`] is built in two phases. Between `shader_group_begin`
//! and `shader_group_end` layers are appended; `shader_group_end` freezes
//! the group and computes its layout: the ordered layer list, the symbol
//! table, and the heap size a context must provide to execute it. After
//! finalization the group is immutable, so symbol references handed out by
//! [`find_symbol`](ShaderGroup::find_symbol) stay valid for the group's
//! lifetime.
//!
//! Groups are reference counted (`Arc`); the shading system and any number
//! of embedder-held handles may share one.

use std::sync::Arc;
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::shaders::BuiltinShader;
use crate::typedesc::TypeDesc;

/// One shader instance inside a group. Usage is validated when the layer
/// is appended and not retained; execution treats every layer the same.
pub(crate) struct Layer {
    pub layername: String,
    pub shader: Arc<dyn BuiltinShader>,
}

/// An output value of a finalized group: name, type, and where it lives in
/// the context heap.
pub struct ShaderSymbol {
    pub(crate) name: &'static str,
    pub(crate) layername: String,
    pub(crate) layer_index: usize,
    pub(crate) typedesc: TypeDesc,
    pub(crate) offset: usize,
}

impl ShaderSymbol {
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn layername(&self) -> &str {
        &self.layername
    }

    pub fn typedesc(&self) -> TypeDesc {
        self.typedesc
    }

    /// Byte offset of the symbol's value inside the context heap.
    pub(crate) fn heap_offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn size(&self) -> usize {
        self.typedesc.size()
    }
}

/// Frozen shape of a finalized group.
pub(crate) struct GroupLayout {
    pub layers: Vec<Layer>,
    pub symbols: Vec<ShaderSymbol>,
    pub heap_size: usize,
}

impl GroupLayout {
    /// Symbol emitted by layer `layer_index` under `name`, if declared.
    pub fn symbol_for(&self, layer_index: usize, name: &str) -> Option<&ShaderSymbol> {
        self.symbols
            .iter()
            .find(|s| s.layer_index == layer_index && s.name == name)
    }
}

/// A named DAG of shader layers; the unit of execution.
pub struct ShaderGroup {
    name: String,
    /// Layers staged before finalization. Emptied by `finalize`.
    pending: Mutex<Vec<Layer>>,
    /// Set exactly once, by `shader_group_end`.
    layout: OnceLock<GroupLayout>,
    /// Renderer outputs that must not be optimized away (group attribute).
    pub(crate) renderer_outputs: Mutex<Vec<String>>,
}

impl ShaderGroup {
    pub(crate) fn new(name: &str) -> ShaderGroup {
        ShaderGroup {
            name: name.to_string(),
            pending: Mutex::new(Vec::new()),
            layout: OnceLock::new(),
            renderer_outputs: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finalized(&self) -> bool {
        self.layout.get().is_some()
    }

    /// Number of layers (staged or finalized).
    pub fn nlayers(&self) -> usize {
        match self.layout.get() {
            Some(layout) => layout.layers.len(),
            None => self.pending.lock().len(),
        }
    }

    pub(crate) fn push_layer(&self, layer: Layer) -> Result<()> {
        if self.is_finalized() {
            return Err(Error::GroupFinalized(self.name.clone()));
        }
        self.pending.lock().push(layer);
        Ok(())
    }

    /// Freeze the group: lay out every declared output in layer order.
    /// Values are 4-byte aligned, which suits every float-based output the
    /// built-in shaders declare. Idempotent after the first call.
    pub(crate) fn finalize(&self) {
        let layers = std::mem::take(&mut *self.pending.lock());
        let mut symbols = Vec::new();
        let mut heap_size = 0usize;
        for (layer_index, layer) in layers.iter().enumerate() {
            for out in layer.shader.outputs() {
                let size = out.ty.size();
                symbols.push(ShaderSymbol {
                    name: out.name,
                    layername: layer.layername.clone(),
                    layer_index,
                    typedesc: out.ty,
                    offset: heap_size,
                });
                heap_size += (size + 3) & !3;
            }
        }
        let nlayers = layers.len();
        if self
            .layout
            .set(GroupLayout {
                layers,
                symbols,
                heap_size,
            })
            .is_ok()
        {
            tracing::debug!(
                group = %self.name,
                layers = nlayers,
                heap_size = heap_size,
                "shader group finalized"
            );
        }
    }

    pub(crate) fn layout(&self) -> Option<&GroupLayout> {
        self.layout.get()
    }

    /// Search the finalized symbol table, last layer to first. `name` is
    /// either a bare symbol name or `"layer.symbol"`.
    pub fn find_symbol(&self, name: &str) -> Option<&ShaderSymbol> {
        let layout = self.layout.get()?;
        let (layer_filter, symname) = match name.split_once('.') {
            Some((layer, sym)) => (Some(layer), sym),
            None => (None, name),
        };
        layout.symbols.iter().rev().find(|s| {
            s.name == symname && layer_filter.map_or(true, |l| s.layername == l)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaders::builtin_registry;

    fn layer(shader: &str, layername: &str) -> Layer {
        Layer {
            layername: layername.into(),
            shader: builtin_registry().get(shader).unwrap().clone(),
        }
    }

    #[test]
    fn finalize_lays_out_symbols() {
        let group = ShaderGroup::new("g");
        group.push_layer(layer("uv", "a")).unwrap();
        group.push_layer(layer("constant", "b")).unwrap();
        group.finalize();

        let layout = group.layout().unwrap();
        assert_eq!(layout.symbols.len(), 2);
        assert_eq!(layout.symbols[0].offset, 0);
        assert_eq!(layout.symbols[1].offset, 12);
        assert_eq!(layout.heap_size, 24);
    }

    #[test]
    fn push_after_finalize_is_rejected() {
        let group = ShaderGroup::new("g");
        group.push_layer(layer("noop", "a")).unwrap();
        group.finalize();
        let err = group.push_layer(layer("noop", "b")).unwrap_err();
        assert!(matches!(err, Error::GroupFinalized(_)));
        assert_eq!(group.nlayers(), 1);
    }

    #[test]
    fn find_symbol_prefers_last_layer() {
        let group = ShaderGroup::new("g");
        group.push_layer(layer("uv", "first")).unwrap();
        group.push_layer(layer("constant", "second")).unwrap();
        group.finalize();

        let sym = group.find_symbol("Cout").unwrap();
        assert_eq!(sym.layername(), "second");

        let qualified = group.find_symbol("first.Cout").unwrap();
        assert_eq!(qualified.layername(), "first");

        assert!(group.find_symbol("Ci_nope").is_none());
        assert!(group.find_symbol("third.Cout").is_none());
    }

    #[test]
    fn find_symbol_on_unfinalized_group_is_none() {
        let group = ShaderGroup::new("g");
        group.push_layer(layer("uv", "a")).unwrap();
        assert!(group.find_symbol("Cout").is_none());
    }
}
