//! Built-in surface shaders
//!
//! The library ships a small registry of named shaders in place of an
//! on-disk shader compiler. Each shader declares its output symbols up
//! front (so groups can lay out their heap at finalize time) and writes
//! float values for them when run.

use std::collections::HashMap;
use std::sync::Arc;

use crate::globals::ShaderGlobals;
use crate::typedesc::TypeDesc;

/// Declared output of a built-in shader.
pub(crate) struct OutputSpec {
    pub name: &'static str,
    pub ty: TypeDesc,
}

/// One built-in shader. `run` emits `(symbol name, values)` pairs through
/// the callback; the executor routes them into the context heap.
pub(crate) trait BuiltinShader: Send + Sync {
    fn name(&self) -> &'static str;
    fn outputs(&self) -> &'static [OutputSpec];
    fn run(&self, sg: &ShaderGlobals, emit: &mut dyn FnMut(&'static str, &[f32]));
}

/// Writes nothing. Useful for wiring tests and as a group entry point.
struct Noop;

impl BuiltinShader for Noop {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn outputs(&self) -> &'static [OutputSpec] {
        &[]
    }

    fn run(&self, _sg: &ShaderGlobals, _emit: &mut dyn FnMut(&'static str, &[f32])) {}
}

/// Emits a constant white color on `Cout`.
struct Constant;

const CONSTANT_OUTPUTS: &[OutputSpec] = &[OutputSpec {
    name: "Cout",
    ty: TypeDesc::COLOR,
}];

impl BuiltinShader for Constant {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn outputs(&self) -> &'static [OutputSpec] {
        CONSTANT_OUTPUTS
    }

    fn run(&self, _sg: &ShaderGlobals, emit: &mut dyn FnMut(&'static str, &[f32])) {
        emit("Cout", &[1.0, 1.0, 1.0]);
    }
}

/// Visualizes the surface parameterization: `Cout = (u, v, 0)`.
struct Uv;

const UV_OUTPUTS: &[OutputSpec] = &[OutputSpec {
    name: "Cout",
    ty: TypeDesc::COLOR,
}];

impl BuiltinShader for Uv {
    fn name(&self) -> &'static str {
        "uv"
    }

    fn outputs(&self) -> &'static [OutputSpec] {
        UV_OUTPUTS
    }

    fn run(&self, sg: &ShaderGlobals, emit: &mut dyn FnMut(&'static str, &[f32])) {
        emit("Cout", &[sg.u, sg.v, 0.0]);
    }
}

/// Registry of every built-in shader, keyed by shader name.
pub(crate) fn builtin_registry() -> HashMap<&'static str, Arc<dyn BuiltinShader>> {
    let shaders: [Arc<dyn BuiltinShader>; 3] = [Arc::new(Noop), Arc::new(Constant), Arc::new(Uv)];
    shaders.into_iter().map(|s| (s.name(), s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_contains_builtins() {
        let reg = builtin_registry();
        for name in ["noop", "constant", "uv"] {
            assert!(reg.contains_key(name), "missing builtin {name}");
        }
    }

    #[test]
    fn uv_emits_surface_parameters() {
        let reg = builtin_registry();
        let uv = reg.get("uv").unwrap();
        let mut sg = ShaderGlobals::default();
        sg.u = 0.5;
        sg.v = 0.75;

        let mut captured = Vec::new();
        uv.run(&sg, &mut |name, vals| {
            captured.push((name, vals.to_vec()));
        });
        assert_eq!(captured, vec![("Cout", vec![0.5, 0.75, 0.0])]);
    }
}
