//! The shading system: attribute plumbing, group construction, execution
//!
//! [`ShadingSystem`] is the long-lived, thread-shared entry point of the
//! library. It owns the renderer-services and error-handler objects the
//! embedder supplied, the built-in shader registry, the closure registry,
//! and the option set controlled through [`attribute`](ShadingSystem::attribute).
//!
//! Operations the host contract defines as boolean-returning report their
//! failure through the error handler and return `false`; nothing is thrown
//! and nothing is swallowed.

use std::collections::HashMap;
use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::closure::{ClosureDef, ClosureParamDef};
use crate::context::{PerThreadInfo, ShadingContext};
use crate::error::Error;
use crate::errorhandler::{DefaultErrorHandler, ErrorHandler};
use crate::globals::ShaderGlobals;
use crate::group::{Layer, ShaderGroup, ShaderSymbol};
use crate::renderer_services::RendererServices;
use crate::shaders::{builtin_registry, BuiltinShader};
use crate::texture::TextureSystem;
use crate::typedesc::{aggregate, basetype, TypeDesc};

/// Options controlled through `attribute`. Defaults follow the host
/// library's documented values.
struct Options {
    searchpath_shader: String,
    colorspace: String,
    commonspace: String,
    statistics_level: i32,
    range_checking: i32,
    debug: i32,
    strict_attributes: i32,
    exec_repeat: i32,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            searchpath_shader: String::new(),
            colorspace: "Rec709".to_string(),
            commonspace: "world".to_string(),
            statistics_level: 0,
            range_checking: 1,
            debug: 0,
            strict_attributes: 0,
            exec_repeat: 1,
        }
    }
}

/// A decoded attribute value.
enum AttrValue {
    Int(i32),
    Float(f32),
    Str(String),
    StrVec(Vec<String>),
}

/// Interpret `val` according to `ty`. String attributes arrive as a pointer
/// to a C-string pointer, matching the host "ustring" convention.
///
/// # Safety
///
/// `val` must point to a value of the shape `ty` describes.
unsafe fn decode_attr(ty: TypeDesc, val: *const c_void) -> Option<AttrValue> {
    if val.is_null() || ty.aggregate != aggregate::SCALAR {
        return None;
    }
    match (ty.basetype, ty.arraylen) {
        (basetype::INT, 0) => Some(AttrValue::Int(*(val as *const i32))),
        (basetype::FLOAT, 0) => Some(AttrValue::Float(*(val as *const f32))),
        (basetype::STRING, 0) => {
            let p = *(val as *const *const c_char);
            let s = if p.is_null() {
                String::new()
            } else {
                CStr::from_ptr(p).to_string_lossy().into_owned()
            };
            Some(AttrValue::Str(s))
        }
        (basetype::STRING, n) if n > 0 => {
            let ptrs = std::slice::from_raw_parts(val as *const *const c_char, n as usize);
            let mut out = Vec::with_capacity(n as usize);
            for &p in ptrs {
                out.push(if p.is_null() {
                    String::new()
                } else {
                    CStr::from_ptr(p).to_string_lossy().into_owned()
                });
            }
            Some(AttrValue::StrVec(out))
        }
        _ => None,
    }
}

struct Stats {
    groups_built: AtomicUsize,
    executions: AtomicUsize,
}

/// The top-level object that builds and runs shader groups.
///
/// Intended to be shared across threads; per-thread execution state lives
/// in [`PerThreadInfo`] and [`ShadingContext`].
pub struct ShadingSystem {
    renderer: Arc<dyn RendererServices>,
    texture_system: Option<Arc<TextureSystem>>,
    error_handler: Arc<dyn ErrorHandler>,
    options: RwLock<Options>,
    shaders: HashMap<&'static str, Arc<dyn BuiltinShader>>,
    closures: RwLock<HashMap<String, ClosureDef>>,
    stats: Stats,
}

impl ShadingSystem {
    /// Create a shading system around the embedder's renderer services.
    /// With no error handler, diagnostics go to `tracing` via
    /// [`DefaultErrorHandler`].
    pub fn new(
        renderer: Arc<dyn RendererServices>,
        texture_system: Option<Arc<TextureSystem>>,
        error_handler: Option<Arc<dyn ErrorHandler>>,
    ) -> ShadingSystem {
        tracing::debug!(
            has_texture_system = texture_system.is_some(),
            "creating shading system"
        );
        ShadingSystem {
            renderer,
            texture_system,
            error_handler: error_handler.unwrap_or_else(|| Arc::new(DefaultErrorHandler::new())),
            options: RwLock::new(Options::default()),
            shaders: builtin_registry(),
            closures: RwLock::new(HashMap::new()),
            stats: Stats {
                groups_built: AtomicUsize::new(0),
                executions: AtomicUsize::new(0),
            },
        }
    }

    pub fn renderer(&self) -> &Arc<dyn RendererServices> {
        &self.renderer
    }

    pub fn texture_system(&self) -> Option<&Arc<TextureSystem>> {
        self.texture_system.as_ref()
    }

    pub fn error_handler(&self) -> &Arc<dyn ErrorHandler> {
        &self.error_handler
    }

    fn report(&self, err: &Error) {
        self.error_handler.error(&err.to_string());
    }

    /// Set a global attribute. Returns whether the name and type were
    /// recognized and the attribute was set. With `strict_attributes`
    /// nonzero, a rejected attribute also emits an ERROR diagnostic.
    ///
    /// Recognized attributes: `searchpath:shader` (string), `colorspace`
    /// (string), `commonspace` (string), `statistics:level` (int),
    /// `range_checking` (int), `debug` (int), `strict_attributes` (int),
    /// `exec_repeat` (int).
    ///
    /// # Safety
    ///
    /// `val` must point to a live value of the shape `ty` describes: an
    /// `i32`, an `f32`, a `*const c_char`, or an array of `*const c_char`.
    pub unsafe fn attribute(&self, name: &str, ty: TypeDesc, val: *const c_void) -> bool {
        let Some(value) = decode_attr(ty, val) else {
            return self.reject_attribute(name, "a decodable scalar or string value");
        };
        let mut options = self.options.write();
        let ok = match (name, &value) {
            ("searchpath:shader", AttrValue::Str(s)) => {
                options.searchpath_shader = s.clone();
                true
            }
            ("colorspace", AttrValue::Str(s)) => {
                options.colorspace = s.clone();
                true
            }
            ("commonspace", AttrValue::Str(s)) => {
                options.commonspace = s.clone();
                true
            }
            ("statistics:level", AttrValue::Int(i)) => {
                options.statistics_level = *i;
                true
            }
            ("range_checking", AttrValue::Int(i)) => {
                options.range_checking = *i;
                true
            }
            ("debug", AttrValue::Int(i)) => {
                options.debug = *i;
                true
            }
            ("strict_attributes", AttrValue::Int(i)) => {
                options.strict_attributes = *i;
                true
            }
            ("exec_repeat", AttrValue::Int(i)) => {
                options.exec_repeat = *i;
                true
            }
            _ => false,
        };
        drop(options);
        if ok {
            tracing::debug!(attribute = name, "shading system attribute set");
            true
        } else {
            self.reject_attribute(name, attr_expectation(name))
        }
    }

    fn reject_attribute(&self, name: &str, expected: &'static str) -> bool {
        let strict = self.options.read().strict_attributes != 0;
        if strict {
            if attr_expectation(name) == UNKNOWN_ATTR {
                self.report(&Error::UnknownAttribute(name.to_string()));
            } else {
                self.report(&Error::AttributeTypeMismatch {
                    name: name.to_string(),
                    expected,
                });
            }
        } else {
            tracing::debug!(attribute = name, "attribute not set");
        }
        false
    }

    /// Set a group-scoped attribute. Recognized: `renderer_outputs`
    /// (string array) and `groupname` (string, informational).
    ///
    /// # Safety
    ///
    /// Same contract as [`attribute`](Self::attribute).
    pub unsafe fn group_attribute(
        &self,
        group: &ShaderGroup,
        name: &str,
        ty: TypeDesc,
        val: *const c_void,
    ) -> bool {
        let Some(value) = decode_attr(ty, val) else {
            return self.reject_attribute(name, "a decodable scalar or string value");
        };
        match (name, value) {
            ("renderer_outputs", AttrValue::StrVec(outputs)) => {
                *group.renderer_outputs.lock() = outputs;
                true
            }
            ("renderer_outputs", AttrValue::Str(output)) => {
                *group.renderer_outputs.lock() = vec![output];
                true
            }
            ("groupname", AttrValue::Str(newname)) => {
                tracing::debug!(group = %group.name(), newname = %newname, "group rename requested");
                true
            }
            (name, _) => self.reject_attribute(name, UNKNOWN_ATTR),
        }
    }

    /// Register a closure's name, id, and parameter-block layout.
    /// Re-registering a name replaces the old definition with a WARNING.
    pub fn register_closure(&self, name: &str, id: i32, params: &[ClosureParamDef]) {
        let def = ClosureDef {
            name: name.to_string(),
            id,
            params: params.to_vec(),
        };
        tracing::debug!(closure = name, id = id, nparams = params.len(), "registering closure");
        if let Some(old) = self.closures.write().insert(name.to_string(), def) {
            self.error_handler.warning(&format!(
                "closure \"{}\" re-registered (previous id {})",
                name, old.id
            ));
        }
    }

    /// Id under which `name` was registered, if any.
    pub fn closure_id(&self, name: &str) -> Option<i32> {
        self.closures.read().get(name).map(|def| def.id)
    }

    /// Begin a new, empty shader group.
    pub fn shader_group_begin(&self, groupname: &str) -> Arc<ShaderGroup> {
        tracing::debug!(group = groupname, "shader group begin");
        Arc::new(ShaderGroup::new(groupname))
    }

    /// Append a shader layer to the group. Usage must be `"surface"` and
    /// the shader name must exist in the registry.
    pub fn shader(
        &self,
        group: &ShaderGroup,
        shaderusage: &str,
        shadername: &str,
        layername: &str,
    ) -> bool {
        if shaderusage != "surface" {
            self.report(&Error::UnsupportedUsage(shaderusage.to_string()));
            return false;
        }
        let Some(shader) = self.shaders.get(shadername) else {
            self.report(&Error::UnknownShader(shadername.to_string()));
            return false;
        };
        match group.push_layer(Layer {
            layername: layername.to_string(),
            shader: shader.clone(),
        }) {
            Ok(()) => {
                tracing::debug!(
                    group = %group.name(),
                    shader = shadername,
                    layer = layername,
                    "layer appended"
                );
                true
            }
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    /// Finalize the group. No layers may be added afterwards.
    pub fn shader_group_end(&self, group: &ShaderGroup) {
        group.finalize();
        self.stats.groups_built.fetch_add(1, Ordering::Relaxed);
    }

    /// Create per-thread state for one renderer thread. Destroy it with
    /// [`destroy_thread_info`](Self::destroy_thread_info) before the
    /// shading system goes away, and never share it between threads.
    pub fn create_thread_info(&self) -> Box<PerThreadInfo> {
        Box::new(PerThreadInfo::new())
    }

    pub fn destroy_thread_info(&self, tinfo: Box<PerThreadInfo>) {
        if tinfo.outstanding() > 0 {
            self.error_handler.warning(&format!(
                "destroying thread info with {} outstanding context(s)",
                tinfo.outstanding()
            ));
        }
    }

    /// Get a fresh context from this thread's info. A context shades many
    /// points; typical usage is one context per thread for the whole run.
    pub fn get_context(&self, tinfo: &PerThreadInfo) -> Box<ShadingContext> {
        Box::new(ShadingContext::new(Some(tinfo.issue())))
    }

    /// Context used internally when no thread info is in play (image
    /// shading). Not counted against any thread.
    pub(crate) fn scratch_context(&self) -> ShadingContext {
        ShadingContext::new(None)
    }

    /// Return a context. The per-thread tallies are balanced on drop.
    pub fn release_context(&self, context: Box<ShadingContext>) {
        drop(context);
    }

    /// Execute the group in the context against `sg`. With `run == false`
    /// the context is bound to the group's layout but no layer is run,
    /// which lets callers resolve output addresses without evaluating.
    pub fn execute(
        &self,
        context: &mut ShadingContext,
        group: &Arc<ShaderGroup>,
        sg: &ShaderGlobals,
        run: bool,
    ) -> bool {
        let Some(layout) = group.layout() else {
            self.report(&Error::GroupNotFinalized(group.name().to_string()));
            return false;
        };
        context.bind(group.clone(), layout.heap_size);
        if !run {
            return true;
        }
        let repeat = self.options.read().exec_repeat.max(1);
        for _ in 0..repeat {
            for (layer_index, layer) in layout.layers.iter().enumerate() {
                layer.shader.run(sg, &mut |name, values| {
                    if let Some(sym) = layout.symbol_for(layer_index, name) {
                        context.write_floats(sym.heap_offset(), sym.size(), values);
                    }
                });
            }
        }
        self.stats.executions.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Search for an output symbol by name (or `"layer.symbol"`) in a
    /// finalized group, last layer to first. The returned reference stays
    /// valid for the life of the group.
    pub fn find_symbol<'g>(
        &self,
        group: &'g Arc<ShaderGroup>,
        symbolname: &str,
    ) -> Option<&'g ShaderSymbol> {
        group.find_symbol(symbolname)
    }

    /// The TypeDesc describing a symbol.
    pub fn symbol_typedesc(&self, symbol: &ShaderSymbol) -> TypeDesc {
        symbol.typedesc()
    }

    /// Address of the symbol's value inside the context heap. Valid only
    /// for the execution that happened most recently in this context.
    pub fn symbol_address(
        &self,
        context: &ShadingContext,
        symbol: &ShaderSymbol,
    ) -> Option<NonNull<u8>> {
        context.symbol_address(symbol)
    }

    /// Whether rejected attributes raise ERROR diagnostics.
    pub fn strict_attributes(&self) -> bool {
        self.options.read().strict_attributes != 0
    }

    /// How many times `execute` runs each group.
    pub fn exec_repeat(&self) -> i32 {
        self.options.read().exec_repeat
    }
}

impl Drop for ShadingSystem {
    fn drop(&mut self) {
        let level = self.options.read().statistics_level;
        if level > 0 {
            self.error_handler.info(&format!(
                "shading statistics: {} group(s) built, {} execution(s)",
                self.stats.groups_built.load(Ordering::Relaxed),
                self.stats.executions.load(Ordering::Relaxed),
            ));
        }
    }
}

const UNKNOWN_ATTR: &str = "no such attribute";

/// Expected value type for a recognized attribute name, used in
/// diagnostics.
fn attr_expectation(name: &str) -> &'static str {
    match name {
        "searchpath:shader" | "colorspace" | "commonspace" => "a string value",
        "statistics:level" | "range_checking" | "debug" | "strict_attributes" | "exec_repeat" => {
            "an int value"
        }
        _ => UNKNOWN_ATTR,
    }
}
