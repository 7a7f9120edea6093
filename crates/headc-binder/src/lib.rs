//! The multi-phase binder.
//!
//! Turns a set of parsed `CompilationUnit`s plus a class-path lookup into a
//! [`BoundProgram`]: every class's hierarchy resolved, every field and
//! method's signature resolved, every `final` constant and annotation use
//! evaluated. Phases run strictly in order; each one consumes the diagnostic
//! sink and may report recoverable errors (a missing type, a cyclic
//! hierarchy) without aborting the run, so a caller gets as complete a
//! picture as possible from one pass. Only `DiagnosticKind::Internal` is
//! fatal; everything else is collected and returned alongside whatever
//! `BoundProgram` still got built.

mod bound;
mod classpath;
mod constants;
mod ctx;
mod hierarchy;
mod imports;
mod namer;
mod typeres;

pub use bound::{
    BoundClass, BoundField, BoundMethod, BoundParam, BoundProgram, ClassKind, Origin, Owner, Retention,
    TypeParamBound,
};
pub use classpath::{exists, ClassPathDecodeError, ClassPathLookup, EmptyClassPath};
pub use ctx::BinderCtx;
pub use hierarchy::{resolve_class_ref, HierarchyInfo};
pub use imports::{ImportMap, TypeNameResolution};
pub use namer::Header;

use headc_ast::CompilationUnit;
use headc_core::{DiagnosticSink, Interner};
use rustc_hash::FxHashMap;

/// Runs every phase over `compilation_units` and returns the resulting
/// [`BoundProgram`]. Diagnostics (missing symbols, cyclic hierarchies,
/// non-constant annotation arguments, and so on) accumulate in `diagnostics`
/// rather than aborting the run; the caller decides what severity to treat
/// as fatal before handing the program to `headc_lower`.
pub fn bind(
    interner: &mut Interner,
    diagnostics: &mut DiagnosticSink,
    classpath: &mut dyn ClassPathLookup,
    compilation_units: Vec<CompilationUnit>,
) -> BoundProgram {
    tracing::debug!(units = compilation_units.len(), "binder: phase I (naming)");
    let namer::NamerOutput { headers, top_level_by_package, compilation_units } =
        namer::name_compilation_units(interner, compilation_units, diagnostics);

    tracing::debug!("binder: phase II (imports)");
    let import_maps = compilation_units
        .iter()
        .map(|cu| ImportMap::from_compilation_unit(cu, diagnostics))
        .collect::<Vec<_>>();

    let mut classpath_cache = FxHashMap::default();
    let mut ctx = BinderCtx { interner, diagnostics, classpath, classpath_cache: &mut classpath_cache };

    tracing::debug!("binder: phase III (hierarchy)");
    let hierarchy::HierarchyOutput { info: hierarchy_info, order } =
        hierarchy::resolve_hierarchy(&mut ctx, &headers, &top_level_by_package, &compilation_units, &import_maps);

    tracing::debug!(classes = order.len(), "binder: phase IV (type resolution)");
    let mut classes = typeres::resolve_types(
        &mut ctx,
        &headers,
        &top_level_by_package,
        &compilation_units,
        &import_maps,
        &hierarchy_info,
        &order,
    );

    tracing::debug!("binder: phase V (constant evaluation)");
    constants::evaluate_constants(
        &mut ctx,
        &headers,
        &top_level_by_package,
        &compilation_units,
        &import_maps,
        &mut classes,
    );

    BoundProgram { classes, order }
}
