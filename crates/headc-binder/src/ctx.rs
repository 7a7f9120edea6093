//! Shared mutable context threaded through Phase III onward: the interner,
//! the diagnostic sink, the injected class-path lookup, and a memoization
//! cache so a classpath class is decoded at most once no matter how many
//! source classes reference it.

use headc_core::{DiagnosticSink, Interner};
use headc_symbols::ClassSymbol;
use rustc_hash::FxHashMap;

use crate::bound::BoundClass;
use crate::classpath::{bound_class_from_classpath, ClassPathLookup};

pub struct BinderCtx<'a> {
    pub interner: &'a mut Interner,
    pub diagnostics: &'a mut DiagnosticSink,
    pub classpath: &'a mut dyn ClassPathLookup,
    pub classpath_cache: &'a mut FxHashMap<ClassSymbol, BoundClass>,
}

impl<'a> BinderCtx<'a> {
    /// Decodes and caches `symbol` from the class-path on first request.
    /// Returns `None` if it's absent or malformed; a malformed class is
    /// reported as `ClassPathDecodeError` by the caller, which has the
    /// context (which reference triggered the lookup) to attach a location.
    pub fn ensure_classpath_class(&mut self, symbol: ClassSymbol) -> Option<&BoundClass> {
        if !self.classpath_cache.contains_key(&symbol) {
            match bound_class_from_classpath(self.classpath, self.interner, symbol) {
                Ok(Some(bound)) => {
                    self.classpath_cache.insert(symbol, bound);
                }
                Ok(None) => return None,
                Err(crate::classpath::ClassPathDecodeError::Malformed(reason)) => {
                    self.diagnostics.report(headc_core::Diagnostic::error(
                        headc_core::DiagnosticKind::ClassPathDecodeError {
                            class: symbol.binary_name(self.interner).to_string(),
                            reason,
                        },
                        None,
                    ));
                    return None;
                }
            }
        }
        self.classpath_cache.get(&symbol)
    }
}
