//! Script object handles

use rquickjs::{Ctx, Persistent, Value};
use std::fmt;
use std::rc::Rc;

/// Strong reference to a QuickJS object that outlives a single `Context::with`.
///
/// Every handle carries a token of the runtime it was saved from, so the
/// runtime can tell on drop whether any handle is still outstanding.
#[derive(Clone)]
pub struct QuickHandle {
    value: Persistent<Value<'static>>,
    _live: Rc<()>,
}

impl QuickHandle {
    pub(crate) fn save<'js>(ctx: &Ctx<'js>, value: Value<'js>, live: Rc<()>) -> Self {
        Self {
            value: Persistent::save(ctx, value),
            _live: live,
        }
    }

    pub(crate) fn restore<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        self.value.clone().restore(ctx)
    }
}

impl fmt::Debug for QuickHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("QuickHandle(..)")
    }
}
