//! Per-instance publish/subscribe.
//!
//! Every stateful piece of the UI (grid, button, scrim, fill bar) owns one
//! `EventBus` and publishes on it. Nothing is shared between instances.
//!
//! ┌──────────────────────── Dispatch of emit("a b") ────────────────────────┐
//! │  for name in ["a", "b"]:                                                │
//! │     snapshot registry[name]  ──► call each (name, payload) in order     │
//! │     snapshot registry["all"] ──► call each (name, payload) in order     │
//! └─────────────────────────────────────────────────────────────────────────┘
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Wildcard channel, receives every emitted event name.
pub const ALL: &str = "all";

/// Listener signature: `(event_name, payload)`.
pub type Callback<P> = Rc<dyn Fn(&str, &P)>;

/// Identifies "who" subscribed, so a group of listeners can be removed
/// together with `off(None, None, Some(context))`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Context(pub u64);

/// Wraps a closure into a shareable `Callback`.
///
/// Keep the returned `Rc` around if you plan to `off` that exact listener.
pub fn listener<P, F>(f: F) -> Callback<P>
where
    F: Fn(&str, &P) + 'static,
{
    Rc::new(f)
}

struct Subscription<P> {
    callback: Callback<P>,
    context: Option<Context>,
}

// manual impl, a derive would demand `P: Clone`
impl<P> Clone for Subscription<P> {
    fn clone(&self) -> Self {
        Subscription {
            callback: self.callback.clone(),
            context: self.context,
        }
    }
}

impl<P> Subscription<P> {
    fn matches(&self, callback: Option<&Callback<P>>, context: Option<Context>) -> bool {
        let callback_matches = callback.map_or(true, |cb| Rc::ptr_eq(cb, &self.callback));
        let context_matches = context.map_or(true, |ctx| self.context == Some(ctx));
        callback_matches && context_matches
    }
}

pub struct EventBus<P> {
    registry: RefCell<HashMap<String, Vec<Subscription<P>>>>,
}

impl<P> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> std::fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.borrow();
        let mut names: Vec<&String> = registry.keys().collect();
        names.sort();
        f.debug_struct("EventBus").field("events", &names).finish()
    }
}

impl<P> EventBus<P> {
    pub fn new() -> Self {
        EventBus {
            registry: RefCell::new(HashMap::new()),
        }
    }

    /// Subscribe `callback` to every space separated name in `names`.
    pub fn on(&self, names: &str, callback: Callback<P>) -> &Self {
        self.subscribe(names, callback, None)
    }

    /// Same as `on`, tagging the subscription with a `Context`.
    pub fn on_with_context(&self, names: &str, callback: Callback<P>, context: Context) -> &Self {
        self.subscribe(names, callback, Some(context))
    }

    fn subscribe(&self, names: &str, callback: Callback<P>, context: Option<Context>) -> &Self {
        let mut registry = self.registry.borrow_mut();
        for name in names.split_whitespace() {
            registry
                .entry(name.to_owned())
                .or_default()
                .push(Subscription {
                    callback: callback.clone(),
                    context,
                });
        }
        self
    }

    /// Remove subscriptions.
    /// - nothing given       : clear every event
    /// - only `names`        : clear those events entirely
    /// - callback / context  : remove entries matching all the given criteria
    pub fn off(
        &self,
        names: Option<&str>,
        callback: Option<&Callback<P>>,
        context: Option<Context>,
    ) -> &Self {
        let mut registry = self.registry.borrow_mut();
        if names.is_none() && callback.is_none() && context.is_none() {
            registry.clear();
            return self;
        }

        let targets: Vec<String> = match names {
            Some(names) => names.split_whitespace().map(str::to_owned).collect(),
            None => registry.keys().cloned().collect(),
        };

        for name in targets {
            if callback.is_none() && context.is_none() {
                registry.remove(&name);
            } else if let Some(list) = registry.get_mut(&name) {
                list.retain(|sub| !sub.matches(callback, context));
                if list.is_empty() {
                    registry.remove(&name);
                }
            }
        }
        self
    }

    /// Synchronously invoke the subscribers of each listed name, followed by
    /// the `"all"` channel.
    pub fn emit(&self, names: &str, payload: &P) -> &Self {
        for name in names.split_whitespace() {
            // the borrow ends here, callbacks may call on/off/emit freely
            let (listeners, wildcard) = {
                let registry = self.registry.borrow();
                (
                    registry.get(name).cloned().unwrap_or_default(),
                    registry.get(ALL).cloned().unwrap_or_default(),
                )
            };
            for sub in listeners.iter().chain(wildcard.iter()) {
                (sub.callback)(name, payload);
            }
        }
        self
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.registry.borrow().get(name).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.registry.borrow().is_empty()
    }
}
