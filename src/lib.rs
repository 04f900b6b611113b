use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

type Location = &'static std::panic::Location<'static>;

/// Shared cell behind an [`Obj`]. Remembers where it was last borrowed so a
/// conflicting borrow can report both sites.
pub struct Value<T: ?Sized> {
    last_used: Mutex<Option<Location>>,
    inner: RwLock<T>,
}

impl<T> Value<T> {
    pub const fn new(t: T) -> Self {
        Value {
            last_used: Mutex::new(None),
            inner: RwLock::new(t),
        }
    }
}

impl<T: ?Sized> Value<T> {
    #[track_caller]
    fn borrow_failed(&self) -> ! {
        let previous = *self
            .last_used
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match previous {
            Some(location) => panic!(
                "Obj<{}> already borrowed at {}",
                std::any::type_name::<T>(),
                location
            ),
            None => panic!("Obj<{}> unknown error", std::any::type_name::<T>()),
        }
    }
    #[track_caller]
    fn mark_used(&self) {
        if let Ok(mut last_used) = self.last_used.lock() {
            *last_used = Some(std::panic::Location::caller());
        }
    }
}

/// A shared, reference counted handle. Controls are held as `Obj<dyn Control>`
/// by the host and as `Obj<ConcreteControl>` by game code.
pub struct Obj<T: ?Sized>(Arc<Value<T>>);
pub struct WeakObj<T: ?Sized>(Weak<Value<T>>);

impl<T> Obj<T> {
    pub fn new(value: T) -> Self {
        Obj(Arc::new(Value::new(value)))
    }
}
impl<T: ?Sized> Obj<T> {
    pub fn from_rc(rc: Arc<Value<T>>) -> Self {
        Obj(rc)
    }
    pub fn rc_weak(&self) -> Weak<Value<T>> {
        Arc::downgrade(&self.0)
    }
    pub fn downgrade(&self) -> WeakObj<T> {
        WeakObj::new(self.rc_weak())
    }

    #[track_caller]
    pub fn get(&self) -> RwLockReadGuard<T> {
        match self.0.inner.try_read() {
            Ok(guard) => {
                self.0.mark_used();
                guard
            }
            Err(_) => self.0.borrow_failed(),
        }
    }
    #[track_caller]
    pub fn get_mut(&self) -> RwLockWriteGuard<T> {
        match self.0.inner.try_write() {
            Ok(guard) => {
                self.0.mark_used();
                guard
            }
            Err(_) => self.0.borrow_failed(),
        }
    }
}
impl<T: ?Sized> Clone for Obj<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
impl<T: ?Sized> PartialEq for Obj<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl<T: ?Sized> Eq for Obj<T> {}

impl<T: ?Sized> WeakObj<T> {
    pub fn new(weak: Weak<Value<T>>) -> Self {
        WeakObj(weak)
    }
    pub fn try_upgrade(&self) -> Option<Obj<T>> {
        Weak::upgrade(&self.0).map(Obj::from_rc)
    }
    #[track_caller]
    pub fn upgrade(&self) -> Obj<T> {
        match self.try_upgrade() {
            Some(obj) => obj,
            None => panic!(
                "WeakObj<{}> object no longer exists",
                std::any::type_name::<T>()
            ),
        }
    }
}
impl<T: ?Sized> Clone for WeakObj<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Converts an `Obj<Concrete>` into a `WeakObj<dyn Trait>`.
#[macro_export]
macro_rules! obj_upcast {
    ($obj:expr) => {
        $crate::WeakObj::new($obj.rc_weak() as _)
    };
}

/// Synchronous observer list. Listeners run in registration order, on the
/// caller's thread, before `emit` returns.
pub struct Event<T> {
    listeners: Vec<Box<dyn FnMut(&T)>>,
}

impl<T> Event<T> {
    pub fn new() -> Self {
        Event {
            listeners: Vec::new(),
        }
    }
    pub fn add_listener<F>(&mut self, f: F)
    where
        F: FnMut(&T) + 'static,
    {
        self.listeners.push(Box::new(f));
    }
    pub fn emit(&mut self, param: &T) {
        for listener in self.listeners.iter_mut() {
            listener(param);
        }
    }
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<T> Default for Event<T> {
    fn default() -> Self {
        Event::new()
    }
}

#[macro_export]
macro_rules! impl_add_event_listener {
    ($type:ty, $member:ident, $param:ty, $fn_name:ident) => {
        impl $type {
            pub fn $fn_name<F>(&mut self, f: F)
            where
                F: FnMut(&$param) + 'static,
            {
                self.$member.add_listener(f);
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn event_runs_listeners_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut event = Event::new();
        let first = seen.clone();
        event.add_listener(move |value: &i32| first.borrow_mut().push(("first", *value)));
        let second = seen.clone();
        event.add_listener(move |value: &i32| second.borrow_mut().push(("second", *value)));

        event.emit(&7);

        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
        assert_eq!(event.listener_count(), 2);
    }

    #[test]
    fn obj_equality_is_identity() {
        let a = Obj::new(1);
        let b = Obj::new(1);
        assert!(a == a.clone());
        assert!(a != b);
        *a.get_mut() = 2;
        assert_eq!(*a.get(), 2);
    }

    #[test]
    fn weak_obj_expires_with_last_handle() {
        let obj = Obj::new(String::from("control"));
        let weak = obj.downgrade();
        assert!(weak.try_upgrade().is_some());
        drop(obj);
        assert!(weak.try_upgrade().is_none());
    }

    #[test]
    #[should_panic(expected = "already borrowed")]
    fn conflicting_borrow_panics() {
        let obj = Obj::new(0);
        let _read = obj.get();
        let _write = obj.get_mut();
    }
}
