//! Observable state cells.
//!
//! Every store field is an [`Observable`]: subscribers are called once with
//! the current value at subscription time and then once per mutation.
//! [`Derived`] values are recomputed from their sources on every read and
//! every emission, so they can never drift from what they are derived from.
//!
//! Delivery is serialized per cell: a subscriber sees mutations in the order
//! they were applied, and the last value it sees is the cell's current value,
//! even when writers race on different threads.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Cell<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(u64, Callback<T>)>,
}

/// A value plus the list of callbacks watching it.
pub struct Observable<T> {
    cell: Arc<Mutex<Cell<T>>>,
    // Held from mutation through the last callback. Reentrant: a callback may
    // write back to the cell it watches.
    delivery: Arc<ReentrantMutex<()>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            delivery: Arc::clone(&self.delivery),
        }
    }
}

impl<T> Default for Observable<T>
where
    T: Default + Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Observable<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(value: T) -> Self {
        Self {
            cell: Arc::new(Mutex::new(Cell {
                value,
                next_id: 0,
                subscribers: Vec::new(),
            })),
            delivery: Arc::new(ReentrantMutex::new(())),
        }
    }

    pub fn get(&self) -> T {
        self.cell.lock().value.clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.lock().value)
    }

    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    /// Mutate in place, then notify every subscriber.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let _delivery = self.delivery.lock();
        let (value, subscribers) = {
            let mut cell = self.cell.lock();
            f(&mut cell.value);
            let subscribers: Vec<Callback<T>> =
                cell.subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect();
            (cell.value.clone(), subscribers)
        };
        // Callbacks run outside the lock so they may read this cell again.
        for callback in subscribers {
            callback(&value);
        }
    }

    /// Call `callback` with the current value now and after every mutation.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let callback: Callback<T> = Arc::new(callback);
        let _delivery = self.delivery.lock();
        let current = self.get();
        callback(&current);
        self.register(callback)
    }

    /// Like [`subscribe`](Self::subscribe) but without the initial call.
    pub(crate) fn watch(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.register(Arc::new(callback))
    }

    pub fn subscriber_count(&self) -> usize {
        self.cell.lock().subscribers.len()
    }

    /// A read-only view computed from this value.
    pub fn map<U>(&self, f: impl Fn(&T) -> U + Send + Sync + 'static) -> Derived<U>
    where
        T: Sync,
        U: 'static,
    {
        let source = self.clone();
        let watched: Arc<dyn Source> = Arc::new(self.clone());
        Derived::new(move || source.with(|value| f(value)), vec![watched])
    }

    fn register(&self, callback: Callback<T>) -> Subscription {
        let id = {
            let mut cell = self.cell.lock();
            let id = cell.next_id;
            cell.next_id += 1;
            cell.subscribers.push((id, callback));
            id
        };

        let weak: Weak<Mutex<Cell<T>>> = Arc::downgrade(&self.cell);
        Subscription::from_fn(move || {
            if let Some(cell) = weak.upgrade() {
                cell.lock().subscribers.retain(|(existing, _)| *existing != id);
            }
        })
    }
}

/// Read side of an [`Observable`]. Stores hand these out and keep writing to themselves.
pub struct ReadOnly<T> {
    inner: Observable<T>,
}

impl<T> Clone for ReadOnly<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> ReadOnly<T>
where
    T: Clone + Send + 'static,
{
    pub fn get(&self) -> T {
        self.inner.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.with(f)
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.inner.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }
}

impl<T> Observable<T>
where
    T: Clone + Send + 'static,
{
    pub fn read_only(&self) -> ReadOnly<T> {
        ReadOnly {
            inner: self.clone(),
        }
    }
}

/// Handle returned by `subscribe`; call [`unsubscribe`](Subscription::unsubscribe) to stop.
///
/// Dropping the handle leaves the subscription in place.
#[must_use = "keep the handle to be able to unsubscribe"]
pub struct Subscription {
    cancels: Vec<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn from_fn(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancels: vec![Box::new(cancel)],
        }
    }

    fn empty() -> Self {
        Self {
            cancels: Vec::new(),
        }
    }

    fn join(&mut self, other: Subscription) {
        self.cancels.extend(other.cancels);
    }

    pub fn unsubscribe(self) {
        for cancel in self.cancels {
            cancel();
        }
    }
}

/// Something a [`Derived`] value can listen to for changes.
pub trait Source: Send + Sync {
    fn on_change(&self, notify: Arc<dyn Fn() + Send + Sync>) -> Subscription;
}

impl<T> Source for Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn on_change(&self, notify: Arc<dyn Fn() + Send + Sync>) -> Subscription {
        self.watch(move |_| notify())
    }
}

/// A value recomputed from one or more observables.
pub struct Derived<U> {
    compute: Arc<dyn Fn() -> U + Send + Sync>,
    sources: Vec<Arc<dyn Source>>,
}

impl<U> Clone for Derived<U> {
    fn clone(&self) -> Self {
        Self {
            compute: Arc::clone(&self.compute),
            sources: self.sources.clone(),
        }
    }
}

impl<U: 'static> Derived<U> {
    pub fn new(
        compute: impl Fn() -> U + Send + Sync + 'static,
        sources: Vec<Arc<dyn Source>>,
    ) -> Self {
        Self {
            compute: Arc::new(compute),
            sources,
        }
    }

    pub fn get(&self) -> U {
        (self.compute)()
    }

    /// Emits the current value once, then again whenever any source changes.
    pub fn subscribe(&self, callback: impl Fn(&U) + Send + Sync + 'static) -> Subscription {
        let callback: Arc<dyn Fn(&U) + Send + Sync> = Arc::new(callback);
        callback(&self.get());

        let mut subscription = Subscription::empty();
        for source in &self.sources {
            let compute = Arc::clone(&self.compute);
            let callback = Arc::clone(&callback);
            subscription.join(source.on_change(Arc::new(move || callback(&compute()))));
        }
        subscription
    }
}

/// Derive a value from two observables.
pub fn derived2<A, B, U>(
    a: &Observable<A>,
    b: &Observable<B>,
    f: impl Fn(&A, &B) -> U + Send + Sync + 'static,
) -> Derived<U>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    U: 'static,
{
    let (left, right) = (a.clone(), b.clone());
    let sources: Vec<Arc<dyn Source>> = vec![Arc::new(a.clone()), Arc::new(b.clone())];
    Derived::new(move || left.with(|a| right.with(|b| f(a, b))), sources)
}

/// Derive a value from three observables.
pub fn derived3<A, B, C, U>(
    a: &Observable<A>,
    b: &Observable<B>,
    c: &Observable<C>,
    f: impl Fn(&A, &B, &C) -> U + Send + Sync + 'static,
) -> Derived<U>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    U: 'static,
{
    let (first, second, third) = (a.clone(), b.clone(), c.clone());
    let sources: Vec<Arc<dyn Source>> =
        vec![Arc::new(a.clone()), Arc::new(b.clone()), Arc::new(c.clone())];
    Derived::new(
        move || first.with(|a| second.with(|b| third.with(|c| f(a, b, c)))),
        sources,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |value: &T| sink.lock().push(value.clone()))
    }

    #[test]
    fn subscribe_replays_current_then_streams() {
        let counter = Observable::new(1);
        let (seen, callback) = recorder::<i32>();

        let subscription = counter.subscribe(callback);
        counter.set(2);
        counter.update(|value| *value += 5);

        assert_eq!(*seen.lock(), vec![1, 2, 7]);
        subscription.unsubscribe();
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let name = Observable::new(String::from("a"));
        let (seen, callback) = recorder::<String>();

        let subscription = name.subscribe(callback);
        subscription.unsubscribe();
        name.set("b".to_string());

        assert_eq!(*seen.lock(), vec!["a".to_string()]);
        assert_eq!(name.subscriber_count(), 0);
    }

    #[test]
    fn dropping_handle_keeps_subscription() {
        let flag = Observable::new(false);
        let (seen, callback) = recorder::<bool>();

        drop(flag.subscribe(callback));
        flag.set(true);

        assert_eq!(*seen.lock(), vec![false, true]);
    }

    #[test]
    fn callback_may_read_the_cell_it_watches() {
        let value = Observable::new(3);
        let reader = value.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let _sub = value.subscribe(move |_| sink.lock().push(reader.get()));
        value.set(4);

        assert_eq!(*seen.lock(), vec![3, 4]);
    }

    #[test]
    fn derived_emits_once_on_subscribe_and_on_each_source_change() {
        let a = Observable::new(2);
        let b = Observable::new(10);
        let sum = derived2(&a, &b, |a: &i32, b: &i32| a + b);
        let (seen, callback) = recorder::<i32>();

        let _sub = sum.subscribe(callback);
        a.set(3);
        b.set(20);

        assert_eq!(*seen.lock(), vec![12, 13, 23]);
        assert_eq!(sum.get(), 23);
    }

    #[test]
    fn mapped_value_tracks_source() {
        let items = Observable::new(vec![1, 2, 3]);
        let len = items.map(|items: &Vec<i32>| items.len());

        assert_eq!(len.get(), 3);
        items.update(|items| items.push(4));
        assert_eq!(len.get(), 4);
    }

    #[test]
    fn read_only_view_shares_the_cell() {
        let source = Observable::new(vec![1]);
        let view = source.read_only();
        let (seen, callback) = recorder::<Vec<i32>>();

        let _sub = view.subscribe(callback);
        source.update(|items| items.push(2));

        assert_eq!(view.get(), vec![1, 2]);
        assert_eq!(seen.lock().len(), 2);
        assert_eq!(view.with(|items| items.len()), 2);
    }

    #[test]
    fn racing_writers_leave_subscribers_on_the_final_value() {
        for _ in 0..200 {
            let counter = Observable::new(0u32);
            let last = Arc::new(Mutex::new(0u32));
            let sink = Arc::clone(&last);
            let _sub = counter.subscribe(move |value| *sink.lock() = *value);

            std::thread::scope(|scope| {
                for _ in 0..2 {
                    let counter = counter.clone();
                    scope.spawn(move || {
                        for _ in 0..50 {
                            counter.update(|value| *value += 1);
                        }
                    });
                }
            });

            assert_eq!(counter.get(), 100);
            assert_eq!(*last.lock(), counter.get());
        }
    }

    #[test]
    fn subscriber_sees_increasing_values_under_concurrent_writes() {
        let counter = Observable::new(0u32);
        let (seen, callback) = recorder::<u32>();

        std::thread::scope(|scope| {
            let writer = counter.clone();
            scope.spawn(move || {
                for _ in 0..500 {
                    writer.update(|value| *value += 1);
                }
            });
            let _sub = counter.subscribe(callback);
        });

        let seen = seen.lock();
        assert!(seen.windows(2).all(|pair| pair[0] + 1 == pair[1]));
        assert_eq!(seen.last().copied(), Some(500));
    }

    #[test]
    fn callback_may_write_back_to_its_own_cell() {
        let value = Observable::new(1);
        let writer = value.clone();

        let _sub = value.subscribe(move |current| {
            if *current == 2 {
                writer.set(3);
            }
        });
        value.set(2);

        assert_eq!(value.get(), 3);
    }
}
