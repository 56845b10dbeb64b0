//! Shared providers for integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trellis::di::{Lazy, Ordered};

pub struct Settings {
    pub url: String,
}

pub struct Database {
    pub url: String,
}

pub struct Repository {
    pub db: Arc<Database>,
}

pub fn new_database(settings: Arc<Settings>) -> Arc<Database> {
    Arc::new(Database {
        url: settings.url.clone(),
    })
}

pub fn new_repository(db: Arc<Database>) -> Arc<Repository> {
    Arc::new(Repository { db })
}

pub fn settings(url: &str) -> Arc<Settings> {
    Arc::new(Settings {
        url: url.to_string(),
    })
}

// cycle a -> b -> c -> a
pub struct CycleA;
pub struct CycleB;
pub struct CycleC;

pub fn new_cycle_a(_b: Arc<CycleB>) -> Arc<CycleA> {
    Arc::new(CycleA)
}

pub fn new_cycle_b(_c: Arc<CycleC>) -> Arc<CycleB> {
    Arc::new(CycleB)
}

pub fn new_cycle_c(_a: Arc<CycleA>) -> Arc<CycleC> {
    Arc::new(CycleC)
}

/// Counts how often an expensive factory actually ran.
#[derive(Default)]
pub struct Counter(AtomicUsize);

impl Counter {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Expensive {
    pub id: usize,
}

pub fn new_expensive(counter: Arc<Counter>) -> Arc<Expensive> {
    counter.bump();
    std::thread::sleep(std::time::Duration::from_millis(20));
    Arc::new(Expensive { id: counter.get() })
}

pub struct Holder {
    pub expensive: Lazy<Arc<Expensive>>,
}

pub fn new_holder(expensive: Lazy<Arc<Expensive>>) -> Arc<Holder> {
    Arc::new(Holder { expensive })
}

pub fn new_eager_holder(expensive: Arc<Expensive>) -> Arc<Holder> {
    let _ = expensive;
    unreachable!("plain consumer of a lazy provider never resolves")
}

pub struct Plugin {
    pub name: &'static str,
}

pub fn plugin(name: &'static str) -> Arc<Plugin> {
    Arc::new(Plugin { name })
}

pub struct Host {
    pub plugins: Vec<Arc<Plugin>>,
}

pub fn new_host(plugins: Vec<Arc<Plugin>>) -> Arc<Host> {
    Arc::new(Host { plugins })
}

impl Host {
    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name).collect()
    }
}

pub trait Handler: Send + Sync {
    fn label(&self) -> String;
}

pub struct Step {
    pub label: &'static str,
    pub order: i32,
}

impl Handler for Step {
    fn label(&self) -> String {
        self.label.to_string()
    }
}

impl Ordered for Step {
    fn order(&self) -> i32 {
        self.order
    }
}

pub fn step(label: &'static str, order: i32) -> Arc<Step> {
    Arc::new(Step { label, order })
}

pub fn as_handler(step: Arc<Step>) -> Arc<dyn Handler> {
    step
}
