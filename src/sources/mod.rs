//! Flight sources.
//!
//! Each backend is an adapter implementing [`FlightSource`]:
//! - `alibaba` (`AlibabaSource`): two-phase poll for international,
//!   single request for domestic
//! - `ataair` (`AtaairSource`): single request, domestic airline
//! - `mrbilit` (`MrbilitSource`): single request, one flight per price option
//!
//! Sources are selected by name through the [`SourceRegistry`].

mod alibaba;
mod ataair;
pub mod decode;
mod mrbilit;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Config, Flight, SearchParams};
use crate::utils::http::HttpTransport;

pub use alibaba::AlibabaSource;
pub use ataair::AtaairSource;
pub use mrbilit::MrbilitSource;

/// Currency every built-in backend quotes in.
pub const IRR: &str = "IRR";

/// A backend that can be searched for flights.
#[async_trait]
pub trait FlightSource: Send + Sync {
    /// Stable identifier used for selection and attribution.
    fn name(&self) -> &str;

    /// Run the backend protocol.
    async fn fetch(&self, params: &SearchParams) -> Result<Vec<Flight>>;

    /// Run the backend protocol, degrading any failure to no results.
    async fn search(&self, params: &SearchParams) -> Vec<Flight> {
        let result = self.fetch(params).await;
        log_outcome(self.name(), &result);
        result.unwrap_or_default()
    }
}

/// Log how one source run ended.
pub(crate) fn log_outcome(name: &str, result: &Result<Vec<Flight>>) {
    match result {
        Ok(flights) => log::info!("[{}] {} flights", name, flights.len()),
        Err(e) if e.is_transport() => log::warn!("[{}] Backend unreachable: {}", name, e),
        Err(e) => log::warn!("[{}] Search failed: {}", name, e),
    }
}

/// What a source gets when it is instantiated for one search.
pub struct SourceContext {
    /// Session owned by this invocation, dropped when it ends
    pub session: Box<dyn HttpTransport>,
    pub config: Arc<Config>,
}

/// Builds a source for one invocation.
pub type SourceFactory = Arc<dyn Fn(SourceContext) -> Box<dyn FlightSource> + Send + Sync>;

/// A named, registered source.
#[derive(Clone)]
pub struct SourceEntry {
    pub name: String,
    pub website: String,
    factory: SourceFactory,
}

impl SourceEntry {
    pub fn build(&self, ctx: SourceContext) -> Box<dyn FlightSource> {
        (self.factory)(ctx)
    }
}

/// Name → factory mapping, in registration order.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    entries: Vec<SourceEntry>,
}

impl SourceRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in backend.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(alibaba::NAME, alibaba::WEBSITE, |ctx| {
            Box::new(AlibabaSource::new(ctx))
        });
        registry.register(ataair::NAME, ataair::WEBSITE, |ctx| {
            Box::new(AtaairSource::new(ctx))
        });
        registry.register(mrbilit::NAME, mrbilit::WEBSITE, |ctx| {
            Box::new(MrbilitSource::new(ctx))
        });
        registry
    }

    /// Register a source, replacing any existing entry with the same name.
    pub fn register<F>(&mut self, name: &str, website: &str, factory: F)
    where
        F: Fn(SourceContext) -> Box<dyn FlightSource> + Send + Sync + 'static,
    {
        let entry = SourceEntry {
            name: name.to_string(),
            website: website.to_string(),
            factory: Arc::new(factory),
        };
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries matching `filter` (case-insensitive); all when `filter` is empty.
    pub fn select(&self, filter: &[String]) -> Vec<&SourceEntry> {
        if filter.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|e| filter.iter().any(|f| e.name.eq_ignore_ascii_case(f.trim())))
            .collect()
    }

    /// Names in `filter` that are not registered.
    pub fn unknown<'a>(&self, filter: &'a [String]) -> Vec<&'a str> {
        filter
            .iter()
            .map(String::as_str)
            .filter(|name| !self.contains(name))
            .collect()
    }
}
