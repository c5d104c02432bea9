use log::{log, Level};
use std::collections::HashMap;
use std::sync::Once;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Id, Subscriber};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::Context, Layer};

static INIT: Once = Once::new();

/// Install a global subscriber forwarding the lifecycle of every load to
/// the [`log`] facade
///
/// Calling this more than once has no further effect.
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(ToLogLayer)
            .try_init()
            .unwrap_or(())
    });
}

/// Turns `load` spans into log records
#[derive(Default)]
pub struct ToLogLayer;

impl<S> Layer<S> for ToLogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let mut map = HashMap::new();
            let mut visitor = FieldMapVisitor::from_map(&mut map);
            attrs.record(&mut visitor);

            let meta = span.metadata();
            if meta.name() == "load" {
                if let Some(endpoint) = map.get("endpoint") {
                    log!(target: meta.target(), Level::Info, "{endpoint}: loading");
                }
            }

            // Store the initial fields in span extensions
            span.extensions_mut().insert(map);
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let mut exts = span.extensions_mut();

            // Get the existing field map (from on_new_span)
            if let Some(fields) = exts.get_mut::<HashMap<String, String>>() {
                let mut visitor = FieldMapVisitor::from_map(fields);
                values.record(&mut visitor);
            }
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(&id) {
            let meta = span.metadata();
            if meta.name() != "load" {
                return;
            }

            let ext = span.extensions();
            let Some(fields) = ext.get::<HashMap<String, String>>() else {
                return;
            };
            let Some(endpoint) = fields.get("endpoint") else {
                return;
            };

            match fields.get("outcome").map(String::as_str) {
                Some("loaded") => log!(target: meta.target(), Level::Info, "{endpoint}: loaded"),
                Some("failed") => log!(target: meta.target(), Level::Warn, "{endpoint}: failed"),
                Some("finished") => {
                    log!(target: meta.target(), Level::Warn, "{endpoint}: finished without a value")
                }
                // cancelled, panicked or dropped with its runtime before delivering
                _ => log!(target: meta.target(), Level::Warn, "{endpoint}: aborted"),
            }
        }
    }
}

struct FieldMapVisitor<'a> {
    fields: &'a mut HashMap<String, String>,
}

impl<'a> FieldMapVisitor<'a> {
    fn from_map(fields: &'a mut HashMap<String, String>) -> Self {
        Self { fields }
    }
}

impl Visit for FieldMapVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().into(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().into(), value.to_string());
    }
}
