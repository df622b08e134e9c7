//! Event Log
//!
//! Every round's events go into [`TickEvents`]; when a log file is attached
//! the round systems drain them into it, one JSON object per line.

use bevy_ecs::prelude::*;
use courier_events::{generate_event_id, ActorSnapshot, Event, EventOutcome, EventType};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// JSONL sink for the run's events
#[derive(Resource)]
pub struct EventLogger {
    writer: BufWriter<File>,
    event_count: u64,
}

impl EventLogger {
    /// Truncates `path`, creating missing parent directories
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
            event_count: 0,
        })
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn log(&mut self, event: &Event) -> std::io::Result<()> {
        writeln!(self.writer, "{}", event.to_jsonl()?)?;
        self.event_count += 1;
        Ok(())
    }

    pub fn log_batch(&mut self, events: &[Event]) -> std::io::Result<()> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "event log lost its tail");
        }
    }
}

/// Events produced during the current round.
///
/// Ids keep counting across rounds; only the buffer is drained.
#[derive(Resource, Debug, Default)]
pub struct TickEvents {
    events: Vec<Event>,
    next_event_id: u64,
}

impl TickEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate_id(&mut self) -> String {
        self.next_event_id += 1;
        generate_event_id(self.next_event_id)
    }

    /// Builds an event with a fresh id and queues it
    pub fn record(
        &mut self,
        step: u64,
        event_type: EventType,
        actor: ActorSnapshot,
        target: Option<ActorSnapshot>,
        outcome: EventOutcome,
    ) {
        let event = Event::new(self.generate_id(), step, event_type, actor, outcome);
        self.events.push(match target {
            Some(target) => event.with_target(target),
            None => event,
        });
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
