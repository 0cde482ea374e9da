//! Line-oriented touch input.
//!
//! Each line read from the console names a touch source; a touch is
//! delivered when the trimmed line matches one of the registered sources.
//! Stands in for a capacitive touch controller on hosts without one.
//!
//! Reading happens on a dedicated `touch-console` thread, so the handler
//! runs there, concurrently with the run loop.  End of input stops the
//! thread; the service keeps running.

use std::collections::HashSet;
use std::io::{self, BufRead, BufReader, Stdin};
use std::thread::{self, JoinHandle};

use anyhow::{Context, bail};
use log::{debug, info, warn};

use crate::app::ports::{TouchEvent, TouchHandler, TouchInput};

pub struct ConsoleTouchInput<R: BufRead + Send + 'static> {
    reader: Option<R>,
    worker: Option<JoinHandle<()>>,
}

impl ConsoleTouchInput<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(io::stdin()))
    }
}

impl<R: BufRead + Send + 'static> ConsoleTouchInput<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: Some(reader),
            worker: None,
        }
    }

    /// Wait for the reader thread to hit end of input.
    pub fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("touch-console: reader thread panicked");
            }
        }
    }
}

impl<R: BufRead + Send + 'static> TouchInput for ConsoleTouchInput<R> {
    fn on_touch(&mut self, sources: &[String], handler: TouchHandler) -> anyhow::Result<()> {
        let Some(reader) = self.reader.take() else {
            bail!("console touch input already has a handler");
        };
        let sources: HashSet<String> = sources.iter().cloned().collect();
        info!("touch-console: listening for {} source(s)", sources.len());

        let worker = thread::Builder::new()
            .name("touch-console".into())
            .spawn(move || read_touches(reader, &sources, &handler))
            .context("spawning touch-console thread")?;
        self.worker = Some(worker);
        Ok(())
    }
}

fn read_touches(reader: impl BufRead, sources: &HashSet<String>, handler: &TouchHandler) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("touch-console: read failed: {}", e);
                break;
            }
        };
        let source = line.trim();
        if source.is_empty() {
            continue;
        }
        if sources.contains(source) {
            handler(TouchEvent::new(source));
        } else {
            debug!("touch-console: '{}' is not a registered source", source);
        }
    }
    debug!("touch-console: end of input");
}
