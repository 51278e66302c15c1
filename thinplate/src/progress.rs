/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines progress reporting messages, sinks, and helper functions for fitting.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Progress reporting primitives for fitting thin plate splines.

use std::fmt::Debug;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

/// Progress events emitted while fitting a model.
#[derive(Debug, Clone)]
pub enum ProgressMsg {
    /// The saddle-point system has been assembled.
    SystemAssembled {
        num_points: usize,
        dimensions: usize,
        system_size: usize,
    },

    /// The pseudo-inverse discarded singular values, e.g. for duplicate or
    /// collinear control points. The fit is a minimum-norm least-squares solution.
    RankDeficient { rank: usize, system_size: usize },

    /// The system has been solved and the model published.
    SystemSolved {
        rank: usize,
        system_size: usize,
        elapsed: Duration,
    },

    /// Arbitrary informational message.
    Message { message: String },
}

/// Sink that consumes progress messages.
pub trait ProgressSink: Send + Sync + Debug {
    fn emit(&self, msg: ProgressMsg);
}

/// Progress sink that forwards messages over a channel.
#[derive(Debug)]
pub struct ClosureSink {
    tx: mpsc::SyncSender<ProgressMsg>,
}

impl ProgressSink for ClosureSink {
    #[inline]
    fn emit(&self, msg: ProgressMsg) {
        let _ = self.tx.try_send(msg);
    }
}

/// Spawns a listener thread that runs a handler closure for each progress message.
///
/// The listener exits once every clone of the returned sink has been dropped.
pub fn closure_sink<F>(
    buffer: usize,
    mut handler: F,
) -> (Arc<dyn ProgressSink>, thread::JoinHandle<()>)
where
    F: FnMut(ProgressMsg) + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<ProgressMsg>(buffer.max(1));
    let sink: Arc<dyn ProgressSink> = Arc::new(ClosureSink { tx });

    let handle = thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            handler(msg);
        }
    });

    (sink, handle)
}

/// Emits `msg` if a sink is attached.
#[inline]
pub(crate) fn emit(sink: Option<&Arc<dyn ProgressSink>>, msg: ProgressMsg) {
    if let Some(sink) = sink {
        sink.emit(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closure_sink_forwards_messages_in_order() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let store = received.clone();

        let (sink, handle) = closure_sink(16, move |msg| {
            if let ProgressMsg::Message { message } = msg {
                store.lock().unwrap().push(message);
            }
        });

        emit(Some(&sink), ProgressMsg::Message { message: "first".into() });
        emit(Some(&sink), ProgressMsg::Message { message: "second".into() });
        emit(None, ProgressMsg::Message { message: "dropped".into() });

        drop(sink);
        handle.join().unwrap();

        assert_eq!(*received.lock().unwrap(), vec!["first", "second"]);
    }
}
