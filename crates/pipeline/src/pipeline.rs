//! [`Pipeline`]: named pipes wired together by directed connections, each driven by its
//! own cooperative worker thread.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::pipe::Pipe;
use crate::Candidate;

/// How often an idle worker re-checks its pipe's slots.
const WORKER_TICK: Duration = Duration::from_millis(10);

struct Connection {
    src_pipe: String,
    src_slot: usize,
    dst_pipe: String,
    dst_slot: usize,
    buffer: Mutex<VecDeque<Candidate>>,
    buffer_size: usize,
}

/// A set of named [`Pipe`]s wired together by directed, bounded connections. Each pipe
/// runs on its own OS thread once [`start`](Pipeline::start) is called, moving candidates
/// between connection buffers and calling `execute` when its inputs are saturated and its
/// outputs are not.
pub struct Pipeline {
    pipes: HashMap<String, Arc<dyn Pipe>>,
    connections: Vec<Connection>,
    used_slots: HashSet<(String, usize, bool)>,
    running: Arc<AtomicBool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            pipes: HashMap::new(),
            connections: Vec::new(),
            used_slots: HashSet::new(),
            running: Arc::new(AtomicBool::new(false)),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Registers a pipe under `name`. Each name may be used at most once.
    pub fn add_pipe(&mut self, name: impl Into<String>, pipe: Arc<dyn Pipe>) -> PipelineResult<()> {
        let name = name.into();
        if self.pipes.contains_key(&name) {
            return Err(PipelineError::InvalidArgument {
                reason: format!("pipe '{name}' is already registered"),
            });
        }
        self.pipes.insert(name, pipe);
        Ok(())
    }

    /// Connects `(src_pipe, src_slot)`'s output to `(dst_pipe, dst_slot)`'s input through a
    /// FIFO buffer of `buffer_size`. A slot may appear in at most one connection.
    pub fn connect(
        &mut self,
        src_pipe: &str,
        src_slot: usize,
        dst_pipe: &str,
        dst_slot: usize,
        buffer_size: usize,
    ) -> PipelineResult<()> {
        let src = self.pipes.get(src_pipe).ok_or_else(|| PipelineError::InvalidArgument {
            reason: format!("unknown pipe '{src_pipe}'"),
        })?;
        let dst = self.pipes.get(dst_pipe).ok_or_else(|| PipelineError::InvalidArgument {
            reason: format!("unknown pipe '{dst_pipe}'"),
        })?;
        if src_slot >= src.output_count() {
            return Err(PipelineError::InvalidArgument {
                reason: format!("pipe '{src_pipe}' has no output slot {src_slot}"),
            });
        }
        if dst_slot >= dst.input_count() {
            return Err(PipelineError::InvalidArgument {
                reason: format!("pipe '{dst_pipe}' has no input slot {dst_slot}"),
            });
        }
        let src_key = (src_pipe.to_string(), src_slot, false);
        let dst_key = (dst_pipe.to_string(), dst_slot, true);
        if self.used_slots.contains(&src_key) {
            return Err(PipelineError::InvalidArgument {
                reason: format!("output slot {src_slot} on pipe '{src_pipe}' is already connected"),
            });
        }
        if self.used_slots.contains(&dst_key) {
            return Err(PipelineError::InvalidArgument {
                reason: format!("input slot {dst_slot} on pipe '{dst_pipe}' is already connected"),
            });
        }
        self.used_slots.insert(src_key);
        self.used_slots.insert(dst_key);
        self.connections.push(Connection {
            src_pipe: src_pipe.to_string(),
            src_slot,
            dst_pipe: dst_pipe.to_string(),
            dst_slot,
            buffer: Mutex::new(VecDeque::new()),
            buffer_size,
        });
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawns one worker thread per registered pipe. Each worker repeats, until `stop` is
    /// called: drain its pipe's saturated output slots into their connection buffers, feed
    /// its pipe's input slots from their connection buffers, run `execute` once if inputs
    /// are saturated and outputs are not, then sleep.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut workers = self.workers.lock();
        for name in self.pipes.keys() {
            let pipeline = Arc::clone(self);
            let name = name.clone();
            workers.push(thread::spawn(move || pipeline.run_worker(&name)));
        }
    }

    /// Signals every worker to stop and joins them. Blocks until all threads have returned.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        let mut workers = self.workers.lock();
        for handle in workers.drain(..) {
            let _ = handle.join();
        }
    }

    fn run_worker(&self, name: &str) {
        let Some(pipe) = self.pipes.get(name) else {
            return;
        };
        debug!(pipe = name, "worker started");
        while self.running.load(Ordering::SeqCst) {
            for conn in self.connections.iter().filter(|c| c.src_pipe == name) {
                loop {
                    let has_space = {
                        let buf = conn.buffer.lock();
                        buf.len() < conn.buffer_size
                    };
                    if !has_space {
                        break;
                    }
                    match pipe.draw_output(conn.src_slot) {
                        Ok(candidate) => conn.buffer.lock().push_back(candidate),
                        Err(_) => break,
                    }
                }
            }

            for conn in self.connections.iter().filter(|c| c.dst_pipe == name) {
                loop {
                    let has_space = pipe.input_has_space(conn.dst_slot).unwrap_or(false);
                    if !has_space {
                        break;
                    }
                    let next = conn.buffer.lock().pop_front();
                    match next {
                        Some(candidate) => {
                            if let Err(err) = pipe.add_input(conn.dst_slot, candidate) {
                                warn!(pipe = name, %err, "failed to feed input slot");
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }

            if pipe.inputs_are_saturated() && !pipe.outputs_are_saturated() {
                if let Err(err) = pipe.execute() {
                    warn!(pipe = name, %err, "execute failed");
                }
            }

            thread::sleep(WORKER_TICK);
        }
        debug!(pipe = name, "worker stopped");
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ProgramFactoryPipe;
    use crate::sink::NullSinkPipe;
    use beast_config::SessionLimits;
    use std::time::Instant;

    #[test]
    fn connect_rejects_duplicate_slot_usage() {
        let mut pipeline = Pipeline::new();
        pipeline
            .add_pipe("factory", Arc::new(ProgramFactoryPipe::random("factory", 4, 16, SessionLimits::default())))
            .unwrap();
        pipeline.add_pipe("sink", Arc::new(NullSinkPipe::new("sink", 4))).unwrap();
        pipeline.add_pipe("sink2", Arc::new(NullSinkPipe::new("sink2", 4))).unwrap();
        pipeline.connect("factory", 0, "sink", 0, 4).unwrap();
        assert!(matches!(
            pipeline.connect("factory", 0, "sink2", 0, 4),
            Err(PipelineError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn connect_rejects_unknown_pipe() {
        let mut pipeline = Pipeline::new();
        pipeline.add_pipe("sink", Arc::new(NullSinkPipe::new("sink", 4))).unwrap();
        assert!(matches!(
            pipeline.connect("ghost", 0, "sink", 0, 4),
            Err(PipelineError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn add_pipe_rejects_duplicate_name() {
        let mut pipeline = Pipeline::new();
        pipeline.add_pipe("sink", Arc::new(NullSinkPipe::new("sink", 4))).unwrap();
        assert!(matches!(
            pipeline.add_pipe("sink", Arc::new(NullSinkPipe::new("sink", 4))),
            Err(PipelineError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn factory_to_sink_drains_under_worker_threads() {
        let mut pipeline = Pipeline::new();
        pipeline
            .add_pipe("factory", Arc::new(ProgramFactoryPipe::random("factory", 4, 16, SessionLimits::default())))
            .unwrap();
        pipeline.add_pipe("sink", Arc::new(NullSinkPipe::new("sink", 4))).unwrap();
        pipeline.connect("factory", 0, "sink", 0, 4).unwrap();

        let pipeline = Arc::new(pipeline);
        pipeline.start();
        assert!(pipeline.is_running());

        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
        }
        pipeline.stop();
        assert!(!pipeline.is_running());
    }
}
