pub trait ProgressCallback: Send {
    fn on_iteration_start(&mut self, iteration: usize);
    fn on_batch_evaluated(&mut self, evaluated: usize, failed: usize);
    fn on_iteration_complete(&mut self, iteration: usize, best_fitness: Option<f64>, stagnation: usize);
}

pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_iteration_start(&mut self, iteration: usize) {
        log::debug!("Iteration {} starting...", iteration);
    }

    fn on_batch_evaluated(&mut self, evaluated: usize, failed: usize) {
        if failed > 0 {
            log::info!("  Evaluated {} candidates ({} failed)", evaluated, failed);
        } else {
            log::debug!("  Evaluated {} candidates", evaluated);
        }
    }

    fn on_iteration_complete(&mut self, iteration: usize, best_fitness: Option<f64>, stagnation: usize) {
        match best_fitness {
            Some(best) => log::info!(
                "Iteration {} complete. Best fitness: {:.6}, stagnation: {}",
                iteration, best, stagnation
            ),
            None => log::info!(
                "Iteration {} complete. No successful evaluation yet, stagnation: {}",
                iteration, stagnation
            ),
        }
    }
}

/// Discards every notification
pub struct SilentProgressCallback;

impl ProgressCallback for SilentProgressCallback {
    fn on_iteration_start(&mut self, _iteration: usize) {}
    fn on_batch_evaluated(&mut self, _evaluated: usize, _failed: usize) {}
    fn on_iteration_complete(&mut self, _iteration: usize, _best_fitness: Option<f64>, _stagnation: usize) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    IterationStart(usize),
    BatchEvaluated { evaluated: usize, failed: usize },
    IterationComplete { iteration: usize, best_fitness: Option<f64>, stagnation: usize },
}

/// Forwards progress to another thread
pub struct ChannelProgressCallback {
    sender: std::sync::mpsc::Sender<ProgressMessage>,
}

impl ChannelProgressCallback {
    pub fn new(sender: std::sync::mpsc::Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_iteration_start(&mut self, iteration: usize) {
        let _ = self.sender.send(ProgressMessage::IterationStart(iteration));
    }

    fn on_batch_evaluated(&mut self, evaluated: usize, failed: usize) {
        let _ = self.sender.send(ProgressMessage::BatchEvaluated { evaluated, failed });
    }

    fn on_iteration_complete(&mut self, iteration: usize, best_fitness: Option<f64>, stagnation: usize) {
        let _ = self.sender.send(ProgressMessage::IterationComplete {
            iteration,
            best_fitness,
            stagnation,
        });
    }
}
