use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub enum Interrupted {
    OsSigInt,
    UserInt,
}

/// Handle for asking every loop of the application to stop
#[derive(Debug, Clone)]
pub struct Terminator {
    interrupt_tx: broadcast::Sender<Interrupted>,
}

impl Terminator {
    pub fn new(interrupt_tx: broadcast::Sender<Interrupted>) -> Self {
        Self { interrupt_tx }
    }

    pub fn terminate(&mut self, interrupted: Interrupted) -> anyhow::Result<()> {
        self.interrupt_tx.send(interrupted)?;

        Ok(())
    }
}

async fn terminate_on_ctrl_c(mut terminator: Terminator) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("could not listen for the interrupt signal: {}", err);
        return;
    }

    if let Err(err) = terminator.terminate(Interrupted::OsSigInt) {
        tracing::warn!("could not broadcast the interrupt signal: {}", err);
    }
}

// create a broadcast channel for retrieving the application kill signal
pub fn create_termination() -> (Terminator, broadcast::Receiver<Interrupted>) {
    let (tx, rx) = broadcast::channel(1);
    let terminator = Terminator::new(tx);

    tokio::spawn(terminate_on_ctrl_c(terminator.clone()));

    (terminator, rx)
}
