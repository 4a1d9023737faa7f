//! Background scheduling for the two sweeps: payout settlement on a short
//! cadence, ticket closing on a daily one.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::config::SettlementConfig;
use crate::service::settlement::SettlementJob;
use crate::service::ticket::TicketService;

/// Owns the background sweep tasks. Dropping the handle leaves the tasks
/// running; call [`SchedulerHandle::shutdown`] for an orderly stop.
pub struct SweepScheduler {
    settlement: Arc<SettlementJob>,
    tickets: Arc<TicketService>,
    config: SettlementConfig,
}

pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Signal both loops and wait for them to finish their current pass.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

impl SweepScheduler {
    pub fn new(
        settlement: Arc<SettlementJob>,
        tickets: Arc<TicketService>,
        config: SettlementConfig,
    ) -> Self {
        Self {
            settlement,
            tickets,
            config,
        }
    }

    /// Spawn both sweep loops. Each ticks on its own cadence, skipping
    /// missed ticks rather than bursting to catch up, and a slow pass never
    /// overlaps the next one on the same loop.
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let settlement = self.settlement;
        let settlement_period = Duration::from_secs(self.config.settlement_interval_secs);
        let mut settlement_shutdown = shutdown_rx.clone();
        let settlement_task = tokio::spawn(async move {
            let mut ticker = interval(settlement_period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = settlement.release_due_payouts().await {
                            error!("settlement sweep failed: {e}");
                        }
                    }
                    _ = settlement_shutdown.changed() => break,
                }
            }
            info!("settlement sweep loop stopped");
        });

        let tickets = self.tickets;
        let ticket_period = Duration::from_secs(self.config.ticket_interval_secs);
        let mut ticket_shutdown = shutdown_rx;
        let ticket_task = tokio::spawn(async move {
            let mut ticker = interval(ticket_period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        tickets.close_expired_tickets().await;
                    }
                    _ = ticket_shutdown.changed() => break,
                }
            }
            info!("ticket sweep loop stopped");
        });

        SchedulerHandle {
            shutdown_tx,
            tasks: vec![settlement_task, ticket_task],
        }
    }
}
