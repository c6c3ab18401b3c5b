use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::{
    entities::{Event, Logistics, Participant},
    persist::Store,
    service::{EventService, ServiceError, ServiceResult},
    types::ParticipantId,
};

use super::events::ServiceEvent;

/// Failures surfaced by [`EventServiceHandle`].
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The operation itself failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// The worker has shut down.
    #[error("event service worker is not running")]
    ChannelClosed,
}

/// Queue sizing for [`spawn_event_service`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Pending commands before callers wait.
    pub command_queue_bound: usize,
    /// Buffered [`ServiceEvent`]s per subscriber before lagging.
    pub event_queue_bound: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_queue_bound: 1024,
        }
    }
}

/// Cloneable async front door; every call is applied one at a time by a single worker.
#[derive(Clone)]
pub struct EventServiceHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<ServiceEvent>,
}

enum Command {
    AddParticipant {
        participant: Participant,
        resp: oneshot::Sender<ServiceResult<Participant>>,
    },
    AssignParticipant {
        event: Event,
        participant_id: ParticipantId,
        resp: oneshot::Sender<ServiceResult<Event>>,
    },
    AssignEventParticipants {
        event: Event,
        resp: oneshot::Sender<ServiceResult<Event>>,
    },
    AttachLogistics {
        logistics: Logistics,
        description: String,
        resp: oneshot::Sender<ServiceResult<Logistics>>,
    },
    LogisticsBetween {
        start: NaiveDate,
        end: NaiveDate,
        resp: oneshot::Sender<ServiceResult<Option<Vec<Logistics>>>>,
    },
    RecomputeCosts {
        resp: oneshot::Sender<ServiceResult<usize>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Moves `service` onto a dedicated blocking worker and returns its handle.
///
/// Must be called from within a tokio runtime.
pub fn spawn_event_service<S>(service: EventService<S>, config: RuntimeConfig) -> EventServiceHandle
where
    S: Store + Send + 'static,
{
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<ServiceEvent>(config.event_queue_bound);

    let events_tx_loop = events_tx.clone();
    tokio::task::spawn_blocking(move || {
        let mut service = service;
        while let Some(cmd) = cmd_rx.blocking_recv() {
            if handle_command(cmd, &mut service, &events_tx_loop) {
                break;
            }
        }
        tracing::debug!("event service worker stopped");
    });

    EventServiceHandle { cmd_tx, events_tx }
}

impl EventServiceHandle {
    /// Subscribes to notifications for writes applied after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ServiceEvent> {
        self.events_tx.subscribe()
    }

    /// See [`EventService::add_participant`].
    pub async fn add_participant(&self, participant: Participant) -> Result<Participant, RuntimeError> {
        Ok(self
            .request(|resp| Command::AddParticipant { participant, resp })
            .await??)
    }

    /// See [`EventService::assign_participant`].
    pub async fn assign_participant(
        &self,
        event: Event,
        participant_id: ParticipantId,
    ) -> Result<Event, RuntimeError> {
        Ok(self
            .request(|resp| Command::AssignParticipant {
                event,
                participant_id,
                resp,
            })
            .await??)
    }

    /// See [`EventService::assign_event_participants`].
    pub async fn assign_event_participants(&self, event: Event) -> Result<Event, RuntimeError> {
        Ok(self
            .request(|resp| Command::AssignEventParticipants { event, resp })
            .await??)
    }

    /// See [`EventService::attach_logistics`].
    pub async fn attach_logistics(
        &self,
        logistics: Logistics,
        description: impl Into<String>,
    ) -> Result<Logistics, RuntimeError> {
        let description = description.into();
        Ok(self
            .request(|resp| Command::AttachLogistics {
                logistics,
                description,
                resp,
            })
            .await??)
    }

    /// See [`EventService::logistics_between`].
    pub async fn logistics_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Vec<Logistics>>, RuntimeError> {
        Ok(self
            .request(|resp| Command::LogisticsBetween { start, end, resp })
            .await??)
    }

    /// See [`EventService::recompute_costs`].
    pub async fn recompute_costs(&self) -> Result<usize, RuntimeError> {
        Ok(self
            .request(|resp| Command::RecomputeCosts { resp })
            .await??)
    }

    /// Stops the worker once every earlier command has been applied.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Shutdown { resp }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(build(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

fn handle_command<S: Store>(
    cmd: Command,
    service: &mut EventService<S>,
    events_tx: &broadcast::Sender<ServiceEvent>,
) -> bool {
    match cmd {
        Command::AddParticipant { participant, resp } => {
            let res = service.add_participant(participant);
            if let Ok(Participant { id: Some(id), .. }) = &res {
                let _ = events_tx.send(ServiceEvent::ParticipantAdded { id: *id });
            }
            let _ = resp.send(res);
        }
        Command::AssignParticipant {
            event,
            participant_id,
            resp,
        } => {
            let res = service.assign_participant(event, participant_id);
            notify_event_saved(events_tx, &res);
            let _ = resp.send(res);
        }
        Command::AssignEventParticipants { event, resp } => {
            let res = service.assign_event_participants(event);
            notify_event_saved(events_tx, &res);
            let _ = resp.send(res);
        }
        Command::AttachLogistics {
            logistics,
            description,
            resp,
        } => {
            let res = service.attach_logistics(logistics, &description);
            if let Ok(Logistics {
                id: Some(id),
                event: Some(event),
                ..
            }) = &res
            {
                let _ = events_tx.send(ServiceEvent::LogisticsAttached {
                    id: *id,
                    event: *event,
                });
            }
            let _ = resp.send(res);
        }
        Command::LogisticsBetween { start, end, resp } => {
            let _ = resp.send(service.logistics_between(start, end));
        }
        Command::RecomputeCosts { resp } => {
            let res = service.recompute_costs();
            if let Ok(events) = &res {
                let _ = events_tx.send(ServiceEvent::CostsRecomputed { events: *events });
            }
            let _ = resp.send(res);
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}

fn notify_event_saved(events_tx: &broadcast::Sender<ServiceEvent>, res: &ServiceResult<Event>) {
    if let Ok(Event { id: Some(id), .. }) = res {
        let _ = events_tx.send(ServiceEvent::EventSaved { id: *id });
    }
}
