use super::render::{render, render_error, StatusView};
use super::transition::{self, Plan, Transition};
use crate::api::models::{
    BrewStage, BrewStatus, HistoryRecord, Machine, NewHistoryRecord, Recipe,
};
use crate::config::Timings;
use crate::error::{Error, Result};
use crate::store::BrewStore;
use chrono::Utc;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The milk capsule has been inserted.
    Continue,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    Connected(Machine),
    Rendered { status: BrewStatus, view: StatusView },
    /// Polling is paused until [`MonitorHandle::continue_brew`] is called.
    MilkRequired,
    HistoryRecorded(HistoryRecord),
    /// Monitoring gave up; leave and start a new session to retry.
    Failed { view: StatusView, message: String },
    Stopped,
}

#[derive(Debug)]
struct PendingTransition {
    transition: Transition,
    deadline: Instant,
}

/// State owned by one monitoring session, from start until teardown.
#[derive(Debug)]
pub struct SessionContext {
    pub machine: Machine,
    /// Last status read from or written to the store.
    pub status: Option<BrewStatus>,
    pub history_recorded: bool,
    pub polling: bool,
    pending: Option<PendingTransition>,
}

impl SessionContext {
    fn new(machine: Machine) -> Self {
        SessionContext {
            machine,
            status: None,
            history_recorded: false,
            polling: true,
            pending: None,
        }
    }

    pub fn transition_in_flight(&self) -> bool {
        self.pending.is_some()
    }
}

pub struct MonitorHandle {
    commands: mpsc::Sender<Command>,
    events: mpsc::UnboundedReceiver<MonitorEvent>,
    task: JoinHandle<Result<()>>,
}

impl MonitorHandle {
    pub async fn next_event(&mut self) -> Option<MonitorEvent> {
        self.events.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<MonitorEvent> {
        self.events.try_recv().ok()
    }

    /// Returns false when the session has already ended.
    pub async fn continue_brew(&self) -> bool {
        self.commands.send(Command::Continue).await.is_ok()
    }

    /// Tears the session down. Any scheduled transition is dropped unwritten.
    pub async fn stop(self) -> Result<()> {
        let _ = self.commands.send(Command::Stop).await;
        self.task.await?
    }

    /// Waits for the session to end on its own.
    pub async fn join(self) -> Result<()> {
        self.task.await?
    }
}

/// Starts monitoring `machine_id` on a new task.
pub fn spawn<S>(store: Arc<S>, machine_id: &str, timings: Timings) -> MonitorHandle
where
    S: BrewStore + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(8);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let session = MonitorSession {
        store,
        timings,
        machine_id: machine_id.to_string(),
        commands: command_rx,
        events: event_tx,
    };
    MonitorHandle {
        commands: command_tx,
        events: event_rx,
        task: tokio::spawn(session.run()),
    }
}

struct MonitorSession<S> {
    store: Arc<S>,
    timings: Timings,
    machine_id: String,
    commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<MonitorEvent>,
}

impl<S: BrewStore> MonitorSession<S> {
    async fn run(mut self) -> Result<()> {
        if let Err(e) = self.timings.validate() {
            error!("Cannot monitor machine {}: {}", self.machine_id, e);
            self.emit(MonitorEvent::Failed {
                view: render_error(),
                message: e.to_string(),
            });
            return Err(e);
        }

        let machine = match self.store.machine(&self.machine_id).await {
            Ok(machine) => machine,
            Err(e) => {
                error!("Could not load machine {}: {}", self.machine_id, e);
                self.emit(MonitorEvent::Failed {
                    view: render_error(),
                    message: e.to_string(),
                });
                return Err(e);
            }
        };
        info!(
            "Monitoring {} ({}) at {}",
            machine.name, machine.location, machine.ip_address
        );
        self.emit(MonitorEvent::Connected(machine.clone()));

        let mut ctx = SessionContext::new(machine);
        self.poll(&mut ctx).await?;

        let period = self.timings.poll_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let deadline = ctx.pending.as_ref().map(|p| p.deadline);
            tokio::select! {
                _ = ticker.tick(), if ctx.polling => self.poll(&mut ctx).await?,
                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.fire(&mut ctx).await;
                }
                command = self.commands.recv() => match command {
                    Some(Command::Continue) => {
                        if self.resume(&mut ctx).await {
                            ticker.reset();
                        }
                    }
                    Some(Command::Stop) | None => break,
                },
            }
        }

        if let Some(pending) = ctx.pending.take() {
            debug!(
                "Dropping scheduled {} -> {:?} for machine {} on teardown",
                pending.transition.from, pending.transition.patch.stage, ctx.machine.id
            );
        }
        info!("Stopped monitoring machine {}", ctx.machine.id);
        self.emit(MonitorEvent::Stopped);
        Ok(())
    }

    fn emit(&self, event: MonitorEvent) {
        // The viewer may already be gone; the session still winds down cleanly.
        let _ = self.events.send(event);
    }

    fn emit_status(&self, status: &BrewStatus) {
        self.emit(MonitorEvent::Rendered {
            status: status.clone(),
            view: render(status),
        });
    }

    async fn poll(&self, ctx: &mut SessionContext) -> Result<()> {
        let status = match self.store.status_for(&ctx.machine.id).await {
            Ok(Some(status)) => status,
            Ok(None) => {
                let missing = Error::StatusNotFound(ctx.machine.id.clone());
                return Err(self.fail(ctx, missing));
            }
            Err(e) => return Err(self.fail(ctx, e)),
        };
        self.emit_status(&status);
        ctx.status = Some(status.clone());

        if !ctx.transition_in_flight() {
            self.evaluate(ctx, &status).await;
        } else if status.stage == BrewStage::Finished {
            // Cooldown is running; retry a history write that failed.
            self.record_history(ctx, &status).await;
        }
        Ok(())
    }

    fn fail(&self, ctx: &mut SessionContext, err: Error) -> Error {
        error!("Monitoring machine {} failed: {}", ctx.machine.id, err);
        ctx.polling = false;
        self.emit(MonitorEvent::Failed {
            view: render_error(),
            message: err.to_string(),
        });
        err
    }

    async fn evaluate(&self, ctx: &mut SessionContext, status: &BrewStatus) {
        let recipe = if transition::needs_recipe(status.stage) {
            self.recipe(&status.beverage).await
        } else {
            Recipe::PURE_COFFEE
        };

        match transition::plan(status, &recipe) {
            Plan::Idle => {}
            Plan::Advance(transition) => {
                if transition.from == BrewStage::HeatingCoffee {
                    ctx.history_recorded = false;
                }
                self.schedule(ctx, transition);
            }
            Plan::AwaitMilk => {
                if ctx.polling {
                    info!(
                        "Machine {} is waiting for a milk capsule, pausing updates",
                        ctx.machine.id
                    );
                    ctx.polling = false;
                    self.emit(MonitorEvent::MilkRequired);
                }
            }
            Plan::Complete(reset) => {
                self.record_history(ctx, status).await;
                self.schedule(ctx, reset);
            }
        }
    }

    async fn recipe(&self, beverage: &str) -> Recipe {
        match self.store.beverage(beverage).await {
            Ok(Some(found)) => found.recipe(),
            Ok(None) => {
                warn!("No recipe named {}, brewing it as plain coffee", beverage);
                Recipe::PURE_COFFEE
            }
            Err(e) => {
                warn!(
                    "Could not fetch the recipe for {}, brewing it as plain coffee: {}",
                    beverage, e
                );
                Recipe::PURE_COFFEE
            }
        }
    }

    fn schedule(&self, ctx: &mut SessionContext, transition: Transition) {
        let delay = transition.phase.delay(&self.timings).sample();
        debug!(
            "Machine {} leaves {} in {:?}",
            ctx.machine.id, transition.from, delay
        );
        ctx.pending = Some(PendingTransition {
            transition,
            deadline: Instant::now() + delay,
        });
    }

    async fn fire(&self, ctx: &mut SessionContext) {
        let pending = match ctx.pending.take() {
            Some(pending) => pending,
            None => return,
        };
        let current = match &ctx.status {
            Some(current) => current,
            None => return,
        };
        if current.stage != pending.transition.from {
            debug!(
                "Machine {} moved to {} before leaving {}, dropping the stale transition",
                ctx.machine.id, current.stage, pending.transition.from
            );
            return;
        }

        let mut next = pending.transition.patch.apply(current);
        next.last_updated = Some(Utc::now());
        self.write(ctx, next).await;
    }

    /// Writes the merged record. Failures are only logged; the next poll
    /// reads the store again and may issue the same transition.
    async fn write(&self, ctx: &mut SessionContext, next: BrewStatus) -> bool {
        match self.store.replace_status(&next).await {
            Ok(saved) => {
                debug!(
                    "Machine {} is now {} at {}%",
                    ctx.machine.id, saved.stage, saved.progress
                );
                self.emit_status(&saved);
                ctx.status = Some(saved);
                true
            }
            Err(e) => {
                error!(
                    "Error moving machine {} to {}: {}",
                    ctx.machine.id, next.stage, e
                );
                false
            }
        }
    }

    async fn record_history(&self, ctx: &mut SessionContext, status: &BrewStatus) {
        if ctx.history_recorded {
            return;
        }
        let record = NewHistoryRecord::completed(&ctx.machine, status);
        match self.store.record_history(&record).await {
            Ok(saved) => {
                info!(
                    "Recorded a {} brewed on machine {}",
                    saved.beverage, ctx.machine.id
                );
                ctx.history_recorded = true;
                self.emit(MonitorEvent::HistoryRecorded(saved));
            }
            Err(e) => error!(
                "Error recording the brew on machine {} in history: {}",
                ctx.machine.id, e
            ),
        }
    }

    /// Handles the milk confirmation. Returns true when polling resumed.
    async fn resume(&self, ctx: &mut SessionContext) -> bool {
        let next = match ctx
            .status
            .as_ref()
            .and_then(|current| transition::continue_after_milk(current).map(|p| (p, current)))
        {
            Some((patch, current)) => {
                let mut next = patch.apply(current);
                next.last_updated = Some(Utc::now());
                next
            }
            None => {
                warn!(
                    "Ignoring continue for machine {}, it is not waiting for milk",
                    ctx.machine.id
                );
                return false;
            }
        };

        if !self.write(ctx, next).await {
            // Still waiting; ask again so the user can retry.
            self.emit(MonitorEvent::MilkRequired);
            return false;
        }
        info!("Milk capsule inserted on machine {}", ctx.machine.id);
        ctx.polling = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{Beverage, NewBeverage, NewBrewStatus, NewMachine};
    use crate::config::DelayRange;
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn seed_into(
        store: &MemoryStore,
        beverage: &str,
        coffee: u8,
        milk: u8,
        stage: Option<BrewStage>,
    ) -> Machine {
        let machine = store.insert_machine(NewMachine {
            name: String::from("Barista One"),
            location: String::from("Lobby"),
            ip_address: String::from("10.0.0.2"),
        });
        store.insert_beverage(NewBeverage {
            name: beverage.to_string(),
            coffee_percent: coffee,
            milk_percent: milk,
        });
        if let Some(stage) = stage {
            let mut status = NewBrewStatus::initial(&machine.id);
            status.power_status = true;
            status.beverage = beverage.to_string();
            status.stage = stage;
            store.insert_status(status);
        }
        machine
    }

    fn seed(
        beverage: &str,
        coffee: u8,
        milk: u8,
        stage: Option<BrewStage>,
    ) -> (Arc<MemoryStore>, Machine) {
        let store = Arc::new(MemoryStore::new());
        let machine = seed_into(&store, beverage, coffee, milk, stage);
        (store, machine)
    }

    /// Follows the session until a finished brew has been reset, answering
    /// the milk prompt along the way. Returns the distinct (stage, progress)
    /// pairs rendered, in order.
    async fn brew_to_completion(handle: &mut MonitorHandle) -> Vec<(BrewStage, u8)> {
        let mut trail: Vec<(BrewStage, u8)> = Vec::new();
        let mut finished = false;
        while let Some(event) = handle.next_event().await {
            match event {
                MonitorEvent::Rendered { status, .. } => {
                    let step = (status.stage, status.progress);
                    if trail.last() != Some(&step) {
                        trail.push(step);
                    }
                    finished |= status.stage == BrewStage::Finished;
                    if finished && status.stage == BrewStage::Inactive {
                        break;
                    }
                }
                MonitorEvent::MilkRequired => assert!(handle.continue_brew().await),
                MonitorEvent::Failed { message, .. } => panic!("monitoring failed: {message}"),
                _ => {}
            }
        }
        trail
    }

    #[tokio::test(start_paused = true)]
    async fn espresso_brews_without_milk() {
        let (store, machine) = seed("ESPRESSO", 100, 0, Some(BrewStage::HeatingCoffee));
        let mut handle = spawn(store.clone(), &machine.id, Timings::default());

        let trail = brew_to_completion(&mut handle).await;
        handle.stop().await.unwrap();

        assert_eq!(
            trail,
            vec![
                (BrewStage::HeatingCoffee, 0),
                (BrewStage::DispensingCoffee, 15),
                (BrewStage::Finished, 100),
                (BrewStage::Inactive, 0),
            ]
        );
        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].beverage, "ESPRESSO");
        assert_eq!(history[0].machine_id, machine.id);
        assert_eq!(history[0].ip_address, "10.0.0.2");
    }

    #[tokio::test(start_paused = true)]
    async fn latte_waits_for_the_milk_capsule() {
        let (store, machine) = seed("LATTE", 60, 40, Some(BrewStage::HeatingCoffee));
        let mut handle = spawn(store.clone(), &machine.id, Timings::default());

        loop {
            match handle.next_event().await {
                Some(MonitorEvent::MilkRequired) => break,
                Some(MonitorEvent::Failed { message, .. }) => panic!("{message}"),
                Some(_) => {}
                None => panic!("session ended early"),
            }
        }
        let waiting = store.statuses(Some(&machine.id)).remove(0);
        assert_eq!(waiting.stage, BrewStage::AwaitingMilk);
        assert_eq!(waiting.progress, 60);

        // Nothing moves, and nothing is polled, until the user continues.
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(handle.try_next_event(), None);
        assert_eq!(
            store.statuses(Some(&machine.id))[0].stage,
            BrewStage::AwaitingMilk
        );

        assert!(handle.continue_brew().await);
        let trail = brew_to_completion(&mut handle).await;
        handle.stop().await.unwrap();

        assert_eq!(
            trail,
            vec![
                (BrewStage::HeatingMilk, 60),
                (BrewStage::DispensingMilk, 60),
                (BrewStage::Finished, 100),
                (BrewStage::Inactive, 0),
            ]
        );
        assert_eq!(store.history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_status_stops_with_an_error() {
        let (store, machine) = seed("ESPRESSO", 100, 0, None);
        let mut handle = spawn(store, &machine.id, Timings::default());

        assert!(matches!(
            handle.next_event().await,
            Some(MonitorEvent::Connected(_))
        ));
        match handle.next_event().await {
            Some(MonitorEvent::Failed { view, .. }) => assert_eq!(view.label, "ERROR"),
            other => panic!("expected a failure, got {other:?}"),
        }
        assert!(matches!(handle.join().await, Err(Error::StatusNotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_machine_stops_with_an_error() {
        let store = Arc::new(MemoryStore::new());
        let mut handle = spawn(store, "42", Timings::default());

        assert!(matches!(
            handle.next_event().await,
            Some(MonitorEvent::Failed { .. })
        ));
        assert!(matches!(handle.join().await, Err(Error::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_beverage_brews_as_plain_coffee() {
        let (store, machine) = seed("ESPRESSO", 100, 0, None);
        let mut status = NewBrewStatus::initial(&machine.id);
        status.beverage = String::from("MOCHA");
        status.stage = BrewStage::HeatingCoffee;
        store.insert_status(status);

        let mut handle = spawn(store.clone(), &machine.id, Timings::default());
        let trail = brew_to_completion(&mut handle).await;
        handle.stop().await.unwrap();

        assert!(trail.contains(&(BrewStage::Finished, 100)));
        assert!(!trail.iter().any(|(stage, _)| *stage == BrewStage::AwaitingMilk));
        assert_eq!(store.history()[0].beverage, "MOCHA");
    }

    fn slow_heating() -> Timings {
        Timings {
            poll_interval: Duration::from_secs(1),
            heating_coffee: DelayRange::fixed(5000),
            ..Timings::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stale_transition_is_dropped() {
        let (store, machine) = seed("ESPRESSO", 100, 0, Some(BrewStage::HeatingCoffee));
        let mut handle = spawn(store.clone(), &machine.id, slow_heating());
        while !matches!(handle.next_event().await, Some(MonitorEvent::Rendered { .. })) {}

        // Someone else resets the machine while heating is scheduled.
        let mut reset = store.statuses(Some(&machine.id)).remove(0);
        reset.stage = BrewStage::Inactive;
        store.put_status(&reset.id.clone(), reset);

        time::sleep(Duration::from_secs(10)).await;
        handle.stop().await.unwrap();
        assert_eq!(
            store.statuses(Some(&machine.id))[0].stage,
            BrewStage::Inactive
        );
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_cancels_the_scheduled_write() {
        let (store, machine) = seed("ESPRESSO", 100, 0, Some(BrewStage::HeatingCoffee));
        let mut handle = spawn(store.clone(), &machine.id, slow_heating());
        while !matches!(handle.next_event().await, Some(MonitorEvent::Rendered { .. })) {}

        handle.stop().await.unwrap();
        time::sleep(Duration::from_secs(10)).await;

        let status = store.statuses(Some(&machine.id)).remove(0);
        assert_eq!(status.stage, BrewStage::HeatingCoffee);
        assert_eq!(status.progress, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn continue_is_ignored_outside_the_checkpoint() {
        let (store, machine) = seed("LATTE", 60, 40, Some(BrewStage::Inactive));
        let mut handle = spawn(store.clone(), &machine.id, Timings::default());
        while !matches!(handle.next_event().await, Some(MonitorEvent::Rendered { .. })) {}

        assert!(handle.continue_brew().await);
        time::sleep(Duration::from_secs(5)).await;
        handle.stop().await.unwrap();
        assert_eq!(store.statuses(Some(&machine.id))[0].stage, BrewStage::Inactive);
    }

    /// Memory store that fails on demand.
    struct Flaky {
        inner: MemoryStore,
        /// Status writes still to reject.
        write_failures: AtomicUsize,
        /// History appends still to reject.
        history_failures: AtomicUsize,
        /// Status reads served before the store goes offline.
        reads_left: AtomicUsize,
        reads: AtomicUsize,
    }

    impl Flaky {
        fn new(inner: MemoryStore) -> Self {
            Flaky {
                inner,
                write_failures: AtomicUsize::new(0),
                history_failures: AtomicUsize::new(0),
                reads_left: AtomicUsize::new(usize::MAX),
                reads: AtomicUsize::new(0),
            }
        }
    }

    fn offline() -> Error {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "store offline",
        ))
    }

    /// Decrements `counter` and reports whether it was still positive.
    fn take(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }

    #[async_trait]
    impl BrewStore for Flaky {
        async fn machine(&self, id: &str) -> Result<Machine> {
            BrewStore::machine(&self.inner, id).await
        }

        async fn status_for(&self, machine_id: &str) -> Result<Option<BrewStatus>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if !take(&self.reads_left) {
                return Err(offline());
            }
            self.inner.status_for(machine_id).await
        }

        async fn replace_status(&self, status: &BrewStatus) -> Result<BrewStatus> {
            if take(&self.write_failures) {
                return Err(offline());
            }
            self.inner.replace_status(status).await
        }

        async fn beverage(&self, name: &str) -> Result<Option<Beverage>> {
            self.inner.beverage(name).await
        }

        async fn record_history(&self, record: &NewHistoryRecord) -> Result<HistoryRecord> {
            if take(&self.history_failures) {
                return Err(offline());
            }
            self.inner.record_history(record).await
        }
    }

    fn flaky(
        beverage: &str,
        coffee: u8,
        milk: u8,
        stage: BrewStage,
    ) -> (Arc<Flaky>, Machine) {
        let inner = MemoryStore::new();
        let machine = seed_into(&inner, beverage, coffee, milk, Some(stage));
        (Arc::new(Flaky::new(inner)), machine)
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_is_reissued_by_a_later_poll() {
        let (store, machine) = flaky("ESPRESSO", 100, 0, BrewStage::HeatingCoffee);
        store.write_failures.store(2, Ordering::SeqCst);

        let mut handle = spawn(store.clone(), &machine.id, Timings::default());
        let trail = brew_to_completion(&mut handle).await;
        handle.stop().await.unwrap();

        assert_eq!(trail.first(), Some(&(BrewStage::HeatingCoffee, 0)));
        assert_eq!(trail.last(), Some(&(BrewStage::Inactive, 0)));
        assert_eq!(store.write_failures.load(Ordering::SeqCst), 0);
        assert_eq!(store.inner.history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_stops_polling_with_an_error() {
        let (store, machine) = flaky("ESPRESSO", 100, 0, BrewStage::Inactive);
        store.reads_left.store(2, Ordering::SeqCst);

        let mut handle = spawn(store.clone(), &machine.id, Timings::default());
        let mut rendered = 0;
        let mut failure = None;
        while let Some(event) = handle.next_event().await {
            match event {
                MonitorEvent::Rendered { .. } => rendered += 1,
                MonitorEvent::Failed { view, message } => failure = Some((view, message)),
                MonitorEvent::Stopped => panic!("session should end with an error"),
                _ => {}
            }
        }

        assert_eq!(rendered, 2);
        let (view, message) = failure.expect("no error view");
        assert_eq!(view.label, "ERROR");
        assert!(message.contains("store offline"), "{message}");

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.reads.load(Ordering::SeqCst), 3);
        assert!(matches!(handle.join().await, Err(Error::Io(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_history_write_is_retried_during_cooldown() {
        let (store, machine) = flaky("ESPRESSO", 100, 0, BrewStage::HeatingCoffee);
        store.history_failures.store(1, Ordering::SeqCst);

        let mut handle = spawn(store.clone(), &machine.id, Timings::default());
        let trail = brew_to_completion(&mut handle).await;
        handle.stop().await.unwrap();

        assert_eq!(trail.last(), Some(&(BrewStage::Inactive, 0)));
        assert_eq!(store.history_failures.load(Ordering::SeqCst), 0);
        let history = store.inner.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].beverage, "ESPRESSO");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_milk_confirmation_asks_again() {
        let (store, machine) = flaky("LATTE", 60, 40, BrewStage::AwaitingMilk);
        let mut handle = spawn(store.clone(), &machine.id, Timings::default());
        while !matches!(handle.next_event().await, Some(MonitorEvent::MilkRequired)) {}

        store.write_failures.store(1, Ordering::SeqCst);
        assert!(handle.continue_brew().await);
        assert_eq!(handle.next_event().await, Some(MonitorEvent::MilkRequired));

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(handle.try_next_event(), None);
        assert_eq!(
            store.inner.statuses(Some(&machine.id))[0].stage,
            BrewStage::AwaitingMilk
        );

        assert!(handle.continue_brew().await);
        let trail = brew_to_completion(&mut handle).await;
        handle.stop().await.unwrap();
        assert_eq!(trail.first().map(|step| step.0), Some(BrewStage::HeatingMilk));
        assert_eq!(store.inner.history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_poll_interval_fails_before_polling() {
        let (store, machine) = seed("ESPRESSO", 100, 0, Some(BrewStage::Inactive));
        let timings = Timings {
            poll_interval: Duration::ZERO,
            ..Timings::default()
        };
        let mut handle = spawn(store, &machine.id, timings);

        match handle.next_event().await {
            Some(MonitorEvent::Failed { view, message }) => {
                assert_eq!(view.label, "ERROR");
                assert!(message.contains("POLL_INTERVAL_MS"), "{message}");
            }
            other => panic!("expected a failure, got {other:?}"),
        }
        assert!(matches!(handle.join().await, Err(Error::Config(_))));
    }
}
