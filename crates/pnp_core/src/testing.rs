//! Scripted machine and event recorder shared by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::machine::{
    DeviceError, DeviceResult, Feeder, Head, JobPlanner, Machine, Nozzle, PlacementSolution,
};
use crate::models::{Board, BoardLocation, Job, Length, Location, Part, Placement, Side};
use crate::processor::{JobError, JobProcessorListener, JobState};

pub(crate) const TIMEOUT: Duration = Duration::from_secs(5);

/// Device operations in the order they were issued, shared by all mocks
/// of one rig.
#[derive(Clone, Default)]
pub(crate) struct OpLog(Arc<Mutex<Vec<String>>>);

impl OpLog {
    pub(crate) fn record(&self, op: String) {
        self.0.lock().push(op);
    }

    pub(crate) fn ops(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Holds a device operation until opened.
#[derive(Default)]
pub(crate) struct Gate {
    state: Mutex<(bool, bool)>,
    changed: Condvar,
}

impl Gate {
    fn pass(&self) {
        let mut state = self.state.lock();
        state.0 = true;
        self.changed.notify_all();
        while !state.1 {
            self.changed.wait(&mut state);
        }
    }

    /// Wait until some operation is blocked on the gate.
    pub(crate) fn wait_entered(&self) -> bool {
        let deadline = Instant::now() + TIMEOUT;
        let mut state = self.state.lock();
        while !state.0 {
            if self.changed.wait_until(&mut state, deadline).timed_out() {
                return state.0;
            }
        }
        true
    }

    pub(crate) fn open(&self) {
        self.state.lock().1 = true;
        self.changed.notify_all();
    }
}

/// Operation name a mock fails or blocks on.
#[derive(Default)]
struct Script {
    fail_on: Option<&'static str>,
    gate: Option<(&'static str, Arc<Gate>)>,
}

impl Script {
    fn run(&self, device: &str, op: &'static str) -> DeviceResult<()> {
        if let Some((gated, gate)) = &self.gate {
            if *gated == op {
                gate.pass();
            }
        }
        if self.fail_on == Some(op) {
            return Err(DeviceError::operation_failed(device, op, "scripted failure"));
        }
        Ok(())
    }
}

pub(crate) struct MockNozzle {
    id: String,
    log: OpLog,
    location: Mutex<Location>,
    script: Script,
}

impl MockNozzle {
    pub(crate) fn new(id: &str, log: OpLog) -> Self {
        Self {
            id: id.to_string(),
            log,
            location: Mutex::new(Location::default()),
            script: Script::default(),
        }
    }

    pub(crate) fn failing(mut self, op: &'static str) -> Self {
        self.script.fail_on = Some(op);
        self
    }

    pub(crate) fn gated(mut self, op: &'static str, gate: Arc<Gate>) -> Self {
        self.script.gate = Some((op, gate));
        self
    }
}

impl Nozzle for MockNozzle {
    fn id(&self) -> &str {
        &self.id
    }

    fn location(&self) -> Location {
        *self.location.lock()
    }

    fn move_to(&self, location: &Location, _feed_rate_ratio: f64) -> DeviceResult<()> {
        self.log.record(format!(
            "{}:move_to {:.3},{:.3},{:.3}",
            self.id, location.x, location.y, location.z
        ));
        self.script.run(&self.id, "move_to")?;
        let mut current = self.location.lock();
        current.x = location.x;
        current.y = location.y;
        if !location.z.is_nan() {
            current.z = location.z;
        }
        Ok(())
    }

    fn move_to_safe_z(&self, _feed_rate_ratio: f64) -> DeviceResult<()> {
        self.log.record(format!("{}:safe_z", self.id));
        self.script.run(&self.id, "safe_z")?;
        self.location.lock().z = 0.0;
        Ok(())
    }

    fn pick(&self) -> DeviceResult<()> {
        self.log.record(format!("{}:pick", self.id));
        self.script.run(&self.id, "pick")
    }

    fn place(&self) -> DeviceResult<()> {
        self.log.record(format!("{}:place", self.id));
        self.script.run(&self.id, "place")
    }
}

pub(crate) struct MockHead {
    id: String,
    log: OpLog,
    nozzles: Vec<Arc<dyn Nozzle>>,
    script: Script,
}

impl MockHead {
    pub(crate) fn new(id: &str) -> Self {
        Self::with_log(id, OpLog::default())
    }

    pub(crate) fn with_log(id: &str, log: OpLog) -> Self {
        Self {
            id: id.to_string(),
            log,
            nozzles: Vec::new(),
            script: Script::default(),
        }
    }

    pub(crate) fn nozzle(mut self, nozzle: Arc<MockNozzle>) -> Self {
        self.nozzles.push(nozzle);
        self
    }

    pub(crate) fn failing(mut self, op: &'static str) -> Self {
        self.script.fail_on = Some(op);
        self
    }
}

impl Head for MockHead {
    fn id(&self) -> &str {
        &self.id
    }

    fn nozzles(&self) -> Vec<Arc<dyn Nozzle>> {
        self.nozzles.clone()
    }

    fn move_to_safe_z(&self, _feed_rate_ratio: f64) -> DeviceResult<()> {
        self.log.record(format!("{}:safe_z", self.id));
        self.script.run(&self.id, "safe_z")
    }
}

pub(crate) struct MockFeeder {
    id: String,
    log: OpLog,
    pick_location: Mutex<Option<Location>>,
    script: Script,
}

impl MockFeeder {
    pub(crate) fn new(id: &str, log: OpLog) -> Self {
        Self {
            id: id.to_string(),
            log,
            pick_location: Mutex::new(Some(Location::mm(5.0, 5.0, 1.0, 0.0))),
            script: Script::default(),
        }
    }

    pub(crate) fn failing(mut self, op: &'static str) -> Self {
        self.script.fail_on = Some(op);
        self
    }

    pub(crate) fn pick_location_at(self, location: Option<Location>) -> Self {
        *self.pick_location.lock() = location;
        self
    }
}

impl Feeder for MockFeeder {
    fn id(&self) -> &str {
        &self.id
    }

    fn feed(&self, nozzle: &dyn Nozzle) -> DeviceResult<()> {
        self.log.record(format!("{}:feed {}", self.id, nozzle.id()));
        self.script.run(&self.id, "feed")
    }

    fn pick_location(&self) -> DeviceResult<Option<Location>> {
        self.script.run(&self.id, "pick_location")?;
        Ok(*self.pick_location.lock())
    }
}

/// Hands out pre-queued batches per head and records every query.
#[derive(Default)]
pub(crate) struct ScriptedPlanner {
    batches: Mutex<HashMap<String, VecDeque<Vec<PlacementSolution>>>>,
    queried: Mutex<Vec<String>>,
    jobs: Mutex<Vec<String>>,
}

impl ScriptedPlanner {
    pub(crate) fn queue(&self, head: &str, batch: Vec<PlacementSolution>) {
        self.batches
            .lock()
            .entry(head.to_string())
            .or_default()
            .push_back(batch);
    }

    pub(crate) fn queried(&self) -> Vec<String> {
        self.queried.lock().clone()
    }

    pub(crate) fn jobs(&self) -> Vec<String> {
        self.jobs.lock().clone()
    }
}

impl JobPlanner for ScriptedPlanner {
    fn set_job(&self, job: Arc<Job>) {
        self.jobs.lock().push(job.name.clone());
    }

    fn next_placement_solutions(&self, head: &Arc<dyn Head>) -> Option<Vec<PlacementSolution>> {
        self.queried.lock().push(head.id().to_string());
        self.batches
            .lock()
            .get_mut(head.id())
            .and_then(|queue| queue.pop_front())
    }
}

pub(crate) struct MockMachine {
    pub(crate) heads: Vec<Arc<dyn Head>>,
    pub(crate) planner: Arc<ScriptedPlanner>,
}

impl Machine for MockMachine {
    fn heads(&self) -> Vec<Arc<dyn Head>> {
        self.heads.clone()
    }

    fn job_planner(&self) -> Arc<dyn JobPlanner> {
        self.planner.clone()
    }
}

/// A notification as recorded by [`EventLog`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Loaded(String),
    State(JobState),
    Error(JobError, String),
    Started(String),
    Picked(String),
    Placed(String),
    Completed(String),
    Status(String),
}

/// Listener that records every notification.
#[derive(Default)]
pub(crate) struct EventLog {
    events: Mutex<Vec<Event>>,
    changed: Condvar,
}

impl EventLog {
    fn push(&self, event: Event) {
        self.events.lock().push(event);
        self.changed.notify_all();
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Events other than status text.
    pub(crate) fn milestones(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| !matches!(e, Event::Status(_)))
            .collect()
    }

    pub(crate) fn count(&self, event: &Event) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }

    /// Block until `pred` holds for the recorded events.
    pub(crate) fn wait_for(&self, pred: impl Fn(&[Event]) -> bool) -> bool {
        let deadline = Instant::now() + TIMEOUT;
        let mut events = self.events.lock();
        while !pred(events.as_slice()) {
            if self.changed.wait_until(&mut events, deadline).timed_out() {
                return pred(events.as_slice());
            }
        }
        true
    }

    pub(crate) fn wait_for_count(&self, event: &Event, n: usize) -> bool {
        self.wait_for(|events| events.iter().filter(|e| *e == event).count() >= n)
    }
}

impl JobProcessorListener for EventLog {
    fn job_loaded(&self, job: &Job) {
        self.push(Event::Loaded(job.name.clone()));
    }

    fn job_state_changed(&self, state: JobState) {
        self.push(Event::State(state));
    }

    fn job_encountered_error(&self, error: JobError, description: &str) {
        self.push(Event::Error(error, description.to_string()));
    }

    fn part_processing_started(&self, _board: &BoardLocation, placement: &Placement) {
        self.push(Event::Started(placement.id.clone()));
    }

    fn part_picked(&self, _board: &BoardLocation, placement: &Placement) {
        self.push(Event::Picked(placement.id.clone()));
    }

    fn part_placed(&self, _board: &BoardLocation, placement: &Placement) {
        self.push(Event::Placed(placement.id.clone()));
    }

    fn part_processing_completed(&self, _board: &BoardLocation, placement: &Placement) {
        self.push(Event::Completed(placement.id.clone()));
    }

    fn detailed_status_updated(&self, status: &str) {
        self.push(Event::Status(status.to_string()));
    }
}

/// Job "test-job": one top-side board at (10, 20) with placements
/// R1..Rn at (2i, 1), all resolved to a 0.5mm part.
pub(crate) fn single_board_job(n: usize) -> Job {
    let part = Arc::new(Part::new("R0805", Length::mm(0.5)));
    let placements = (1..=n)
        .map(|i| {
            Placement::new(
                format!("R{}", i),
                Side::Top,
                Location::mm(2.0 * i as f64, 1.0, 0.0, 0.0),
                Some(part.clone()),
            )
        })
        .collect();
    let board = Arc::new(Board::new("board", placements));
    Job::new(
        "test-job",
        vec![BoardLocation::new(
            board,
            Location::mm(10.0, 20.0, 0.0, 0.0),
            Side::Top,
        )],
    )
}

/// One solution per active placement of `job`, all on the same devices.
pub(crate) fn solutions(
    job: &Job,
    head: &Arc<dyn Head>,
    nozzle: Option<Arc<dyn Nozzle>>,
    feeder: Option<Arc<dyn Feeder>>,
) -> Vec<PlacementSolution> {
    job.board_locations
        .iter()
        .flat_map(|bl| bl.active_placements().map(move |p| (bl, p)))
        .map(|(bl, p)| {
            PlacementSolution::new(
                Arc::clone(head),
                nozzle.clone(),
                feeder.clone(),
                bl.clone(),
                p.clone(),
            )
        })
        .collect()
}
