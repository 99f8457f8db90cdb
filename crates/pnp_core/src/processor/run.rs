//! Worker-side run loop: pre-process, plan, pick, place.
//!
//! Every device interaction is preceded by a status broadcast and a
//! checkpoint. Errors are converted to a `JobError` kind at the call site
//! and end the run.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::machine::{Feeder, Head, HeadSequencer, Nozzle, PlacementSolution};
use crate::models::{Job, Location};

use super::errors::{JobError, RunError, RunResult};
use super::job_processor::Shared;
use super::transform::placement_target_location;
use super::types::JobState;

/// A solution whose part is on its nozzle, with the cached target.
struct PickedPart {
    solution: PlacementSolution,
    nozzle: Arc<dyn Nozzle>,
    target: Location,
}

/// Worker thread entry point.
pub(crate) fn run_job(shared: &Shared, job: Arc<Job>) {
    match execute(shared, &job) {
        Ok(()) => {
            info!(job = %job.name, "job complete");
            shared.listeners.detailed_status_updated("Job complete.");
            shared.set_state(JobState::Stopped);
        }
        Err(RunError::Stopped) => {
            debug!(job = %job.name, "run loop exited on stop");
        }
        Err(RunError::Failed { kind, message }) => {
            warn!(job = %job.name, %kind, "job error: {}", message);
            shared.listeners.job_encountered_error(kind, &message);
        }
    }
}

fn execute(shared: &Shared, job: &Arc<Job>) -> RunResult<()> {
    let machine = Arc::clone(&shared.config.machine);
    let motion = &shared.config.settings.motion;

    pre_process(job)?;

    for head in machine.heads() {
        announce(shared, format!("Move head {} to Safe-Z.", head.id()))?;
        head.move_to_safe_z(motion.safe_z_ratio())
            .map_err(RunError::device(JobError::MachineMovementError))?;
    }

    let planner = machine.job_planner();
    planner.set_job(Arc::clone(job));
    let mut sequencer = HeadSequencer::from_machine(machine.as_ref());

    loop {
        let Some(batch) = next_batch(&mut sequencer, |head| {
            planner.next_placement_solutions(head)
        }) else {
            break;
        };
        debug!(solutions = batch.len(), "planned batch");

        let mut picked = Vec::with_capacity(batch.len());
        for solution in batch {
            picked.push(pick(shared, solution)?);
        }
        for part in &picked {
            place(shared, part)?;
        }

        shared.update_progress(|p| p.batches_completed += 1);
    }

    Ok(())
}

/// Every active placement must resolve to a part.
fn pre_process(job: &Job) -> RunResult<()> {
    match job.find_unresolved_placement() {
        Some((board_location, placement)) => Err(RunError::failed(
            JobError::PartError,
            format!(
                "Part not found for Board {}, Placement {}",
                board_location.board.name, placement.id
            ),
        )),
        None => Ok(()),
    }
}

/// Ask each head once, starting at the sequencer's offset, for a
/// non-empty batch. `None` when no head has work left.
fn next_batch(
    sequencer: &mut HeadSequencer,
    mut plan: impl FnMut(&Arc<dyn Head>) -> Option<Vec<PlacementSolution>>,
) -> Option<Vec<PlacementSolution>> {
    let count = sequencer.head_count();
    sequencer
        .iter()
        .take(count)
        .find_map(|head| plan(head).filter(|batch| !batch.is_empty()))
}

/// Broadcast what is about to happen, then wait at the checkpoint.
fn announce(shared: &Shared, status: String) -> RunResult<()> {
    shared.listeners.detailed_status_updated(&status);
    shared.checkpoint()
}

fn pick(shared: &Shared, solution: PlacementSolution) -> RunResult<PickedPart> {
    let motion = &shared.config.settings.motion;
    let board_location = &solution.board_location;
    let placement = &solution.placement;

    shared
        .listeners
        .part_processing_started(board_location, placement);

    let nozzle = solution.nozzle.clone().ok_or_else(|| {
        RunError::failed(
            JobError::HeadError,
            format!("No Nozzle available to service Placement {}", placement),
        )
    })?;
    let part = placement.part.clone().ok_or_else(|| {
        RunError::failed(
            JobError::PartError,
            format!(
                "Part not found for Board {}, Placement {}",
                board_location.board.name, placement.id
            ),
        )
    })?;
    let feeder: Arc<dyn Feeder> = solution.feeder.clone().ok_or_else(|| {
        RunError::failed(
            JobError::FeederError,
            format!("No viable Feeders found for Part {}", part.id),
        )
    })?;

    let target = placement_target_location(board_location, placement, &part);

    announce(
        shared,
        format!(
            "Move nozzle {} to Safe-Z at ({}).",
            nozzle.id(),
            nozzle.location()
        ),
    )?;
    nozzle
        .move_to_safe_z(motion.safe_z_ratio())
        .map_err(RunError::device(JobError::MachineMovementError))?;

    announce(shared, format!("Request part feed from feeder {}.", feeder.id()))?;
    feeder
        .feed(nozzle.as_ref())
        .map_err(RunError::device(JobError::FeederError))?;

    let pick_location = feeder
        .pick_location()
        .map_err(RunError::device(JobError::FeederError))?
        .filter(Location::is_valid_xy)
        .ok_or_else(|| {
            RunError::failed(
                JobError::FeederError,
                format!("Feeder {} returned no valid pick location", feeder.id()),
            )
        })?;

    announce(
        shared,
        format!("Move to safe Z at ({}).", nozzle.location()),
    )?;
    nozzle
        .move_to_safe_z(motion.safe_z_ratio())
        .map_err(RunError::device(JobError::MachineMovementError))?;

    announce(
        shared,
        format!("Move to pick location, safe Z at ({}).", pick_location),
    )?;
    nozzle
        .move_to(&pick_location.with_unconstrained_z(), motion.xy_ratio())
        .map_err(RunError::device(JobError::MachineMovementError))?;

    announce(
        shared,
        format!("Move to pick location Z at ({}).", pick_location),
    )?;
    nozzle
        .move_to(&pick_location, motion.z_ratio())
        .map_err(RunError::device(JobError::MachineMovementError))?;

    announce(shared, format!("Request part pick at ({}).", pick_location))?;
    nozzle
        .pick()
        .map_err(RunError::device(JobError::PickError))?;

    shared.update_progress(|p| p.parts_picked += 1);
    shared.listeners.part_picked(board_location, placement);

    announce(
        shared,
        format!("Move to safe Z at ({}).", nozzle.location()),
    )?;
    nozzle
        .move_to_safe_z(motion.safe_z_ratio())
        .map_err(RunError::device(JobError::MachineMovementError))?;

    Ok(PickedPart {
        solution,
        nozzle,
        target,
    })
}

fn place(shared: &Shared, picked: &PickedPart) -> RunResult<()> {
    let motion = &shared.config.settings.motion;
    let PickedPart {
        solution,
        nozzle,
        target,
    } = picked;

    announce(
        shared,
        format!("Move to placement location, safe Z at ({}).", target),
    )?;
    nozzle
        .move_to(&target.with_unconstrained_z(), motion.xy_ratio())
        .map_err(RunError::device(JobError::MachineMovementError))?;

    announce(
        shared,
        format!("Move to placement location Z at ({}).", target),
    )?;
    nozzle
        .move_to(target, motion.z_ratio())
        .map_err(RunError::device(JobError::MachineMovementError))?;

    announce(
        shared,
        format!(
            "Request part place at (X {:.3}, Y {:.3}, Z {:.3}, C {:.3}).",
            target.x, target.y, target.z, target.rotation
        ),
    )?;
    nozzle
        .place()
        .map_err(RunError::device(JobError::PlaceError))?;

    shared.update_progress(|p| p.parts_placed += 1);
    shared
        .listeners
        .part_placed(&solution.board_location, &solution.placement);

    announce(
        shared,
        format!("Move to safe Z at ({}).", nozzle.location()),
    )?;
    nozzle
        .move_to_safe_z(motion.safe_z_ratio())
        .map_err(RunError::device(JobError::MachineMovementError))?;

    shared
        .listeners
        .part_processing_completed(&solution.board_location, &solution.placement);
    Ok(())
}
