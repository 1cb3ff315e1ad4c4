use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

/// What a single command character did.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Moved,
    /// The target cell was off the grid, the rover stayed put.
    Blocked,
    Turned,
    Disarmed,
    /// Disarm on a cell without a mine.
    Idle,
    /// Character outside the instruction alphabet, carried along inertly.
    Ignored,
    Eliminated,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    pub source: char,
    pub pose: Pose,
    pub outcome: StepOutcome,
}

/// Result of one dispatch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub pose: Pose,
    pub status: RoverStatus,
    pub executed_commands: String,
    pub overlay: PathOverlay,
    pub trace: Vec<TraceStep>,
    /// Registry records deleted by successful disarms, in order.
    pub removed_mines: Vec<MineRecord>,
    /// Cells whose mine was cleared, in order. A cell may be listed without a
    /// matching record when the registry had none for it.
    pub cleared_cells: Vec<Coord2>,
}

impl DispatchReport {
    pub fn is_eliminated(&self) -> bool {
        self.status == RoverStatus::Eliminated
    }
}

/// Runs one rover's command sequence against a private copy of the grid.
///
/// Mine removals go to the registry as they happen. The caller's grid is
/// never touched, the cleared cells are reported for write-back instead.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchEngine {
    grid: Grid,
    overlay: PathOverlay,
    pose: Pose,
    status: RoverStatus,
    executed_commands: String,
    trace: Vec<TraceStep>,
    removed_mines: Vec<MineRecord>,
    cleared_cells: Vec<Coord2>,
}

impl DispatchEngine {
    pub fn new(grid: &Grid, start: Pose) -> Self {
        let mut overlay = PathOverlay::from_grid(grid);
        overlay.mark_visited(start.position);
        Self {
            grid: grid.clone(),
            overlay,
            pose: start,
            status: RoverStatus::Moving,
            executed_commands: String::new(),
            trace: Vec::new(),
            removed_mines: Vec::new(),
            cleared_cells: Vec::new(),
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn status(&self) -> RoverStatus {
        self.status
    }

    pub fn is_eliminated(&self) -> bool {
        self.status == RoverStatus::Eliminated
    }

    pub fn overlay(&self) -> &PathOverlay {
        &self.overlay
    }

    /// Working copy of the grid, with mines disarmed so far cleared.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn executed_commands(&self) -> &str {
        &self.executed_commands
    }

    /// Executes a single command.
    pub fn step<R: MineRegistry + ?Sized>(
        &mut self,
        command: Command,
        registry: &mut R,
    ) -> Result<StepOutcome> {
        if self.is_eliminated() {
            return Err(RoverError::AlreadyEliminated);
        }
        Ok(self.apply(command, registry))
    }

    /// Executes `commands` in order, stopping at elimination.
    pub fn run<R: MineRegistry + ?Sized>(
        mut self,
        commands: &CommandSequence,
        registry: &mut R,
    ) -> DispatchReport {
        for command in commands.iter() {
            if self.apply(command, registry) == StepOutcome::Eliminated {
                let dropped = commands.len() - self.trace.len();
                if dropped > 0 {
                    log::debug!("Dropping {dropped} command(s) after elimination");
                }
                break;
            }
        }
        self.finish()
    }

    /// Ends the dispatch. A rover that survived is `Finished`.
    pub fn finish(mut self) -> DispatchReport {
        if !self.is_eliminated() {
            self.status = RoverStatus::Finished;
        }
        DispatchReport {
            pose: self.pose,
            status: self.status,
            executed_commands: self.executed_commands,
            overlay: self.overlay,
            trace: self.trace,
            removed_mines: self.removed_mines,
            cleared_cells: self.cleared_cells,
        }
    }

    fn apply<R: MineRegistry + ?Sized>(
        &mut self,
        command: Command,
        registry: &mut R,
    ) -> StepOutcome {
        let outcome = match command.instruction {
            Some(Instruction::MoveForward) => self.move_forward(),
            Some(Instruction::Turn(turn)) => {
                self.pose.orientation = self.pose.orientation.turn(turn);
                StepOutcome::Turned
            }
            Some(Instruction::Disarm) => self.disarm(registry),
            None => StepOutcome::Ignored,
        };

        self.executed_commands.push(command.source);
        self.trace.push(TraceStep {
            source: command.source,
            pose: self.pose,
            outcome,
        });
        log::trace!(
            "{} -> {:?} at {:?} facing {}",
            command.source,
            outcome,
            self.pose.position,
            self.pose.orientation
        );
        outcome
    }

    fn move_forward(&mut self) -> StepOutcome {
        let current = self.pose.position;

        // the mine under the rover goes off on any attempt to move, walls included
        if self.grid.contains_mine(current) {
            log::debug!("Rover eliminated by mine at {current:?}");
            self.status = RoverStatus::Eliminated;
            return StepOutcome::Eliminated;
        }

        let next = self.pose.orientation.step(current);
        if !self.grid.is_valid_position(next) {
            return StepOutcome::Blocked;
        }

        self.overlay.mark_visited(current);
        self.pose.position = next;
        StepOutcome::Moved
    }

    fn disarm<R: MineRegistry + ?Sized>(&mut self, registry: &mut R) -> StepOutcome {
        let position = self.pose.position;
        self.overlay.mark_visited(position);

        if !matches!(self.grid.clear_mine(position), Ok(true)) {
            return StepOutcome::Idle;
        }
        self.cleared_cells.push(position);

        match registry
            .find_mine_at(position)
            .and_then(|mine| registry.delete_mine(mine.id))
        {
            Some(mine) => {
                log::debug!(
                    "Disarmed mine {} ({}) at {position:?}",
                    mine.id,
                    mine.serial_number
                );
                self.removed_mines.push(mine);
            }
            None => log::warn!("Disarmed mine at {position:?} has no registry record"),
        }
        StepOutcome::Disarmed
    }
}

/// Runs a full dispatch from `start`. See [`DispatchEngine`].
pub fn dispatch<R: MineRegistry + ?Sized>(
    grid: &Grid,
    start: Pose,
    commands: &CommandSequence,
    registry: &mut R,
) -> DispatchReport {
    DispatchEngine::new(grid, start).run(commands, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn grid(size: Size2, mines: &[Coord2]) -> Grid {
        Grid::from_mine_coords(size, mines).unwrap()
    }

    fn lenient(commands: &str) -> CommandSequence {
        CommandSequence::parse(commands, CommandMode::Lenient).unwrap()
    }

    fn registry_for(mines: &[Coord2]) -> Vec<MineRecord> {
        mines
            .iter()
            .zip(1..)
            .map(|(&coords, id)| MineRecord::new(id, coords, alloc::format!("SN-{id}")))
            .collect()
    }

    /// Dispatch against an empty registry.
    fn run(grid: &Grid, start: Pose, commands: &str) -> DispatchReport {
        let mut registry: Vec<MineRecord> = Vec::new();
        dispatch(grid, start, &lenient(commands), &mut registry)
    }

    fn facing(orientation: Orientation) -> Pose {
        Pose::new((0, 0), orientation)
    }

    #[test]
    fn moving_off_the_top_left_corner_is_absorbed() {
        let grid = grid((3, 3), &[]);
        let report = run(&grid, facing(Orientation::North), "M");

        assert_eq!(report.pose.position, (0, 0));
        assert_eq!(report.status, RoverStatus::Finished);
        assert_eq!(report.executed_commands, "M");
        assert_eq!(report.trace[0].outcome, StepOutcome::Blocked);
    }

    #[test]
    fn walks_south_then_bumps_west_wall() {
        let grid = grid((3, 3), &[]);
        let report = run(&grid, facing(Orientation::South), "MMRM");

        let positions: Vec<_> = report.trace.iter().map(|s| s.pose.position).collect();
        assert_eq!(positions, vec![(1, 0), (2, 0), (2, 0), (2, 0)]);
        assert_eq!(report.pose, Pose::new((2, 0), Orientation::West));
        assert_eq!(report.status, RoverStatus::Finished);
        assert_eq!(report.executed_commands, "MMRM");
    }

    #[test]
    fn mine_goes_off_when_leaving_the_cell() {
        let grid = grid((2, 2), &[(1, 0)]);
        let mut registry = registry_for(&[(1, 0)]);
        let commands = lenient("MM");
        let report = dispatch(&grid, facing(Orientation::South), &commands, &mut registry);

        assert_eq!(report.status, RoverStatus::Eliminated);
        assert_eq!(report.executed_commands, "MM");
        assert_eq!(report.pose.position, (1, 0));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn elimination_drops_the_remaining_commands() {
        let grid = grid((3, 3), &[(1, 0)]);
        let report = run(&grid, facing(Orientation::South), "MMLMD");

        assert!(report.is_eliminated());
        assert_eq!(report.executed_commands, "MM");
        assert_eq!(report.trace.len(), 2);
        assert_eq!(report.trace[1].outcome, StepOutcome::Eliminated);
    }

    #[test]
    fn wall_move_from_mined_origin_eliminates() {
        let grid = grid((3, 3), &[(0, 0)]);
        let report = run(&grid, facing(Orientation::North), "M");

        assert_eq!(report.status, RoverStatus::Eliminated);
        assert_eq!(report.executed_commands, "M");
        assert_eq!(report.pose.position, (0, 0));
    }

    #[test]
    fn mined_cell_eliminates_even_when_facing_a_wall() {
        let grid = grid((2, 2), &[(0, 0)]);
        let report = run(&grid, facing(Orientation::North), "MLM");

        assert!(report.is_eliminated());
        assert_eq!(report.executed_commands, "M");
        assert_eq!(report.pose.position, (0, 0));
    }

    #[test]
    fn disarm_on_empty_cell_only_marks_overlay() {
        let grid = grid((3, 3), &[]);
        let start = Pose::new((1, 1), Orientation::East);
        let report = run(&grid, facing(Orientation::South), "MD");
        let idle = run(&grid, start, "D");

        assert_eq!(report.trace[1].outcome, StepOutcome::Idle);
        assert!(report.overlay.is_visited((1, 0)));
        assert_eq!(idle.pose, start);
        assert_eq!(idle.status, RoverStatus::Finished);
        assert!(idle.removed_mines.is_empty());
        assert!(idle.cleared_cells.is_empty());
    }

    #[test]
    fn disarm_removes_exactly_the_mine_underneath() {
        let mines = [(1, 0), (2, 2)];
        let grid = grid((3, 3), &mines);
        let mut registry = registry_for(&mines);
        let commands = lenient("MDMM");
        let report = dispatch(&grid, facing(Orientation::South), &commands, &mut registry);

        assert_eq!(report.status, RoverStatus::Finished);
        assert_eq!(report.pose.position, (2, 0));
        assert_eq!(report.cleared_cells, vec![(1, 0)]);
        assert_eq!(report.removed_mines.len(), 1);
        assert_eq!(report.removed_mines[0].position(), (1, 0));
        assert_eq!(registry, vec![MineRecord::new(2, (2, 2), "SN-2")]);
        // caller's grid is left alone
        assert!(grid.contains_mine((1, 0)));
    }

    #[test]
    fn disarm_without_registry_record_still_clears_the_cell() {
        let grid = grid((2, 2), &[(0, 0)]);
        let report = run(&grid, facing(Orientation::South), "DM");

        assert_eq!(report.status, RoverStatus::Finished);
        assert_eq!(report.cleared_cells, vec![(0, 0)]);
        assert!(report.removed_mines.is_empty());
    }

    #[test]
    fn overlay_keeps_unvisited_mines_visible() {
        let grid = grid((3, 3), &[(2, 2), (1, 0)]);
        let report = run(&grid, facing(Orientation::South), "MDM");

        assert_eq!(report.overlay.cell_at((2, 2)), Some(OverlayCell::Mine));
        assert_eq!(report.overlay.cell_at((0, 0)), Some(OverlayCell::Visited));
        assert_eq!(report.overlay.cell_at((1, 0)), Some(OverlayCell::Visited));
        // arrival cell is only marked once the rover leaves or disarms there
        assert_eq!(report.overlay.cell_at((2, 0)), Some(OverlayCell::Empty));
    }

    #[test]
    fn inert_characters_are_recorded_but_do_nothing() {
        let grid = grid((3, 3), &[]);
        let report = run(&grid, facing(Orientation::South), "M?M");

        assert_eq!(report.executed_commands, "M?M");
        assert_eq!(report.trace[1].outcome, StepOutcome::Ignored);
        assert_eq!(report.pose.position, (2, 0));
    }

    #[test]
    fn full_turns_restore_heading() {
        let grid = grid((2, 2), &[]);
        for orientation in Orientation::ALL {
            for commands in ["RRRR", "LLLL"] {
                let report = run(&grid, facing(orientation), commands);
                assert_eq!(report.pose.orientation, orientation);
            }
        }
    }

    #[test]
    fn repeated_runs_are_identical() {
        let grid = grid((4, 4), &[(3, 3)]);
        let start = facing(Orientation::South);

        let first = run(&grid, start, "MMLMMRxMD");
        let second = run(&grid, start, "MMLMMRxMD");

        assert_eq!(first, second);
    }

    #[test]
    fn engine_accepts_non_origin_start() {
        let grid = grid((3, 3), &[]);
        let report = run(&grid, Pose::new((2, 2), Orientation::North), "MM");

        assert_eq!(report.pose.position, (0, 2));
        assert!(report.overlay.is_visited((2, 2)));
    }

    #[test]
    fn step_refuses_commands_after_elimination() {
        let grid = grid((2, 2), &[(0, 0)]);
        let mut engine = DispatchEngine::new(&grid, facing(Orientation::South));
        let mut registry: Vec<MineRecord> = Vec::new();

        let outcome = engine.step(Instruction::MoveForward.into(), &mut registry).unwrap();

        assert_eq!(outcome, StepOutcome::Eliminated);
        assert_eq!(
            engine.step(Instruction::Disarm.into(), &mut registry),
            Err(RoverError::AlreadyEliminated)
        );
        assert_eq!(engine.executed_commands(), "M");
    }

    #[test]
    fn working_grid_reflects_disarms_during_the_run() {
        let grid = grid((2, 2), &[(0, 0)]);
        let mut engine = DispatchEngine::new(&grid, facing(Orientation::South));
        let mut registry = registry_for(&[(0, 0)]);

        engine.step(Instruction::Disarm.into(), &mut registry).unwrap();

        assert!(!engine.grid().contains_mine((0, 0)));
        assert!(registry.is_empty());
        assert_eq!(
            engine.step(Instruction::MoveForward.into(), &mut registry),
            Ok(StepOutcome::Moved)
        );
    }
}
