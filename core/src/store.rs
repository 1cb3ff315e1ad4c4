use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

/// Resolves mine records by position and deletes them by id.
pub trait MineRegistry {
    fn find_mine_at(&self, coords: Coord2) -> Option<MineRecord>;
    fn delete_mine(&mut self, id: MineId) -> Option<MineRecord>;
}

/// Holder of the single map a set of rovers drive on.
pub trait GridStore {
    fn fetch_grid(&self) -> Option<Grid>;
    fn store_grid(&mut self, grid: Grid);
}

pub trait RoverStore {
    fn fetch_rover(&self, id: RoverId) -> Option<Rover>;
    fn store_rover(&mut self, rover: Rover);
}

/// A plain list of records works as a registry.
impl MineRegistry for Vec<MineRecord> {
    fn find_mine_at(&self, coords: Coord2) -> Option<MineRecord> {
        self.iter().find(|mine| mine.position() == coords).cloned()
    }

    fn delete_mine(&mut self, id: MineId) -> Option<MineRecord> {
        let index = self.iter().position(|mine| mine.id == id)?;
        Some(self.remove(index))
    }
}

/// Where a dispatch starts from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    /// Every dispatch launches from `(0, 0)` facing South.
    Origin,
    /// Continue from the position and heading the last dispatch ended at.
    Resume,
}

impl Default for StartPolicy {
    fn default() -> Self {
        Self::Origin
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub command_mode: CommandMode,
    pub start_policy: StartPolicy,
}

impl DispatchSettings {
    pub const fn start_pose(&self, rover: &Rover) -> Pose {
        match self.start_policy {
            StartPolicy::Origin => Pose::LAUNCH,
            StartPolicy::Resume => Pose::new(rover.position, rover.orientation),
        }
    }
}

/// Dispatches a stored rover and writes the outcome back.
///
/// Missing rover or map is reported before anything runs. Mine records are
/// deleted while the engine runs; cleared cells and the rover record are
/// written back once it is done. Taking the store by `&mut` keeps a second
/// dispatch on the same map from interleaving with this one.
pub fn dispatch_rover<S>(
    store: &mut S,
    rover_id: RoverId,
    settings: DispatchSettings,
) -> Result<DispatchReport>
where
    S: GridStore + MineRegistry + RoverStore + ?Sized,
{
    let mut rover = store
        .fetch_rover(rover_id)
        .ok_or(RoverError::RoverNotFound(rover_id))?;
    let mut grid = store.fetch_grid().ok_or(RoverError::MapNotFound)?;
    let commands = CommandSequence::parse(&rover.commands, settings.command_mode)?;
    let start = settings.start_pose(&rover);
    grid.validate_coords(start.position)?;

    log::info!(
        "Dispatching rover {rover_id} from {:?} facing {} with {} command(s)",
        start.position,
        start.orientation,
        commands.len()
    );
    let report = dispatch(&grid, start, &commands, store);

    if !report.cleared_cells.is_empty() {
        for &coords in &report.cleared_cells {
            grid.clear_mine(coords)?;
        }
        store.store_grid(grid);
    }
    rover.apply_report(&report);
    store.store_rover(rover);

    log::info!(
        "Rover {rover_id} {} at {:?} after {:?}, {} mine(s) disarmed",
        report.status,
        report.pose.position,
        report.executed_commands,
        report.cleared_cells.len()
    );
    Ok(report)
}

/// In-memory repository holding one map, its mine registry and the rovers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    grid: Option<Grid>,
    mines: BTreeMap<MineId, MineRecord>,
    rovers: BTreeMap<RoverId, Rover>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(grid: Grid) -> Self {
        Self {
            grid: Some(grid),
            ..Self::default()
        }
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Cuts or extends the map, keeping overlapping cells. Records of mines
    /// that fall outside the new bounds are dropped.
    pub fn resize_grid(&mut self, size: Size2) -> Result<()> {
        let grid = self.grid.as_ref().ok_or(RoverError::MapNotFound)?;
        let resized = grid.resized(size)?;
        self.mines.retain(|id, mine| {
            let keep = resized.is_valid_position(mine.position());
            if !keep {
                log::debug!("Dropping mine {id} outside resized map");
            }
            keep
        });
        self.grid = Some(resized);
        Ok(())
    }

    pub fn mines(&self) -> impl Iterator<Item = &MineRecord> {
        self.mines.values()
    }

    /// Registers a mine and marks its cell on the map.
    pub fn place_mine(&mut self, mine: MineRecord) -> Result<()> {
        if self.mines.contains_key(&mine.id) {
            return Err(RoverError::DuplicateMine(mine.id));
        }
        let grid = self.grid.as_mut().ok_or(RoverError::MapNotFound)?;
        grid.place_mine(mine.position())?;
        self.mines.insert(mine.id, mine);
        Ok(())
    }

    /// Moves a mine, optionally renaming it. The target cell must be free.
    pub fn update_mine(
        &mut self,
        id: MineId,
        position: Option<Coord2>,
        serial_number: Option<String>,
    ) -> Result<&MineRecord> {
        let grid = self.grid.as_mut().ok_or(RoverError::MapNotFound)?;
        let mine = self.mines.get_mut(&id).ok_or(RoverError::MineNotFound(id))?;

        if let Some(position) = position {
            grid.validate_coords(position)?;
            if position != mine.position() {
                grid.place_mine(position)?;
                grid.clear_mine(mine.position())?;
                (mine.x, mine.y) = position;
            }
        }
        if let Some(serial_number) = serial_number {
            mine.serial_number = serial_number;
        }
        Ok(mine)
    }

    /// Deletes a mine record and clears its cell.
    pub fn remove_mine(&mut self, id: MineId) -> Result<MineRecord> {
        let mine = self.mines.remove(&id).ok_or(RoverError::MineNotFound(id))?;
        if let Some(grid) = self.grid.as_mut() {
            grid.clear_mine(mine.position())?;
        }
        Ok(mine)
    }

    pub fn rovers(&self) -> impl Iterator<Item = &Rover> {
        self.rovers.values()
    }

    pub fn rover(&self, id: RoverId) -> Result<&Rover> {
        self.rovers.get(&id).ok_or(RoverError::RoverNotFound(id))
    }

    /// Stores a rover, returning the one it replaced.
    pub fn insert_rover(&mut self, rover: Rover) -> Option<Rover> {
        self.rovers.insert(rover.id, rover)
    }

    pub fn set_rover_commands(&mut self, id: RoverId, commands: &str) -> Result<&Rover> {
        let rover = self.rovers.get_mut(&id).ok_or(RoverError::RoverNotFound(id))?;
        rover.set_commands(commands)?;
        Ok(rover)
    }
}

impl MineRegistry for MemoryStore {
    fn find_mine_at(&self, coords: Coord2) -> Option<MineRecord> {
        self.mines
            .values()
            .find(|mine| mine.position() == coords)
            .cloned()
    }

    fn delete_mine(&mut self, id: MineId) -> Option<MineRecord> {
        self.mines.remove(&id)
    }
}

impl GridStore for MemoryStore {
    fn fetch_grid(&self) -> Option<Grid> {
        self.grid.clone()
    }

    fn store_grid(&mut self, grid: Grid) {
        self.grid = Some(grid);
    }
}

impl RoverStore for MemoryStore {
    fn fetch_rover(&self, id: RoverId) -> Option<Rover> {
        self.rovers.get(&id).cloned()
    }

    fn store_rover(&mut self, rover: Rover) {
        self.rovers.insert(rover.id, rover);
    }
}
