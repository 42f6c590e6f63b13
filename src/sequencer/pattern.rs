// Pattern - Fixed-grid step sequence for one instrument
// A pattern is a looping row of on/off steps, always a whole number of measures

/// Grid subdivisions per measure
pub const DIVISIONS: usize = 32;

/// Step notation character for an active step
pub const STEP_ON: char = 'x';

/// Step notation character for an inactive step
pub const STEP_OFF: char = '.';

/// A looping on/off step pattern
///
/// The length is always a positive multiple of [`DIVISIONS`]. The playhead
/// (`position`) is derived from the transport tick on every cycle, so edits
/// that change the length never desynchronize it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// Step states, `true` = active
    cells: Vec<bool>,

    /// Current playhead index
    position: usize,
}

impl Pattern {
    /// Create an empty one-measure pattern
    pub fn new() -> Self {
        Self {
            cells: vec![false; DIVISIONS],
            position: 0,
        }
    }

    /// Create a pattern from step notation
    ///
    /// See [`Pattern::set_steps`] for the accepted notation.
    pub fn from_steps(steps: &str) -> Self {
        let mut pattern = Self::new();
        pattern.set_steps(steps);
        pattern
    }

    /// Replace the cell content from step notation
    ///
    /// A space or `.` is a rest, any other character is a hit. The result is
    /// padded with rests to a whole number of measures; an empty string gives
    /// one empty measure. The playhead is left where it is until the next tick.
    pub fn set_steps(&mut self, steps: &str) {
        let mut cells: Vec<bool> = steps.chars().map(|c| c != ' ' && c != STEP_OFF).collect();
        let measures = cells.len().div_ceil(DIVISIONS).max(1);
        cells.resize(measures * DIVISIONS, false);
        self.cells = cells;
        self.debug_check_length();
    }

    /// Render the cells as `x`/`.` step notation
    pub fn to_steps(&self) -> String {
        self.cells
            .iter()
            .map(|&on| if on { STEP_ON } else { STEP_OFF })
            .collect()
    }

    /// All cells, in order
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Companion to [`Pattern::len`]; never true, since every mutator keeps
    /// at least one measure
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of measures
    pub fn measures(&self) -> usize {
        self.cells.len().div_ceil(DIVISIONS)
    }

    /// Current playhead index
    pub fn position(&self) -> usize {
        self.position
    }

    /// Normalize any index (negative included) into the pattern
    pub fn wrap_index(&self, index: i64) -> usize {
        index.rem_euclid(self.cells.len() as i64) as usize
    }

    /// Whether the step at `index mod length` is active
    pub fn is_active(&self, index: i64) -> bool {
        self.cells[self.wrap_index(index)]
    }

    /// Flip the step at `index mod length`
    pub fn toggle(&mut self, index: i64) {
        let idx = self.wrap_index(index);
        self.cells[idx] = !self.cells[idx];
    }

    /// Append a copy of the whole pattern to itself
    pub fn duplicate(&mut self) {
        self.cells.extend_from_within(..);
        self.debug_check_length();
    }

    /// Append one measure of rests
    pub fn extend(&mut self) {
        self.cells.resize(self.cells.len() + DIVISIONS, false);
        self.debug_check_length();
    }

    /// Remove the last measure; no-op at one measure
    pub fn shorten(&mut self) {
        if self.cells.len() > DIVISIONS {
            self.cells.truncate(self.cells.len() - DIVISIONS);
        }
        self.debug_check_length();
    }

    /// Clear to one measure of rests
    pub fn reset(&mut self) {
        self.cells.clear();
        self.cells.resize(DIVISIONS, false);
        self.debug_check_length();
    }

    /// Map the global transport tick onto the playhead
    ///
    /// Must be called every cycle: the position is recomputed from the tick,
    /// never incremented.
    pub fn set_position(&mut self, tick: u64) {
        self.position = (tick % self.cells.len() as u64) as usize;
    }

    /// Whether the step under the playhead is active
    ///
    /// The index is re-wrapped so a shorten between `set_position` and this
    /// call can never read out of bounds.
    pub fn is_active_at_current_position(&self) -> bool {
        self.cells[self.position % self.cells.len()]
    }

    /// Length must stay a positive multiple of `DIVISIONS`
    fn debug_check_length(&self) {
        debug_assert!(
            !self.cells.is_empty() && self.cells.len() % DIVISIONS == 0,
            "pattern length {} is not a whole number of measures",
            self.cells.len()
        );
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new()
    }
}
