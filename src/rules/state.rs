//! Authoritative game-mode state.
//!
//! One [`MatchState`] exists per match, owned by the state machine and
//! mutated only from the tick evaluation and the synchronous lifecycle
//! events. There are no ambient globals.

use std::collections::BTreeSet;

use crate::rules::{AllianceId, UnitId};

/// Possession sentinel for an eliminated alliance. Negative so it can
/// never be confused with zero legitimate possession.
pub const DISQUALIFIED: i64 = -1;

/// Win-progress of an alliance, as consumed by presentation layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Fraction of the win duration accrued, in `0.0..=1.0`.
    Fraction(f32),
    /// The alliance was eliminated and can no longer win.
    Disqualified,
}

/// The authoritative hill-ownership state for one match.
#[derive(Debug, Clone)]
pub struct MatchState {
    /// Current owning alliance, if any. At most one king at a time is
    /// structural: there is exactly one slot.
    pub king: Option<AllianceId>,
    /// Tick at which the current king (if any) began reigning.
    pub king_start_tick: u32,
    /// Alliance progressing toward or regressing from capture.
    pub contesting: Option<AllianceId>,
    /// Tick at which the current contest phase completes.
    pub contest_deadline: u32,
    /// `true` while progressing toward capture, `false` while
    /// regressing.
    pub contest_direction: bool,
    /// Precomputed tick at which the current king wins, cleared on
    /// dethronement.
    pub win_tick: Option<u32>,
    /// Buildings completed by the current king inside the hill, to be
    /// demolished on dethronement. Ordered so demolition effects are
    /// deterministic.
    pub hill_buildings: BTreeSet<UnitId>,
    /// Accumulated prior possession ticks per alliance;
    /// [`DISQUALIFIED`] once eliminated.
    possession: Vec<i64>,
}

impl MatchState {
    /// Create the initial state for a match with `num_alliances`
    /// alliances.
    #[must_use]
    pub fn new(num_alliances: usize) -> Self {
        Self {
            king: None,
            king_start_tick: 0,
            contesting: None,
            contest_deadline: 0,
            contest_direction: false,
            win_tick: None,
            hill_buildings: BTreeSet::new(),
            possession: vec![0; num_alliances],
        }
    }

    /// Raw signed possession ticks for an alliance. Negative means
    /// disqualified.
    #[must_use]
    pub fn possession_ticks(&self, alliance: AllianceId) -> i64 {
        self.possession
            .get(usize::from(alliance))
            .copied()
            .unwrap_or(0)
    }

    /// Whether an alliance has been disqualified.
    #[must_use]
    pub fn is_disqualified(&self, alliance: AllianceId) -> bool {
        self.possession_ticks(alliance) < 0
    }

    /// Add completed-reign ticks to an alliance's possession. Possession
    /// of a disqualified alliance never increases.
    pub fn accrue_possession(&mut self, alliance: AllianceId, ticks: u32) {
        if let Some(total) = self.possession.get_mut(usize::from(alliance))
            && *total >= 0
        {
            *total += i64::from(ticks);
        }
    }

    /// Permanently disqualify an alliance.
    pub fn disqualify(&mut self, alliance: AllianceId) {
        if let Some(total) = self.possession.get_mut(usize::from(alliance)) {
            *total = DISQUALIFIED;
        }
    }

    /// Win progress for an alliance at `tick`, counting prior possession
    /// plus the active reign when it is the current king.
    ///
    /// Disqualification is surfaced explicitly rather than clamped into
    /// the valid range.
    #[must_use]
    pub fn progress(&self, alliance: AllianceId, win_ticks: u32, tick: u32) -> Progress {
        let prior = self.possession_ticks(alliance);
        if prior < 0 {
            return Progress::Disqualified;
        }
        let mut total = prior;
        if self.king == Some(alliance) {
            total += i64::from(tick.saturating_sub(self.king_start_tick));
        }
        if win_ticks == 0 {
            return Progress::Fraction(1.0);
        }
        #[allow(clippy::cast_precision_loss)]
        let fraction = (total as f64 / f64::from(win_ticks)).clamp(0.0, 1.0);
        #[allow(clippy::cast_possible_truncation)]
        let fraction = fraction as f32;
        Progress::Fraction(fraction)
    }
}
