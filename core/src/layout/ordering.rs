use crate::layout::format::DisplayFormat;

/// The twelve clinical leads in natural reading order.
pub const STANDARD_LEADS: [&str; 12] = [
    "I", "II", "III", "aVR", "aVL", "aVF", "V1", "V2", "V3", "V4", "V5", "V6",
];

const LEAD_II: usize = 1;

// Positions into STANDARD_LEADS, row-major.
const TWO_COLUMN: [usize; 12] = [0, 6, 1, 7, 2, 8, 3, 9, 4, 10, 5, 11];
const FOUR_COLUMN: [usize; 12] = [0, 3, 6, 9, 1, 4, 7, 10, 2, 5, 8, 11];

/// Maps a channel label such as `"Lead aVR"` to its standard lead position.
pub fn standard_lead_position(name: &str) -> Option<usize> {
    let trimmed = name.trim();
    let bare = match trimmed.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("lead ") => trimmed[5..].trim(),
        _ => trimmed,
    };
    STANDARD_LEADS
        .iter()
        .position(|lead| lead.eq_ignore_ascii_case(bare))
}

/// Channels arranged for one format: grid slots row-major plus an optional
/// full-width rhythm row underneath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelOrder {
    pub columns: usize,
    pub slots: Vec<Option<usize>>,
    pub rhythm: Option<usize>,
}

impl ChannelOrder {
    pub fn grid_rows(&self) -> usize {
        self.slots.len().div_ceil(self.columns.max(1))
    }

    pub fn rows(&self) -> usize {
        self.grid_rows() + usize::from(self.rhythm.is_some())
    }

    /// Channel indices in display order, rhythm last.
    pub fn channels(&self) -> Vec<usize> {
        self.slots.iter().flatten().copied().chain(self.rhythm).collect()
    }
}

/// Ordering strategy chosen once per dataset from its channel names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadOrdering {
    /// All twelve standard leads present; `leads[p]` is the channel holding
    /// standard lead `p`.
    Standard { leads: [usize; 12], rhythm: usize },
    /// Anything else: insertion order.
    Fallback {
        channel_count: usize,
        rhythm: Option<usize>,
    },
}

impl LeadOrdering {
    pub fn select(names: &[String], flagged_rhythm: Option<usize>) -> Self {
        let flagged_rhythm = flagged_rhythm.filter(|&r| r < names.len());
        let mut leads = [None; 12];
        for (channel, name) in names.iter().enumerate() {
            if let Some(position) = standard_lead_position(name) {
                leads[position].get_or_insert(channel);
            }
        }

        if leads.iter().all(Option::is_some) {
            let leads = leads.map(|lead| lead.unwrap_or_default());
            let rhythm = flagged_rhythm.unwrap_or(leads[LEAD_II]);
            return LeadOrdering::Standard { leads, rhythm };
        }

        let rhythm = flagged_rhythm.or(if names.len() > 1 { Some(1) } else { None });
        LeadOrdering::Fallback {
            channel_count: names.len(),
            rhythm,
        }
    }

    pub fn is_standard(&self) -> bool {
        matches!(self, LeadOrdering::Standard { .. })
    }

    pub fn rhythm(&self) -> Option<usize> {
        match self {
            LeadOrdering::Standard { rhythm, .. } => Some(*rhythm),
            LeadOrdering::Fallback { rhythm, .. } => *rhythm,
        }
    }

    pub fn order(&self, format: DisplayFormat) -> ChannelOrder {
        let columns = format.columns();
        let rhythm = if format.has_rhythm_strip() {
            self.rhythm()
        } else {
            None
        };

        let slots = match self {
            LeadOrdering::Standard { leads, .. } => {
                let positions: &[usize] = match format {
                    DisplayFormat::Default => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
                    DisplayFormat::TwoColumn => &TWO_COLUMN,
                    DisplayFormat::FourColumn | DisplayFormat::FourColumnWithRhythm => {
                        &FOUR_COLUMN
                    }
                };
                positions.iter().map(|&p| Some(leads[p])).collect()
            }
            LeadOrdering::Fallback { channel_count, .. } => {
                let body: Vec<usize> = (0..*channel_count)
                    .filter(|&c| Some(c) != rhythm)
                    .collect();
                interleave(&body, columns)
            }
        };

        ChannelOrder {
            columns,
            slots,
            rhythm,
        }
    }
}

/// Slices `items` into `columns` consecutive groups and lays them out
/// row-major, leaving gaps when the last group is short.
fn interleave(items: &[usize], columns: usize) -> Vec<Option<usize>> {
    let columns = columns.max(1);
    let rows = items.len().div_ceil(columns);
    let mut slots = Vec::with_capacity(rows * columns);
    for row in 0..rows {
        for column in 0..columns {
            slots.push(items.get(column * rows + row).copied());
        }
    }
    while slots.last() == Some(&None) {
        slots.pop();
    }
    slots
}
