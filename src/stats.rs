use std::fmt;

use crate::models::{AdminBlock, Task};

/// Which tasks to show by completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    /// Anything not completed.
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.is_completed(),
            StatusFilter::Completed => task.is_completed(),
        }
    }

    pub fn next(self) -> StatusFilter {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }

    /// Text shown when nothing passes the filters.
    pub fn empty_message(self) -> &'static str {
        match self {
            StatusFilter::Completed => "No completed tasks yet",
            StatusFilter::Active => "No active tasks",
            StatusFilter::All => "No tasks yet",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusFilter::All => "All Tasks",
            StatusFilter::Active => "Active",
            StatusFilter::Completed => "Completed",
        })
    }
}

/// Which tasks to show by admin block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BlockFilter {
    #[default]
    All,
    Morning,
    Afternoon,
}

impl BlockFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            BlockFilter::All => true,
            BlockFilter::Morning => task.admin_block == AdminBlock::Morning,
            BlockFilter::Afternoon => task.admin_block == AdminBlock::Afternoon,
        }
    }

    pub fn next(self) -> BlockFilter {
        match self {
            BlockFilter::All => BlockFilter::Morning,
            BlockFilter::Morning => BlockFilter::Afternoon,
            BlockFilter::Afternoon => BlockFilter::All,
        }
    }
}

impl fmt::Display for BlockFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlockFilter::All => "All Blocks",
            BlockFilter::Morning => "Morning",
            BlockFilter::Afternoon => "Afternoon",
        })
    }
}

/// Tasks passing both the status and the block filter, in list order.
pub fn filter_tasks(tasks: &[Task], status: StatusFilter, block: BlockFilter) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| status.matches(t) && block.matches(t))
        .collect()
}

/// Counts derived from the full (unfiltered) task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub morning: usize,
    pub afternoon: usize,
}

impl Stats {
    pub fn from_tasks(tasks: &[Task]) -> Stats {
        tasks.iter().fold(Stats::default(), |mut s, t| {
            s.total += 1;
            if t.is_completed() {
                s.completed += 1;
            }
            match t.admin_block {
                AdminBlock::Morning => s.morning += 1,
                AdminBlock::Afternoon => s.afternoon += 1,
            }
            s
        })
    }

    /// Share of completed tasks as a rounded percentage; `None` without tasks.
    pub fn completion_percent(&self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        Some((self.completed as f64 / self.total as f64 * 100.0).round() as u8)
    }

    /// Completed share in `0.0..=1.0`, for progress bars.
    pub fn completion_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}
