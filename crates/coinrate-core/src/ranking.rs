//! Per character and skill ranking of saved rates.

use serde::{Deserialize, Serialize};

use crate::entry::Entry;

/// Average rate of every entry sharing a `(character, skill)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRow {
    pub character: String,
    pub skill: i64,
    pub average_cpm: f64,
    pub count: usize,
}

/// Running total for one `(character, skill)` pair.
struct Group {
    character: String,
    skill: i64,
    sum: f64,
    count: usize,
}

impl Group {
    fn matches(&self, entry: &Entry) -> bool {
        self.character == entry.character && self.skill == entry.skill
    }
}

impl From<Group> for RankRow {
    fn from(group: Group) -> Self {
        RankRow {
            average_cpm: group.sum / group.count as f64,
            character: group.character,
            skill: group.skill,
            count: group.count,
        }
    }
}

/// Group, average and sort descending by average.
///
/// Groups keep their first-seen order among equal averages.
pub fn aggregate(entries: &[Entry]) -> Vec<RankRow> {
    let mut groups: Vec<Group> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|g| g.matches(entry)) {
            Some(group) => {
                group.sum += entry.cpm;
                group.count += 1;
            }
            None => groups.push(Group {
                character: entry.character.clone(),
                skill: entry.skill,
                sum: entry.cpm,
                count: 1,
            }),
        }
    }

    let mut rows: Vec<RankRow> = groups.into_iter().map(RankRow::from).collect();
    rows.sort_by(|a, b| b.average_cpm.total_cmp(&a.average_cpm));
    rows
}
