use std::collections::{BTreeMap, HashMap};

use crate::types::{CanonicalRecord, JobTitle};

/// Skill frequency counts across a canonical dataset, for reporting only
#[derive(Debug, Clone, Default)]
pub struct SkillTally {
    overall: HashMap<String, usize>,
    by_title: BTreeMap<JobTitle, HashMap<String, usize>>,
}

impl SkillTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a CanonicalRecord>,
    {
        let mut tally = Self::new();
        for record in records {
            tally.add(record);
        }
        tally
    }

    pub fn add(&mut self, record: &CanonicalRecord) {
        let per_title = self.by_title.entry(record.title).or_default();
        for skill in &record.skills {
            *self.overall.entry(skill.clone()).or_default() += 1;
            *per_title.entry(skill.clone()).or_default() += 1;
        }
    }

    pub fn distinct(&self) -> usize {
        self.overall.len()
    }

    /// Top `n` skills by count; ties broken alphabetically
    pub fn most_common(&self, n: usize) -> Vec<(String, usize)> {
        top_n(&self.overall, n)
    }

    /// Top `n` skills for each title present in the data
    pub fn most_common_by_title(&self, n: usize) -> BTreeMap<JobTitle, Vec<(String, usize)>> {
        self.by_title
            .iter()
            .map(|(title, counts)| (*title, top_n(counts, n)))
            .collect()
    }
}

fn top_n(counts: &HashMap<String, usize>, n: usize) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts
        .iter()
        .map(|(skill, count)| (skill.clone(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}
